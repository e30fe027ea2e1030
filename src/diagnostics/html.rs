use std::io::Write;

/// append-only html log. survives crashes by reopening per line; the
/// file is for humans skimming a long run, not for machines.
pub struct Html {
    path: String,
}

impl Html {
    pub fn create(path: &str) -> Self {
        if std::fs::metadata(path).is_err() {
            std::fs::write(path, "<!DOCTYPE html>\n<title>tasbot log</title>\n<body>\n")
                .expect("create html log");
        }
        Self {
            path: path.to_string(),
        }
    }

    pub fn log(&self, message: &str) {
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(&self.path)
            .expect("append html log");
        let escaped = message
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;");
        writeln!(file, "<div>{}</div>", escaped).expect("write html log");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_append_and_escape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.html");
        let path = path.to_str().unwrap();
        let html = Html::create(path);
        html.log("round 1");
        html.log("a < b");
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("<div>round 1</div>"));
        assert!(content.contains("a &lt; b"));
    }
}

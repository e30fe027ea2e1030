use crate::console::Input;
use anyhow::Context;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Write;
use std::path::Path;

/// just enough .fm2 to replay a recorded trace and publish our own.
/// input rows look like `|0|RLDUTSBA|||`; a released button is `.` or
/// a space. header keys we do not produce are ignored on read.
const BUTTONS: &str = "RLDUTSBA";

pub fn read(path: &str) -> anyhow::Result<Vec<Input>> {
    let file = std::fs::File::open(path).with_context(|| format!("open movie {}", path))?;
    let mut inputs = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.with_context(|| format!("read movie {}", path))?;
        if !line.starts_with('|') {
            continue;
        }
        let fields = line.split('|').collect::<Vec<&str>>();
        let pad = fields.get(2).copied().unwrap_or_default();
        let mut bits = 0u8;
        for (i, c) in pad.chars().take(8).enumerate() {
            if c != '.' && c != ' ' {
                bits |= 0x80 >> i;
            }
        }
        inputs.push(Input::from(bits));
    }
    log::info!("read {} inputs from {}", inputs.len(), path);
    Ok(inputs)
}

pub fn write<P: AsRef<Path>>(path: P, inputs: &[Input], game: &str) -> anyhow::Result<()> {
    let path = path.as_ref();
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("create movie {}", path.display()))?;
    writeln!(file, "version 3")?;
    writeln!(file, "emuVersion 9828")?;
    writeln!(file, "romFilename {}", game)?;
    writeln!(file, "rerecordCount 0")?;
    writeln!(file, "guid 00000000-0000-0000-0000-000000000000")?;
    writeln!(file, "fourscore 0")?;
    writeln!(file, "port0 1")?;
    writeln!(file, "port1 0")?;
    writeln!(file, "port2 0")?;
    for input in inputs {
        let bits = input.bits();
        let pad = BUTTONS
            .chars()
            .enumerate()
            .map(|(i, c)| if bits & (0x80 >> i) != 0 { c } else { '.' })
            .collect::<String>();
        writeln!(file, "|0|{}|||", pad)?;
    }
    log::info!("wrote {} inputs to {}", inputs.len(), path.display());
    Ok(())
}

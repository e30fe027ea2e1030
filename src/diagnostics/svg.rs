use super::Distribution;
use crate::console::Memory;
use crate::objective::Objectives;
use std::io::Write;

const WIDTH: f64 = 1024.0;
const HEIGHT: f64 = 512.0;
const COLORS: &[&str] = &["#227", "#272", "#722", "#277", "#727", "#772"];

/// normalized value of every trajectory frame, one polyline. a human
/// eyeballs whether the learned preorder actually climbs along the
/// human playthrough.
pub fn objectives_svg(path: &str, objectives: &Objectives, trajectory: &[Memory]) {
    let values = trajectory
        .iter()
        .map(|m| objectives.normalized_value(m))
        .collect::<Vec<f64>>();
    let mut file = header(path);
    polyline(&mut file, &values, 0.0, 1.0, COLORS[0]);
    footer(&mut file);
    log::info!("wrote objective trajectory to {}", path);
}

/// per-round candidate scores: immediates as one series per round slot,
/// with the chosen candidate's immediate restated in a second color
pub fn distributions_svg(path: &str, distributions: &[Distribution]) {
    let all = distributions
        .iter()
        .flat_map(|d| d.immediates.iter().chain(d.positives.iter()))
        .copied()
        .collect::<Vec<f64>>();
    let lo = all.iter().copied().fold(0.0, f64::min);
    let hi = all.iter().copied().fold(1.0, f64::max);
    let mut file = header(path);
    let immediates = distributions
        .iter()
        .map(|d| d.immediates.iter().copied().sum::<f64>() / d.immediates.len().max(1) as f64)
        .collect::<Vec<f64>>();
    let chosen = distributions
        .iter()
        .map(|d| d.immediates.get(d.chosen).copied().unwrap_or(0.0))
        .collect::<Vec<f64>>();
    let positives = distributions
        .iter()
        .map(|d| d.positives.iter().copied().fold(0.0, f64::max))
        .collect::<Vec<f64>>();
    polyline(&mut file, &immediates, lo, hi, COLORS[0]);
    polyline(&mut file, &chosen, lo, hi, COLORS[1]);
    polyline(&mut file, &positives, lo, hi, COLORS[2]);
    footer(&mut file);
    log::info!("wrote {} score distributions to {}", distributions.len(), path);
}

/// every motif's weight history over the committed movie
pub fn motifs_svg(path: &str, motifs: &crate::motifs::Motifs) {
    let hi = motifs
        .histories()
        .flat_map(|h| h.iter().map(|&(_, w)| w))
        .fold(1.0, f64::max);
    let mut file = header(path);
    for (i, history) in motifs.histories().enumerate() {
        let values = history.iter().map(|&(_, w)| w).collect::<Vec<f64>>();
        polyline(&mut file, &values, 0.0, hi, COLORS[i % COLORS.len()]);
    }
    footer(&mut file);
    log::info!("wrote motif weight histories to {}", path);
}

fn header(path: &str) -> std::fs::File {
    let mut file = std::fs::File::create(path).expect("create svg");
    writeln!(
        file,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\">",
        WIDTH, HEIGHT
    )
    .expect("write svg");
    file
}

fn footer(file: &mut std::fs::File) {
    writeln!(file, "</svg>").expect("write svg");
}

fn polyline(file: &mut std::fs::File, values: &[f64], lo: f64, hi: f64, color: &str) {
    if values.is_empty() {
        return;
    }
    let span = (hi - lo).max(1e-9);
    let step = WIDTH / values.len().max(1) as f64;
    let points = values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let x = i as f64 * step;
            let y = HEIGHT - (v - lo) / span * HEIGHT;
            format!("{:.1},{:.1}", x, y)
        })
        .collect::<Vec<String>>()
        .join(" ");
    writeln!(
        file,
        "  <polyline fill=\"none\" stroke=\"{}\" points=\"{}\"/>",
        color, points
    )
    .expect("write svg");
}

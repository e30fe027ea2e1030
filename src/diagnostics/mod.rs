mod html;
mod svg;

pub use html::Html;
pub use svg::distributions_svg;
pub use svg::motifs_svg;
pub use svg::objectives_svg;

use crate::Frame;
use crate::Score;

/// what one selector step saw: per-candidate immediate deltas, best and
/// worst future scalars, normalized values, and which candidate won.
/// collected for the per-round score plots; nothing reads it back.
pub struct Distribution {
    pub start: Frame,
    pub immediates: Vec<Score>,
    pub positives: Vec<Score>,
    pub negatives: Vec<Score>,
    pub norms: Vec<Score>,
    pub chosen: usize,
}

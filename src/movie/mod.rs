mod fm2;

pub use fm2::read;
pub use fm2::write;

use crate::Frame;
use crate::console::Input;

/// the committed playthrough: inputs plus a parallel annotation per
/// input saying where it came from. the two stay the same length by
/// construction; everything that rewinds goes through truncate.
#[derive(Default)]
pub struct Movie {
    inputs: Vec<Input>,
    annotations: Vec<String>,
}

impl Movie {
    pub fn push(&mut self, input: Input, annotation: &str) {
        self.inputs.push(input);
        self.annotations.push(annotation.to_string());
    }

    pub fn len(&self) -> Frame {
        self.inputs.len()
    }
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }
    pub fn annotations(&self) -> &[String] {
        &self.annotations
    }

    /// rewind to a prefix
    pub fn truncate(&mut self, len: Frame) {
        assert!(len <= self.inputs.len(), "rewind past the end");
        self.inputs.truncate(len);
        self.annotations.truncate(len);
    }

    /// length of the leading run of blank inputs
    pub fn blank_prefix(inputs: &[Input]) -> usize {
        inputs.iter().take_while(|i| i.is_blank()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotations_track_inputs() {
        let mut movie = Movie::default();
        movie.push(Input::from(0x80), "ftr-0");
        movie.push(Input::from(0x00), "backfill");
        assert_eq!(movie.len(), 2);
        assert_eq!(movie.annotations().len(), movie.len());
        movie.truncate(1);
        assert_eq!(movie.annotations().len(), movie.len());
        assert_eq!(movie.annotations()[0], "ftr-0");
    }

    #[test]
    fn blank_prefix_counts_leading_zeros() {
        let inputs = [0x00u8, 0x00, 0x00, 0x08, 0x00]
            .iter()
            .map(|&b| Input::from(b))
            .collect::<Vec<Input>>();
        assert_eq!(Movie::blank_prefix(&inputs), 3);
    }
}

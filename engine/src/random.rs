//! Uniform choice over response variants.

/// Picks an index uniformly from `0..len`. Callers never pass `len == 0`.
pub trait Picker {
    fn pick(&mut self, len: usize) -> usize;
}

/// Thread-local RNG. No cryptographic quality needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPicker;

impl Picker for RandomPicker {
    fn pick(&mut self, len: usize) -> usize {
        rand::random_range(0..len)
    }
}

/// Replays a fixed sequence of indices, wrapping each into range.
#[derive(Debug, Clone)]
pub struct SequencePicker {
    sequence: Vec<usize>,
    cursor: usize,
}

impl SequencePicker {
    #[must_use]
    pub fn new(sequence: impl Into<Vec<usize>>) -> Self {
        Self {
            sequence: sequence.into(),
            cursor: 0,
        }
    }

    /// Always picks the first variant.
    #[must_use]
    pub fn first() -> Self {
        Self::new(vec![0])
    }
}

impl Picker for SequencePicker {
    fn pick(&mut self, len: usize) -> usize {
        if self.sequence.is_empty() || len == 0 {
            return 0;
        }
        let value = self.sequence[self.cursor % self.sequence.len()];
        self.cursor += 1;
        value % len
    }
}

/// Choose one of `options`, or `default` when there are none.
pub fn pick_text(picker: &mut dyn Picker, options: &[String], default: &str) -> String {
    if options.is_empty() {
        return default.to_owned();
    }
    options[picker.pick(options.len())].clone()
}

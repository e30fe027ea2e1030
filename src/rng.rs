use rand::RngCore;
use rand::SeedableRng;
use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;

/// explicitly-owned randomness. every stochastic operation in the crate
/// borrows one of these; nothing draws from ambient global state, so a
/// run is a pure function of its seeds. the underlying generator is
/// ChaCha12 via StdRng.
///
/// `random_double` divides a 32-bit draw by 2^32 - 1. downstream
/// sampling depends on exactly this precision, so resist the urge to
/// use the full 53 bits.
pub struct Rng(rand::rngs::StdRng);

impl Rng {
    /// derive a generator from a textual seed
    pub fn seeded(seed: &str) -> Self {
        let ref mut hasher = DefaultHasher::new();
        seed.hash(hasher);
        Self(rand::rngs::StdRng::seed_from_u64(hasher.finish()))
    }

    /// uniform in [0, 1]
    pub fn random_double(&mut self) -> f64 {
        self.0.next_u32() as f64 / u32::MAX as f64
    }

    /// uniform in [0, n)
    pub fn random_below(&mut self, n: usize) -> usize {
        assert!(n > 0, "empty range");
        self.0.next_u32() as usize % n
    }

    /// true once in n draws
    pub fn one_in(&mut self, n: u32) -> bool {
        self.0.next_u32() % n == 0
    }

    pub fn random_byte(&mut self) -> u8 {
        self.0.next_u32() as u8
    }

    /// fisher-yates
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.random_below(i + 1);
            items.swap(i, j);
        }
    }

    /// (start, length) of a random span over a sequence of `len` items.
    /// the exponent biases toward short spans: draw d = U(0,1)^exponent,
    /// span = ceil(d * (len - 1)) + 1, start uniform over what fits.
    pub fn random_span(&mut self, len: usize, exponent: i32) -> (usize, usize) {
        assert!(len > 0, "span over empty sequence");
        let d = self.random_double().powi(exponent);
        let span = ((d * (len - 1) as f64).ceil() as usize + 1).min(len);
        let start = (self.random_double() * (len - span) as f64) as usize;
        (start, span)
    }
}

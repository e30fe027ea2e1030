use super::Input;
use super::Memory;
use crate::CACHE_RECENT;
use crate::CACHE_STICKY;
use serde::Deserialize;
use serde::Serialize;
use std::collections::HashMap;

/// opaque saved machine state. only the console that produced one can
/// interpret it; everyone else moves it around whole.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(Vec<u8>);

impl Snapshot {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }
}

/// the seam to the actual machine. a hardware core implements these four
/// operations; everything above this trait is emulator-agnostic.
pub trait Console {
    /// advance one frame with the given controller state
    fn step(&mut self, input: Input);
    fn save(&self) -> Snapshot;
    fn load(&mut self, snapshot: &Snapshot);
    fn memory(&self) -> Memory;
}

/// a console plus a two-tier (state, input) -> state step cache. the
/// sticky tier fills once and holds until reset; the recent tier is
/// cleared wholesale when full. retried scoring work revisits the same
/// states constantly, which is what makes worker retries cheap.
pub struct Emulator {
    console: Box<dyn Console>,
    sticky: HashMap<(Snapshot, Input), Snapshot>,
    recent: HashMap<(Snapshot, Input), Snapshot>,
    sticky_cap: usize,
    recent_cap: usize,
    hits: usize,
    misses: usize,
}

impl Emulator {
    pub fn new(console: Box<dyn Console>) -> Self {
        Self {
            console,
            sticky: HashMap::new(),
            recent: HashMap::new(),
            sticky_cap: CACHE_STICKY,
            recent_cap: CACHE_RECENT,
            hits: 0,
            misses: 0,
        }
    }

    pub fn step(&mut self, input: Input) {
        self.console.step(input);
    }
    pub fn save(&self) -> Snapshot {
        self.console.save()
    }
    pub fn load(&mut self, snapshot: &Snapshot) {
        self.console.load(snapshot);
    }
    pub fn memory(&self) -> Memory {
        self.console.memory()
    }

    /// step, consulting the cache first. a hit loads the cached successor
    /// instead of emulating the frame.
    pub fn cached_step(&mut self, input: Input) {
        let key = (self.console.save(), input);
        if let Some(next) = self.sticky.get(&key).or_else(|| self.recent.get(&key)) {
            self.hits += 1;
            let next = next.clone();
            self.console.load(&next);
            return;
        }
        self.misses += 1;
        self.console.step(input);
        let next = self.console.save();
        if self.sticky.len() < self.sticky_cap {
            self.sticky.insert(key, next);
        } else {
            if self.recent.len() >= self.recent_cap {
                self.recent.clear();
            }
            self.recent.insert(key, next);
        }
    }

    /// drop both tiers and set fresh capacities
    pub fn reset_cache(&mut self, sticky: usize, recent: usize) {
        self.sticky.clear();
        self.recent.clear();
        self.sticky_cap = sticky;
        self.recent_cap = recent;
        log::debug!("step cache reset to {} + {}", sticky, recent);
    }

    /// (hits, misses) since construction
    pub fn cache_stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }
}

#[cfg(test)]
mod tests {
    use super::super::Sim;
    use super::*;

    fn drive(emulator: &mut Emulator, cached: bool) -> Memory {
        let script = [0x80u8, 0x80, 0x81, 0x00, 0x80, 0x01, 0x80, 0x80];
        for bits in script {
            match cached {
                true => emulator.cached_step(Input::from(bits)),
                false => emulator.step(Input::from(bits)),
            }
        }
        emulator.memory()
    }

    #[test]
    fn cached_step_matches_step() {
        let mut plain = Emulator::new(Box::new(Sim::new("cache")));
        let mut caching = Emulator::new(Box::new(Sim::new("cache")));
        assert!(drive(&mut plain, false) == drive(&mut caching, true));
    }

    #[test]
    fn replay_hits_cache() {
        let mut emulator = Emulator::new(Box::new(Sim::new("cache")));
        let start = emulator.save();
        let first = drive(&mut emulator, true);
        emulator.load(&start);
        let second = drive(&mut emulator, true);
        assert!(first == second);
        let (hits, misses) = emulator.cache_stats();
        assert_eq!(hits, 8);
        assert_eq!(misses, 8);
    }

    #[test]
    fn reset_clears_tiers() {
        let mut emulator = Emulator::new(Box::new(Sim::new("cache")));
        let start = emulator.save();
        drive(&mut emulator, true);
        emulator.reset_cache(16, 16);
        emulator.load(&start);
        drive(&mut emulator, true);
        let (hits, _) = emulator.cache_stats();
        assert_eq!(hits, 0);
    }

    #[test]
    fn recent_tier_clears_when_full() {
        let mut emulator = Emulator::new(Box::new(Sim::new("cache")));
        emulator.reset_cache(0, 4);
        for bits in 0..32u8 {
            emulator.cached_step(Input::from(bits));
        }
        let (_, misses) = emulator.cache_stats();
        assert_eq!(misses, 32);
    }
}

use super::Objective;
use crate::OBSERVATION_SLOTS;
use crate::Score;
use crate::Weight;
use crate::console::Memory;
use crate::rng::Rng;
use std::collections::BTreeMap;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Write;

/// weight and normalization history for one objective
struct Entry {
    weight: Weight,
    /// up to 64 previously-seen projections, kept sorted ascending.
    /// used only to place an instantaneous value on a [0, 1] scale.
    observations: Vec<Vec<u8>>,
}

/// the weighted collection of objectives. keyed by the index tuple
/// itself, so identity is stable across processes and across save/load,
/// and iteration order is deterministic: masters and helpers that
/// loaded the same file sum in the same order.
#[derive(Default)]
pub struct Objectives {
    entries: BTreeMap<Objective, Entry>,
}

impl Objectives {
    /// add an objective at the given weight; duplicates keep the
    /// existing entry
    pub fn insert(&mut self, objective: Objective, weight: Weight) {
        self.entries.entry(objective).or_insert(Entry {
            weight,
            observations: Vec::new(),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    /// sum of weights over enabled objectives
    pub fn active_weight(&self) -> Weight {
        self.entries.values().map(|e| e.weight).sum()
    }
    /// total observation slots in use, across objectives
    pub fn observed(&self) -> usize {
        self.entries.values().map(|e| e.observations.len()).sum()
    }

    /// record a memory under every objective. histories below capacity
    /// grow; full ones lose a uniformly random slot. sorted order is
    /// restored after every insertion.
    pub fn observe(&mut self, memory: &Memory, rng: &mut Rng) {
        for (objective, entry) in self.entries.iter_mut() {
            let projection = objective.projection(memory);
            if entry.observations.len() < OBSERVATION_SLOTS {
                entry.observations.push(projection);
            } else {
                let slot = rng.random_below(entry.observations.len());
                entry.observations[slot] = projection;
            }
            entry.observations.sort();
        }
    }

    /// weighted sum of radix-2 discounted deltas from a to b
    pub fn evaluate(&self, a: &Memory, b: &Memory) -> Score {
        self.entries
            .iter()
            .filter(|(_, e)| e.weight > 0.0)
            .map(|(o, e)| e.weight * o.delta(a, b))
            .sum()
    }

    /// sum of weights of objectives under which a strictly precedes b
    pub fn weighted_less(&self, a: &Memory, b: &Memory) -> Score {
        self.entries
            .iter()
            .filter(|(_, e)| e.weight > 0.0)
            .filter(|(o, _)| o.less(a, b))
            .map(|(_, e)| e.weight)
            .sum()
    }

    /// where this memory sits inside everything seen so far, averaged
    /// over objectives with a non-empty history. 0 when nothing has
    /// been observed yet.
    pub fn normalized_value(&self, memory: &Memory) -> Score {
        let fractions = self
            .entries
            .iter()
            .filter(|(_, e)| !e.observations.is_empty())
            .map(|(o, e)| {
                let projection = o.projection(memory);
                let rank = e.observations.partition_point(|seen| seen < &projection);
                rank as Score / e.observations.len() as Score
            })
            .collect::<Vec<Score>>();
        match fractions.is_empty() {
            true => 0.0,
            false => fractions.iter().sum::<Score>() / fractions.len() as Score,
        }
    }

    /// reweight every objective against a reference trajectory. the
    /// score is how far the final frame's projection climbed over the
    /// first frame's, measured through the unique sorted projection
    /// values the trajectory visited. objectives that net-decline are
    /// disabled.
    pub fn weight_by_examples(&mut self, trajectory: &[Memory]) {
        assert!(!trajectory.is_empty(), "weighting against nothing");
        for (objective, entry) in self.entries.iter_mut() {
            let mut values = trajectory
                .iter()
                .map(|m| objective.projection(m))
                .collect::<Vec<Vec<u8>>>();
            values.sort();
            values.dedup();
            let frac = |memory: &Memory| {
                let projection = objective.projection(memory);
                values.partition_point(|seen| seen < &projection) as Score / values.len() as Score
            };
            let score = frac(trajectory.last().unwrap()) - frac(trajectory.first().unwrap());
            entry.weight = if score <= 0.0 { 0.0 } else { score };
        }
    }

    /// one line per objective: `<weight> <idx>+`. disabled objectives
    /// are dropped here but accepted by load.
    pub fn save(&self, path: &str) {
        let mut file = std::fs::File::create(path).expect("create objectives file");
        for (objective, entry) in self.entries.iter() {
            if entry.weight == 0.0 {
                continue;
            }
            let indices = objective
                .indices()
                .iter()
                .map(|i| i.to_string())
                .collect::<Vec<String>>()
                .join(" ");
            writeln!(file, "{} {}", entry.weight, indices).expect("write objective");
        }
        log::info!("saved {} objectives to {}", self.len(), path);
    }

    pub fn load(path: &str) -> Self {
        let file = std::fs::File::open(path).expect("open objectives file");
        let mut objectives = Self::default();
        for line in BufReader::new(file).lines() {
            let line = line.expect("read objectives file");
            if line.trim().is_empty() {
                continue;
            }
            let mut fields = line.split_whitespace();
            let weight = fields
                .next()
                .and_then(|w| w.parse::<Weight>().ok())
                .expect("objective weight");
            let indices = fields
                .map(|i| i.parse::<usize>().expect("objective index"))
                .collect::<Vec<usize>>();
            objectives.insert(Objective::new(indices), weight);
        }
        log::info!("loaded {} objectives from {}", objectives.len(), path);
        objectives
    }

    /// (objective, weight) view for diagnostics
    pub fn weights(&self) -> impl Iterator<Item = (&Objective, Weight)> {
        self.entries.iter().map(|(o, e)| (o, e.weight))
    }

    #[cfg(test)]
    fn history(&self, objective: &Objective) -> &[Vec<u8>] {
        &self.entries.get(objective).unwrap().observations
    }
}

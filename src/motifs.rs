use crate::Frame;
use crate::MOTIF_ALPHA;
use crate::MOTIF_LENGTH;
use crate::MOTIF_MAX_FRAC;
use crate::MOTIF_MIN_FRAC;
use crate::Weight;
use crate::console::Input;
use crate::rng::Rng;
use std::collections::BTreeMap;
use std::collections::HashSet;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Write;

/// bookkeeping for one motif
struct Motif {
    weight: Weight,
    picked: u64,
    /// chronological (commit frame, weight) pairs, for the diagnostics
    history: Vec<(Frame, Weight)>,
}

/// the library of length-10 input fragments the human actually used,
/// each with a sampling weight. keyed by the fragment bytes themselves,
/// so identity is stable and iteration (hence weighted sampling against
/// a fixed rng stream) is deterministic.
#[derive(Default)]
pub struct Motifs {
    motifs: BTreeMap<Vec<Input>, Motif>,
}

impl Motifs {
    /// segment the tail of an input sequence into consecutive length-10
    /// chunks and bank each at weight 1, merging duplicates by sum
    pub fn add_inputs(&mut self, inputs: &[Input], skip_prefix: usize) {
        let tail = &inputs[skip_prefix.min(inputs.len())..];
        for chunk in tail.chunks_exact(MOTIF_LENGTH) {
            self.motifs
                .entry(chunk.to_vec())
                .and_modify(|m| m.weight += 1.0)
                .or_insert(Motif {
                    weight: 1.0,
                    picked: 0,
                    history: Vec::new(),
                });
        }
    }

    pub fn len(&self) -> usize {
        self.motifs.len()
    }
    pub fn is_empty(&self) -> bool {
        self.motifs.is_empty()
    }
    pub fn is_motif(&self, inputs: &[Input]) -> bool {
        self.motifs.contains_key(inputs)
    }
    pub fn total_weight(&self) -> Weight {
        self.motifs.values().map(|m| m.weight).sum()
    }

    /// uniform over the library
    pub fn random_motif(&self, rng: &mut Rng) -> Vec<Input> {
        assert!(!self.motifs.is_empty(), "sampling an empty motif library");
        let pick = rng.random_below(self.motifs.len());
        self.motifs.keys().nth(pick).cloned().unwrap()
    }

    /// proportional to weight
    pub fn random_weighted_motif(&self, rng: &mut Rng) -> Vec<Input> {
        assert!(!self.motifs.is_empty(), "sampling an empty motif library");
        let mut roll = rng.random_double() * self.total_weight();
        for (inputs, motif) in self.motifs.iter() {
            roll -= motif.weight;
            if roll <= 0.0 {
                return inputs.clone();
            }
        }
        self.motifs.keys().next_back().cloned().unwrap()
    }

    /// proportional to weight, restricted to motifs absent from the
    /// set; None once everything is in it
    pub fn random_weighted_motif_not_in(
        &self,
        rng: &mut Rng,
        seen: &HashSet<Vec<Input>>,
    ) -> Option<Vec<Input>> {
        let total = self
            .motifs
            .iter()
            .filter(|(inputs, _)| !seen.contains(*inputs))
            .map(|(_, m)| m.weight)
            .sum::<Weight>();
        if total <= 0.0 {
            return None;
        }
        let mut roll = rng.random_double() * total;
        let mut last = None;
        for (inputs, motif) in self.motifs.iter().filter(|(i, _)| !seen.contains(*i)) {
            roll -= motif.weight;
            last = Some(inputs);
            if roll <= 0.0 {
                break;
            }
        }
        last.cloned()
    }

    /// count a sampling event
    pub fn pick(&mut self, inputs: &[Input]) {
        self.motifs.get_mut(inputs).expect("picked unknown motif").picked += 1;
    }

    pub fn weight_mut(&mut self, inputs: &[Input]) -> Option<&mut Weight> {
        self.motifs.get_mut(inputs).map(|m| &mut m.weight)
    }

    /// a committed motif moved the normalized value; nudge its weight.
    /// winners multiply by 1/alpha but never past a 10% share of the
    /// total; losers multiply by alpha unless that would push their
    /// share below 1e-5, in which case the update is suppressed.
    pub fn reweight(&mut self, inputs: &[Input], rose: bool) {
        let total = self.total_weight();
        let Some(motif) = self.motifs.get_mut(inputs) else {
            return;
        };
        let old = motif.weight;
        if rose {
            let raised = old / MOTIF_ALPHA;
            let cap = MOTIF_MAX_FRAC * (total - old) / (1.0 - MOTIF_MAX_FRAC);
            let new = raised.min(cap);
            if new > old {
                motif.weight = new;
            }
        } else {
            let lowered = old * MOTIF_ALPHA;
            let share = lowered / (total - old + lowered);
            if share >= MOTIF_MIN_FRAC {
                motif.weight = lowered;
            }
        }
        log::debug!("motif reweight {} -> {}", old, self.motifs[inputs].weight);
    }

    /// record (frame, weight) in every motif's history
    pub fn checkpoint(&mut self, frame: Frame) {
        for motif in self.motifs.values_mut() {
            let weight = motif.weight;
            motif.history.push((frame, weight));
        }
    }

    /// histories for the diagnostics plots
    pub fn histories(&self) -> impl Iterator<Item = &[(Frame, Weight)]> {
        self.motifs.values().map(|m| m.history.as_slice())
    }

    /// one line per motif: `<weight> <picked> <ten input bytes>`
    pub fn save(&self, path: &str) {
        let mut file = std::fs::File::create(path).expect("create motifs file");
        for (inputs, motif) in self.motifs.iter() {
            let bytes = inputs
                .iter()
                .map(|i| i.bits().to_string())
                .collect::<Vec<String>>()
                .join(" ");
            writeln!(file, "{} {} {}", motif.weight, motif.picked, bytes).expect("write motif");
        }
        log::info!("saved {} motifs to {}", self.len(), path);
    }

    pub fn load(path: &str) -> Self {
        let file = std::fs::File::open(path).expect("open motifs file");
        let mut motifs = Self::default();
        for line in BufReader::new(file).lines() {
            let line = line.expect("read motifs file");
            if line.trim().is_empty() {
                continue;
            }
            let mut fields = line.split_whitespace();
            let weight = fields
                .next()
                .and_then(|w| w.parse::<Weight>().ok())
                .expect("motif weight");
            let picked = fields
                .next()
                .and_then(|p| p.parse::<u64>().ok())
                .expect("motif picked count");
            let inputs = fields
                .map(|b| Input::from(b.parse::<u8>().expect("motif byte")))
                .collect::<Vec<Input>>();
            assert!(inputs.len() == MOTIF_LENGTH, "motif of {} inputs", inputs.len());
            motifs.motifs.insert(
                inputs,
                Motif {
                    weight,
                    picked,
                    history: Vec::new(),
                },
            );
        }
        log::info!("loaded {} motifs from {}", motifs.len(), path);
        motifs
    }
}

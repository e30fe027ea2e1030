use super::Objective;
use super::Objectives;
use crate::console::Emulator;
use crate::console::Memory;
use crate::diagnostics;
use crate::motifs::Motifs;
use crate::movie;
use crate::rng::Rng;

/// the learnfun pass: replay a recorded human playthrough, harvest
/// objectives that rose along it, weight them by how far they rose, and
/// bank the motifs the human actually used. everything lands on disk
/// for the player and its helpers to load.
pub struct Learner {
    trajectory: Vec<Memory>,
    rng: Rng,
}

impl Learner {
    pub fn run(game: &str, movie_path: &str, fastforward: usize) -> anyhow::Result<()> {
        let inputs = movie::read(movie_path)?;
        anyhow::ensure!(!inputs.is_empty(), "empty movie {}", movie_path);
        let mut learner = Self {
            trajectory: Self::replay(game, &inputs),
            rng: Rng::seeded(game),
        };
        let objectives = learner.objectives();
        objectives.save(&format!("{}.objectives", game));
        let mut motifs = Motifs::default();
        motifs.add_inputs(&inputs, fastforward);
        motifs.save(&format!("{}.motifs", game));
        diagnostics::objectives_svg(&format!("{}-objectives.svg", game), &objectives, &learner.trajectory);
        log::info!(
            "learned {} objectives and {} motifs from {} frames",
            objectives.len(),
            motifs.len(),
            learner.trajectory.len(),
        );
        Ok(())
    }

    /// play the movie through the console, keeping the memory after
    /// every frame (and the power-on memory in front)
    fn replay(game: &str, inputs: &[crate::console::Input]) -> Vec<Memory> {
        let mut emulator = Emulator::new(crate::console::open(game));
        let progress = crate::progress(inputs.len());
        let mut trajectory = vec![emulator.memory()];
        for &input in inputs.iter() {
            emulator.step(input);
            trajectory.push(emulator.memory());
            progress.inc(1);
        }
        progress.finish();
        trajectory
    }

    /// generate candidate tuples over many views of the trajectory,
    /// dedup, then weight every survivor against the whole thing
    fn objectives(&mut self) -> Objectives {
        let mut objectives = Objectives::default();
        let n = self.trajectory.len();
        let whole = (0..n).collect::<Vec<usize>>();
        for _ in 0..50 {
            self.propose(&mut objectives, &whole);
        }
        for k in 2..=10 {
            for slice in Self::slices(n, k) {
                for _ in 0..3 {
                    self.propose(&mut objectives, &slice);
                }
            }
        }
        for slice in Self::slices(n, 50) {
            for _ in 0..2 {
                self.propose(&mut objectives, &slice);
            }
        }
        for slice in Self::slices(n, 100) {
            self.propose(&mut objectives, &slice);
        }
        for (period, count) in [(100usize, 20usize), (250, 10), (1000, 5)] {
            for rep in 0..count {
                let offset = (rep % 10) * (period / 10);
                let sparse = (offset..n).step_by(period).collect::<Vec<usize>>();
                self.propose(&mut objectives, &sparse);
            }
        }
        log::info!("generated {} distinct candidate objectives", objectives.len());
        objectives.weight_by_examples(&self.trajectory);
        objectives
    }

    fn propose(&mut self, objectives: &mut Objectives, frames: &[usize]) {
        if frames.len() < 2 {
            return;
        }
        if let Some(objective) = Objective::enumerate(&self.trajectory, frames, &mut self.rng) {
            log::debug!("candidate {}", objective);
            objectives.insert(objective, 1.0);
        }
    }

    /// k contiguous equal slices of 0..n
    fn slices(n: usize, k: usize) -> Vec<Vec<usize>> {
        (0..k)
            .map(|j| (n * j / k..n * (j + 1) / k).collect::<Vec<usize>>())
            .filter(|slice| slice.len() >= 2)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_partition_the_range() {
        let slices = Learner::slices(100, 7);
        let total = slices.iter().map(|s| s.len()).sum::<usize>();
        assert_eq!(total, 100);
        assert!(slices.windows(2).all(|w| w[0].last().unwrap() + 1 == w[1][0]));
    }

    #[test]
    fn proposed_tuples_weigh_nonnegative() {
        let game = "learner-test";
        let mut emulator = Emulator::new(crate::console::open(game));
        let inputs = (0..120).map(|_| crate::console::Input::from(0x80));
        let mut trajectory = vec![emulator.memory()];
        for input in inputs {
            emulator.step(input);
            trajectory.push(emulator.memory());
        }
        let mut learner = Learner {
            trajectory,
            rng: Rng::seeded(game),
        };
        let objectives = learner.objectives();
        assert!(!objectives.is_empty());
        for (_, weight) in objectives.weights() {
            assert!(weight >= 0.0);
        }
        assert!(objectives.active_weight() > 0.0);
    }
}

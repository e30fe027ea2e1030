use super::scorer;
use crate::Score;
use crate::console::Emulator;
use crate::console::Input;
use crate::console::Memory;
use crate::console::Snapshot;
use crate::helper::Improvement;
use crate::helper::Strategy;
use crate::motifs::Motifs;
use crate::objective::Objectives;
use crate::rng::Rng;

/// how many improvement requests a backtrack batch dispatches per
/// strategy
pub const SCHEDULE: &[(Strategy, usize)] = &[
    (Strategy::Dualize, 1),
    (Strategy::Ablate, 10),
    (Strategy::Chop, 10),
    (Strategy::Shuffle, 10),
    (Strategy::Random, 10),
];

/// one improve-segment pass: hill-climb from the original segment,
/// keeping every accepted candidate, until an iteration fails to
/// improve or the iteration budget runs out. the textual seed makes
/// the pass reproducible wherever it runs.
pub fn improve(
    emulator: &mut Emulator,
    objectives: &Objectives,
    motifs: &Motifs,
    start_state: &Snapshot,
    improveme: &[Input],
    end_state: &Snapshot,
    end_integral: Score,
    strategy: Strategy,
    seed: &str,
    iters: usize,
    maxbest: usize,
) -> Improvement {
    let mut rng = Rng::seeded(seed);
    emulator.load(end_state);
    let end_memory = emulator.memory();
    let mut current = improveme.to_vec();
    let mut found: Vec<(Vec<Input>, Score)> = Vec::new();
    let mut tried = 0;
    let mut better = 0;
    for _ in 0..iters {
        tried += 1;
        let improved = match strategy {
            Strategy::Random => random(&current, motifs, &mut rng),
            Strategy::Dualize => dualize(&current, &mut rng),
            Strategy::Ablate => ablate(&current, &mut rng),
            Strategy::Chop => chop(&current, &mut rng),
            Strategy::Shuffle => shuffle(&current, &mut rng),
        };
        let mut accepted = false;
        for candidate in improved {
            let test = is_improvement(
                emulator,
                objectives,
                start_state,
                &candidate.inputs,
                &end_memory,
                end_integral,
            );
            if let Some(score) = test {
                found.push((candidate.inputs.clone(), score));
                if candidate.keep(&mut rng) {
                    current = candidate.inputs;
                }
                accepted = true;
            }
        }
        if !accepted {
            break;
        }
        better += 1;
    }
    found.sort_by(|a, b| b.1.total_cmp(&a.1));
    found.truncate(maxbest);
    let (inputs, scores) = found.into_iter().unzip();
    Improvement {
        inputs,
        scores,
        iters_tried: tried,
        iters_better: better,
    }
}

/// a candidate can still be improving by value but fall out of favor
/// as the working point; reversal keeps only half the time
struct Candidate {
    inputs: Vec<Input>,
    keep_probability: f64,
}

impl Candidate {
    fn always(inputs: Vec<Input>) -> Self {
        Self {
            inputs,
            keep_probability: 1.0,
        }
    }
    fn sometimes(inputs: Vec<Input>, keep_probability: f64) -> Self {
        Self {
            inputs,
            keep_probability,
        }
    }
    fn keep(&self, rng: &mut Rng) -> bool {
        self.keep_probability >= 1.0 || rng.random_double() < self.keep_probability
    }
}

/// does the candidate beat both references? it must land strictly past
/// the old endpoint, and then its score is how much integral it gained
/// plus how far past the endpoint it landed. the integral is not
/// normalized by length, so shorter candidates pay for what they skip.
fn is_improvement(
    emulator: &mut Emulator,
    objectives: &Objectives,
    start_state: &Snapshot,
    candidate: &[Input],
    end_memory: &Memory,
    end_integral: Score,
) -> Option<Score> {
    let (n_minus_s, landed) = scorer::score_integral(emulator, objectives, start_state, candidate);
    let n_minus_e = objectives.evaluate(end_memory, &landed);
    match n_minus_e > 0.0 {
        true => Some((n_minus_s - end_integral) + n_minus_e),
        false => None,
    }
}

/// replace everything with fresh motif-sampled inputs of the same length
fn random(current: &[Input], motifs: &Motifs, rng: &mut Rng) -> Vec<Candidate> {
    let mut fresh = Vec::with_capacity(current.len());
    while fresh.len() < current.len() {
        fresh.extend(motifs.random_weighted_motif(rng));
    }
    fresh.truncate(current.len());
    vec![Candidate::always(fresh)]
}

/// dualize a span; then also offer the reversal of that span, kept as
/// the working point only half the time
fn dualize(current: &[Input], rng: &mut Rng) -> Vec<Candidate> {
    let (start, len) = rng.random_span(current.len(), 2);
    let mut swapped = current.to_vec();
    swapped[start..start + len].iter_mut().for_each(|i| *i = i.dualize());
    let mut reversed = swapped.clone();
    reversed[start..start + len].reverse();
    vec![Candidate::always(swapped), Candidate::sometimes(reversed, 0.5)]
}

/// AND a non-0xFF button mask over the span, each input independently
/// with a drawn probability
fn ablate(current: &[Input], rng: &mut Rng) -> Vec<Candidate> {
    let mask = loop {
        let mask = rng.random_byte();
        if mask != 0xFF {
            break mask;
        }
    };
    let probability = rng.random_double();
    let (start, len) = rng.random_span(current.len(), 2);
    let mut masked = current.to_vec();
    for input in masked[start..start + len].iter_mut() {
        if rng.random_double() < probability {
            *input = input.mask(mask);
        }
    }
    vec![Candidate::always(masked)]
}

/// erase the span outright; an erasure that would empty the segment is
/// a failed iteration
fn chop(current: &[Input], rng: &mut Rng) -> Vec<Candidate> {
    let (start, len) = rng.random_span(current.len(), 2);
    if len >= current.len() {
        return Vec::new();
    }
    let mut shorter = current.to_vec();
    shorter.drain(start..start + len);
    vec![Candidate::always(shorter)]
}

/// permute the span uniformly
fn shuffle(current: &[Input], rng: &mut Rng) -> Vec<Candidate> {
    let (start, len) = rng.random_span(current.len(), 2);
    let mut permuted = current.to_vec();
    rng.shuffle(&mut permuted[start..start + len]);
    vec![Candidate::always(permuted)]
}

/// seed text for one scheduled request
pub fn seed(strategy: Strategy, movenum: usize, rep: usize) -> String {
    format!("{}-{}-{}", strategy, movenum, rep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MOTIF_LENGTH;
    use crate::console::Sim;
    use crate::objective::Objective;

    fn rig() -> (Emulator, Objectives, Motifs) {
        let mut objectives = Objectives::default();
        objectives.insert(Objective::new(vec![0x10, 0x11]), 1.0);
        let mut motifs = Motifs::default();
        let mut inputs = Vec::new();
        inputs.extend(vec![Input::from(Input::RIGHT); MOTIF_LENGTH]);
        inputs.extend(vec![Input::from(0); MOTIF_LENGTH]);
        motifs.add_inputs(&inputs, 0);
        (Emulator::new(Box::new(Sim::new("backtrack"))), objectives, motifs)
    }

    #[test]
    fn reverse_is_involution() {
        let mut inputs = (0..20u8).map(Input::from).collect::<Vec<Input>>();
        let original = inputs.clone();
        inputs[3..15].reverse();
        inputs[3..15].reverse();
        assert_eq!(inputs, original);
    }

    #[test]
    fn span_dualize_is_involution() {
        let mut inputs = (0..20u8).map(Input::from).collect::<Vec<Input>>();
        let original = inputs.clone();
        for _ in 0..2 {
            inputs[5..12].iter_mut().for_each(|i| *i = i.dualize());
        }
        assert_eq!(inputs, original);
    }

    #[test]
    fn improvement_requires_passing_the_endpoint() {
        let (mut emulator, objectives, _) = rig();
        let start = emulator.save();
        // reference: walk right for 40 frames
        let improveme = vec![Input::from(Input::RIGHT); 40];
        let (end_integral, end_memory) =
            scorer::score_integral(&mut emulator, &objectives, &start, &improveme);
        // idling cannot land past the endpoint
        let idle = vec![Input::from(0); 40];
        assert!(
            is_improvement(&mut emulator, &objectives, &start, &idle, &end_memory, end_integral)
                .is_none()
        );
        // walking further lands past it and scores positive
        let longer = vec![Input::from(Input::RIGHT); 60];
        let score = is_improvement(
            &mut emulator,
            &objectives,
            &start,
            &longer,
            &end_memory,
            end_integral,
        );
        assert!(score.unwrap() > 0.0);
    }

    #[test]
    fn improve_pass_returns_sorted_candidates() {
        let (mut emulator, objectives, motifs) = rig();
        let start = emulator.save();
        // a weak original: idle half the time
        let mut improveme = vec![Input::from(0); 20];
        improveme.extend(vec![Input::from(Input::RIGHT); 20]);
        let (end_integral, _) =
            scorer::score_integral(&mut emulator, &objectives, &start, &improveme);
        let end_state = emulator.save();
        let improvement = improve(
            &mut emulator,
            &objectives,
            &motifs,
            &start,
            &improveme,
            &end_state,
            end_integral,
            Strategy::Random,
            "random-0-0",
            50,
            3,
        );
        assert!(improvement.inputs.len() <= 3);
        assert_eq!(improvement.inputs.len(), improvement.scores.len());
        assert!(improvement.iters_tried >= improvement.iters_better);
        assert!(
            improvement
                .scores
                .windows(2)
                .all(|w| w[0] >= w[1])
        );
    }

    #[test]
    fn improve_pass_is_reproducible() {
        let (mut emulator, objectives, motifs) = rig();
        let start = emulator.save();
        let improveme = vec![Input::from(0); 30];
        let (end_integral, _) =
            scorer::score_integral(&mut emulator, &objectives, &start, &improveme);
        let end_state = emulator.save();
        let run = |emulator: &mut Emulator| {
            improve(
                emulator,
                &objectives,
                &motifs,
                &start,
                &improveme,
                &end_state,
                end_integral,
                Strategy::Shuffle,
                "shuffle-0-3",
                20,
                5,
            )
        };
        let first = run(&mut emulator);
        let second = run(&mut emulator);
        assert_eq!(first, second);
    }
}

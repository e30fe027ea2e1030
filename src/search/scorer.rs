use crate::Score;
use crate::console::Emulator;
use crate::console::Input;
use crate::console::Memory;
use crate::console::Snapshot;
use crate::helper::Scored;
use crate::objective::Objectives;

/// run a sequence from a base snapshot, summing the per-step evaluate
/// deltas. returns the raw (un-normalized) integral and the final
/// memory. the emulator is left wherever the sequence ends.
pub fn score_integral(
    emulator: &mut Emulator,
    objectives: &Objectives,
    base: &Snapshot,
    inputs: &[Input],
) -> (Score, Memory) {
    emulator.load(base);
    let mut prev = emulator.memory();
    let mut integral = 0.0;
    for &input in inputs.iter() {
        emulator.cached_step(input);
        let memory = emulator.memory();
        integral += objectives.evaluate(&prev, &memory);
        prev = memory;
    }
    (integral, prev)
}

/// score one candidate next against the futures pool, per the round
/// protocol: the immediate delta of the next itself, then for every
/// future the integral along its path, its endpoint ordered against the
/// post-next memory, and the exponential aggregate over all integral
/// scores. one synthetic future that holds the next's last input for
/// the pool's average length joins the aggregate but earns no scalar.
pub fn score_next(
    emulator: &mut Emulator,
    objectives: &Objectives,
    state: &Snapshot,
    next: &[Input],
    futures: &[Vec<Input>],
) -> Scored {
    assert!(!next.is_empty(), "scoring an empty next");
    emulator.load(state);
    let before = emulator.memory();
    for &input in next.iter() {
        emulator.cached_step(input);
    }
    let after = emulator.memory();
    let landing = emulator.save();
    let immediate = objectives.evaluate(&before, &after);
    let normalized = objectives.normalized_value(&after);
    let mut integrals = Vec::with_capacity(futures.len() + 1);
    let mut scalars = Vec::with_capacity(futures.len());
    for inputs in futures.iter() {
        let (integral, end) = score_integral(emulator, objectives, &landing, inputs);
        let integral = integral / inputs.len().max(1) as Score;
        let positive = objectives.weighted_less(&after, &end);
        let negative = -objectives.weighted_less(&end, &after);
        scalars.push(integral + positive + negative);
        integrals.push(integral);
    }
    let average = match futures.is_empty() {
        true => 1,
        false => (futures.iter().map(|f| f.len()).sum::<usize>() / futures.len()).max(1),
    };
    let synthetic = vec![*next.last().unwrap(); average];
    let (integral, _) = score_integral(emulator, objectives, &landing, &synthetic);
    integrals.push(integral / synthetic.len() as Score);
    Scored {
        immediate,
        normalized,
        best_future: scalars.iter().copied().max_by(Score::total_cmp).unwrap_or(0.0),
        worst_future: scalars.iter().copied().min_by(Score::total_cmp).unwrap_or(0.0),
        aggregate: aggregate(&mut integrals),
        per_future_scalar: scalars,
    }
}

/// sort ascending, then fold each score in at half weight: the largest
/// contributes 1/2, the runner-up 1/4, and the bottom half of the pool
/// fades to nothing.
pub fn aggregate(scores: &mut [Score]) -> Score {
    scores.sort_by(|a, b| a.total_cmp(b));
    scores.iter().fold(0.0, |agg, s| agg / 2.0 + s / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::Sim;
    use crate::objective::Objective;

    fn rig() -> (Emulator, Objectives) {
        let mut objectives = Objectives::default();
        objectives.insert(Objective::new(vec![0x10, 0x11]), 1.0);
        (Emulator::new(Box::new(Sim::new("scorer"))), objectives)
    }

    #[test]
    fn aggregate_folds_sorted_halves() {
        let mut scores = vec![3.0, 1.0, 2.0];
        let agg = aggregate(&mut scores);
        assert_eq!(agg, ((1.0 / 2.0) / 2.0 + 1.0) / 2.0 + 1.5);
    }

    #[test]
    fn aggregate_of_empty_is_zero() {
        assert_eq!(aggregate(&mut []), 0.0);
    }

    #[test]
    fn integral_of_stasis_is_zero() {
        let (mut emulator, objectives) = rig();
        let base = emulator.save();
        let blank = vec![Input::from(0); 20];
        let (integral, _) = score_integral(&mut emulator, &objectives, &base, &blank);
        assert_eq!(integral, 0.0);
    }

    #[test]
    fn integral_rewards_walking_right() {
        let (mut emulator, objectives) = rig();
        let base = emulator.save();
        let right = vec![Input::from(Input::RIGHT); 20];
        let (integral, _) = score_integral(&mut emulator, &objectives, &base, &right);
        assert!(integral > 0.0);
    }

    #[test]
    fn forward_next_beats_idle_next() {
        let (mut emulator, objectives) = rig();
        let state = emulator.save();
        let futures = vec![vec![Input::from(Input::RIGHT); 60], vec![Input::from(0); 60]];
        let right = score_next(&mut emulator, &objectives, &state, &[Input::from(Input::RIGHT); 10], &futures);
        let idle = score_next(&mut emulator, &objectives, &state, &[Input::from(0); 10], &futures);
        assert!(right.immediate > idle.immediate);
        assert!(right.immediate + right.aggregate > idle.immediate + idle.aggregate);
        assert_eq!(right.per_future_scalar.len(), futures.len());
    }

    #[test]
    fn scoring_is_a_pure_function_of_its_inputs() {
        let (mut emulator, objectives) = rig();
        let state = emulator.save();
        let futures = vec![vec![Input::from(Input::RIGHT); 30]];
        let next = vec![Input::from(Input::RIGHT); 10];
        let once = score_next(&mut emulator, &objectives, &state, &next, &futures);
        for _ in 0..3 {
            emulator.cached_step(Input::from(0x01));
        }
        let again = score_next(&mut emulator, &objectives, &state, &next, &futures);
        assert_eq!(once, again);
    }
}

use crate::INPUTS_PER_NEXT;
use crate::MAXFUTURELENGTH;
use crate::MINFUTURELENGTH;
use crate::NFUTURES;
use crate::NWEIGHTEDFUTURES;
use crate::console::Input;
use crate::motifs::Motifs;
use crate::rng::Rng;

/// a speculative continuation. the pool holds forty of these; each
/// round consumes their heads as candidate nexts and scores every next
/// by how the whole pool fares after it.
#[derive(Debug, Clone)]
pub struct Future {
    pub inputs: Vec<Input>,
    /// sampled from weighted motifs rather than uniformly
    pub weighted: bool,
    /// derived from another future
    pub is_mutant: bool,
    pub desired: usize,
}

impl Future {
    pub fn fresh(weighted: bool, rng: &mut Rng) -> Self {
        Self {
            inputs: Vec::new(),
            weighted,
            is_mutant: false,
            desired: MINFUTURELENGTH + rng.random_below(MAXFUTURELENGTH - MINFUTURELENGTH + 1),
        }
    }

    /// a perturbed copy: occasionally flip the sampling flavor, cut the
    /// tail down, occasionally dualize what remains
    pub fn mutant(&self, rng: &mut Rng) -> Self {
        let mut future = self.clone();
        future.is_mutant = true;
        if rng.one_in(8) {
            future.weighted = !future.weighted;
        }
        future.inputs.truncate(MINFUTURELENGTH.max(future.desired / 2));
        if rng.one_in(8) {
            future.inputs.iter_mut().for_each(|i| *i = i.dualize());
        }
        future
    }

    /// strip the head the committed next just consumed
    pub fn chop(&mut self) {
        self.inputs.drain(..INPUTS_PER_NEXT.min(self.inputs.len()));
    }

    /// append whole motifs (of this future's flavor) until the desired
    /// length is reached, truncating the last one to fit
    pub fn top_up(&mut self, motifs: &Motifs, rng: &mut Rng) {
        while self.inputs.len() < self.desired {
            let motif = match self.weighted {
                true => motifs.random_weighted_motif(rng),
                false => motifs.random_motif(rng),
            };
            self.inputs.extend(motif);
        }
        self.inputs.truncate(self.desired);
    }
}

/// refill the pool to NFUTURES, keeping at least NWEIGHTEDFUTURES of
/// them weighted, then top every future up to its desired length
pub fn populate(futures: &mut Vec<Future>, motifs: &Motifs, rng: &mut Rng) {
    assert!(!motifs.is_empty(), "populating futures with no motifs");
    while futures.len() < NFUTURES {
        let weighted = futures.iter().filter(|f| f.weighted).count() < NWEIGHTEDFUTURES;
        futures.push(Future::fresh(weighted, rng));
    }
    for future in futures.iter_mut() {
        future.top_up(motifs, rng);
    }
    assert!(futures.len() == NFUTURES, "future pool of {}", futures.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MOTIF_LENGTH;

    fn motifs() -> Motifs {
        let mut motifs = Motifs::default();
        let mut inputs = Vec::new();
        inputs.extend(vec![Input::from(0x80); MOTIF_LENGTH]);
        inputs.extend(vec![Input::from(0x41); MOTIF_LENGTH]);
        motifs.add_inputs(&inputs, 0);
        motifs
    }

    #[test]
    fn populate_reaches_steady_state() {
        let mut rng = Rng::seeded("populate");
        let mut futures = Vec::new();
        populate(&mut futures, &motifs(), &mut rng);
        assert_eq!(futures.len(), NFUTURES);
        assert!(futures.iter().filter(|f| f.weighted).count() >= NWEIGHTEDFUTURES);
        for future in futures.iter() {
            assert_eq!(future.inputs.len(), future.desired);
            assert!((MINFUTURELENGTH..=MAXFUTURELENGTH).contains(&future.desired));
        }
    }

    #[test]
    fn chop_strips_one_next() {
        let mut rng = Rng::seeded("chop");
        let mut futures = Vec::new();
        populate(&mut futures, &motifs(), &mut rng);
        let lengths = futures.iter().map(|f| f.inputs.len()).collect::<Vec<usize>>();
        futures.iter_mut().for_each(|f| f.chop());
        for (future, length) in futures.iter().zip(lengths) {
            assert_eq!(future.inputs.len(), length - INPUTS_PER_NEXT);
        }
    }

    #[test]
    fn mutant_is_flagged_and_shorter() {
        let mut rng = Rng::seeded("mutant");
        let mut futures = Vec::new();
        populate(&mut futures, &motifs(), &mut rng);
        let mutant = futures[0].mutant(&mut rng);
        assert!(mutant.is_mutant);
        assert!(mutant.inputs.len() <= futures[0].inputs.len());
        assert!(mutant.inputs.len() >= MINFUTURELENGTH.min(futures[0].inputs.len()));
    }
}

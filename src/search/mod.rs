pub mod backtrack;
pub mod scorer;

mod future;

pub use future::Future;

use crate::CACHE_RECENT;
use crate::CACHE_STICKY;
use crate::CHECKPOINT_EVERY;
use crate::DROPFUTURES;
use crate::Frame;
use crate::IMPROVE_ITERS;
use crate::IMPROVE_MAXBEST;
use crate::INPUTS_PER_NEXT;
use crate::MIN_BACKTRACK_DISTANCE;
use crate::MUTATEFUTURES;
use crate::NFUTURES;
use crate::Score;
use crate::TRY_BACKTRACK_EVERY;
use crate::WRITE_MOVIE_EVERY;
use crate::console::Emulator;
use crate::console::Input;
use crate::console::Snapshot;
use crate::diagnostics::Distribution;
use crate::diagnostics::Html;
use crate::helper::Dispatcher;
use crate::helper::Request;
use crate::helper::Response;
use crate::motifs::Motifs;
use crate::movie;
use crate::movie::Movie;
use crate::objective::Objectives;
use crate::rng::Rng;
use colored::Colorize;
use std::collections::HashSet;

/// a place the search can crawl back to
pub struct Checkpoint {
    pub snapshot: Snapshot,
    pub movenum: Frame,
}

/// a candidate next plus where it came from, for the annotations
#[derive(Clone)]
struct Next {
    inputs: Vec<Input>,
    explanation: String,
}

/// the player: owns the one emulator, the learned objectives and
/// motifs, the committed movie, the futures pool, and the dispatcher
/// that farms scoring out. single-threaded with respect to itself;
/// parallelism lives strictly behind the dispatcher.
pub struct PlayFun {
    game: String,
    emulator: Emulator,
    objectives: Objectives,
    motifs: Motifs,
    movie: Movie,
    futures: Vec<Future>,
    checkpoints: Vec<Checkpoint>,
    watermark: Frame,
    until_backtrack: usize,
    rounds: usize,
    backtracks: usize,
    rng: Rng,
    dispatcher: Dispatcher,
    html: Html,
    distributions: Vec<Distribution>,
}

impl PlayFun {
    /// load what learnfun banked, then fast-forward through the warmup:
    /// the movie's leading blank run plus `fastforward` more inputs,
    /// committed without scoring or observation. the watermark pins the
    /// result; backtracking never crosses it.
    pub fn new(
        game: &str,
        movie_path: &str,
        fastforward: usize,
        dispatcher: Dispatcher,
    ) -> anyhow::Result<Self> {
        let objectives = Objectives::load(&format!("{}.objectives", game));
        let motifs = Motifs::load(&format!("{}.motifs", game));
        assert!(!objectives.is_empty(), "no objectives learned for {}", game);
        assert!(!motifs.is_empty(), "no motifs learned for {}", game);
        let recorded = movie::read(movie_path)?;
        anyhow::ensure!(!recorded.is_empty(), "empty movie {}", movie_path);
        let mut emulator = Emulator::new(crate::console::open(game));
        emulator.reset_cache(CACHE_STICKY, CACHE_RECENT);
        let warmup = (Movie::blank_prefix(&recorded) + fastforward).min(recorded.len());
        let mut moviefile = Movie::default();
        for &input in recorded[..warmup].iter() {
            emulator.cached_step(input);
            moviefile.push(input, "warmup");
        }
        log::info!("warmed up {} inputs; watermark at {}", warmup, warmup);
        let mut play = Self {
            game: game.to_string(),
            emulator,
            objectives,
            motifs,
            movie: moviefile,
            futures: Vec::new(),
            checkpoints: Vec::new(),
            watermark: warmup,
            until_backtrack: TRY_BACKTRACK_EVERY,
            rounds: 0,
            backtracks: 0,
            rng: Rng::seeded(game),
            dispatcher,
            html: Html::create(&format!("{}-log.html", game)),
            distributions: Vec::new(),
        };
        future::populate(&mut play.futures, &play.motifs, &mut play.rng);
        Ok(play)
    }

    pub fn movie(&self) -> &Movie {
        &self.movie
    }
    pub fn watermark(&self) -> Frame {
        self.watermark
    }
    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }
    pub fn futures(&self) -> &[Future] {
        &self.futures
    }
    pub fn observed(&self) -> usize {
        self.objectives.observed()
    }

    /// round after round until the budget runs out or someone types Q
    pub fn run(&mut self, rounds: Option<usize>) {
        while !crate::interrupted() {
            if rounds.map_or(false, |n| self.rounds >= n) {
                break;
            }
            self.round();
        }
        self.finish();
    }

    fn round(&mut self) {
        self.rounds += 1;
        self.motifs.checkpoint(self.movie.len());
        let nexts = self.enumerate_nexts();
        self.take_best(nexts, true);
        if self.rounds % WRITE_MOVIE_EVERY == 0 {
            self.publish(&format!("{}-playfun-{}.fm2", self.game, self.rounds));
        }
        if self.until_backtrack == 0 {
            self.backtrack();
        }
    }

    /// candidate nexts: the head of every long-enough future, dedup'd
    /// by value, backfilled from the weighted motifs until the slate is
    /// full or the library runs dry
    fn enumerate_nexts(&mut self) -> Vec<Next> {
        let mut seen = HashSet::new();
        let mut nexts = Vec::new();
        for (i, future) in self.futures.iter().enumerate() {
            if future.inputs.len() < INPUTS_PER_NEXT {
                continue;
            }
            let head = future.inputs[..INPUTS_PER_NEXT].to_vec();
            if seen.insert(head.clone()) {
                nexts.push(Next {
                    inputs: head,
                    explanation: format!("ftr-{}", i),
                });
            }
        }
        while nexts.len() < NFUTURES {
            let Some(motif) = self.motifs.random_weighted_motif_not_in(&mut self.rng, &seen)
            else {
                break;
            };
            self.motifs.pick(&motif);
            seen.insert(motif.clone());
            nexts.push(Next {
                inputs: motif,
                explanation: "backfill".to_string(),
            });
        }
        assert!(!nexts.is_empty(), "no candidate nexts");
        nexts
    }

    /// one selector pass over a slate of candidates: score every
    /// candidate against the futures pool, commit the winner, cull and
    /// mutate the pool, reweight a committed motif, refill. rounds chop
    /// the consumed head off every future; backtrack trials do not.
    fn take_best(&mut self, nexts: Vec<Next>, chopfutures: bool) {
        let snapshot = self.emulator.save();
        let before = self.emulator.memory();
        let pool = self
            .futures
            .iter()
            .map(|f| f.inputs.clone())
            .collect::<Vec<Vec<Input>>>();
        let requests = nexts
            .iter()
            .map(|n| Request::ScoreNexts {
                state: snapshot.clone(),
                next: n.inputs.clone(),
                futures: pool.clone(),
            })
            .collect::<Vec<Request>>();
        let responses = self.dispatcher.dispatch(&requests);
        let mut totals = vec![0.0; self.futures.len()];
        let mut scores = Vec::with_capacity(nexts.len());
        let mut distribution = Distribution {
            start: self.movie.len(),
            immediates: Vec::new(),
            positives: Vec::new(),
            negatives: Vec::new(),
            norms: Vec::new(),
            chosen: 0,
        };
        for response in responses.iter() {
            let Response::ScoreNexts(scored) = response else {
                panic!("mismatched response kind");
            };
            scores.push(scored.immediate + scored.aggregate);
            for (i, scalar) in scored.per_future_scalar.iter().enumerate() {
                totals[i] += scalar;
            }
            distribution.immediates.push(scored.immediate);
            distribution.positives.push(scored.best_future);
            distribution.negatives.push(scored.worst_future);
            distribution.norms.push(scored.normalized);
        }
        let best = scores
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .expect("empty slate");
        distribution.chosen = best;
        let winner = nexts[best].inputs.clone();
        let explanation = nexts[best].explanation.clone();
        self.emulator.load(&snapshot);
        for &input in winner.iter() {
            self.commit(input, &explanation);
        }
        log::info!(
            "round {} committed {} [{}] score {}",
            self.rounds,
            explanation,
            winner.iter().map(|i| i.to_string()).collect::<Vec<String>>().join(" "),
            format!("{:.3}", scores[best]).cyan(),
        );
        if chopfutures {
            self.futures.iter_mut().for_each(|f| f.chop());
        }
        self.cull(&mut totals);
        if self.motifs.is_motif(&winner) {
            let after = self.emulator.memory();
            let rose =
                self.objectives.normalized_value(&after) > self.objectives.normalized_value(&before);
            self.motifs.reweight(&winner, rose);
        }
        future::populate(&mut self.futures, &self.motifs, &mut self.rng);
        self.distributions.push(distribution);
        self.html.log(&format!(
            "frame {} chose {} at {:.3}",
            self.movie.len(),
            explanation,
            scores[best],
        ));
    }

    /// drop the worst-scoring futures, then clone mutants off the best
    /// survivor
    fn cull(&mut self, totals: &mut Vec<Score>) {
        for _ in 0..(DROPFUTURES + MUTATEFUTURES).min(self.futures.len().saturating_sub(1)) {
            let worst = totals
                .iter()
                .enumerate()
                .min_by(|a, b| a.1.total_cmp(b.1))
                .map(|(i, _)| i)
                .expect("empty pool");
            self.futures.swap_remove(worst);
            totals.swap_remove(worst);
        }
        let best = totals
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .expect("empty pool");
        for _ in 0..MUTATEFUTURES {
            let mutant = self.futures[best].mutant(&mut self.rng);
            self.futures.push(mutant);
        }
    }

    /// append one input to the movie for real: step the console, record
    /// the memory under every objective, lay down a checkpoint on the
    /// cadence, tick the backtrack clock
    fn commit(&mut self, input: Input, annotation: &str) {
        self.emulator.cached_step(input);
        self.movie.push(input, annotation);
        let memory = self.emulator.memory();
        self.objectives.observe(&memory, &mut self.rng);
        if self.movie.len() > self.watermark
            && (self.movie.len() - self.watermark) % CHECKPOINT_EVERY == 0
        {
            self.checkpoints.push(Checkpoint {
                snapshot: self.emulator.save(),
                movenum: self.movie.len(),
            });
        }
        self.until_backtrack = self.until_backtrack.saturating_sub(1);
    }

    /// try to replace the recent past with something better. pick the
    /// newest checkpoint far enough back, fan improvement passes out,
    /// rewind, and let a selector round arbitrate between the original
    /// segment and everything the passes found.
    fn backtrack(&mut self) {
        let target = self
            .checkpoints
            .iter()
            .rev()
            .find(|c| {
                self.movie.len() - c.movenum >= MIN_BACKTRACK_DISTANCE
                    && c.movenum > self.watermark
            })
            .map(|c| (c.movenum, c.snapshot.clone()));
        let Some((movenum, snapshot)) = target else {
            log::info!("backtrack deferred: no eligible checkpoint");
            self.until_backtrack = 1;
            return;
        };
        let improveme = self.movie.inputs()[movenum..].to_vec();
        let (end_integral, _) =
            scorer::score_integral(&mut self.emulator, &self.objectives, &snapshot, &improveme);
        let end_state = self.emulator.save();
        let mut requests = Vec::new();
        for &(strategy, count) in backtrack::SCHEDULE.iter() {
            for rep in 0..count {
                requests.push(Request::ImproveSegment {
                    start_state: snapshot.clone(),
                    improveme: improveme.clone(),
                    end_state: end_state.clone(),
                    end_integral,
                    strategy,
                    seed: backtrack::seed(strategy, movenum, rep),
                    iters: IMPROVE_ITERS,
                    maxbest: IMPROVE_MAXBEST,
                });
            }
        }
        let responses = self.dispatcher.dispatch(&requests);
        let mut seen = HashSet::new();
        seen.insert(improveme.clone());
        let mut trials = vec![Next {
            inputs: improveme,
            explanation: "original".to_string(),
        }];
        for response in responses {
            let Response::ImproveSegment(improvement) = response else {
                panic!("mismatched response kind");
            };
            for (inputs, score) in improvement.inputs.into_iter().zip(improvement.scores) {
                if seen.insert(inputs.clone()) {
                    trials.push(Next {
                        inputs,
                        explanation: format!("improved-{:.2}", score),
                    });
                }
            }
        }
        if trials.len() == 1 {
            log::info!("backtrack at {} found no improvements", movenum);
            self.html.log(&format!("backtrack at {} found nothing", movenum));
            self.until_backtrack = TRY_BACKTRACK_EVERY;
            return;
        }
        log::info!(
            "backtracking to {} with {} trials over {} inputs",
            movenum,
            trials.len(),
            self.movie.len() - movenum,
        );
        self.movie.truncate(movenum);
        while self.checkpoints.last().map_or(false, |c| c.movenum > movenum) {
            self.checkpoints.pop();
        }
        self.emulator.load(&snapshot);
        self.take_best(trials, false);
        self.backtracks += 1;
        self.until_backtrack = TRY_BACKTRACK_EVERY;
        self.publish(&format!(
            "{}-playfun-backtrack-{}.fm2",
            self.game, self.backtracks,
        ));
        self.html.log(&format!("backtracked at {}", movenum));
    }

    fn publish(&self, path: &str) {
        if let Err(e) = movie::write(path, self.movie.inputs(), &self.game) {
            log::warn!("could not write {}: {}", path, e);
        }
    }

    /// final movie plus the diagnostics plots
    fn finish(&mut self) {
        self.publish(&format!("{}-playfun-{}.fm2", self.game, self.rounds));
        crate::diagnostics::distributions_svg(
            &format!("{}-futures-{}.svg", self.game, self.rounds),
            &self.distributions,
        );
        crate::diagnostics::motifs_svg(&format!("{}-motifs.svg", self.game), &self.motifs);
        let (hits, misses) = self.emulator.cache_stats();
        log::info!(
            "{} rounds, {} backtracks, {} inputs, step cache {} / {}",
            self.rounds,
            self.backtracks,
            self.movie.len(),
            hits,
            hits + misses,
        );
    }
}

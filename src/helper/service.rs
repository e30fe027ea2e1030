use super::Request;
use super::Response;
use crate::console::Emulator;
use crate::motifs::Motifs;
use crate::objective::Objectives;
use crate::search::backtrack;
use crate::search::scorer;

/// the compute engine behind one helper: its own console, plus the
/// learned objectives and motifs loaded from disk at startup. a request
/// carries every snapshot it needs, so serving holds no state between
/// calls beyond the emulator's step cache.
pub struct Service {
    emulator: Emulator,
    objectives: Objectives,
    motifs: Motifs,
}

impl Service {
    pub fn load(game: &str) -> Self {
        let objectives = Objectives::load(&format!("{}.objectives", game));
        let motifs = Motifs::load(&format!("{}.motifs", game));
        assert!(!objectives.is_empty(), "no objectives learned for {}", game);
        assert!(!motifs.is_empty(), "no motifs learned for {}", game);
        Self::new(Emulator::new(crate::console::open(game)), objectives, motifs)
    }

    pub fn new(emulator: Emulator, objectives: Objectives, motifs: Motifs) -> Self {
        Self {
            emulator,
            objectives,
            motifs,
        }
    }

    pub fn serve(&mut self, request: &Request) -> Response {
        match request {
            Request::ScoreNexts {
                state,
                next,
                futures,
            } => Response::ScoreNexts(scorer::score_next(
                &mut self.emulator,
                &self.objectives,
                state,
                next,
                futures,
            )),
            Request::ImproveSegment {
                start_state,
                improveme,
                end_state,
                end_integral,
                strategy,
                seed,
                iters,
                maxbest,
            } => Response::ImproveSegment(backtrack::improve(
                &mut self.emulator,
                &self.objectives,
                &self.motifs,
                start_state,
                improveme,
                end_state,
                *end_integral,
                *strategy,
                seed,
                *iters,
                *maxbest,
            )),
        }
    }
}

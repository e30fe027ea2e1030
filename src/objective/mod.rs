mod learner;
mod objective;
mod weighted;

pub use learner::Learner;
pub use objective::Objective;
pub use weighted::Objectives;

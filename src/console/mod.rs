mod emulator;
mod input;
mod memory;
mod sim;

pub use emulator::Console;
pub use emulator::Emulator;
pub use emulator::Snapshot;
pub use input::Input;
pub use memory::Memory;
pub use sim::Sim;

/// open the console backend for a game. hardware cores attach behind the
/// Console trait; the built-in deterministic machine stands in for them
/// so the pipeline runs end-to-end without one.
pub fn open(game: &str) -> Box<dyn Console> {
    log::info!("opening console for {}", game);
    Box::new(Sim::new(game))
}

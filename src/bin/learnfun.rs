//! Learnfun Binary
//!
//! Replays a recorded playthrough and learns what progress looked like:
//! weighted RAM objectives plus the motif library, saved beside the game.

use clap::Parser;
use tasbot::objective::Learner;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// base name of the game; outputs land at <game>.objectives and
    /// <game>.motifs
    #[arg(long)]
    game: String,
    /// recorded input trace (.fm2)
    #[arg(long)]
    movie: String,
    /// skip-replay prefix length
    #[arg(long, default_value_t = 0)]
    fastforward: usize,
}

fn main() -> anyhow::Result<()> {
    tasbot::log();
    let args = Args::parse();
    Learner::run(&args.game, &args.movie, args.fastforward)
}

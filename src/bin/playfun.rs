//! Playfun Binary
//!
//! Searches forward from the recorded prefix using the learned
//! objectives and motifs. Runs standalone, as a master fanning scoring
//! out to helpers, or as a helper serving one port.

use clap::Parser;
use tasbot::helper;
use tasbot::helper::Dispatcher;
use tasbot::helper::Service;
use tasbot::search::PlayFun;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// base name of the game and its learned files
    #[arg(long)]
    game: String,
    /// recorded input trace (.fm2)
    #[arg(long)]
    movie: String,
    /// skip-replay prefix length
    #[arg(long, default_value_t = 0)]
    fastforward: usize,
    /// serve scoring work on this port instead of playing
    #[arg(long, conflicts_with = "master")]
    helper: Option<u16>,
    /// play as master against helpers on these ports (the first is the
    /// colocated helper's)
    #[arg(long, num_args = 1..)]
    master: Vec<u16>,
    /// stop after this many rounds instead of running until interrupted
    #[arg(long)]
    rounds: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    tasbot::log();
    let args = Args::parse();
    if let Some(port) = args.helper {
        return helper::run(&args.game, port);
    }
    let dispatcher = match args.master.is_empty() {
        true => Dispatcher::serial(Service::load(&args.game)),
        false => Dispatcher::remote(&args.master),
    };
    let mut play = PlayFun::new(&args.game, &args.movie, args.fastforward, dispatcher)?;
    tasbot::brb();
    play.run(args.rounds);
    Ok(())
}

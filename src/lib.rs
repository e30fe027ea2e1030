pub mod console;
pub mod diagnostics;
pub mod helper;
pub mod motifs;
pub mod movie;
pub mod objective;
pub mod rng;
pub mod search;

/// dimensional analysis types
/// objective weights and sampling masses
pub type Weight = f64;
/// evaluation deltas, integrals, and search scores
pub type Score = f64;
/// index into the committed movie
pub type Frame = usize;

// console parameters
pub const RAM_SIZE: usize = 2048;
pub const MOTIF_LENGTH: usize = 10;

// objective normalization
pub const OBSERVATION_SLOTS: usize = 64;

// futures pool parameters
pub const NFUTURES: usize = 40;
pub const NWEIGHTEDFUTURES: usize = 35;
pub const INPUTS_PER_NEXT: usize = 10;
pub const DROPFUTURES: usize = 5;
pub const MUTATEFUTURES: usize = 7;
pub const MINFUTURELENGTH: usize = 50;
pub const MAXFUTURELENGTH: usize = 800;

// motif reweighting
pub const MOTIF_ALPHA: Weight = 0.8;
pub const MOTIF_MAX_FRAC: Weight = 0.1;
pub const MOTIF_MIN_FRAC: Weight = 1e-5;

// checkpoints and backtracking
pub const CHECKPOINT_EVERY: usize = 100;
pub const TRY_BACKTRACK_EVERY: usize = 180;
pub const MIN_BACKTRACK_DISTANCE: usize = 300;
pub const IMPROVE_ITERS: usize = 200;
pub const IMPROVE_MAXBEST: usize = 5;

// output cadence
pub const WRITE_MOVIE_EVERY: usize = 5;

// helper protocol
pub const HELPER_CACHE_SIZE: usize = 8;
pub const HELPER_RETRIES: usize = 3;
pub const MAX_FRAME_BYTES: usize = 1 << 24;

// emulator step cache tiers
pub const CACHE_STICKY: usize = 1 << 14;
pub const CACHE_RECENT: usize = 1 << 12;

/// trait for random generation, mainly (strictly?) for testing
pub trait Arbitrary {
    fn random() -> Self;
}

/// progress bar
pub fn progress(n: usize) -> indicatif::ProgressBar {
    let tick = std::time::Duration::from_secs(60);
    let style = "{spinner:.cyan} {elapsed} ~ {percent:>3}% {wide_bar:.cyan}";
    let style = indicatif::ProgressStyle::with_template(style).unwrap();
    let progress = indicatif::ProgressBar::new(n as u64);
    progress.set_style(style);
    progress.enable_steady_tick(tick);
    progress
}

/// initialize dual logging (terminal + file) with timestamped log files.
/// creates `logs/` and writes DEBUG level to file, INFO to terminal.
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// global stop flag for graceful shutdown coordination
static INTERRUPTED: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(false);

/// check if graceful shutdown was requested (via stdin "Q")
pub fn interrupted() -> bool {
    INTERRUPTED.load(std::sync::atomic::Ordering::Relaxed)
}

/// register graceful interrupt handler. type "Q" + Enter to stop after the current round.
pub fn brb() {
    std::thread::spawn(|| {
        loop {
            let ref mut buffer = String::new();
            if let Ok(_) = std::io::stdin().read_line(buffer) {
                if buffer.trim().to_uppercase() == "Q" {
                    log::warn!("graceful interrupt requested, finishing current round...");
                    INTERRUPTED.store(true, std::sync::atomic::Ordering::Relaxed);
                    break;
                }
            }
        }
    });
}

//! Headless entry point
//!
//! Runs a seeded demo session for a fixed number of frames and logs a
//! summary. A windowed front end would own the frame loop instead, feeding
//! `InputTracker` snapshots into `App::update` and an actual surface into
//! `App::draw`.

use std::env;
use std::time::{SystemTime, UNIX_EPOCH};

use cavern::sim::{GameState, tick};

const DEMO_FRAMES: u32 = 3600; // one minute at 60 fps

fn main() {
    env_logger::init();

    let seed = env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });

    log::info!("running demo session with seed {seed}");
    let mut state = GameState::new(seed, None);
    for _ in 0..DEMO_FRAMES {
        tick(&mut state, None);
    }

    log::info!(
        "after {} frames: level {}, {} robots on screen, {} queued, {} orbs",
        DEMO_FRAMES,
        state.level + 1,
        state.enemies.len(),
        state.pending_enemies.len(),
        state.orbs.len(),
    );
    println!(
        "demo seed {seed}: reached level {} with {} active robots",
        state.level + 1,
        state.enemies.len()
    );
}

//! Tower defense entry point
//!
//! Usage: `tower_defense [config.toml]`

use std::process::ExitCode;

use tower_defense::{Game, GameError};
use tower_engine::foundation::logging;
use tower_engine::prelude::*;

fn run() -> Result<(), GameError> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let config = EngineConfig::load_or_default(&path)?;
    logging::init(&config.log_level);
    log::info!("Starting tower defense with {path}");

    let mut game = Game::new(config)?;
    game.spawn_archetypes()?;
    game.run()?;
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            // Logging may not be up yet when the config itself failed
            logging::init("error");
            log::error!("{error}");
            eprintln!("tower_defense: {error}");
            ExitCode::FAILURE
        }
    }
}

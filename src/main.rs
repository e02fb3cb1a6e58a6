//! Interactive fibre classification.
//!
//! Downloads (or reuses) the dataset, walks through every configured protein
//! with two polygon selection windows each, and writes the classified table
//! and its summaries to the working directory.

use std::path::Path;
use std::process::ExitCode;

use mitoselect::config::{Config, DEFAULT_CONFIG_FILE};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::load_or_default(Path::new(DEFAULT_CONFIG_FILE)) {
        Ok(c) => c,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    println!("Select points in the figure by enclosing them within a polygon.");
    println!("{}", config.selector.keys.help_text());

    match mitoselect::workflow::run(&config) {
        Ok(table) => {
            log::info!(
                "classified {} fibres for {} proteins",
                table.wide.len(),
                table.classes.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

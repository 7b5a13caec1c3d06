//! The `tutorlens reset` command.

use std::path::PathBuf;

use anyhow::Result;

use tutorlens_providers::load_config_from;
use tutorlens_store::PredictionLog;

pub fn execute(yes: bool, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let log = PredictionLog::new(&config.log_path);

    if !yes {
        anyhow::bail!(
            "refusing to delete {} without confirmation; re-run with --yes",
            log.path().display()
        );
    }

    log.reset()?;
    println!("Prediction log reset: {}", log.path().display());
    Ok(())
}

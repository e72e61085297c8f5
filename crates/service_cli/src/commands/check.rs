//! `check` command: validate an engine configuration file without running
//! any computation.

use tracing::info;

use crate::{io, Result};

/// Load and validate `config_path`, printing the resolved configuration on
/// success.
pub fn run(config_path: &str) -> Result<()> {
    info!(config = %config_path, "validating engine configuration");
    let config = io::load_config(config_path)?;

    println!("configuration valid");
    println!("engine_version:       {}", config.engine_version);
    println!("var_window_days:      {}", config.var_window_days);
    println!("var_confidence:       {}", config.var_confidence);
    println!(
        "var_stress_window:    {} .. {}",
        config.var_stress_window_start, config.var_stress_window_end
    );
    println!("vol_regime_override:  {:?}", config.vol_regime_override);
    println!("parallelism:          {}", config.parallelism);
    println!(
        "deadline_ms:          {}",
        if config.deadline_ms == 0 { "none".to_string() } else { config.deadline_ms.to_string() }
    );

    Ok(())
}

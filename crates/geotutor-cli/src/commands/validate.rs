//! The `geotutor validate` command.

use std::path::PathBuf;

use anyhow::Result;

use geotutor_core::config::load_config_from;

pub fn execute(config_path: PathBuf) -> Result<()> {
    let config = load_config_from(Some(&config_path))?;

    println!("Config: {}", config_path.display());
    println!(
        "  mastery: {:?} model, alpha {}, beta {}, initial {}",
        config.mastery.model,
        config.mastery.alpha,
        config.mastery.beta,
        config.mastery.initial_mastery
    );
    println!(
        "  policy: promote at {}, demote below {}{}",
        config.policy.promote_threshold,
        config.policy.demote_threshold,
        if config.policy.allow_double_step {
            format!(", double step at {}", config.policy.double_step_threshold)
        } else {
            String::new()
        }
    );
    println!(
        "  tolerance: absolute {}, relative {}",
        config.tolerance.absolute, config.tolerance.relative
    );
    println!("Config valid.");

    Ok(())
}

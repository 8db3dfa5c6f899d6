//! The `geotutor example` command.

use std::path::PathBuf;

use anyhow::Result;

use geotutor_core::config::load_config_from;
use geotutor_core::generator::ProblemGenerator;
use geotutor_core::model::Shape;

pub fn execute(shape: String, seed: Option<u64>, config_path: Option<PathBuf>) -> Result<()> {
    let shape: Shape = shape.parse()?;
    let config = load_config_from(config_path.as_deref())?;

    let mut generator = match seed {
        Some(seed) => ProblemGenerator::seeded(config.ranges, seed),
        None => ProblemGenerator::from_entropy(config.ranges),
    };

    println!("{}", generator.worked_example(shape).explanation);
    Ok(())
}

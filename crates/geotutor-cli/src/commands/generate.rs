//! The `geotutor generate` command.

use std::path::PathBuf;

use anyhow::Result;

use geotutor_core::config::load_config_from;
use geotutor_core::generator::ProblemGenerator;

#[allow(clippy::too_many_arguments)]
pub fn execute(
    shape: String,
    difficulty: String,
    count: usize,
    show_answer: bool,
    seed: Option<u64>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(count >= 1, "count must be at least 1");
    let config = load_config_from(config_path.as_deref())?;

    let mut generator = match seed {
        Some(seed) => ProblemGenerator::seeded(config.ranges, seed),
        None => ProblemGenerator::from_entropy(config.ranges),
    };

    let mut problems = Vec::with_capacity(count);
    for _ in 0..count {
        problems.push(generator.generate_named(&shape, &difficulty)?);
    }

    match format.as_str() {
        "json" => {
            let items: Vec<_> = problems
                .iter()
                .map(|p| -> Result<serde_json::Value> {
                    let mut value = serde_json::to_value(p)?;
                    if show_answer {
                        value["area"] = serde_json::json!(p.area());
                    }
                    Ok(value)
                })
                .collect::<Result<_>>()?;
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        _ => {
            for (i, problem) in problems.iter().enumerate() {
                println!("{}. {}", i + 1, problem.prompt());
                if show_answer {
                    println!(
                        "   Area = {} = {:.2}",
                        problem.shape().formula(),
                        problem.area()
                    );
                }
            }
        }
    }

    Ok(())
}

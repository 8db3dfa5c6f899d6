//! The `geotutor init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("geotutor.toml").exists() {
        println!("geotutor.toml already exists, skipping.");
    } else {
        std::fs::write("geotutor.toml", SAMPLE_CONFIG)?;
        println!("Created geotutor.toml");
    }

    println!("\nNext steps:");
    println!("  1. Tune the learning rates and thresholds in geotutor.toml");
    println!("  2. Run: geotutor validate --config geotutor.toml");
    println!("  3. Run: geotutor practice --student <your id>");

    Ok(())
}

pub(crate) const SAMPLE_CONFIG: &str = r#"# geotutor configuration

[mastery]
# "linear": m + alpha(1 - m) on correct, m - beta*m on incorrect
# "bkt": knowledge tracing with guess/slip/learn
model = "linear"
alpha = 0.1
beta = 0.15
initial_mastery = 0.5

[mastery.bkt]
guess = 0.2
slip = 0.1
learn = 0.3

[policy]
promote_threshold = 0.7
demote_threshold = 0.3
allow_double_step = false
double_step_threshold = 0.9

[tolerance]
absolute = 0.01
relative = 0.0

# Dimension ranges per band and shape. decimals = 0 draws whole numbers.
[ranges.easy.triangle]
base = { min = 3, max = 8 }
height = { min = 3, max = 8 }

[ranges.easy.square]
side = { min = 3, max = 8 }

[ranges.easy.rectangle]
length = { min = 4, max = 8 }
width = { min = 3, max = 6 }

[ranges.medium.triangle]
base = { min = 6, max = 12 }
height = { min = 5, max = 10, decimals = 1 }

[ranges.medium.square]
side = { min = 7, max = 15 }

[ranges.medium.rectangle]
length = { min = 8, max = 15 }
width = { min = 5, max = 10 }

[ranges.hard.triangle]
base = { min = 8, max = 20, decimals = 1 }
height = { min = 6, max = 15, decimals = 1 }

[ranges.hard.square]
side = { min = 10, max = 25, decimals = 1 }

[ranges.hard.rectangle]
length = { min = 10, max = 30, decimals = 1 }
width = { min = 5, max = 15, decimals = 1 }
"#;

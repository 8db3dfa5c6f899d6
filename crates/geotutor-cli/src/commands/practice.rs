//! The `geotutor practice` command.
//!
//! Reads one line at a time from stdin. A number answers the current
//! problem; anything else is a command.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;

use geotutor_core::config::load_config_from;
use geotutor_core::model::{Problem, Shape};
use geotutor_core::progress::ProgressSummary;
use geotutor_core::session::SessionController;
use geotutor_core::store::JsonFileStore;

pub fn execute(
    student: String,
    shape: String,
    store_path: PathBuf,
    config_path: Option<PathBuf>,
    seed: Option<u64>,
) -> Result<()> {
    let student = student.trim().to_string();
    let mut shape: Shape = shape.parse()?;
    let config = load_config_from(config_path.as_deref())?;
    let store = JsonFileStore::open(&store_path)?;
    tracing::debug!(store = %store_path.display(), "opened record store");

    let mut session = match seed {
        Some(seed) => SessionController::seeded(config, store, seed)?,
        None => SessionController::from_entropy(config, store)?,
    };

    let record = session.start_session(&student)?;
    println!("Welcome, {student}!");
    println!(
        "Mastery: {}% | Difficulty: {}",
        ProgressSummary::from(&record).mastery_percent,
        record.difficulty
    );
    print_help();

    let mut problem = session.next_problem(&student, shape)?;
    show_problem(&problem);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let input = line.trim();

        if let Some(name) = shape_argument(input) {
            match name.parse::<Shape>() {
                Ok(next) => {
                    shape = next;
                    problem = session.next_problem(&student, shape)?;
                    println!("Switched to {shape}.");
                    show_problem(&problem);
                }
                Err(e) => println!("Error: {e}. Choose triangle, square, or rectangle."),
            }
            continue;
        }

        match input {
            "q" | "quit" | "exit" => break,
            "help" => print_help(),
            "example" => {
                let example = session.worked_example(shape);
                println!("{}", example.explanation);
            }
            "skip" | "new" => {
                problem = session.next_problem(&student, shape)?;
                show_problem(&problem);
            }
            "progress" => print_progress(&session.progress(&student)?),
            answer => match session.submit_answer(&student, &problem, answer) {
                Ok(feedback) => {
                    println!("{}", feedback.message);
                    println!(
                        "Mastery: {}% | Difficulty: {}",
                        (feedback.mastery * 100.0) as u32,
                        feedback.difficulty
                    );
                    problem = session.next_problem(&student, shape)?;
                    show_problem(&problem);
                }
                Err(e) if e.is_user_correctable() => println!("Error: {e}"),
                Err(e) => return Err(e.into()),
            },
        }
    }

    let summary = session.progress(&student)?;
    println!();
    print_progress(&summary);
    println!("Goodbye, {student}!");

    Ok(())
}

/// The shape name in a `shape <name>` command, if `input` is one.
fn shape_argument(input: &str) -> Option<&str> {
    match input.split_once(char::is_whitespace) {
        Some(("shape", name)) => Some(name.trim()),
        None if input == "shape" => Some(""),
        _ => None,
    }
}

fn show_problem(problem: &Problem) {
    println!("\n{}", problem.prompt());
}

fn print_help() {
    println!("Type the area to answer. Other commands:");
    println!("  shape <name>  switch to triangle, square, or rectangle");
    println!("  example       show a worked example");
    println!("  skip          get a different problem");
    println!("  progress      show your progress");
    println!("  quit          save and leave");
}

fn print_progress(summary: &ProgressSummary) {
    println!(
        "Progress: mastery {}%, {} band, {}/{} correct ({:.0}% accuracy)",
        summary.mastery_percent,
        summary.difficulty,
        summary.correct,
        summary.attempts,
        summary.accuracy * 100.0
    );
}

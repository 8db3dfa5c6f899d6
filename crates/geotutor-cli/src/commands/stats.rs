//! The `geotutor stats` command.

use std::path::PathBuf;

use anyhow::Result;

use geotutor_core::progress::{summarize_store, GroupSummary, ProgressSummary};
use geotutor_core::store::{JsonFileStore, RecordStore};

pub fn execute(student: Option<String>, store_path: PathBuf, format: String) -> Result<()> {
    let store = JsonFileStore::open(&store_path)?;

    let summaries = match &student {
        Some(id) => {
            let record = store
                .load(id)?
                .ok_or_else(|| anyhow::anyhow!("no record for student '{id}'"))?;
            vec![ProgressSummary::from(&record)]
        }
        None => summarize_store(&store)?,
    };

    if summaries.is_empty() {
        println!(
            "No students found in {}. Run `geotutor practice --student <id>` to start.",
            store_path.display()
        );
        return Ok(());
    }

    let group = GroupSummary::from_summaries(&summaries);

    match format.as_str() {
        "json" => {
            let output = serde_json::json!({
                "students": summaries,
                "summary": group,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        _ => {
            print_table(&summaries);
            if student.is_none() {
                println!(
                    "\n{} student(s), mean mastery {:.0}%, overall accuracy {:.1}% ({}/{})",
                    group.students,
                    group.mean_mastery * 100.0,
                    group.overall_accuracy * 100.0,
                    group.total_correct,
                    group.total_attempts
                );
            }
        }
    }

    Ok(())
}

fn print_table(summaries: &[ProgressSummary]) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec![
        "Student",
        "Mastery",
        "Difficulty",
        "Correct",
        "Attempts",
        "Accuracy",
        "Last activity",
    ]);

    for s in summaries {
        table.add_row(vec![
            Cell::new(&s.student_id),
            Cell::new(format!("{}%", s.mastery_percent)),
            Cell::new(s.difficulty),
            Cell::new(s.correct),
            Cell::new(s.attempts),
            Cell::new(format!("{:.1}%", s.accuracy * 100.0)),
            Cell::new(s.last_activity.format("%Y-%m-%d %H:%M")),
        ]);
    }

    println!("{table}");
}

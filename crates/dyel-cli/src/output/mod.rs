use dyel_core::Program;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::ui;

pub mod table;

/// Render a serializable response as pretty or single-line JSON.
pub fn render_json<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
        OutputFormat::Json | OutputFormat::Table => Ok(serde_json::to_string_pretty(value)?),
    }
}

/// Print a serializable response. Table mode falls back to pretty JSON.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    println!("{}", render_json(value, format)?);
    Ok(())
}

/// Print a list of programs: one summary row each in table mode.
pub fn output_programs(programs: &[Program], format: OutputFormat) -> anyhow::Result<()> {
    let rendered = match format {
        OutputFormat::Table => render_program_summaries(programs, table_options()),
        OutputFormat::Json | OutputFormat::Raw => render_json(&programs, format)?,
    };
    println!("{rendered}");
    Ok(())
}

/// Print one program: every exercise as a row in table mode.
pub fn output_program(program: &Program, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = match format {
        OutputFormat::Table => render_program_detail(program, table_options()),
        OutputFormat::Json | OutputFormat::Raw => render_json(program, format)?,
    };
    println!("{rendered}");
    Ok(())
}

fn table_options() -> table::TableOptions {
    let prefs = ui::prefs();
    table::TableOptions {
        max_width: prefs.term_width,
        color: prefs.table_color,
    }
}

fn render_program_summaries(programs: &[Program], options: table::TableOptions) -> String {
    if programs.is_empty() {
        return String::from("(no programs)");
    }
    let rows = programs
        .iter()
        .map(|program| {
            vec![
                program.id.clone(),
                program.name.clone(),
                program.shared_by.clone(),
                program.days.len().to_string(),
                program.exercise_count().to_string(),
                program.updated_at.to_rfc3339(),
            ]
        })
        .collect::<Vec<_>>();
    table::render_table(
        &["id", "name", "shared_by", "days", "exercises", "updated_at"],
        &rows,
        options,
    )
}

fn render_program_detail(program: &Program, options: table::TableOptions) -> String {
    let heading = format!(
        "{} ({}) shared by {}",
        program.name, program.id, program.shared_by
    );
    let rows = program
        .days
        .iter()
        .flat_map(|day| {
            let empty_day = day.exercises.is_empty().then(|| {
                vec![
                    day.name.clone(),
                    "-".to_string(),
                    "-".to_string(),
                    "-".to_string(),
                    "-".to_string(),
                ]
            });
            day.exercises
                .iter()
                .map(|exercise| {
                    vec![
                        day.name.clone(),
                        exercise.name.clone(),
                        exercise.sets.to_string(),
                        exercise.reps.clone(),
                        exercise.rest.clone(),
                    ]
                })
                .chain(empty_day)
        })
        .collect::<Vec<_>>();

    if rows.is_empty() {
        return format!("{heading}\n(no days)");
    }
    let body = table::render_table(&["day", "exercise", "sets", "reps", "rest"], &rows, options);
    format!("{heading}\n{body}")
}

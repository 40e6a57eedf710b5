//! Placeholder markdown for guide files that are not written yet.

use std::fmt::Write;
use std::path::Path;

use super::curriculum::Example;

/// Title shown for a missing guide: the file name without its extension.
pub fn title_for(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// Render the placeholder for `path`. When an example references the file,
/// its objectives, steps and expected output are inlined.
pub fn render(path: &str, example: Option<&Example>) -> String {
    let mut out = format!("# {}\n\n## File Not Yet Created\n\n", title_for(path));
    out.push_str(
        "This guide file is being prepared. \
         The step-by-step instructions are available in the lesson details.\n",
    );

    match example {
        Some(example) => write_example(&mut out, example),
        None => out.push_str(
            "\nPlease refer to the Step-by-Step Instructions, \
             Execution Steps and Expected Output sections of the lesson.\n",
        ),
    }

    out.push_str("\n---\n*This is a placeholder. The actual file will be available soon.*\n");
    out
}

fn write_example(out: &mut String, example: &Example) {
    if !example.learning_objectives.is_empty() {
        out.push_str("\n## Learning Objectives\n\n");
        for objective in &example.learning_objectives {
            let _ = writeln!(out, "- {objective}");
        }
    }
    write_numbered(out, "Step-by-Step Instructions", &example.steps);
    write_numbered(out, "Execution Steps", &example.execution_steps);
    if let Some(expected) = &example.expected_output {
        let _ = write!(out, "\n## Expected Output\n\n{expected}\n");
    }
}

fn write_numbered(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = write!(out, "\n## {heading}\n\n");
    for (i, item) in items.iter().enumerate() {
        let _ = writeln!(out, "{}. {item}", i + 1);
    }
}

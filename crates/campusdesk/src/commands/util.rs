//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Wrap a dialoguer failure.
pub fn prompt_err(e: dialoguer::Error) -> CliError {
    CliError::Prompt(e.to_string())
}

/// Whether prompts can be shown.
pub fn interactive() -> bool {
    std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to ask on, a missing `--yes` is an error rather than
/// a silent "no".
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !interactive() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Split `KEY=VALUE`. The value may be empty and may contain `=`.
pub fn parse_assignment(raw: &str, flag: &str) -> Result<(String, String), CliError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_owned(), value.to_owned()))
        }
        _ => Err(CliError::Validation {
            field: flag.into(),
            reason: format!("expected KEY=VALUE, got '{raw}'"),
        }),
    }
}

/// Read a JSON object of field values for `--from-file`.
///
/// Strings are taken as-is, numbers and booleans as their JSON text, arrays
/// as comma-separated ids. Nulls are skipped.
pub fn read_form_file(path: &Path) -> Result<Vec<(String, String)>, CliError> {
    let contents = std::fs::read_to_string(path)?;
    form_pairs(&serde_json::from_str(&contents)?)
}

fn form_pairs(value: &Value) -> Result<Vec<(String, String)>, CliError> {
    let Value::Object(map) = value else {
        return Err(CliError::Validation {
            field: "from-file".into(),
            reason: "expected a JSON object of field values".into(),
        });
    };
    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        let text = match value {
            Value::Null => continue,
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .map(|v| v.as_str().map_or_else(|| v.to_string(), str::to_owned))
                .collect::<Vec<_>>()
                .join(","),
            other => other.to_string(),
        };
        pairs.push((key.clone(), text));
    }
    Ok(pairs)
}

/// Spinner on stderr while a request runs; hidden when quiet or piped.
pub fn spinner(message: &str, global: &GlobalOpts) -> ProgressBar {
    if global.quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn assignments_split_on_first_equals() {
        assert_eq!(
            parse_assignment("description=a=b", "set").unwrap(),
            ("description".into(), "a=b".into())
        );
        assert_eq!(
            parse_assignment("remarks=", "set").unwrap(),
            ("remarks".into(), String::new())
        );
        assert!(parse_assignment("=oops", "set").is_err());
        assert!(parse_assignment("novalue", "set").is_err());
    }

    #[test]
    fn form_file_values_become_text() {
        let mut pairs = form_pairs(&json!({
            "name": "Science",
            "floors": 3,
            "is_active": false,
            "permissions": [1, 4],
            "block_id": null
        }))
        .unwrap();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("floors".to_owned(), "3".to_owned()),
                ("is_active".to_owned(), "false".to_owned()),
                ("name".to_owned(), "Science".to_owned()),
                ("permissions".to_owned(), "1,4".to_owned()),
            ]
        );
        assert!(form_pairs(&json!([1, 2])).is_err());
    }
}

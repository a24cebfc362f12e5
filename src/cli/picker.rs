//! Interactive series picker.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `cpi pick` and choose a series" UX

use std::io::{self, BufRead, Write};

use crate::domain::SeriesDescriptor;
use crate::error::AppError;

/// What one line of picker input resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Selected(usize),
    Quit,
    Invalid(String),
}

/// Prompt on stdin/stdout for a series from `catalog`.
///
/// Returns `Ok(None)` when the user quits or input ends.
pub fn prompt_for_series(catalog: &[SeriesDescriptor]) -> Result<Option<SeriesDescriptor>, AppError> {
    let stdin = io::stdin();
    prompt_with(catalog, stdin.lock(), io::stdout())
}

/// Picker loop over arbitrary input/output streams.
///
/// Behavior:
/// - list the catalog with 1-based numbers
/// - accept either a number (from the list) or a series id
/// - `q` or end of input cancels
pub fn prompt_with<R: BufRead, W: Write>(
    catalog: &[SeriesDescriptor],
    mut input: R,
    mut out: W,
) -> Result<Option<SeriesDescriptor>, AppError> {
    if catalog.is_empty() {
        return Err(AppError::new(
            2,
            "No series match the current filters. Try `--any-title` or `--all-years`.",
        ));
    }

    let write_err = |e: io::Error| AppError::new(2, format!("Failed to write prompt: {e}"));

    writeln!(out, "Found {} series:", catalog.len()).map_err(write_err)?;
    for (idx, series) in catalog.iter().enumerate() {
        writeln!(out, "{:>4}) {}  {}", idx + 1, series.id, series.title).map_err(write_err)?;
    }

    loop {
        write!(out, "Select a series by number (1-{}) or id (q to quit): ", catalog.len()).map_err(write_err)?;
        out.flush().map_err(write_err)?;

        let mut line = String::new();
        let bytes = input
            .read_line(&mut line)
            .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;
        if bytes == 0 {
            writeln!(out).map_err(write_err)?;
            return Ok(None);
        }

        match resolve_choice(catalog, &line) {
            Choice::Selected(idx) => return Ok(Some(catalog[idx].clone())),
            Choice::Quit => return Ok(None),
            Choice::Invalid(msg) => writeln!(out, "{msg}").map_err(write_err)?,
        }
    }
}

/// Interpret one line of input against the catalog.
pub fn resolve_choice(catalog: &[SeriesDescriptor], input: &str) -> Choice {
    let input = input.trim();
    if input.eq_ignore_ascii_case("q") {
        return Choice::Quit;
    }
    if input.is_empty() {
        return Choice::Invalid("Enter a number or a series id.".to_string());
    }

    if let Ok(choice) = input.parse::<usize>() {
        if (1..=catalog.len()).contains(&choice) {
            return Choice::Selected(choice - 1);
        }
        return Choice::Invalid(format!(
            "Invalid choice: {choice}. Enter a number between 1 and {}.",
            catalog.len()
        ));
    }

    catalog
        .iter()
        .position(|s| s.id == input)
        .map(Choice::Selected)
        .unwrap_or_else(|| Choice::Invalid(format!("Unknown series: {input}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<SeriesDescriptor> {
        vec![
            SeriesDescriptor {
                id: "APU0000708111".to_string(),
                title: "Eggs, grade A, large, per doz. in U.S. city average".to_string(),
            },
            SeriesDescriptor {
                id: "APU0000702111".to_string(),
                title: "Bread, white, pan, per lb. in U.S. city average".to_string(),
            },
        ]
    }

    #[test]
    fn resolves_numbers_ids_and_quit() {
        let cat = catalog();
        assert_eq!(resolve_choice(&cat, "2\n"), Choice::Selected(1));
        assert_eq!(resolve_choice(&cat, " APU0000708111 "), Choice::Selected(0));
        assert_eq!(resolve_choice(&cat, "Q"), Choice::Quit);
        assert!(matches!(resolve_choice(&cat, "3"), Choice::Invalid(_)));
        assert!(matches!(resolve_choice(&cat, "0"), Choice::Invalid(_)));
        assert!(matches!(resolve_choice(&cat, "NOPE"), Choice::Invalid(_)));
    }

    #[test]
    fn reprompts_until_valid() {
        let cat = catalog();
        let mut out = Vec::new();
        let picked = prompt_with(&cat, "9\nAPU0000702111\n".as_bytes(), &mut out).unwrap();
        assert_eq!(picked.map(|s| s.id), Some("APU0000702111".to_string()));

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("   1) APU0000708111  Eggs"));
        assert!(text.contains("Invalid choice: 9"));
    }

    #[test]
    fn eof_and_quit_are_no_selection() {
        let cat = catalog();
        assert_eq!(prompt_with(&cat, "".as_bytes(), Vec::new()).unwrap(), None);
        assert_eq!(prompt_with(&cat, "q\n".as_bytes(), Vec::new()).unwrap(), None);
    }

    #[test]
    fn empty_catalog_is_an_error() {
        let err = prompt_with(&[], "1\n".as_bytes(), Vec::new()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}

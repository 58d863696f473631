//! Interactive source picker.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `salesdens` and choose a file" UX
//!
//! The picker searches for spreadsheet and CSV files under the current working directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::io::ingest::SourceFormat;

/// Default directory recursion depth for finding source files.
const DEFAULT_SEARCH_DEPTH: usize = 4;

/// Prompt the user to select a source file from the current directory tree.
///
/// Behavior:
/// - list discovered spreadsheet/CSV files
/// - accept either a number (from the list) or an explicit path
/// - `q` cancels
pub fn prompt_for_source_path() -> Result<PathBuf, AppError> {
    let files = discover_source_files();
    if files.is_empty() {
        return Err(AppError::usage(
            "No spreadsheet or CSV files found. Provide one with `salesdens report -f <file.xlsx>`.",
        ));
    }

    println!("Found {} source file(s):", files.len());
    for (idx, path) in files.iter().enumerate() {
        println!("{:>3}) {}", idx + 1, pretty_path(path));
    }

    loop {
        print!("Select a file by number (1-{}) or type a path (q to quit): ", files.len());
        io::stdout()
            .flush()
            .map_err(|e| AppError::usage(format!("Failed to write prompt: {e}")))?;

        let mut input = String::new();
        let bytes = io::stdin()
            .read_line(&mut input)
            .map_err(|e| AppError::usage(format!("Failed to read input: {e}")))?;

        if bytes == 0 {
            return Err(AppError::usage(
                "No input received. Provide a source path with `-f <file.xlsx>`.",
            ));
        }

        let input = input.trim();
        if input.eq_ignore_ascii_case("q") {
            return Err(AppError::usage("Canceled."));
        }

        if let Ok(choice) = input.parse::<usize>() {
            if (1..=files.len()).contains(&choice) {
                return validate_source_path(&files[choice - 1]);
            }
            println!("Invalid choice: {choice}. Enter a number between 1 and {}.", files.len());
            continue;
        }

        let candidate = PathBuf::from(input);
        match validate_source_path(&candidate) {
            Ok(path) => return Ok(path),
            Err(err) => {
                println!("{err}");
                continue;
            }
        }
    }
}

/// Validate the provided path points to a readable spreadsheet or CSV file.
pub fn validate_source_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::load(format!("Source file not found: {}", path.display())));
    }
    if path.is_dir() {
        return Err(AppError::load(format!(
            "Expected a file, got a directory: {}",
            path.display()
        )));
    }
    if SourceFormat::from_path(path).is_none() {
        return Err(AppError::load(format!(
            "Expected a spreadsheet or .csv file (got: {}).",
            path.display()
        )));
    }

    Ok(path.to_path_buf())
}

/// Discover source files under the current directory (deterministic order).
///
/// This is used by both the basic text prompt and the Ratatui TUI.
pub fn discover_source_files() -> Vec<PathBuf> {
    find_source_files(Path::new("."), DEFAULT_SEARCH_DEPTH)
}

fn find_source_files(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut out = Vec::new();
    find_source_files_inner(root, 0, max_depth, &mut out);
    out.sort_by_key(|p| pretty_path(p));
    out
}

fn find_source_files_inner(root: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }

    let Ok(entries) = fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(_) => continue,
        };

        if file_type.is_dir() {
            if should_skip_dir(&path) {
                continue;
            }
            find_source_files_inner(&path, depth + 1, max_depth, out);
            continue;
        }

        if file_type.is_file() && !is_lock_file(&path) && SourceFormat::from_path(&path).is_some() {
            out.push(path);
        }
    }
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules")
}

/// Office writes `~$name.xlsx` lock files next to open workbooks.
fn is_lock_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .is_some_and(|name| name.starts_with("~$"))
}

pub fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_spreadsheets_and_csv_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("data");
        fs::create_dir(&nested).unwrap();
        for name in ["b.xlsx", "a.csv", "notes.txt", "~$b.xlsx"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        fs::write(nested.join("c.ods"), "").unwrap();

        let found: Vec<String> = find_source_files(dir.path(), 2)
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().display().to_string())
            .collect();
        assert_eq!(found, vec!["a.csv", "b.xlsx", "data/c.ods"]);
    }

    #[test]
    fn validate_rejects_directories_and_other_types() {
        let dir = tempfile::tempdir().unwrap();
        assert!(validate_source_path(dir.path()).is_err());

        let txt = dir.path().join("notes.txt");
        fs::write(&txt, "").unwrap();
        assert!(validate_source_path(&txt).is_err());

        let csv = dir.path().join("sales.csv");
        fs::write(&csv, "").unwrap();
        assert_eq!(validate_source_path(&csv).unwrap(), csv);
    }
}

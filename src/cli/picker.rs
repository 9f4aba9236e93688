//! Interactive fits-file picker.
//!
//! This is kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `chi2fit plot` and choose a saved fit" UX
//!
//! The picker searches for `*.json` files under the current working directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Directory recursion depth for finding fits files.
const DEFAULT_SEARCH_DEPTH: usize = 3;

/// Prompt the user to select a fits JSON file from the current directory tree.
///
/// Behavior:
/// - list discovered `*.json` files
/// - accept either a number (from the list) or an explicit path
/// - `q` cancels
pub fn prompt_for_fits_path() -> Result<PathBuf, AppError> {
    let files = discover_json_files(Path::new("."));
    if files.is_empty() {
        return Err(AppError::new(
            2,
            "No .json files found. Provide one with `chi2fit plot --fits <file.json>`.",
        ));
    }

    println!("Found {} JSON file(s):", files.len());
    for (idx, path) in files.iter().enumerate() {
        println!("{:>3}) {}", idx + 1, pretty_path(path));
    }

    loop {
        print!("Select a file by number (1-{}) or type a path (q to quit): ", files.len());
        io::stdout()
            .flush()
            .map_err(|e| AppError::new(2, format!("Failed to write prompt: {e}")))?;

        let mut input = String::new();
        let bytes = io::stdin()
            .read_line(&mut input)
            .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;

        if bytes == 0 {
            return Err(AppError::new(
                2,
                "No input received. Provide a fits file with `chi2fit plot --fits <file.json>`.",
            ));
        }

        let input = input.trim();
        if input.eq_ignore_ascii_case("q") {
            return Err(AppError::new(2, "Canceled."));
        }

        if let Ok(choice) = input.parse::<usize>() {
            if (1..=files.len()).contains(&choice) {
                return validate_fits_path(&files[choice - 1]);
            }
            println!("Invalid choice: {choice}. Enter a number between 1 and {}.", files.len());
            continue;
        }

        match validate_fits_path(&PathBuf::from(input)) {
            Ok(path) => return Ok(path),
            Err(err) => println!("{err}"),
        }
    }
}

/// Validate the provided path points to a `.json` file.
pub fn validate_fits_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::new(2, format!("Fits file not found: {}", path.display())));
    }
    if path.is_dir() {
        return Err(AppError::new(
            2,
            format!("Expected a file, got a directory: {}", path.display()),
        ));
    }
    if !has_json_extension(path) {
        return Err(AppError::new(
            2,
            format!("Expected a .json file (got: {}).", path.display()),
        ));
    }
    Ok(path.to_path_buf())
}

/// Discover `*.json` files under `root` (deterministic order).
pub fn discover_json_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    find_json_files(root, 0, DEFAULT_SEARCH_DEPTH, &mut out);
    out.sort_by_key(|p| pretty_path(p));
    out
}

fn find_json_files(root: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }

    let Ok(entries) = fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            if !should_skip_dir(&path) {
                find_json_files(&path, depth + 1, max_depth, out);
            }
        } else if file_type.is_file() && has_json_extension(&path) {
            out.push(path);
        }
    }
}

fn has_json_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules")
}

fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}

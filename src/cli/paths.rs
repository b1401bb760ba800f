//! Startup validation of paths and numeric flags.
//!
//! Problems are reported before any work starts, with exit code 2.

use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Validate the provided path points to an existing `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::new(
            2,
            format!("CSV file not found: {}", path.display()),
        ));
    }
    if path.is_dir() {
        return Err(AppError::new(
            2,
            format!("Expected a file, got a directory: {}", path.display()),
        ));
    }
    if !has_csv_extension(path) {
        return Err(AppError::new(
            2,
            format!("Expected a .csv file (got: {})", path.display()),
        ));
    }

    Ok(path.to_path_buf())
}

/// Validate that `path` can be created: its parent directory must exist.
pub fn validate_output_path(path: &Path) -> Result<PathBuf, AppError> {
    if path.is_dir() {
        return Err(AppError::new(
            2,
            format!("Output path is a directory: {}", path.display()),
        ));
    }
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.is_dir() {
        return Err(AppError::new(
            2,
            format!("Output directory does not exist: {}", parent.display()),
        ));
    }
    Ok(path.to_path_buf())
}

pub fn validate_train_ratio(ratio: f64) -> Result<f64, AppError> {
    if ratio.is_finite() && ratio > 0.0 && ratio < 1.0 {
        Ok(ratio)
    } else {
        Err(AppError::new(
            2,
            format!("--train-ratio must lie strictly between 0 and 1 (got {ratio})"),
        ))
    }
}

pub fn validate_ma_window(window: usize) -> Result<usize, AppError> {
    if window == 0 {
        return Err(AppError::new(2, "--ma-window must be at least 1"));
    }
    Ok(window)
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        == Some(true)
}

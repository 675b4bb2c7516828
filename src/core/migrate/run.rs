//! Migration driver. Applies a rewriter to every walked file.
//!
//! Planning never touches disk beyond reading. Applying writes each planned
//! edit, optionally after copying the original aside. Failures are recorded
//! per file and never abort the run.

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::walk::{relative_path, walk_files, WalkOptions};
use super::Rewriter;
use crate::log_status;
use crate::utils::io;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub walk: WalkOptions,
    /// Write edits to disk (default is dry-run).
    pub write: bool,
    /// Copy originals to `<file><suffix>` before writing.
    pub backup_suffix: Option<String>,
    /// Report every handled file on stderr.
    pub verbose: bool,
}

/// Planned (or applied) content change for one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileEdit {
    /// File path relative to root.
    pub file: String,
    /// Number of replacements in this file.
    pub replacements: usize,
    /// Backup copy written before the edit, relative to root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<String>,
    #[serde(skip)]
    pub path: PathBuf,
    #[serde(skip)]
    pub new_content: String,
}

/// A rewriter warning, located.
#[derive(Debug, Clone, Serialize)]
pub struct FileWarning {
    pub file: String,
    pub line: usize,
    pub matched: String,
    pub message: String,
}

/// A file that could not be read, backed up or written.
#[derive(Debug, Clone, Serialize)]
pub struct FileError {
    pub file: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MigrationResult {
    pub files_scanned: usize,
    pub edits: Vec<FileEdit>,
    pub warnings: Vec<FileWarning>,
    pub errors: Vec<FileError>,
    pub total_replacements: usize,
    /// Whether changes were written to disk.
    pub applied: bool,
}

/// Rewrite every matching file in memory and collect the edits.
pub fn plan_migration(rewriter: &dyn Rewriter, root: &Path, options: &RunOptions) -> MigrationResult {
    let files = walk_files(root, &options.walk);
    let mut result = MigrationResult {
        files_scanned: files.len(),
        edits: Vec::new(),
        warnings: Vec::new(),
        errors: Vec::new(),
        total_replacements: 0,
        applied: false,
    };

    for path in files {
        let relative = relative_path(root, &path);
        if options.verbose {
            eprintln!("[migrate] Handling file: {}", relative);
        }

        let content = match io::read_file(&path, &format!("read {}", path.display())) {
            Ok(content) => content,
            Err(err) => {
                log_status!("migrate", "Skipping {}: {}", relative, describe(&err));
                result.errors.push(FileError {
                    file: relative,
                    error: describe(&err),
                });
                continue;
            }
        };

        let rewrite = rewriter.rewrite(&content);

        result
            .warnings
            .extend(rewrite.warnings.iter().map(|w| FileWarning {
                file: relative.clone(),
                line: w.line,
                matched: w.matched.clone(),
                message: w.message.clone(),
            }));

        if rewrite.is_changed() {
            if options.verbose {
                eprintln!(
                    "[migrate]   {} substitution(s) found",
                    rewrite.replacements
                );
            }
            result.total_replacements += rewrite.replacements;
            result.edits.push(FileEdit {
                file: relative,
                replacements: rewrite.replacements,
                backup: None,
                path,
                new_content: rewrite.content,
            });
        }
    }

    result
}

/// Write planned edits. Files that fail move from `edits` to `errors`.
pub fn apply_migration(result: &mut MigrationResult, root: &Path, backup_suffix: Option<&str>) {
    let mut applied = Vec::with_capacity(result.edits.len());

    for mut edit in std::mem::take(&mut result.edits) {
        if let Some(suffix) = backup_suffix {
            match io::backup_file(&edit.path, suffix) {
                Ok(copy) => edit.backup = Some(relative_path(root, &copy)),
                Err(err) => {
                    record_failure(result, edit, &err);
                    continue;
                }
            }
        }

        let operation = format!("write {}", edit.path.display());
        if let Err(err) = io::write_file(&edit.path, &edit.new_content, &operation) {
            record_failure(result, edit, &err);
            continue;
        }

        log_status!("migrate", "Rewrote {} ({} replacements)", edit.file, edit.replacements);
        applied.push(edit);
    }

    result.edits = applied;
    result.applied = true;
}

/// Plan, then apply when `options.write` is set.
pub fn run_migration(rewriter: &dyn Rewriter, root: &Path, options: &RunOptions) -> MigrationResult {
    let mut result = plan_migration(rewriter, root, options);
    if options.write {
        apply_migration(&mut result, root, options.backup_suffix.as_deref());
    }
    result
}

fn record_failure(result: &mut MigrationResult, edit: FileEdit, err: &crate::Error) {
    log_status!("migrate", "Failed to rewrite {}: {}", edit.file, describe(err));
    result.total_replacements -= edit.replacements;
    result.errors.push(FileError {
        file: edit.file,
        error: describe(err),
    });
}

/// Error message with its underlying cause, when the details carry one.
fn describe(err: &crate::Error) -> String {
    match err.details.get("error").and_then(|e| e.as_str()) {
        Some(cause) => format!("{}: {}", err.message, cause),
        None => err.message.clone(),
    }
}

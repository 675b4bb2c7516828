use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use srcmigrate::config::{self, MigrateConfig};
use srcmigrate::migrate::{FileWarning, MigrationResult, RunOptions, WalkOptions};
use srcmigrate::BatchResult;

pub type CmdResult<T> = srcmigrate::Result<(T, i32)>;

/// Arguments shared by every migration: what to walk and whether to write.
#[derive(Args, Debug)]
pub struct WalkArgs {
    /// File or directory to migrate
    #[arg(default_value = ".")]
    pub path: String,

    /// Comma-separated file extensions to process (default: cpp,C,hpp,h)
    #[arg(long, value_delimiter = ',')]
    pub extensions: Option<Vec<String>>,

    /// Skip root-relative paths matching this glob (repeatable)
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Apply changes to disk (default is dry-run)
    #[arg(long)]
    pub write: bool,

    /// Copy originals to <file><SUFFIX> before writing (default suffix: .orig)
    #[arg(
        long,
        value_name = "SUFFIX",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = ".orig"
    )]
    pub backup: Option<String>,

    /// Configuration file (default: <path>/srcmigrate.json)
    #[arg(long, value_name = "FILE")]
    pub config: Option<String>,

    /// Print every file as it is handled
    #[arg(short, long)]
    pub verbose: bool,
}

/// Everything a migration command needs once flags and config are merged.
pub struct ResolvedWalk {
    pub root: PathBuf,
    pub config: MigrateConfig,
    pub options: RunOptions,
}

impl WalkArgs {
    /// Merge flags over the project config; flags win.
    pub fn resolve(&self) -> srcmigrate::Result<ResolvedWalk> {
        let root = config::expand_path(&self.path);
        if !root.exists() {
            return Err(srcmigrate::Error::validation_invalid_argument(
                "path",
                format!("Path '{}' does not exist", root.display()),
                None,
                None,
            ));
        }

        let explicit = self.config.as_deref().map(config::expand_path);
        let config = config::load_config(&root, explicit.as_deref())?;

        let extensions = match &self.extensions {
            Some(list) => {
                let list: Vec<String> = list
                    .iter()
                    .map(|ext| ext.trim().trim_start_matches('.').to_string())
                    .filter(|ext| !ext.is_empty())
                    .collect();
                if list.is_empty() {
                    return Err(srcmigrate::Error::validation_invalid_argument(
                        "extensions",
                        "At least one extension is required",
                        None,
                        None,
                    ));
                }
                list
            }
            None => config.extensions.clone(),
        };

        if matches!(self.backup.as_deref(), Some("")) {
            return Err(srcmigrate::Error::validation_invalid_argument(
                "backup",
                "Backup suffix cannot be empty",
                None,
                None,
            ));
        }

        let mut exclude = config.exclude.clone();
        exclude.extend(self.exclude.iter().cloned());

        let options = RunOptions {
            walk: WalkOptions {
                extensions,
                exclude,
            },
            write: self.write,
            backup_suffix: self.backup.clone().or_else(|| config.backup_suffix.clone()),
            verbose: self.verbose,
        };

        Ok(ResolvedWalk {
            root,
            config,
            options,
        })
    }
}

/// Per-run summary shared by every migration command's output.
#[derive(Serialize)]
pub struct MigrationSummary {
    pub files_scanned: usize,
    pub files_affected: usize,
    pub total_replacements: usize,
    pub applied: bool,
    pub files: BatchResult,
    pub warnings: Vec<FileWarning>,
}

impl MigrationSummary {
    pub fn from_result(result: MigrationResult) -> Self {
        let mut files = BatchResult::new();
        for edit in &result.edits {
            files.record_rewritten(edit.file.clone(), edit.replacements);
        }
        for error in &result.errors {
            files.record_error(error.file.clone(), error.error.clone());
        }

        Self {
            files_scanned: result.files_scanned,
            files_affected: result.edits.len(),
            total_replacements: result.total_replacements,
            applied: result.applied,
            files,
            warnings: result.warnings,
        }
    }

    /// Runs with per-file failures exit non-zero.
    pub fn exit_code(&self) -> i32 {
        if self.files.errors > 0 {
            1
        } else {
            0
        }
    }
}

pub mod enums;
pub mod includes;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args))
    };
}

pub(crate) fn run_json(command: crate::Commands) -> (srcmigrate::Result<serde_json::Value>, i32) {
    crate::tty::status("srcmigrate is working...");

    match command {
        crate::Commands::Enums(args) => dispatch!(args, enums),
        crate::Commands::Includes(args) => dispatch!(args, includes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn walk_args(root: &Path) -> WalkArgs {
        WalkArgs {
            path: root.to_string_lossy().to_string(),
            extensions: None,
            exclude: Vec::new(),
            write: false,
            backup: None,
            config: None,
            verbose: false,
        }
    }

    fn write_config(root: &Path) {
        std::fs::write(
            root.join(config::CONFIG_FILE),
            r#"{"extensions": ["cc"], "exclude": ["vendor/**"], "backupSuffix": ".bak"}"#,
        )
        .unwrap();
    }

    #[test]
    fn defaults_apply_without_config_or_flags() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = walk_args(dir.path()).resolve().unwrap();

        assert_eq!(resolved.options.walk.extensions, vec!["cpp", "C", "hpp", "h"]);
        assert!(resolved.options.walk.exclude.is_empty());
        assert_eq!(resolved.options.backup_suffix, None);
        assert!(!resolved.options.write);
    }

    #[test]
    fn config_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path());
        let resolved = walk_args(dir.path()).resolve().unwrap();

        assert_eq!(resolved.options.walk.extensions, vec!["cc"]);
        assert_eq!(resolved.options.walk.exclude, vec!["vendor/**"]);
        assert_eq!(resolved.options.backup_suffix.as_deref(), Some(".bak"));
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path());
        let mut args = walk_args(dir.path());
        args.extensions = Some(vec![".cpp".to_string(), " h".to_string()]);
        args.exclude = vec!["build/**".to_string()];
        args.backup = Some(".orig".to_string());
        args.write = true;

        let resolved = args.resolve().unwrap();
        assert_eq!(resolved.options.walk.extensions, vec!["cpp", "h"]);
        assert_eq!(resolved.options.walk.exclude, vec!["vendor/**", "build/**"]);
        assert_eq!(resolved.options.backup_suffix.as_deref(), Some(".orig"));
        assert!(resolved.options.write);
    }

    #[test]
    fn explicit_config_flag_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let other = dir.path().join("other.json");
        std::fs::write(&other, r#"{"requireQualifier": true, "extensions": ["hh"]}"#).unwrap();
        let mut args = walk_args(dir.path());
        args.config = Some(other.to_string_lossy().to_string());

        let resolved = args.resolve().unwrap();
        assert!(resolved.config.require_qualifier);
        assert_eq!(resolved.options.walk.extensions, vec!["hh"]);
    }

    #[test]
    fn empty_extension_list_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = walk_args(dir.path());
        args.extensions = Some(vec![".".to_string(), String::new()]);

        let err = args.resolve().err().unwrap();
        assert_eq!(err.code.as_str(), "validation.invalid_argument");
        assert_eq!(err.details["field"], "extensions");
    }

    #[test]
    fn empty_backup_suffix_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = walk_args(dir.path());
        args.backup = Some(String::new());

        let err = args.resolve().err().unwrap();
        assert_eq!(err.details["field"], "backup");
    }

    #[test]
    fn missing_path_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = walk_args(&dir.path().join("nope")).resolve().err().unwrap();
        assert_eq!(err.code.as_str(), "validation.invalid_argument");
        assert_eq!(err.details["field"], "path");
    }

    #[test]
    fn backup_flag_defaults_to_orig_suffix() {
        use clap::Parser;

        #[derive(Parser)]
        struct Harness {
            #[command(flatten)]
            walk: WalkArgs,
        }

        let harness = Harness::try_parse_from(["srcmigrate", "src", "--backup"]).unwrap();
        assert_eq!(harness.walk.backup.as_deref(), Some(".orig"));
        let harness = Harness::try_parse_from(["srcmigrate", "--backup=.b", "src"]).unwrap();
        assert_eq!(harness.walk.backup.as_deref(), Some(".b"));
        assert_eq!(harness.walk.path, "src");
    }
}

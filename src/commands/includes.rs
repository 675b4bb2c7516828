use clap::{Args, Subcommand};
use serde::Serialize;

use srcmigrate::config::expand_path;
use srcmigrate::migrate::{self, IncludeRewriter, IncludeRules};

use crate::commands::{CmdResult, MigrationSummary, WalkArgs};

#[derive(Args)]
pub struct IncludesArgs {
    #[command(subcommand)]
    command: IncludesCommand,
}

#[derive(Subcommand)]
enum IncludesCommand {
    /// Add a file extension to #include directives
    AddExtension {
        /// File of `old,new` include renames, merged over the configured ones
        #[arg(long, value_name = "FILE")]
        map: Option<String>,
        /// Also add the extension to any unmapped include under this prefix (repeatable)
        #[arg(long = "prefix", value_name = "PREFIX")]
        prefixes: Vec<String>,
        /// Extension to add, without the dot (default: h)
        #[arg(long)]
        extension: Option<String>,
        #[command(flatten)]
        walk: WalkArgs,
    },
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum IncludesOutput {
    #[serde(rename = "includes.add_extension")]
    AddExtension {
        root: String,
        dry_run: bool,
        extension: String,
        prefixes: Vec<String>,
        renames: usize,
        migration: MigrationSummary,
    },
}

pub fn run(args: IncludesArgs) -> CmdResult<IncludesOutput> {
    match args.command {
        IncludesCommand::AddExtension {
            map,
            prefixes,
            extension,
            walk,
        } => run_add_extension(map.as_deref(), prefixes, extension, &walk),
    }
}

fn run_add_extension(
    map: Option<&str>,
    prefixes: Vec<String>,
    extension: Option<String>,
    walk: &WalkArgs,
) -> CmdResult<IncludesOutput> {
    let resolved = walk.resolve()?;

    let mut rules = IncludeRules::from_config(&resolved.config.includes);
    if let Some(path) = map {
        rules = rules.with_renames(migrate::load_include_map(&expand_path(path))?);
    }
    if !prefixes.is_empty() {
        rules.prefixes = prefixes;
    }
    if let Some(ext) = extension {
        let ext = ext.trim_start_matches('.').to_string();
        if ext.is_empty() {
            return Err(srcmigrate::Error::validation_invalid_argument(
                "extension",
                "Extension cannot be empty",
                None,
                None,
            ));
        }
        rules.extension = ext;
    }

    let rewriter = IncludeRewriter::new(rules)?;
    let result = migrate::run_migration(&rewriter, &resolved.root, &resolved.options);
    let migration = MigrationSummary::from_result(result);
    let exit_code = migration.exit_code();

    Ok((
        IncludesOutput::AddExtension {
            root: resolved.root.display().to_string(),
            dry_run: !resolved.options.write,
            extension: rewriter.rules().extension.clone(),
            prefixes: rewriter.rules().prefixes.clone(),
            renames: rewriter.rules().renames.len(),
            migration,
        },
        exit_code,
    ))
}

use clap::{Args, Subcommand};
use serde::Serialize;
use std::collections::BTreeMap;

use srcmigrate::config::expand_path;
use srcmigrate::log_status;
use srcmigrate::migrate::{self, EnumRenameOptions, EnumRenamer};

use crate::commands::{CmdResult, MigrationSummary, WalkArgs};

#[derive(Args)]
pub struct EnumsArgs {
    #[command(subcommand)]
    command: EnumsCommand,
}

#[derive(Subcommand)]
enum EnumsCommand {
    /// Rename enum identifiers across a codebase
    Rename {
        /// Enum definition file
        #[arg(short, long, value_name = "FILE")]
        definitions: String,
        /// Only rewrite scope-qualified references; leave bare identifiers alone
        #[arg(long)]
        require_qualifier: bool,
        #[command(flatten)]
        walk: WalkArgs,
    },
    /// Show the substitution maps built from a definition file
    Show {
        /// Enum definition file
        #[arg(short, long, value_name = "FILE")]
        definitions: String,
    },
}

#[derive(Serialize)]
#[serde(tag = "command")]
pub enum EnumsOutput {
    #[serde(rename = "enums.rename")]
    Rename {
        definitions: String,
        root: String,
        dry_run: bool,
        identifiers: usize,
        migration: MigrationSummary,
    },
    #[serde(rename = "enums.show")]
    Show {
        definitions: String,
        types: BTreeMap<String, String>,
        values: BTreeMap<String, String>,
    },
}

pub fn run(args: EnumsArgs) -> CmdResult<EnumsOutput> {
    match args.command {
        EnumsCommand::Rename {
            definitions,
            require_qualifier,
            walk,
        } => run_rename(&definitions, require_qualifier, &walk),
        EnumsCommand::Show { definitions } => run_show(&definitions),
    }
}

fn run_rename(
    definitions_path: &str,
    require_qualifier: bool,
    walk: &WalkArgs,
) -> CmdResult<EnumsOutput> {
    let resolved = walk.resolve()?;
    let definitions = migrate::load_definitions(&expand_path(definitions_path))?;

    let renamer = EnumRenamer::new(
        &definitions,
        EnumRenameOptions {
            require_qualifier: require_qualifier || resolved.config.require_qualifier,
        },
    )?;
    log_status!(
        "enums",
        "Matching {} identifiers under {}",
        renamer.identifier_count(),
        resolved.root.display()
    );

    let result = migrate::run_migration(&renamer, &resolved.root, &resolved.options);
    let migration = MigrationSummary::from_result(result);
    let exit_code = migration.exit_code();

    Ok((
        EnumsOutput::Rename {
            definitions: definitions_path.to_string(),
            root: resolved.root.display().to_string(),
            dry_run: !resolved.options.write,
            identifiers: renamer.identifier_count(),
            migration,
        },
        exit_code,
    ))
}

fn run_show(definitions_path: &str) -> CmdResult<EnumsOutput> {
    let definitions = migrate::load_definitions(&expand_path(definitions_path))?;

    Ok((
        EnumsOutput::Show {
            definitions: definitions_path.to_string(),
            types: definitions.types,
            values: definitions.values,
        },
        0,
    ))
}

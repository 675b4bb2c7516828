//! Source migrations: regex-driven rewrites applied file by file.
//!
//! Two rewriters share one driver:
//! - `enums` renames enum types and values from a definition file, resolving
//!   scope-qualified references (`Wt::AlignLeft`, `WDialog::Accepted`).
//! - `includes` adds a file extension to `#include` directives.
//!
//! The driver walks a tree, runs a rewriter over every matching file, and
//! either reports the planned edits (dry-run) or writes them.

mod definitions;
mod enums;
mod includes;
mod run;
mod walk;

use serde::Serialize;

pub use definitions::{load_definitions, parse_definitions, EnumDefinitions};
pub use enums::{EnumRenameOptions, EnumRenamer};
pub use includes::{
    builtin_include_renames, load_include_map, parse_include_map, IncludeRewriter, IncludeRules,
};
pub use run::{
    apply_migration, plan_migration, run_migration, FileEdit, FileError, FileWarning,
    MigrationResult, RunOptions,
};
pub use walk::{relative_path, walk_files, WalkOptions};

/// Something a rewriter noticed but did not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewriteWarning {
    /// Line number (1-indexed).
    pub line: usize,
    /// The text that was left untouched.
    pub matched: String,
    pub message: String,
}

/// Outcome of rewriting one file's content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rewrite {
    pub content: String,
    /// Substitutions that actually changed text.
    pub replacements: usize,
    pub warnings: Vec<RewriteWarning>,
}

impl Rewrite {
    pub fn is_changed(&self) -> bool {
        self.replacements > 0
    }
}

/// A stateless content transform applied to each file.
pub trait Rewriter {
    fn rewrite(&self, content: &str) -> Rewrite;
}

/// Lines of `content` with their terminators kept, numbered from 1.
pub(crate) fn numbered_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .split_inclusive('\n')
        .enumerate()
        .map(|(idx, line)| (idx + 1, line))
}

/// Preprocessor lines (`#include`, `#define`, ...) start with `#`.
pub(crate) fn is_directive_line(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_lines_keeps_terminators() {
        let lines: Vec<(usize, &str)> = numbered_lines("a\r\nb\nc").collect();
        assert_eq!(lines, vec![(1, "a\r\n"), (2, "b\n"), (3, "c")]);
    }

    #[test]
    fn numbered_lines_rejoins_to_original() {
        let content = "one\n\ntwo\n";
        let joined: String = numbered_lines(content).map(|(_, l)| l).collect();
        assert_eq!(joined, content);
    }

    #[test]
    fn directive_lines_allow_leading_whitespace() {
        assert!(is_directive_line("#include <Wt/WApplication>\n"));
        assert!(is_directive_line("  #  define FOO 1"));
        assert!(!is_directive_line("int x; // #not a directive"));
    }
}

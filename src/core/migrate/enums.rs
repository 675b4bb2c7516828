//! Enum rename engine: one composite regex over every known identifier.
//!
//! A match is a (possibly `::`-qualified) reference ending in a known
//! identifier. The written qualifiers decide which definition it refers to:
//! they must be a suffix of the definition's old scope. The replacement keeps
//! the author's qualification depth, so `AlignLeft` becomes
//! `AlignmentFlag::Left` while `Wt::AlignLeft` becomes `Wt::AlignmentFlag::Left`.

use fancy_regex::{Captures, Regex};
use std::collections::HashMap;

use super::definitions::EnumDefinitions;
use super::{is_directive_line, numbered_lines, Rewrite, RewriteWarning, Rewriter};
use crate::error::{Error, Result};

/// Trailing components a replacement must always keep.
const TYPE_TAIL: usize = 1;
const VALUE_TAIL: usize = 2;

#[derive(Debug, Clone, Default)]
pub struct EnumRenameOptions {
    /// Leave bare identifiers alone; only qualified references are rewritten.
    pub require_qualifier: bool,
}

/// One old name indexed under its final identifier.
#[derive(Debug, Clone)]
struct Entry {
    /// Old scope, without the identifier.
    scope: Vec<String>,
    /// New fully qualified name, identifier included.
    target: Vec<String>,
    tail: usize,
}

impl Entry {
    fn new(old: &str, new: &str, tail: usize) -> Option<(String, Self)> {
        let mut scope: Vec<String> = old.split("::").map(str::to_string).collect();
        let name = scope.pop()?;
        let target: Vec<String> = new.split("::").map(str::to_string).collect();
        let tail = tail.min(target.len());
        Some((name, Entry { scope, target, tail }))
    }

    fn accepts(&self, qualifiers: &[&str], global: bool) -> bool {
        if global && qualifiers.len() != self.scope.len() {
            return false;
        }
        if qualifiers.len() > self.scope.len() {
            return false;
        }
        let offset = self.scope.len() - qualifiers.len();
        self.scope[offset..]
            .iter()
            .zip(qualifiers)
            .all(|(have, written)| have == written)
    }

    /// Replacement text for a reference that wrote `written` of the scope's components.
    fn replacement(&self, written: usize, global: bool) -> String {
        let len = self.target.len();
        let keep = if global {
            len
        } else {
            let omitted = self.scope.len() - written;
            len.saturating_sub(omitted).clamp(self.tail, len)
        };
        let joined = self.target[len - keep..].join("::");
        if global {
            format!("::{}", joined)
        } else {
            joined
        }
    }
}

enum Resolution {
    Unresolved,
    Replace(String),
    Ambiguous(Vec<String>),
}

pub struct EnumRenamer {
    pattern: Option<Regex>,
    index: HashMap<String, Vec<Entry>>,
    options: EnumRenameOptions,
}

impl EnumRenamer {
    /// Build the composite pattern for every type and value in `definitions`.
    pub fn new(definitions: &EnumDefinitions, options: EnumRenameOptions) -> Result<Self> {
        let mut index: HashMap<String, Vec<Entry>> = HashMap::new();

        let entries = definitions
            .types
            .iter()
            .filter_map(|(old, new)| Entry::new(old, new, TYPE_TAIL))
            .chain(
                definitions
                    .values
                    .iter()
                    .filter_map(|(old, new)| Entry::new(old, new, VALUE_TAIL)),
            );
        for (name, entry) in entries {
            index.entry(name).or_default().push(entry);
        }

        let pattern = if index.is_empty() {
            None
        } else {
            Some(build_pattern(index.keys())?)
        };

        Ok(Self {
            pattern,
            index,
            options,
        })
    }

    /// Number of distinct identifiers the pattern matches.
    pub fn identifier_count(&self) -> usize {
        self.index.len()
    }

    fn resolve(&self, global: bool, qualifiers: &[&str], name: &str) -> Resolution {
        if self.options.require_qualifier && !global && qualifiers.is_empty() {
            return Resolution::Unresolved;
        }
        let Some(entries) = self.index.get(name) else {
            return Resolution::Unresolved;
        };

        let mut candidates: Vec<String> = entries
            .iter()
            .filter(|e| e.accepts(qualifiers, global))
            .map(|e| e.replacement(qualifiers.len(), global))
            .collect();
        candidates.sort();
        candidates.dedup();

        match candidates.len() {
            0 => Resolution::Unresolved,
            1 => Resolution::Replace(candidates.remove(0)),
            _ => Resolution::Ambiguous(candidates),
        }
    }

    fn rewrite_line(
        &self,
        pattern: &Regex,
        line: &str,
        line_no: usize,
        warnings: &mut Vec<RewriteWarning>,
    ) -> (String, usize) {
        let mut out = String::with_capacity(line.len());
        let mut last = 0;
        let mut replacements = 0;

        for caps in pattern.captures_iter(line) {
            let caps = match caps {
                Ok(caps) => caps,
                Err(e) => {
                    warnings.push(RewriteWarning {
                        line: line_no,
                        matched: line.trim_end().to_string(),
                        message: format!("Line left unchanged: {}", e),
                    });
                    return (line.to_string(), 0);
                }
            };
            let Some(whole) = caps.get(0) else {
                continue;
            };

            let (global, qualifiers, name) = split_reference(&caps);
            match self.resolve(global, &qualifiers, name) {
                Resolution::Replace(text) if text != whole.as_str() => {
                    out.push_str(&line[last..whole.start()]);
                    out.push_str(&text);
                    last = whole.end();
                    replacements += 1;
                }
                Resolution::Ambiguous(candidates) => warnings.push(RewriteWarning {
                    line: line_no,
                    matched: whole.as_str().to_string(),
                    message: format!("Ambiguous reference, could be {}", candidates.join(" or ")),
                }),
                _ => {}
            }
        }

        out.push_str(&line[last..]);
        (out, replacements)
    }
}

impl Rewriter for EnumRenamer {
    fn rewrite(&self, content: &str) -> Rewrite {
        let Some(pattern) = &self.pattern else {
            return Rewrite {
                content: content.to_string(),
                ..Rewrite::default()
            };
        };

        let mut result = Rewrite {
            content: String::with_capacity(content.len()),
            ..Rewrite::default()
        };

        for (line_no, line) in numbered_lines(content) {
            if is_directive_line(line) {
                result.content.push_str(line);
                continue;
            }
            let (new_line, count) = self.rewrite_line(pattern, line, line_no, &mut result.warnings);
            result.content.push_str(&new_line);
            result.replacements += count;
        }

        result
    }
}

/// `(?<!\w)(?<!::)(::)?((?:\w+::)*)(Names)\b(?!::)`, names longest first.
fn build_pattern<'a>(names: impl Iterator<Item = &'a String>) -> Result<Regex> {
    let mut names: Vec<&String> = names.collect();
    names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let alternation = names
        .iter()
        .map(|n| regex::escape(n))
        .collect::<Vec<_>>()
        .join("|");
    let source = format!(r"(?<!\w)(?<!::)(::)?((?:\w+::)*)({})\b(?!::)", alternation);

    Regex::new(&source).map_err(|e| Error::pattern_invalid(&source, e.to_string()))
}

fn split_reference<'t>(caps: &Captures<'t>) -> (bool, Vec<&'t str>, &'t str) {
    let global = caps.get(1).is_some();
    let qualifiers = caps
        .get(2)
        .map(|m| m.as_str())
        .unwrap_or_default()
        .split("::")
        .filter(|part| !part.is_empty())
        .collect();
    let name = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
    (global, qualifiers, name)
}

//! Enum definition files.
//!
//! ```text
//! # Old unscoped enum, values renamed into the new scoped enum
//! Wt::AlignmentFlag
//!     AlignLeft -> Left
//!     AlignRight -> Right
//!
//! # Enum moved out of its class
//! Wt::WDialog::DialogCode -> Wt::DialogCode
//!     Rejected
//!     Accepted
//! ```
//!
//! Headers start at column zero; values are indented and belong to the most
//! recent header. The old enum's values are reachable from the scope that
//! encloses the type as well as through the type itself, so each value yields
//! two keys in the values map.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::utils::io;

const ARROW: &str = "->";

/// The two enum substitution maps, keyed by fully qualified old name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnumDefinitions {
    /// Renamed enum types: old qualified type → new qualified type.
    pub types: BTreeMap<String, String>,
    /// Enum values: old qualified value → new qualified value.
    pub values: BTreeMap<String, String>,
}

impl EnumDefinitions {
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.values.is_empty()
    }
}

struct EnumHeader {
    old: Vec<String>,
    new: Vec<String>,
}

/// Read and parse a definition file.
pub fn load_definitions(path: &Path) -> Result<EnumDefinitions> {
    let text = io::read_file(path, &format!("read {}", path.display()))?;
    parse_definitions(&text).map_err(|e| e.with_definitions_path(path.display().to_string()))
}

/// Parse definition text into the types and values maps.
pub fn parse_definitions(text: &str) -> Result<EnumDefinitions> {
    let mut definitions = EnumDefinitions::default();
    let mut current: Option<EnumHeader> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (old, new) = split_arrow(trimmed, line)?;

        if !raw.starts_with(|c: char| c == ' ' || c == '\t') {
            let old = parse_qualified(old, line)?;
            let new = match new {
                Some(n) => parse_qualified(n, line)?,
                None => old.clone(),
            };
            if old != new {
                insert_mapping(&mut definitions.types, old.join("::"), new.join("::"), line)?;
            }
            current = Some(EnumHeader { old, new });
            continue;
        }

        let header = current.as_ref().ok_or_else(|| {
            Error::definitions_invalid(None, line, "Enum value appears before any enum header")
                .with_hint("Start each block with an unindented line naming the enum type")
        })?;

        let old_name = parse_identifier(old, line)?;
        let new_name = match new {
            Some(n) => parse_identifier(n, line)?,
            None => old_name.clone(),
        };

        let target = qualify(&header.new, &new_name);
        let enclosing = &header.old[..header.old.len() - 1];

        insert_mapping(
            &mut definitions.values,
            qualify(enclosing, &old_name),
            target.clone(),
            line,
        )?;
        insert_mapping(
            &mut definitions.values,
            qualify(&header.old, &old_name),
            target,
            line,
        )?;
    }

    Ok(definitions)
}

/// Split `old -> new` into its halves; `new` is `None` when there is no arrow.
fn split_arrow(text: &str, line: usize) -> Result<(&str, Option<&str>)> {
    let mut parts = text.split(ARROW);
    let old = parts.next().unwrap_or_default().trim();
    let new = parts.next().map(str::trim);

    if parts.next().is_some() {
        return Err(Error::definitions_invalid(
            None,
            line,
            format!("More than one '{}' in '{}'", ARROW, text),
        ));
    }
    if matches!(new, Some("")) {
        return Err(Error::definitions_invalid(
            None,
            line,
            format!("Missing new name after '{}'", ARROW),
        ));
    }

    Ok((old, new))
}

fn parse_qualified(text: &str, line: usize) -> Result<Vec<String>> {
    text.split("::")
        .map(|part| parse_identifier(part, line))
        .collect()
}

fn parse_identifier(text: &str, line: usize) -> Result<String> {
    let mut chars = text.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(text.to_string())
    } else {
        Err(Error::definitions_invalid(
            None,
            line,
            format!("'{}' is not a valid identifier", text),
        ))
    }
}

fn qualify(scope: &[String], name: &str) -> String {
    scope
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(name))
        .collect::<Vec<_>>()
        .join("::")
}

fn insert_mapping(
    map: &mut BTreeMap<String, String>,
    key: String,
    value: String,
    line: usize,
) -> Result<()> {
    if let Some(existing) = map.get(&key) {
        if *existing != value {
            return Err(Error::definitions_invalid(
                None,
                line,
                format!(
                    "'{}' already maps to '{}', cannot also map to '{}'",
                    key, existing, value
                ),
            ));
        }
        return Ok(());
    }
    map.insert(key, value);
    Ok(())
}

//! Add a file extension to `#include` directives.
//!
//! `#include <Wt/WWidget>` becomes `#include <Wt/WWidget.h>`. The rename table
//! is closed by default: headers Wt 4 dropped (`Wt/Ext/*`, `Wt/WConfig`) are
//! not in it and stay as written. The prefix rule is opt-in and only applies
//! to paths the table does not name.

use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;

use super::{numbered_lines, Rewrite, Rewriter};
use crate::config::IncludesConfig;
use crate::error::{Error, Result};
use crate::utils::io;

/// Wt 3 → Wt 4 header table, `old,new` per line.
const WT4_INCLUDE_MAP: &str = include_str!("wt4_includes.map");

/// Delimiters must pair: `<...>` or `"..."`.
const INCLUDE_PATTERN: &str = r#"^(\s*#\s*include\s*)(?:<([^<>"\r\n]+)>|"([^<>"\r\n]+)")"#;

#[derive(Debug, Clone, Default)]
pub struct IncludeRules {
    /// Exact include path → new include path.
    pub renames: BTreeMap<String, String>,
    /// Include paths under these prefixes receive `extension`.
    pub prefixes: Vec<String>,
    /// Extension without the dot.
    pub extension: String,
}

impl IncludeRules {
    pub fn from_config(config: &IncludesConfig) -> Self {
        Self {
            renames: config.renames.clone(),
            prefixes: config.prefixes.clone(),
            extension: config.extension.clone(),
        }
    }

    /// Merge extra renames; entries in `extra` win.
    pub fn with_renames(mut self, extra: BTreeMap<String, String>) -> Self {
        self.renames.extend(extra);
        self
    }

    /// New include path for `path`, or `None` when it stays as-is.
    pub fn target_for(&self, path: &str) -> Option<String> {
        if let Some(renamed) = self.renames.get(path) {
            return (renamed != path).then(|| renamed.clone());
        }

        if !self.prefixes.iter().any(|p| path.starts_with(p.as_str())) {
            return None;
        }
        let file_name = path.rsplit('/').next().unwrap_or(path);
        if file_name.is_empty() || file_name.contains('.') {
            return None;
        }
        Some(format!("{}.{}", path, self.extension))
    }
}

/// Parse `old,new` lines into a rename map.
pub fn parse_include_map(text: &str) -> Result<BTreeMap<String, String>> {
    let mut renames = BTreeMap::new();

    for (idx, raw) in text.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut parts = trimmed.split(',');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(from), Some(to), None) if !from.trim().is_empty() && !to.trim().is_empty() => {
                renames.insert(from.trim().to_string(), to.trim().to_string());
            }
            _ => {
                return Err(Error::definitions_invalid(
                    None,
                    idx + 1,
                    format!("Expected 'old,new', found '{}'", trimmed),
                ))
            }
        }
    }

    Ok(renames)
}

/// The built-in Wt 4 header renames.
pub fn builtin_include_renames() -> BTreeMap<String, String> {
    WT4_INCLUDE_MAP
        .lines()
        .filter_map(|line| line.split_once(','))
        .map(|(from, to)| (from.trim().to_string(), to.trim().to_string()))
        .collect()
}

/// Read and parse an include rename file.
pub fn load_include_map(path: &Path) -> Result<BTreeMap<String, String>> {
    let text = io::read_file(path, &format!("read {}", path.display()))?;
    parse_include_map(&text).map_err(|e| e.with_definitions_path(path.display().to_string()))
}

pub struct IncludeRewriter {
    rules: IncludeRules,
    pattern: Regex,
}

impl IncludeRewriter {
    pub fn new(rules: IncludeRules) -> Result<Self> {
        let pattern = Regex::new(INCLUDE_PATTERN)
            .map_err(|e| Error::pattern_invalid(INCLUDE_PATTERN, e.to_string()))?;
        Ok(Self { rules, pattern })
    }

    pub fn rules(&self) -> &IncludeRules {
        &self.rules
    }

    fn rewrite_line(&self, line: &str) -> Option<String> {
        let caps = self.pattern.captures(line)?;
        let path = caps.get(2).or_else(|| caps.get(3))?;
        let target = self.rules.target_for(path.as_str())?;

        let mut out = String::with_capacity(line.len() + target.len() - path.len());
        out.push_str(&line[..path.start()]);
        out.push_str(&target);
        out.push_str(&line[path.end()..]);
        Some(out)
    }
}

impl Rewriter for IncludeRewriter {
    fn rewrite(&self, content: &str) -> Rewrite {
        let mut result = Rewrite {
            content: String::with_capacity(content.len()),
            ..Rewrite::default()
        };

        for (_, line) in numbered_lines(content) {
            match self.rewrite_line(line) {
                Some(new_line) => {
                    result.content.push_str(&new_line);
                    result.replacements += 1;
                }
                None => result.content.push_str(line),
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewriter() -> IncludeRewriter {
        IncludeRewriter::new(IncludeRules::from_config(&IncludesConfig::default())).unwrap()
    }

    #[test]
    fn angle_and_quote_includes_get_extension() {
        let result = rewriter().rewrite("#include <Wt/WApplication>\n#include \"Wt/WText\"\n");
        assert_eq!(
            result.content,
            "#include <Wt/WApplication.h>\n#include \"Wt/WText.h\"\n"
        );
        assert_eq!(result.replacements, 2);
    }

    #[test]
    fn explicit_rename_wins() {
        let result = rewriter().rewrite("#include <Wt/WBoostAny>\n#include <WQApplication>\n");
        assert_eq!(
            result.content,
            "#include <Wt/WAny.h>\n#include <WQApplication.h>\n"
        );
    }

    #[test]
    fn other_headers_are_untouched() {
        let text = "#include <vector>\n#include \"widget.h\"\n#include <Wt/WWidget.h>\n#include <boost/any>\n";
        let result = rewriter().rewrite(text);
        assert_eq!(result.content, text);
        assert!(!result.is_changed());
    }

    #[test]
    fn headers_outside_the_table_are_untouched_by_default() {
        let text = "#include <Wt/Ext/Button>\n#include <Wt/WConfig>\n";
        let result = rewriter().rewrite(text);
        assert_eq!(result.content, text);
        assert_eq!(result.replacements, 0);
    }

    #[test]
    fn prefix_rule_is_opt_in() {
        let mut rules = IncludeRules::from_config(&IncludesConfig::default());
        assert!(rules.prefixes.is_empty());
        rules.prefixes.push("Wt/".to_string());

        let result = IncludeRewriter::new(rules)
            .unwrap()
            .rewrite("#include <Wt/WConfig>\n#include <Wt/WBoostAny>\n");
        assert_eq!(result.content, "#include <Wt/WConfig.h>\n#include <Wt/WAny.h>\n");
    }

    #[test]
    fn builtin_table_parses_cleanly() {
        let parsed = parse_include_map(WT4_INCLUDE_MAP).unwrap();
        assert_eq!(parsed, builtin_include_renames());
        assert_eq!(parsed.len(), 315);
        assert_eq!(parsed["Wt/WBoostAny"], "Wt/WAny.h");
        assert_eq!(parsed["WQApplication"], "WQApplication.h");
    }

    #[test]
    fn mismatched_delimiters_are_untouched() {
        let text = "#include <Wt/WText\"\n";
        assert_eq!(rewriter().rewrite(text).content, text);
    }

    #[test]
    fn spacing_and_trailing_text_are_preserved() {
        let result = rewriter().rewrite("  #  include<Wt/WTimer> // timers\r\n");
        assert_eq!(result.content, "  #  include<Wt/WTimer.h> // timers\r\n");
    }

    #[test]
    fn non_include_lines_are_untouched() {
        let text = "// #include <Wt/WText>\nstd::string s = \"Wt/WText\";\n";
        assert_eq!(rewriter().rewrite(text).content, text);
    }

    #[test]
    fn target_for_respects_prefix_and_extension() {
        let rules = IncludeRules {
            renames: BTreeMap::new(),
            prefixes: vec!["Lib/".to_string()],
            extension: "hpp".to_string(),
        };
        assert_eq!(rules.target_for("Lib/Thing").as_deref(), Some("Lib/Thing.hpp"));
        assert_eq!(rules.target_for("Lib/Thing.hpp"), None);
        assert_eq!(rules.target_for("Lib/"), None);
        assert_eq!(rules.target_for("Other/Thing"), None);
    }

    #[test]
    fn identity_rename_is_no_change() {
        let mut renames = BTreeMap::new();
        renames.insert("Wt/WText".to_string(), "Wt/WText".to_string());
        let rules = IncludeRules::from_config(&IncludesConfig::default()).with_renames(renames);
        assert_eq!(rules.target_for("Wt/WText"), None);
    }

    #[test]
    fn parse_include_map_reads_pairs() {
        let map = parse_include_map("# header map\nWt/WBoostAny,Wt/WAny.h\n\n Wt/Utils , Wt/Utils.h \n")
            .unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["Wt/Utils"], "Wt/Utils.h");
    }

    #[test]
    fn parse_include_map_rejects_bad_lines() {
        let err = parse_include_map("a,b\nonly-one-field\n").unwrap_err();
        assert_eq!(err.details["line"], 2);

        assert!(parse_include_map("a,b,c\n").is_err());
        assert!(parse_include_map(",b\n").is_err());
    }
}

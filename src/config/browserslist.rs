//! `.browserslistrc` parsing.
//!
//! The format is line based:
//!
//! ```text
//! # comment
//! > 1%, last 2 versions
//! not dead
//!
//! [production]
//! > 0.5%
//! ```
//!
//! Queries before the first section header belong to the `defaults`
//! section, which is the only one the build uses.
use std::collections::BTreeMap;

/// Section name holding queries outside any `[header]`.
pub const DEFAULT_SECTION: &str = "defaults";

/// Ordered target-environment queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct TargetList(Vec<String>);

impl TargetList {
    /// Queries in file order.
    #[must_use]
    pub const fn queries(&self) -> &[String] {
        self.0.as_slice()
    }

    /// Whether no query was given.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for TargetList {
    fn from(queries: Vec<String>) -> Self {
        Self(queries)
    }
}

/// Parse every section of a browserslist config.
///
/// A header may name several environments (`[production staging]`); each
/// gets the queries that follow. The leading section is implicit, so an
/// explicit `[defaults]` header counts as declaring it a second time.
///
/// # Errors
///
/// Returns a message if a section header is empty or an environment
/// (including `defaults`) is declared twice.
pub fn parse_sections(text: &str) -> Result<BTreeMap<String, Vec<String>>, String> {
    let mut sections: BTreeMap<String, Vec<String>> = BTreeMap::new();
    sections.insert(DEFAULT_SECTION.to_string(), Vec::new());
    let mut current: Vec<String> = vec![DEFAULT_SECTION.to_string()];

    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let names: Vec<String> = header.split_whitespace().map(String::from).collect();
            if names.is_empty() {
                return Err(format!("empty section header on line {}", lineno + 1));
            }
            for name in &names {
                if sections.insert(name.clone(), Vec::new()).is_some() {
                    return Err(format!("duplicate section '{name}' on line {}", lineno + 1));
                }
            }
            current = names;
            continue;
        }

        let queries: Vec<String> = line
            .split(',')
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(String::from)
            .collect();
        for name in &current {
            sections
                .entry(name.clone())
                .or_default()
                .extend(queries.iter().cloned());
        }
    }

    Ok(sections)
}

/// Parse the `defaults` target list.
///
/// # Errors
///
/// See [`parse_sections`].
pub fn parse(text: &str) -> Result<TargetList, String> {
    let mut sections = parse_sections(text)?;
    Ok(TargetList(
        sections.remove(DEFAULT_SECTION).unwrap_or_default(),
    ))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn parses_lines_and_comma_lists() {
        let list = parse("> 1%, last 2 versions\nnot dead\n").unwrap();
        assert_eq!(list.queries(), ["> 1%", "last 2 versions", "not dead"]);
    }

    #[test]
    fn strips_comments_and_blank_lines() {
        let list = parse("# browsers\n\n  ie 11  # legacy\n#only a comment\n").unwrap();
        assert_eq!(list.queries(), ["ie 11"]);
    }

    #[test]
    fn named_sections_do_not_leak_into_defaults() {
        let text = "last 1 version\n[production]\n> 5%\n[development]\nlast 1 chrome version\n";
        let sections = parse_sections(text).unwrap();
        assert_eq!(sections["defaults"], vec!["last 1 version"]);
        assert_eq!(sections["production"], vec!["> 5%"]);
        assert_eq!(sections["development"], vec!["last 1 chrome version"]);
        assert_eq!(parse(text).unwrap().queries(), ["last 1 version"]);
    }

    #[test]
    fn explicit_defaults_header_is_duplicate() {
        let text = "firefox esr\n[production]\n> 5%\n[defaults]\nsafari 12\n";
        let err = parse(text).unwrap_err();
        assert_eq!(err, "duplicate section 'defaults' on line 4");
    }

    #[test]
    fn leading_defaults_header_is_duplicate_too() {
        assert!(parse_sections("[defaults]\n> 1%\n").is_err());
    }

    #[test]
    fn multi_name_header_shares_queries() {
        let sections = parse_sections("[staging production]\n> 1%\n").unwrap();
        assert_eq!(sections["staging"], vec!["> 1%"]);
        assert_eq!(sections["production"], vec!["> 1%"]);
    }

    #[test]
    fn duplicate_section_is_error() {
        let err = parse("[production]\n> 1%\n[production]\nie 11\n").unwrap_err();
        assert!(err.contains("duplicate section 'production'"));
    }

    #[test]
    fn empty_header_is_error() {
        assert!(parse("[ ]\n").is_err());
    }

    #[test]
    fn empty_file_is_empty_list() {
        assert!(parse("").unwrap().is_empty());
    }
}

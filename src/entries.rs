//! Glossary entries and their TSV/CSV wire formats.

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// A set of glossary term pairs, keyed by source term.
///
/// Stored in a sorted map so serialization is deterministic regardless of
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlossaryEntries {
    terms: BTreeMap<String, String>,
}

impl GlossaryEntries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds entries from `(source, target)` pairs. Duplicate source terms
    /// and invalid terms are rejected.
    pub fn from_pairs<S, T>(pairs: impl IntoIterator<Item = (S, T)>) -> Result<Self>
    where
        S: Into<String>,
        T: Into<String>,
    {
        let mut entries = Self::new();
        for (source, target) in pairs {
            let source = source.into();
            if entries.terms.contains_key(&source) {
                return Err(Error::Config(format!(
                    "duplicate source term in glossary entries: {source:?}"
                )));
            }
            entries.insert(source, target.into())?;
        }
        Ok(entries)
    }

    /// Adds one term pair, replacing any existing target for the source term.
    pub fn insert(&mut self, source: impl Into<String>, target: impl Into<String>) -> Result<()> {
        let source = source.into();
        let target = target.into();
        validate_term(&source)?;
        validate_term(&target)?;
        self.terms.insert(source, target);
        Ok(())
    }

    pub fn get(&self, source: &str) -> Option<&str> {
        self.terms.get(source).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.terms.iter().map(|(s, t)| (s.as_str(), t.as_str()))
    }

    /// Serializes to tab-separated values, one term pair per line.
    pub fn to_tsv(&self) -> String {
        let mut tsv = String::new();
        for (source, target) in &self.terms {
            if !tsv.is_empty() {
                tsv.push('\n');
            }
            tsv.push_str(source);
            tsv.push('\t');
            tsv.push_str(target);
        }
        tsv
    }

    /// Parses tab-separated values as produced by [`to_tsv`](Self::to_tsv).
    /// Blank lines are skipped; extra tab-separated columns are an error.
    pub fn from_tsv(tsv: &str) -> Result<Self> {
        let mut entries = Self::new();
        for (index, line) in tsv.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let mut columns = line.split('\t');
            let source = columns.next().unwrap_or_default().trim();
            let target = columns
                .next()
                .ok_or_else(|| {
                    Error::Config(format!("missing tab on TSV line {}", index + 1))
                })?
                .trim();
            if columns.next().is_some() {
                return Err(Error::Config(format!(
                    "expected a single tab on TSV line {}",
                    index + 1
                )));
            }
            if entries.terms.contains_key(source) {
                return Err(Error::Config(format!(
                    "duplicate source term on TSV line {}: {source:?}",
                    index + 1
                )));
            }
            entries.insert(source, target)?;
        }
        Ok(entries)
    }

    /// Parses comma-separated values: the first column is the source term and
    /// the second the target, further columns are ignored. Fields may be
    /// double-quoted, with `""` as an escaped quote.
    pub fn from_csv(csv: &str) -> Result<Self> {
        let mut entries = Self::new();
        for (index, line) in csv.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let fields = split_csv_line(line, index + 1)?;
            if fields.len() < 2 {
                return Err(Error::Config(format!(
                    "expected at least two columns on CSV line {}",
                    index + 1
                )));
            }
            let source = fields[0].trim();
            if entries.terms.contains_key(source) {
                return Err(Error::Config(format!(
                    "duplicate source term on CSV line {}: {source:?}",
                    index + 1
                )));
            }
            entries.insert(source, fields[1].trim())?;
        }
        Ok(entries)
    }
}

impl<'a> IntoIterator for &'a GlossaryEntries {
    type Item = (&'a String, &'a String);
    type IntoIter = std::collections::btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.terms.iter()
    }
}

/// Terms must be non-empty and printable: C0 and C1 control characters and
/// the Unicode line/paragraph separators would corrupt the TSV encoding.
fn validate_term(term: &str) -> Result<()> {
    if term.is_empty() {
        return Err(Error::Config("glossary term must not be empty".to_string()));
    }
    let forbidden = |c: char| {
        ('\u{0000}'..='\u{001F}').contains(&c)
            || ('\u{0080}'..='\u{009F}').contains(&c)
            || c == '\u{2028}'
            || c == '\u{2029}'
    };
    if term.chars().any(forbidden) {
        return Err(Error::Config(format!(
            "glossary term contains invalid character: {term:?}"
        )));
    }
    Ok(())
}

fn split_csv_line(line: &str, line_number: usize) -> Result<Vec<String>> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars().peekable();
    let mut quoted = false;

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    quoted = false;
                }
            }
            '"' if field.is_empty() => quoted = true,
            ',' if !quoted => {
                fields.push(std::mem::take(&mut field));
            }
            c => field.push(c),
        }
    }
    if quoted {
        return Err(Error::Config(format!(
            "unterminated quoted field on CSV line {line_number}"
        )));
    }
    fields.push(field);
    Ok(fields)
}

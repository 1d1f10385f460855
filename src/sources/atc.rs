//! ATC multilingual classification table.
//!
//! Each non-empty, non-comment line of the input file is
//! `CODE|name_de|name_fr|name_it|name_en`; only the column for the requested
//! language is kept in memory.

use std::collections::HashMap;
use std::path::Path;

use tracing::warn;

use crate::error::PipelineError;

const SOURCE: &str = "atc";

#[derive(Debug, Default)]
pub struct AtcIndex {
    by_code: HashMap<String, String>,
    code_by_name: HashMap<String, String>,
}

impl AtcIndex {
    pub fn load(path: &Path, language: &str) -> Result<Self, PipelineError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::input_missing(path, e))?;

        let column = match language {
            "de" => 1,
            "fr" => 2,
            "it" => 3,
            _ => 4,
        };

        let mut by_code = HashMap::new();
        let mut code_by_name = HashMap::new();
        for (lineno, line) in raw.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split('|').collect();
            if fields.len() <= column {
                warn!(target: SOURCE, lineno, "malformed atc line, skipping");
                continue;
            }
            let code = fields[0].trim().to_string();
            let name = fields[column].trim().to_string();
            code_by_name
                .entry(name.to_lowercase())
                .or_insert_with(|| code.clone());
            by_code.insert(code, name);
        }

        Ok(Self { by_code, code_by_name })
    }

    pub fn text_for(&self, atc: &str) -> Option<&str> {
        self.by_code.get(atc).map(String::as_str)
    }

    /// Reverse lookup used to fill a medicine's missing ATC code from its
    /// active substance name, mirroring upstream AIPS parsing falling back
    /// to the ATC table when the monograph carries no code of its own.
    pub fn code_for_name(&self, name: &str) -> Option<&str> {
        if name.is_empty() {
            return None;
        }
        self.code_by_name.get(&name.to_lowercase()).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn picks_requested_language_column() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "J01CA04|Penicilline|Pénicilline|Penicillina|Penicillin").unwrap();
        let idx = AtcIndex::load(f.path(), "fr").unwrap();
        assert_eq!(idx.text_for("J01CA04"), Some("Pénicilline"));
    }

    #[test]
    fn unknown_code_is_none() {
        let idx = AtcIndex::default();
        assert_eq!(idx.text_for("J01"), None);
    }

    #[test]
    fn resolves_code_from_name_case_insensitively() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "J01CA04|Penicilline|Pénicilline|Penicillina|Penicillin").unwrap();
        let idx = AtcIndex::load(f.path(), "de").unwrap();
        assert_eq!(idx.code_for_name("penicilline"), Some("J01CA04"));
        assert_eq!(idx.code_for_name(""), None);
    }
}

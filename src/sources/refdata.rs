//! Refdata commercial reference-data loader — primary source of package names.

use std::collections::HashSet;
use std::path::Path;

use roxmltree::Document;
use tracing::warn;

use crate::error::PipelineError;
use crate::gtin;

const SOURCE: &str = "refdata";

#[derive(Debug, Clone)]
pub struct RefdataRow {
    pub rn5: String,
    pub gtin: String,
    pub name: String,
}

#[derive(Debug, Default)]
pub struct RefdataIndex {
    pub(crate) rows: Vec<RefdataRow>,
}

impl RefdataIndex {
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::input_missing(path, e))?;
        let doc = Document::parse(&raw)
            .map_err(|e| PipelineError::parse_fatal(SOURCE, e.to_string()))?;

        let mut rows = Vec::new();
        for node in doc.descendants().filter(|n| n.has_tag_name("Article")) {
            let rn_raw = text(node, "RegNr");
            let pack_raw = text(node, "PackingCode");
            let name = text(node, "Name");

            if rn_raw.is_empty() {
                warn!(target: SOURCE, "article with no RegNr, skipping");
                continue;
            }

            let rn5 = gtin::pad(5, &rn_raw);
            let pack3 = gtin::pad(3, &pack_raw);
            let gtin13 = match gtin::gtin13(&rn5, &pack3) {
                Ok(g) => g,
                Err(_) => {
                    warn!(target: SOURCE, rn = %rn5, "non-numeric identifier, skipping row");
                    continue;
                }
            };

            rows.push(RefdataRow { rn5, gtin: gtin13, name });
        }

        Ok(Self { rows })
    }

    /// Primary package names for `rn`. Every GTIN emitted is inserted into
    /// `used`; the caller (merger) uses that set both to de-duplicate with
    /// Swissmedic/BAG and to know which barcodes belong in section 18.
    pub fn names_by_rn(&self, rn: &str, used: &mut HashSet<String>) -> Vec<(String, String)> {
        self.rows
            .iter()
            .filter(|r| r.rn5 == rn)
            .map(|r| {
                used.insert(r.gtin.clone());
                (r.gtin.clone(), r.name.clone())
            })
            .collect()
    }

    pub fn find_gtin(&self, gtin: &str) -> bool {
        self.rows.iter().any(|r| r.gtin == gtin)
    }
}

fn text(node: roxmltree::Node, tag: &str) -> String {
    node.children()
        .find(|n| n.has_tag_name(tag))
        .and_then(|n| n.text())
        .unwrap_or("")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_by_rn_accumulates_used_gtins() {
        let idx = RefdataIndex {
            rows: vec![RefdataRow {
                rn5: "12345".into(),
                gtin: gtin::gtin13("12345", "000").unwrap(),
                name: "Dafalgan 500mg".into(),
            }],
        };
        let mut used = HashSet::new();
        let names = idx.names_by_rn("12345", &mut used);
        assert_eq!(names.len(), 1);
        assert!(used.contains(&gtin::gtin13("12345", "000").unwrap()));
    }

    #[test]
    fn unknown_rn_yields_nothing() {
        let idx = RefdataIndex::default();
        let mut used = HashSet::new();
        assert!(idx.names_by_rn("99999", &mut used).is_empty());
    }
}

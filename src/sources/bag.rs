//! BAG (Bundesamt für Gesundheit) price/reimbursement/application loader.

use std::collections::HashSet;
use std::path::Path;

use roxmltree::Document;
use tracing::warn;

use crate::error::PipelineError;
use crate::gtin;

const SOURCE: &str = "bag";

#[derive(Debug, Clone)]
pub struct BagRow {
    pub rn5: String,
    pub gtin: String,
    pub name: String,
    pub tindex: String,
    pub application: String,
    pub public_price: Option<String>,
    pub reserve_price: Option<String>,
    pub reimbursement_flags: String,
}

#[derive(Debug, Default)]
pub struct BagIndex {
    pub(crate) rows: Vec<BagRow>,
}

impl BagIndex {
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::input_missing(path, e))?;
        let doc = Document::parse(&raw)
            .map_err(|e| PipelineError::parse_fatal(SOURCE, e.to_string()))?;

        let mut rows = Vec::new();
        for node in doc.descendants().filter(|n| n.has_tag_name("Preparation")) {
            let rn_raw = text(node, "RegNr");
            let pack_raw = text(node, "PackingCode");
            if rn_raw.is_empty() {
                warn!(target: SOURCE, "preparation with no RegNr, skipping");
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

            rows.push(BagRow {
                rn5,
                gtin: gtin13,
                name: text(node, "Name"),
                tindex: text(node, "Tindex"),
                application: text(node, "Application"),
                public_price: non_empty(text(node, "PublicPrice")),
                reserve_price: non_empty(text(node, "ReservePrice")),
                reimbursement_flags: text(node, "ReimbursementFlags"),
            });
        }

        Ok(Self { rows })
    }

    pub fn tindex_by_rn(&self, rn: &str) -> String {
        self.rows
            .iter()
            .find(|r| r.rn5 == rn)
            .map(|r| r.tindex.clone())
            .unwrap_or_default()
    }

    pub fn application_by_rn(&self, rn: &str) -> String {
        self.rows
            .iter()
            .find(|r| r.rn5 == rn)
            .map(|r| r.application.clone())
            .unwrap_or_default()
    }

    /// Package names for `rn` not already claimed (by GTIN) in `used`.
    pub fn additional_names_by_rn(&self, rn: &str, used: &mut HashSet<String>) -> Vec<(String, String)> {
        self.rows
            .iter()
            .filter(|r| r.rn5 == rn && !used.contains(&r.gtin))
            .map(|r| {
                used.insert(r.gtin.clone());
                (r.gtin.clone(), r.name.clone())
            })
            .collect()
    }

    pub fn gtin_list(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.gtin.clone()).collect()
    }

    pub fn row_by_gtin(&self, gtin: &str) -> Option<&BagRow> {
        self.rows.iter().find(|r| r.gtin == gtin)
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

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn additional_names_skip_already_used_gtins() {
        let gtin13 = gtin::gtin13("12345", "000").unwrap();
        let idx = BagIndex {
            rows: vec![BagRow {
                rn5: "12345".into(),
                gtin: gtin13.clone(),
                name: "Dafalgan (BAG)".into(),
                tindex: "01.01".into(),
                application: "App".into(),
                public_price: Some("4.50".into()),
                reserve_price: None,
                reimbursement_flags: "SL".into(),
            }],
        };

        let mut used = HashSet::new();
        used.insert(gtin13.clone());
        assert!(idx.additional_names_by_rn("12345", &mut used).is_empty());

        let mut used2 = HashSet::new();
        assert_eq!(idx.additional_names_by_rn("12345", &mut used2).len(), 1);
    }

    #[test]
    fn tindex_by_rn_falls_back_to_empty() {
        let idx = BagIndex::default();
        assert_eq!(idx.tindex_by_rn("00001"), "");
    }
}

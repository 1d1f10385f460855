//! Per-medicine package merger: unions Refdata/Swissmedic/BAG rows for each
//! registration number, de-duplicating by GTIN with fixed precedence.

use std::collections::HashSet;

use crate::decorator;
use crate::entities::package::{PackageRecord, PackageSource};
use crate::sources::bag::BagIndex;
use crate::sources::refdata::RefdataIndex;
use crate::sources::swissmedic::SwissmedicIndex;

/// Fixed per-package `packages` column layout, bound unchanged for every
/// merged package (see DESIGN.md, "packages-blob defect").
const PACKAGES_SEGMENT_TEMPLATE: &str = "|||CHF 0.00|CHF 0.00||||,,,|||255|0";

#[derive(Debug, Default)]
pub struct MergeStats {
    pub refdata_found: usize,
    pub refdata_not_found: usize,
    pub swissmedic_found: usize,
    pub swissmedic_not_found: usize,
    pub bag_found: usize,
    pub bag_not_found: usize,
    pub orphan_regnrs: Vec<String>,
}

pub struct MergeResult {
    pub records: Vec<PackageRecord>,
    pub used_gtins: HashSet<String>,
    pub stats: MergeStats,
}

/// Merges package rows for every RN in `regnrs`, in listed order, applying
/// the precedence Refdata > Swissmedic > BAG per RN.
pub fn merge(
    regnrs: &[String],
    refdata: &RefdataIndex,
    swissmedic: &SwissmedicIndex,
    bag: &BagIndex,
) -> MergeResult {
    let mut records = Vec::new();
    let mut all_used = HashSet::new();
    let mut stats = MergeStats::default();

    for rn in regnrs {
        let mut used_for_rn = HashSet::new();

        let refdata_names = refdata.names_by_rn(rn, &mut used_for_rn);
        if refdata_names.is_empty() {
            stats.refdata_not_found += 1;
        } else {
            stats.refdata_found += 1;
        }
        for (gtin, name) in refdata_names {
            push_record(&mut records, PackageSource::Refdata, gtin, name, swissmedic, bag);
        }

        let mut swissmedic_names = Vec::new();
        for r in swissmedic.rows_for_rn(rn) {
            if used_for_rn.insert(r.gtin.clone()) {
                swissmedic_names.push((r.gtin.clone(), r.name.clone()));
            }
        }
        if swissmedic_names.is_empty() {
            stats.swissmedic_not_found += 1;
        } else {
            stats.swissmedic_found += 1;
        }
        for (gtin, name) in swissmedic_names {
            push_record(&mut records, PackageSource::Swissmedic, gtin, name, swissmedic, bag);
        }

        let bag_names = bag.additional_names_by_rn(rn, &mut used_for_rn);
        if bag_names.is_empty() {
            stats.bag_not_found += 1;
        } else {
            stats.bag_found += 1;
        }
        for (gtin, name) in bag_names {
            push_record(&mut records, PackageSource::Bag, gtin, name, swissmedic, bag);
        }

        if used_for_rn.is_empty() {
            stats.orphan_regnrs.push(rn.clone());
        }
        all_used.extend(used_for_rn);
    }

    MergeResult {
        records,
        used_gtins: all_used,
        stats,
    }
}

fn push_record(
    records: &mut Vec<PackageRecord>,
    source: PackageSource,
    gtin: String,
    name: String,
    swissmedic: &SwissmedicIndex,
    bag: &BagIndex,
) {
    let tail = decorator::decorate(bag, swissmedic, &gtin);
    records.push(PackageRecord {
        gtin: gtin.clone(),
        source,
        line: format!("{name}{tail}"),
        packages_segment: PACKAGES_SEGMENT_TEMPLATE.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::refdata::RefdataRow;
    use crate::sources::swissmedic::SwissmedicRow;

    #[test]
    fn precedence_is_refdata_then_swissmedic_then_bag() {
        let refdata = RefdataIndex {
            rows: vec![RefdataRow {
                rn5: "12345".into(),
                gtin: crate::gtin::gtin13("12345", "000").unwrap(),
                name: "Refdata name".into(),
            }],
        };
        let swissmedic = SwissmedicIndex {
            rows: vec![SwissmedicRow {
                rn5: "12345".into(),
                pack3: "001".into(),
                gtin: crate::gtin::gtin13("12345", "001").unwrap(),
                name: "Swissmedic name".into(),
                category: "B".into(),
                application: "".into(),
            }],
        };
        let bag = BagIndex::default();

        let result = merge(&["12345".to_string()], &refdata, &swissmedic, &bag);
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0].source, PackageSource::Refdata);
        assert_eq!(result.records[1].source, PackageSource::Swissmedic);
        assert_ne!(result.records[0].gtin, result.records[1].gtin);
    }

    #[test]
    fn same_gtin_from_swissmedic_is_not_duplicated() {
        let gtin13 = crate::gtin::gtin13("12345", "000").unwrap();
        let refdata = RefdataIndex {
            rows: vec![RefdataRow {
                rn5: "12345".into(),
                gtin: gtin13.clone(),
                name: "Refdata name".into(),
            }],
        };
        let swissmedic = SwissmedicIndex {
            rows: vec![SwissmedicRow {
                rn5: "12345".into(),
                pack3: "000".into(),
                gtin: gtin13,
                name: "Swissmedic name".into(),
                category: "B".into(),
                application: "".into(),
            }],
        };
        let bag = BagIndex::default();

        let result = merge(&["12345".to_string()], &refdata, &swissmedic, &bag);
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].source, PackageSource::Refdata);
    }

    #[test]
    fn duplicate_swissmedic_rows_for_same_gtin_are_not_both_emitted() {
        let refdata = RefdataIndex::default();
        let gtin13 = crate::gtin::gtin13("12345", "000").unwrap();
        let swissmedic = SwissmedicIndex {
            rows: vec![
                SwissmedicRow {
                    rn5: "12345".into(),
                    pack3: "000".into(),
                    gtin: gtin13.clone(),
                    name: "Swissmedic name A".into(),
                    category: "B".into(),
                    application: "".into(),
                },
                SwissmedicRow {
                    rn5: "12345".into(),
                    pack3: "000".into(),
                    gtin: gtin13,
                    name: "Swissmedic name B".into(),
                    category: "B".into(),
                    application: "".into(),
                },
            ],
        };
        let bag = BagIndex::default();

        let result = merge(&["12345".to_string()], &refdata, &swissmedic, &bag);
        assert_eq!(result.records.len(), 1);
    }

    #[test]
    fn rn_found_nowhere_is_recorded_as_orphan() {
        let refdata = RefdataIndex::default();
        let swissmedic = SwissmedicIndex::default();
        let bag = BagIndex::default();
        let result = merge(&["99999".to_string()], &refdata, &swissmedic, &bag);
        assert!(result.records.is_empty());
        assert_eq!(result.stats.orphan_regnrs, vec!["99999".to_string()]);
    }
}

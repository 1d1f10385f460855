//! Stable ordering of the merged package set.
//!
//! Applied to `packInfo` and `packages` together: both are derived from one
//! sort permutation over the same [`PackageRecord`] list, so their line
//! counts can never diverge (see DESIGN.md).

use crate::entities::package::PackageRecord;

pub struct Beautified {
    pub pack_info: String,
    pub packages: String,
}

/// Stable lexicographic sort on the rendered `packInfo` line text.
pub fn sort(records: &[PackageRecord]) -> Beautified {
    let mut ordered: Vec<&PackageRecord> = records.iter().collect();
    ordered.sort_by(|a, b| a.line.cmp(&b.line));

    let pack_info = ordered
        .iter()
        .map(|r| r.line.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let packages = ordered
        .iter()
        .map(|r| r.packages_segment.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    Beautified { pack_info, packages }
}

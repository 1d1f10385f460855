//! Appends price/reimbursement/category decoration to a package name line.

use crate::sources::bag::BagIndex;
use crate::sources::swissmedic::SwissmedicIndex;

/// Builds the tail segment appended to a package-info name line:
/// `" | {publicPrice} | {reservePrice} | {flags} | {category}"`. Returns an
/// empty string when BAG has no record for `gtin` (the line is then emitted
/// undecorated).
pub fn decorate(bag: &BagIndex, swissmedic: &SwissmedicIndex, gtin: &str) -> String {
    let Some(row) = bag.row_by_gtin(gtin) else {
        return String::new();
    };

    let public_price = row
        .public_price
        .as_deref()
        .map(|p| format!("CHF {p}"))
        .unwrap_or_default();
    let reserve_price = row
        .reserve_price
        .as_deref()
        .map(|p| format!("CHF {p}"))
        .unwrap_or_default();
    let category = swissmedic.category_by_gtin(gtin).unwrap_or_default();

    format!(
        " | {public_price} | {reserve_price} | {} | {category}",
        row.reimbursement_flags
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::bag::BagRow;

    #[test]
    fn empty_when_bag_has_no_record() {
        let bag = BagIndex::default();
        let swissmedic = SwissmedicIndex::default();
        assert_eq!(decorate(&bag, &swissmedic, "7680123450005"), "");
    }

    #[test]
    fn builds_tail_from_bag_row() {
        let bag = BagIndex {
            rows: vec![BagRow {
                rn5: "12345".into(),
                gtin: "7680123450005".into(),
                name: "Dafalgan".into(),
                tindex: "".into(),
                application: "".into(),
                public_price: Some("4.50".into()),
                reserve_price: None,
                reimbursement_flags: "SL".into(),
            }],
        };
        let swissmedic = SwissmedicIndex::default();
        let tail = decorate(&bag, &swissmedic, "7680123450005");
        assert!(tail.contains("CHF 4.50"));
        assert!(tail.contains("SL"));
    }

    #[test]
    fn includes_reserve_price_when_present() {
        let bag = BagIndex {
            rows: vec![BagRow {
                rn5: "12345".into(),
                gtin: "7680123450005".into(),
                name: "Dafalgan".into(),
                tindex: "".into(),
                application: "".into(),
                public_price: Some("4.50".into()),
                reserve_price: Some("3.90".into()),
                reimbursement_flags: "SL".into(),
            }],
        };
        let swissmedic = SwissmedicIndex::default();
        let tail = decorate(&bag, &swissmedic, "7680123450005");
        assert!(tail.contains("CHF 4.50"));
        assert!(tail.contains("CHF 3.90"));
    }
}

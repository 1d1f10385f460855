//! Per-medicine driver: joins every source for one medicine and writes the row.

use std::io::IsTerminal;

use crate::beautify;
use crate::diagnostics::Diagnostics;
use crate::entities::Medicine;
use crate::merge;
use crate::peddose_html;
use crate::rewriter;
use crate::sources::atc::AtcIndex;
use crate::sources::bag::BagIndex;
use crate::sources::peddose::PedDoseIndex;
use crate::sources::refdata::RefdataIndex;
use crate::sources::swissmedic::SwissmedicIndex;
use crate::writer::{MedicineRow, Writer};

/// Every loaded source the driver reads from, held by shared reference for
/// the run's duration.
pub struct Sources<'a> {
    pub refdata: &'a RefdataIndex,
    pub swissmedic: &'a SwissmedicIndex,
    pub bag: &'a BagIndex,
    pub atc: &'a AtcIndex,
    pub peddose: Option<&'a PedDoseIndex>,
}

/// Iterates `medicines` in AIPS order, joins every source, and writes each
/// row through `writer`. Returns the accumulated diagnostics.
pub fn run(medicines: &[Medicine], sources: &Sources, writer: &mut Writer) -> Diagnostics {
    let mut diagnostics = Diagnostics::default();
    let interactive = std::io::stderr().is_terminal();
    let total = medicines.len();

    for (i, medicine) in medicines.iter().enumerate() {
        let merge_result = merge::merge(
            &medicine.regnr_list,
            sources.refdata,
            sources.swissmedic,
            sources.bag,
        );
        diagnostics.record_merge(&merge_result.stats);

        let beautified = beautify::sort(&merge_result.records);

        let rn0 = medicine.first_regnr().unwrap_or("");
        let tindex = sources.bag.tindex_by_rn(rn0);
        let swissmedic_app = sources.swissmedic.application_by_rn(rn0);
        let bag_app = sources.bag.application_by_rn(rn0);
        let application = if bag_app.is_empty() {
            swissmedic_app
        } else {
            format!("{swissmedic_app};{bag_app}")
        };

        let content = rewriter::rewrite(
            &medicine.content_xml,
            &medicine.regnrs,
            &medicine.auth,
            &merge_result.used_gtins,
        );

        let atc = if medicine.atc.is_empty() {
            sources.atc.code_for_name(&medicine.substance).unwrap_or("")
        } else {
            &medicine.atc
        };

        let peddose_html = sources
            .peddose
            .map(|idx| peddose_html::html_for_atc(idx, atc))
            .unwrap_or_default();
        diagnostics.record_peddose(peddose_html.is_empty());

        let content = if peddose_html.is_empty() {
            content
        } else {
            format!("{content}{peddose_html}")
        };

        let row = MedicineRow {
            title: &medicine.title,
            auth: &medicine.auth,
            atc,
            substance: &medicine.substance,
            regnrs: &medicine.regnrs,
            tindex: &tindex,
            application: &application,
            pack_info: &beautified.pack_info,
            content: &content,
            packages: &beautified.packages,
        };

        if let Err(e) = writer.write_all(std::iter::once(row)) {
            tracing::warn!(target: "pipeline", medicine = %medicine.title, error = %e, "failed to write row, skipping");
            continue;
        }

        if interactive && (i + 1) % 60 == 0 {
            eprint!("\r{} %", (i + 1) * 100 / total.max(1));
        }
    }

    if interactive {
        eprintln!();
    }

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_over_medicines_with_no_sources_loaded() {
        let medicines = vec![Medicine::new(
            "Dafalgan".into(),
            "ACME AG".into(),
            "N02BE01".into(),
            "Paracetamol".into(),
            "12345".into(),
            "<div><p id=\"section1\">Title</p></div>".into(),
        )];

        let refdata = RefdataIndex::default();
        let swissmedic = SwissmedicIndex::default();
        let bag = BagIndex::default();
        let atc = AtcIndex::default();
        let sources = Sources {
            refdata: &refdata,
            swissmedic: &swissmedic,
            bag: &bag,
            atc: &atc,
            peddose: None,
        };

        let file = tempfile::NamedTempFile::new().unwrap();
        let mut writer = Writer::create(file.path()).unwrap();

        let diagnostics = run(&medicines, &sources, &mut writer);
        assert_eq!(diagnostics.refdata_not_found, 1);
        assert_eq!(diagnostics.peddose_misses, 1);
    }
}

//! Pediatric-dose HTML table generator.

use crate::sources::peddose::PedDoseIndex;

const LITERAL_ABBREVIATIONS: &[(&str, &str)] = &[
    ("Dosis", "dose"),
    ("Gramm", "g"),
    ("Kilogramm", "kg"),
    ("Milligramm", "mg"),
    ("Tag", "day"),
];

/// Looks up `unit` in the parsed `DOSISUNIT` code table first, falling back
/// to the literal map, and finally to the unit string itself.
fn abbreviate_unit(index: &PedDoseIndex, unit: &str) -> String {
    if unit.is_empty() {
        return String::new();
    }
    if let Some(desc) = index.dose_unit_code(unit) {
        if !desc.is_empty() {
            return desc.to_string();
        }
    }
    LITERAL_ABBREVIATIONS
        .iter()
        .find(|(k, _)| *k == unit)
        .map(|(_, v)| v.to_string())
        .unwrap_or_else(|| unit.to_string())
}

fn range(low: &str, high: &str, suffix: &str) -> String {
    if low == high || high.is_empty() {
        format!("{low}{suffix}")
    } else {
        format!("{low} - {high}{suffix}")
    }
}

/// Builds the pediatric dosing table for an ATC code. Empty when there are
/// no cases for that ATC.
pub fn html_for_atc(index: &PedDoseIndex, atc: &str) -> String {
    let cases = index.cases_by_atc(atc);
    if cases.is_empty() {
        return String::new();
    }

    let mut html = String::new();
    for case in cases {
        let description = index.description_by_atc(atc);
        let indication = index.indication_by_key(&case.indication_key);

        html.push_str(&format!("<br>\n{description}<br>\n"));
        html.push_str(&format!("\nATC-Code: {atc}<br>\n"));
        html.push_str(&format!("Indication: {indication}<br>\n"));

        let dosages = index.dosages_by_case_id(&case.case_id);

        let colgroup = "<colgroup><col span=\"7\" style=\"background-color: #EEEEEE; padding-right: 5px; padding-left: 5px\"/></colgroup>";

        let mut header = String::new();
        if !dosages.is_empty() {
            for h in [
                "Age",
                "Weight",
                "Type of use",
                "Dosage",
                "Daily repetitions",
                "ROA",
                "Max. daily dose",
            ] {
                header.push_str(&format!("<th>{h}</th>"));
            }
            header = format!("<thead><tr>{header}\n</tr></thead>");
        }

        let mut body = String::new();
        for dosage in dosages {
            let mut row = String::new();

            let mut age = format!("{}{}", dosage.age_from, dosage.age_from_unit);
            age.push_str(&format!(" to {}{}", dosage.age_to, dosage.age_to_unit));
            if !dosage.age_weight_relation.is_empty() {
                age.push(' ');
                age.push_str(&dosage.age_weight_relation);
            }
            row.push_str(&td(&age));

            let mut weight = dosage.weight_from.clone();
            if dosage.weight_from != dosage.weight_to {
                weight.push_str(&format!(" to {}", dosage.weight_to));
            }
            weight.push_str(" kg");
            row.push_str(&td(&weight));

            row.push_str(&td(&dosage.type_of_case));

            let mut dose = range(&dosage.dose_low, &dosage.dose_high, "");
            dose.push(' ');
            dose.push_str(&abbreviate_unit(index, &dosage.dose_unit));
            if !dosage.dose_unit_ref1.is_empty() {
                dose.push('/');
                dose.push_str(&abbreviate_unit(index, &dosage.dose_unit_ref1));
            }
            if !dosage.dose_unit_ref2.is_empty() {
                dose.push('/');
                dose.push_str(&abbreviate_unit(index, &dosage.dose_unit_ref2));
            }
            row.push_str(&td(&dose));

            let mut reps = range(&dosage.daily_repetitions_low, &dosage.daily_repetitions_high, "");
            reps.push_str(" x daily");
            row.push_str(&td(&reps));

            row.push_str(&td(&case.roa_code));

            let mut max_daily = format!("{} {}", dosage.max_daily_dose, abbreviate_unit(index, &dosage.max_daily_dose_unit));
            if !dosage.max_daily_dose_unit_ref1.is_empty() {
                max_daily.push('/');
                max_daily.push_str(&abbreviate_unit(index, &dosage.max_daily_dose_unit_ref1));
            }
            if !dosage.max_daily_dose_unit_ref2.is_empty() {
                max_daily.push('/');
                max_daily.push_str(&abbreviate_unit(index, &dosage.max_daily_dose_unit_ref2));
            }
            row.push_str(&td(&max_daily));

            body.push_str(&format!("<tr>{row}\n</tr>"));
        }
        body = format!("<tbody>{body}</tbody>");

        html.push_str(&format!("<table class=\"s14\">{colgroup}{header}{body}</table>"));
    }

    format!("<p>{html}</p>")
}

fn td(content: &str) -> String {
    format!("<td class=\"s13\"><p class=\"s11\">{content}</p><div class=\"s12\"/></td>")
}

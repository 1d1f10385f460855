//! SwissPedDose pediatric dosing loader.
//!
//! The upstream feed's own tag names carry two long-standing misspellings —
//! `DecsriptionF` and `IndikationNameE` (English, with a K) — which are kept
//! verbatim here since they are what the XML actually contains.

use std::collections::HashMap;
use std::path::Path;

use roxmltree::Document;

use crate::entities::pediatric::{Case, Code, Dosage, Indication};
use crate::error::PipelineError;

const SOURCE: &str = "peddose";

#[derive(Debug, Default)]
pub struct PedDoseIndex {
    cases: Vec<Case>,
    indications_by_key: HashMap<String, Indication>,
    /// Keyed by `CodeType`, then by `CodeValue`.
    codes_by_type: HashMap<String, HashMap<String, Code>>,
    dosages_by_case_id: HashMap<String, Vec<Dosage>>,
}

impl PedDoseIndex {
    pub fn load(path: &Path, language: &str) -> Result<Self, PipelineError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::input_missing(path, e))?;
        let doc = Document::parse(&raw)
            .map_err(|e| PipelineError::parse_fatal(SOURCE, e.to_string()))?;

        let root = doc
            .descendants()
            .find(|n| n.has_tag_name("SwissPedDosePublication"))
            .ok_or_else(|| PipelineError::parse_fatal(SOURCE, "missing SwissPedDosePublication root"))?;

        let mut cases = Vec::new();
        let mut indications_by_key = HashMap::new();
        let mut codes_by_type: HashMap<String, HashMap<String, Code>> = HashMap::new();
        let mut dosages_by_case_id: HashMap<String, Vec<Dosage>> = HashMap::new();

        for section in root.children().filter(|n| n.is_element()) {
            match section.tag_name().name() {
                "Cases" => {
                    for c in section.children().filter(|n| n.has_tag_name("Case")) {
                        cases.push(Case {
                            case_id: text(c, "CaseID"),
                            atc_code: text(c, "ATCCode"),
                            indication_key: text(c, "IndicationKey"),
                            roa_code: text(c, "ROACode"),
                        });
                    }
                }
                "Indications" => {
                    for i in section.children().filter(|n| n.has_tag_name("Indication")) {
                        let name = match language {
                            "de" => text(i, "IndicationNameD"),
                            "fr" => text(i, "IndicationNameF"),
                            _ => text(i, "IndikationNameE"),
                        };
                        let key = text(i, "IndicationKey");
                        indications_by_key.insert(
                            key,
                            Indication {
                                name,
                                rec_status: text(i, "RecStatus"),
                            },
                        );
                    }
                }
                "Codes" => {
                    for c in section.children().filter(|n| n.has_tag_name("Code")) {
                        let code_type = text(c, "CodeType");
                        let description = match language {
                            "de" => text(c, "DescriptionD"),
                            "fr" => text(c, "DecsriptionF"),
                            _ => text(c, "DecriptionE"),
                        };
                        let value = text(c, "CodeValue");
                        codes_by_type.entry(code_type).or_default().insert(
                            value.clone(),
                            Code {
                                value,
                                description,
                                rec_status: text(c, "RecStatus"),
                            },
                        );
                    }
                }
                "Dosages" => {
                    for d in section.children().filter(|n| n.has_tag_name("Dosage")) {
                        let remarks = match language {
                            "de" => text(d, "RemarksD"),
                            "fr" => text(d, "RemarksF"),
                            "it" => text(d, "RemarksI"),
                            _ => text(d, "RemarksE"),
                        };
                        let case_id = text(d, "CaseID");
                        dosages_by_case_id.entry(case_id.clone()).or_default().push(Dosage {
                            case_id,
                            type_of_case: text(d, "TypeOfCase"),
                            age_from: text(d, "AgeFrom"),
                            age_from_unit: text(d, "AgeFromUnit"),
                            age_to: text(d, "AgeTo"),
                            age_to_unit: text(d, "AgeToUnit"),
                            age_weight_relation: text(d, "AgeWeightRelation"),
                            weight_from: text(d, "WeightFrom"),
                            weight_to: text(d, "WeightTo"),
                            dose_low: text(d, "LowerDoseRange"),
                            dose_high: text(d, "UpperDoseRange"),
                            dose_unit: text(d, "DoseRangeUnit"),
                            dose_unit_ref1: text(d, "DoseRangeReferenceUnit1"),
                            dose_unit_ref2: text(d, "DoseRangeReferenceUnit2"),
                            daily_repetitions_low: text(d, "LowerRangeDailyRepetitions"),
                            daily_repetitions_high: text(d, "UpperRangeDailyRepetitions"),
                            max_single_dose: text(d, "MaxSingleDose"),
                            max_single_dose_unit: text(d, "MaxSingleDoseUnit"),
                            max_single_dose_unit_ref1: text(d, "MaxSingleDoseReferenceUnit1"),
                            max_single_dose_unit_ref2: text(d, "MaxSingleDoseReferenceUnit2"),
                            max_daily_dose: text(d, "MaxDailyDose"),
                            max_daily_dose_unit: text(d, "MaxDailyDoseUnit"),
                            max_daily_dose_unit_ref1: text(d, "MaxDailyDoseReferenceUnit1"),
                            max_daily_dose_unit_ref2: text(d, "MaxDailyDoseReferenceUnit2"),
                            remarks,
                        });
                    }
                }
                _ => {}
            }
        }

        Ok(Self {
            cases,
            indications_by_key,
            codes_by_type,
            dosages_by_case_id,
        })
    }

    pub fn cases_by_atc(&self, atc: &str) -> Vec<&Case> {
        self.cases.iter().filter(|c| c.atc_code == atc).collect()
    }

    pub fn description_by_atc(&self, atc: &str) -> String {
        self.codes_by_type
            .get("ATC")
            .and_then(|m| m.get(atc))
            .map(|c| c.description.clone())
            .unwrap_or_default()
    }

    pub fn indication_by_key(&self, key: &str) -> String {
        self.indications_by_key
            .get(key)
            .map(|i| i.name.clone())
            .unwrap_or_default()
    }

    pub fn dosages_by_case_id(&self, case_id: &str) -> &[Dosage] {
        self.dosages_by_case_id
            .get(case_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Dose-unit abbreviation/description, consulted before falling back to
    /// the literal abbreviation table (see `peddose_html::abbreviate_unit`).
    pub fn dose_unit_code(&self, unit: &str) -> Option<&str> {
        self.codes_by_type
            .get("DOSISUNIT")
            .and_then(|m| m.get(unit))
            .map(|c| c.description.as_str())
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
    use std::io::Write;

    fn fixture() -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            f,
            r#"<SwissPedDosePublication>
                <Cases>
                    <Case><CaseID>1</CaseID><ATCCode>J01CA04</ATCCode><IndicationKey>339</IndicationKey><ROACode>oral</ROACode></Case>
                </Cases>
                <Indications>
                    <Indication><IndicationKey>339</IndicationKey><IndicationNameD>Harnwegsinfekt</IndicationNameD></Indication>
                </Indications>
                <Codes>
                    <Code><CodeType>ATC</CodeType><CodeValue>J01CA04</CodeValue><DescriptionD>Amoxicillin</DescriptionD></Code>
                    <Code><CodeType>DOSISUNIT</CodeType><CodeValue>Milligramm</CodeValue><DescriptionD>mg</DescriptionD></Code>
                </Codes>
                <Dosages>
                    <Dosage><CaseID>1</CaseID><TypeOfCase>Standard</TypeOfCase><AgeFrom>0</AgeFrom><AgeFromUnit>y</AgeFromUnit><AgeTo>2</AgeTo><AgeToUnit>y</AgeToUnit><LowerDoseRange>10</LowerDoseRange><UpperDoseRange>20</UpperDoseRange><DoseRangeUnit>Milligramm</DoseRangeUnit></Dosage>
                </Dosages>
            </SwissPedDosePublication>"#
        ).unwrap();
        f
    }

    #[test]
    fn loads_cases_indications_codes_dosages() {
        let idx = PedDoseIndex::load(fixture().path(), "de").unwrap();
        let cases = idx.cases_by_atc("J01CA04");
        assert_eq!(cases.len(), 1);
        assert_eq!(idx.indication_by_key("339"), "Harnwegsinfekt");
        assert_eq!(idx.description_by_atc("J01CA04"), "Amoxicillin");
        assert_eq!(idx.dosages_by_case_id("1").len(), 1);
        assert_eq!(idx.dose_unit_code("Milligramm"), Some("mg"));
    }

    #[test]
    fn unknown_atc_has_no_cases() {
        let idx = PedDoseIndex::load(fixture().path(), "de").unwrap();
        assert!(idx.cases_by_atc("Z99").is_empty());
    }
}

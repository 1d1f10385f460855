//! SwissPedDose value types: cases, indications, ATC/unit codes, dosages.

#[derive(Debug, Clone, Default)]
pub struct Case {
    pub case_id: String,
    pub atc_code: String,
    pub indication_key: String,
    pub roa_code: String,
}

#[derive(Debug, Clone, Default)]
pub struct Indication {
    pub name: String,
    pub rec_status: String,
}

/// A `<Code>` entry from the `Codes` section, keyed by `CodeValue`. Used for
/// both the ATC-description lookup (`CodeType == ATC`) and the dose-unit
/// abbreviation lookup (`CodeType == DOSISUNIT`).
#[derive(Debug, Clone, Default)]
pub struct Code {
    pub value: String,
    pub description: String,
    pub rec_status: String,
}

#[derive(Debug, Clone, Default)]
pub struct Dosage {
    pub case_id: String,
    pub type_of_case: String,

    pub age_from: String,
    pub age_from_unit: String,
    pub age_to: String,
    pub age_to_unit: String,
    pub age_weight_relation: String,

    pub weight_from: String,
    pub weight_to: String,

    pub dose_low: String,
    pub dose_high: String,
    pub dose_unit: String,
    pub dose_unit_ref1: String,
    pub dose_unit_ref2: String,

    pub daily_repetitions_low: String,
    pub daily_repetitions_high: String,

    pub max_single_dose: String,
    pub max_single_dose_unit: String,
    pub max_single_dose_unit_ref1: String,
    pub max_single_dose_unit_ref2: String,

    pub max_daily_dose: String,
    pub max_daily_dose_unit: String,
    pub max_daily_dose_unit_ref1: String,
    pub max_daily_dose_unit_ref2: String,

    pub remarks: String,
}

//! Command-line surface: one mode of operation, every upstream flag accepted.

use std::path::PathBuf;

use clap::Parser;

/// Builds a consolidated `amiko_db_full_idx_{lang}.db` from the AIPS,
/// Swissmedic, Refdata, BAG, ATC and (optional) SwissPedDose inputs found
/// under `--inDir`.
#[derive(Parser, Debug)]
#[command(name = "amikodb-builder", version, about)]
pub struct Cli {
    /// Root directory containing the upstream input files
    #[arg(long = "inDir", value_name = "DIR")]
    pub in_dir: PathBuf,

    /// Output language for localised fields
    #[arg(long, default_value = "de", value_parser = ["de", "fr", "it", "en"])]
    pub lang: String,

    /// Emit orphan-RN list and per-loader statistics
    #[arg(long)]
    pub verbose: bool,

    /// Skip DB emission (stub)
    #[arg(long)]
    pub xml: bool,

    /// Select patient-information monographs (type=pi) instead of fi
    #[arg(long)]
    pub pinfo: bool,

    // Upstream flags accepted for wrapper-script compatibility; logged at
    // debug level and otherwise ignored (see SPEC_FULL.md §4.9).
    #[arg(long)]
    pub pseudo: bool,
    #[arg(long)]
    pub inter: bool,
    #[arg(long)]
    pub gln: bool,
    #[arg(long)]
    pub shop: bool,
    #[arg(long)]
    pub zurrose: bool,
    #[arg(long)]
    pub desitin: bool,
    #[arg(long)]
    pub reports: bool,
    #[arg(long)]
    pub nodown: bool,
    #[arg(long)]
    pub onlyshop: bool,
    #[arg(long)]
    pub onlydesitin: bool,
    #[arg(long)]
    pub takeda: bool,
    #[arg(long)]
    pub dailydrugcosts: bool,
    #[arg(long)]
    pub smsequence: bool,
    #[arg(long)]
    pub packageparse: bool,
    #[arg(long)]
    pub zip: bool,
    #[arg(long)]
    pub indications: bool,
    #[arg(long)]
    pub plain: bool,
    #[arg(long)]
    pub test: bool,
    #[arg(long)]
    pub stats: bool,
    #[arg(long)]
    pub alpha: bool,
    #[arg(long)]
    pub regnr: Option<String>,
    #[arg(long)]
    pub owner: Option<String>,
}

impl Cli {
    pub fn aips_path(&self) -> PathBuf {
        self.in_dir.join("aips_xml.xml")
    }
    pub fn refdata_path(&self) -> PathBuf {
        self.in_dir.join("refdata_pharma_xml.xml")
    }
    pub fn swissmedic_path(&self) -> PathBuf {
        self.in_dir.join("swissmedic_packages_xlsx.xlsx")
    }
    pub fn bag_path(&self) -> PathBuf {
        self.in_dir.join("bag_preparations_xml.xml")
    }
    pub fn atc_path(&self) -> PathBuf {
        self.in_dir.join("../input/atc_codes_multi_lingual.txt")
    }
    pub fn peddose_path(&self) -> PathBuf {
        self.in_dir.join("swisspeddose_xml.xml")
    }
    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(format!("amiko_db_full_idx_{}.db", self.lang))
    }
}

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use amikodb_builder::cli::Cli;
use amikodb_builder::pipeline::{self, Sources};
use amikodb_builder::sources::aips::{self, MonographType};
use amikodb_builder::sources::{atc::AtcIndex, bag::BagIndex, peddose::PedDoseIndex, refdata::RefdataIndex, swissmedic::SwissmedicIndex};
use amikodb_builder::writer::Writer;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    for (flag, set) in [
        ("pseudo", cli.pseudo),
        ("inter", cli.inter),
        ("gln", cli.gln),
        ("shop", cli.shop),
        ("zurrose", cli.zurrose),
        ("desitin", cli.desitin),
        ("reports", cli.reports),
        ("nodown", cli.nodown),
        ("onlyshop", cli.onlyshop),
        ("onlydesitin", cli.onlydesitin),
        ("takeda", cli.takeda),
        ("dailydrugcosts", cli.dailydrugcosts),
        ("smsequence", cli.smsequence),
        ("packageparse", cli.packageparse),
        ("zip", cli.zip),
        ("indications", cli.indications),
        ("plain", cli.plain),
        ("test", cli.test),
        ("stats", cli.stats),
        ("alpha", cli.alpha),
    ] {
        if set {
            tracing::debug!(flag, "accepted upstream flag has no core effect");
        }
    }

    let monograph_type = if cli.pinfo { MonographType::Pi } else { MonographType::Fi };
    let medicines = aips::load(&cli.aips_path(), monograph_type)?;

    let refdata = RefdataIndex::load(&cli.refdata_path())?;
    let swissmedic = SwissmedicIndex::load(&cli.swissmedic_path())?;
    let bag = BagIndex::load(&cli.bag_path())?;
    let atc = AtcIndex::load(&cli.atc_path(), &cli.lang)?;
    let peddose = cli
        .peddose_path()
        .exists()
        .then(|| PedDoseIndex::load(&cli.peddose_path(), &cli.lang))
        .transpose()?;

    if cli.xml {
        tracing::info!(medicines = medicines.len(), "xml-only mode, skipping DB emission");
        return Ok(());
    }

    let mut writer = Writer::create(&cli.output_path())?;
    let sources = Sources {
        refdata: &refdata,
        swissmedic: &swissmedic,
        bag: &bag,
        atc: &atc,
        peddose: peddose.as_ref(),
    };
    let diagnostics = pipeline::run(&medicines, &sources, &mut writer);
    diagnostics.report(cli.verbose);

    Ok(())
}

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use ifile_view::{IFile, IFileConfig, LogLevel, OffsetMethod, Section};

/// Inspect a converted engine-test record: engine data, parameters, channel
/// metadata and the offset-correction pairs.
#[derive(Debug, Parser)]
#[command(name = "ifile-view", version)]
struct Cli {
    /// Converted record (.json)
    record: PathBuf,

    /// JSON file with an IFileConfig; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// INFO, DEBUG or WARNING
    #[arg(long)]
    log: Option<LogLevel>,

    /// Leave offset correction to the converter
    #[arg(long)]
    no_avl_correction: bool,

    #[arg(long)]
    keep_temp_files: bool,

    /// reference-mean or axis-matched
    #[arg(long)]
    method: Option<OffsetMethod>,

    /// Override the detected correction pairs (repeatable)
    #[arg(long = "pair", value_name = "MEAS=REF")]
    pairs: Vec<String>,

    /// Only print one section: CA, CY, PAR or ENGINE
    #[arg(long)]
    section: Option<String>,
}

impl Cli {
    fn ifile_config(&self) -> Result<IFileConfig> {
        let mut cfg = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                serde_json::from_str(&text).context("parsing config")?
            }
            None => IFileConfig::default(),
        };
        if let Some(log) = self.log {
            cfg.log = log;
        }
        if let Some(method) = self.method {
            cfg.offset_method = method;
        }
        cfg.avl_correction &= !self.no_avl_correction;
        cfg.keep_temp_files |= self.keep_temp_files;
        Ok(cfg)
    }

    fn pair_overrides(&self) -> Result<Vec<(String, String)>> {
        self.pairs
            .iter()
            .map(|p| match p.split_once('=') {
                Some((m, r)) if !m.is_empty() && !r.is_empty() => {
                    Ok((m.trim().to_string(), r.trim().to_string()))
                }
                _ => bail!("--pair expects MEAS=REF, got '{p}'"),
            })
            .collect()
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.ifile_config()?;
    let overrides = cli.pair_overrides()?;

    let mut ifile = IFile::open(&cli.record, config)
        .with_context(|| format!("loading {}", cli.record.display()))?;

    if !overrides.is_empty() {
        ifile
            .set_correction_pairs(overrides)
            .context("setting correction pairs")?;
        for applied in ifile.reapply_corrections().context("reapplying corrections")? {
            log::info!(
                "{} -> {}: mean offset {} over {} cycles",
                applied.measurement,
                applied.reference,
                applied.mean_offset,
                applied.cycles
            );
        }
    }

    let tags: Vec<&str> = match &cli.section {
        Some(tag) => vec![tag.as_str()],
        None => vec!["ENGINE", "PAR", "CA", "CY"],
    };
    for tag in tags {
        let section = ifile.section(tag)?;
        println!("== {} ==", tag.to_ascii_uppercase());
        print_section(section);
        println!();
    }

    if cli.section.is_none() {
        println!("== correction pairs ==");
        if ifile.correction_pairs().is_empty() {
            println!("  (none)");
        }
        for (meas, reference) in ifile.correction_pairs() {
            println!("  {meas} -> {reference}");
        }
    }
    Ok(())
}

fn print_section(section: Section<'_>) {
    match section {
        Section::Engine(engine) => {
            for (name, value) in engine.iter() {
                println!("  {name:<20} {value}");
            }
        }
        Section::Parameters(params) => {
            for p in params {
                let g = p.general();
                println!("  {:<20} {} {}  {}", p.name(), p.value(), g.units, g.description);
            }
        }
        Section::Axis(axis) => {
            for ch in axis {
                let g = ch.general();
                println!(
                    "  {:<12} [{}] {} records ({} cycles), range {}  {}",
                    ch.name(),
                    g.units,
                    g.record_count,
                    ch.cycles(),
                    g.range,
                    g.description
                );
            }
        }
    }
}

use std::path::PathBuf;

use anyhow::{bail, Context};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dnaparam::helper_functions::dataframe_to_csv;
use dnaparam::{AnalysisRun, PdbFileSource, ToolConfig};

/// Analyzes a DNA duplex PDB and writes the per-base-pair parameter
/// table next to it as CSV.
///
/// Usage: dnaparam <duplex.pdb> <strand-length> [reference.pdb]
///
/// When a reference PDB is given, base-pair detection runs on it and the
/// analysis of the main structure is carried out under the reference
/// topology; otherwise the structure serves as its own reference. Tool
/// locations come from the JSON file named by `DNAPARAM_CONFIG`, or are
/// discovered on PATH.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 || args.len() > 3 {
        bail!("usage: dnaparam <duplex.pdb> <strand-length> [reference.pdb]");
    }
    let pdb = PathBuf::from(&args[0]);
    let strand_len: usize = args[1]
        .parse()
        .with_context(|| format!("strand length must be a positive integer, got {:?}", args[1]))?;

    let cfg = match std::env::var_os("DNAPARAM_CONFIG") {
        Some(path) => ToolConfig::from_json_file(path.as_ref())
            .with_context(|| format!("reading tool configuration from {path:?}"))?,
        None => ToolConfig::discover()?,
    };

    let run = AnalysisRun::new(cfg)?;
    let source = PdbFileSource { path: pdb.clone(), strand_len };

    let ref_id = match args.get(2) {
        Some(reference) => {
            info!("Detecting base pairs on reference structure {reference}");
            run.find_pair(&PdbFileSource { path: PathBuf::from(reference), strand_len })?
        }
        None => run.find_pair(&source)?,
    };

    info!("Analyzing {:?}", pdb);
    let mut df = run.analyze(&source, &ref_id)?;

    let out = pdb.with_extension("params.csv");
    dataframe_to_csv(&mut df, &out, true)?;
    info!("Wrote {} base pairs to {:?}", df.height(), out);
    Ok(())
}

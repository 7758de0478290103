//! Inverse direction of the pipeline: a parameter table goes back out as
//! a `bp_step.par` file in the exact layout `rebuild` expects, then the
//! atomic model is reconstructed from it.

use std::fs;
use std::path::Path;

use polars::prelude::*;
use tracing::info;

use crate::config::ToolConfig;
use crate::error::{DnaParamError, Result};
use crate::external_tools::x3dna_integration::{run_cp_std, run_rebuild};
use crate::models::{BP_NAME_COL, PAIR_PARAM_COLS, STEP_PARAM_COLS};

const PARAM_COUNT_LINE: &str = "    0 # ***local base-pair & step parameters***";
const PARAM_HEADER: &str = " #        Shear    Stretch   Stagger   Buckle   Prop-Tw   Opening     Shift     Slide     Rise      Tilt      Roll      Twist";

/// Watson-Crick complement, as pair codes.
fn complement_pair_name(base: char) -> Result<&'static str> {
    match base.to_ascii_uppercase() {
        'A' => Ok("A-T"),
        'T' => Ok("T-A"),
        'G' => Ok("G-C"),
        'C' => Ok("C-G"),
        other => Err(DnaParamError::UnknownBase(other)),
    }
}

/// Serializes a parameter table (as produced by the forward analysis)
/// into a `rebuild` input file: pair-count header, parameter-count line,
/// column-header comment, then one fixed-width row per pair. Null
/// numeric cells (the first row's step parameters) are written as zero.
///
/// With `new_seq` the pair-name column is regenerated from the
/// replacement sequence instead of reusing the original names.
pub fn write_bp_step(df: &DataFrame, path: &Path, new_seq: Option<&[char]>) -> Result<()> {
    let n = df.height();
    if let Some(seq) = new_seq {
        if seq.len() != n {
            return Err(DnaParamError::StrandImbalance(format!(
                "replacement sequence has {} bases for {} pairs",
                seq.len(),
                n
            )));
        }
    }

    let names = df.column(BP_NAME_COL)?.str()?.clone();
    let mut numeric = Vec::with_capacity(12);
    for col in PAIR_PARAM_COLS.iter().chain(STEP_PARAM_COLS.iter()) {
        numeric.push(df.column(col)?.cast(&DataType::Float64)?);
    }

    let mut out = String::new();
    out.push_str(&format!("  {n} # base-pairs\n"));
    out.push_str(PARAM_COUNT_LINE);
    out.push('\n');
    out.push_str(PARAM_HEADER);
    out.push('\n');

    for i in 0..n {
        let name = match new_seq {
            Some(seq) => complement_pair_name(seq[i])?.to_string(),
            None => names
                .get(i)
                .ok_or_else(|| {
                    DnaParamError::format("parameter table", format!("pair name in row {i}"))
                })?
                .to_string(),
        };
        out.push_str(&format!("{name:<4}"));
        for col in &numeric {
            let value = col.f64()?.get(i).unwrap_or(0.0);
            out.push_str(&format!(" {value:>9.3}"));
        }
        out.push('\n');
    }
    fs::write(path, out)?;
    Ok(())
}

/// Writes the parameter file, stages the standard B-DNA geometry, runs
/// `rebuild -atomic` and relocates the reconstructed PDB to `dest`.
pub fn build_dna(
    cfg: &ToolConfig,
    workdir: &Path,
    df: &DataFrame,
    dest: &Path,
    new_seq: Option<&[char]>,
) -> Result<()> {
    let stem = dest
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "rebuilt".to_string());
    let par_name = format!("{stem}.par");
    write_bp_step(df, &workdir.join(&par_name), new_seq)?;

    run_cp_std(cfg, workdir)?;
    let out_name = format!("{par_name}.pdb");
    run_rebuild(cfg, workdir, &par_name, &out_name)?;

    let produced = workdir.join(&out_name);
    if fs::rename(&produced, dest).is_err() {
        // scratch dir and destination may live on different filesystems
        fs::copy(&produced, dest)?;
        fs::remove_file(&produced)?;
    }
    info!("Rebuilt model written to {:?}", dest);
    Ok(())
}

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{require_output_file, run_logged};
use crate::config::ToolConfig;
use crate::error::{DnaParamError, Result};

/// Bundled van der Waals radii sets for NACCESS, matched to common force
/// fields. Resolved against `ToolConfig::vdw_radii_dir`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VdwSet {
    CharmmRmin,
    CharmmSigma,
    AmberRmin,
    AmberSigma,
}

impl VdwSet {
    pub fn file_name(self) -> &'static str {
        match self {
            VdwSet::CharmmRmin => "vdw_charmm36_rmin.radii",
            VdwSet::CharmmSigma => "vdw_charmm36_sigma.radii",
            VdwSet::AmberRmin => "vdw_parm10_rmin.radii",
            VdwSet::AmberSigma => "vdw_parm10_sigma.radii",
        }
    }
}

/// Per-call knobs of a SASA run; probe radius and slice width come from
/// the config.
#[derive(Debug, Clone, Default)]
pub struct SasaOptions {
    /// Run `reduce` first to add hydrogens to the written PDB.
    pub add_hydrogens: bool,
    /// Ask NACCESS for contact areas instead of accessible areas.
    pub contact_area: bool,
    /// Explicit radii file; takes precedence over `vdw_set`.
    pub vdw_file: Option<PathBuf>,
    pub vdw_set: Option<VdwSet>,
}

pub fn resolve_vdw_file(cfg: &ToolConfig, opts: &SasaOptions) -> Option<PathBuf> {
    if let Some(file) = &opts.vdw_file {
        return Some(file.clone());
    }
    match (&cfg.vdw_radii_dir, opts.vdw_set) {
        (Some(dir), Some(set)) => Some(dir.join(set.file_name())),
        _ => None,
    }
}

/// `reduce -NOFLIP <pdb>` with stdout redirected into `pdb_out`. reduce
/// is known to exit nonzero even after writing a usable model, so only
/// the produced file decides success.
pub fn run_reduce(cfg: &ToolConfig, workdir: &Path, pdb_in: &str, pdb_out: &str) -> Result<()> {
    let reduce = cfg.reduce.as_ref().ok_or_else(|| DnaParamError::ExternalToolFailure {
        tool: "reduce".into(),
        status: "not configured".into(),
        stderr: "add_hydrogens requested but no reduce executable in the config".into(),
    })?;
    info!("Adding hydrogens to {pdb_in} with reduce");
    let out_file = File::create(workdir.join(pdb_out))?;
    let output = Command::new(reduce)
        .current_dir(workdir)
        .arg("-NOFLIP")
        .arg(pdb_in)
        .stdin(Stdio::null())
        .stdout(Stdio::from(out_file))
        .stderr(Stdio::piped())
        .output()?;
    debug!("reduce log:\n{}", String::from_utf8_lossy(&output.stderr));
    if !output.status.success() {
        warn!("reduce exited with {:?}; checking its output anyway", output.status);
    }
    require_output_file(&workdir.join(pdb_out), "reduce")
}

/// Runs NACCESS on a PDB inside `workdir` and returns the path of the
/// `.asa` report. Hydrogens are always included (`-y`); slicing uses the
/// configured width.
pub fn run_naccess(cfg: &ToolConfig, workdir: &Path, pdb_name: &str, opts: &SasaOptions) -> Result<PathBuf> {
    info!("Running NACCESS on {pdb_name}");
    let mut cmd = Command::new(&cfg.naccess);
    cmd.current_dir(workdir)
        .arg(pdb_name)
        .arg("-p")
        .arg(format!("{}", cfg.probe_radius));
    if let Some(vdw) = resolve_vdw_file(cfg, opts) {
        cmd.arg("-r").arg(vdw);
    }
    cmd.arg("-y").arg("-z").arg(format!("{}", cfg.slice_width));
    if opts.contact_area {
        cmd.arg("-c");
    }
    run_logged(&mut cmd, "naccess")?;

    let stem = pdb_name.strip_suffix(".pdb").unwrap_or(pdb_name);
    let asa = workdir.join(format!("{stem}.asa"));
    require_output_file(&asa, "naccess")?;
    Ok(asa)
}

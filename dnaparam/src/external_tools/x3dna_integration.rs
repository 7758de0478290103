use std::fs;
use std::path::Path;
use std::process::Command;

use tracing::info;

use super::{require_output_file, run_logged};
use crate::config::ToolConfig;
use crate::error::Result;

/// Fixed conventional names `analyze` writes into its working directory.
pub const REF_FRAMES_FILE: &str = "ref_frames.dat";
pub const BP_STEP_FILE: &str = "bp_step.par";
pub const TORSION_FILE: &str = "backbone.tor";

fn x3dna_cmd(exe: &Path, cfg: &ToolConfig, workdir: &Path) -> Command {
    let mut cmd = Command::new(exe);
    cmd.current_dir(workdir).env("X3DNA", &cfg.x3dna_dir);
    cmd
}

/// `find_pair <pdb> <out>` — detects base pairing and writes the pairing
/// report under `out_name`.
pub fn run_find_pair(cfg: &ToolConfig, workdir: &Path, pdb_name: &str, out_name: &str) -> Result<()> {
    info!("Running find_pair on {pdb_name}");
    run_logged(
        x3dna_cmd(&cfg.find_pair, cfg, workdir).arg(pdb_name).arg(out_name),
        "find_pair",
    )?;
    require_output_file(&workdir.join(out_name), "find_pair")
}

/// `analyze <input>` — writes `ref_frames.dat` and `bp_step.par` as side
/// effects.
pub fn run_analyze(cfg: &ToolConfig, workdir: &Path, input_name: &str) -> Result<()> {
    info!("Running analyze on {input_name}");
    run_logged(x3dna_cmd(&cfg.analyze, cfg, workdir).arg(input_name), "analyze")?;
    require_output_file(&workdir.join(REF_FRAMES_FILE), "analyze")?;
    require_output_file(&workdir.join(BP_STEP_FILE), "analyze")
}

/// `analyze -t=<tor> <pdb>` — writes the torsion report. This invocation
/// deletes files left by a previous plain `analyze` run, so everything
/// from that run must be parsed before calling this.
pub fn run_analyze_torsions(cfg: &ToolConfig, workdir: &Path, pdb_name: &str) -> Result<()> {
    info!("Running analyze -t on {pdb_name}");
    run_logged(
        x3dna_cmd(&cfg.analyze, cfg, workdir)
            .arg(format!("-t={TORSION_FILE}"))
            .arg(pdb_name),
        "analyze -t",
    )?;
    require_output_file(&workdir.join(TORSION_FILE), "analyze -t")
}

/// `x3dna_utils cp_std BDNA` — stages the standard B-DNA geometry files
/// `rebuild` needs.
pub fn run_cp_std(cfg: &ToolConfig, workdir: &Path) -> Result<()> {
    run_logged(
        x3dna_cmd(&cfg.x3dna_utils, cfg, workdir).arg("cp_std").arg("BDNA"),
        "x3dna_utils",
    )?;
    Ok(())
}

/// `rebuild -atomic <par> <pdb>` — reconstructs an atomic model from a
/// step-parameter file.
pub fn run_rebuild(cfg: &ToolConfig, workdir: &Path, par_name: &str, out_name: &str) -> Result<()> {
    info!("Running rebuild on {par_name}");
    run_logged(
        x3dna_cmd(&cfg.rebuild, cfg, workdir)
            .arg("-atomic")
            .arg(par_name)
            .arg(out_name),
        "rebuild",
    )?;
    require_output_file(&workdir.join(out_name), "rebuild")
}

/// Copies the reference pairing report, substituting the reference run id
/// with the current one, so that `analyze` reads the new coordinates
/// under the original pairing topology. Returns the derived file name.
pub fn derive_reference_input(workdir: &Path, ref_id: &str, cur_id: &str) -> Result<String> {
    let text = fs::read_to_string(workdir.join(ref_id))?;
    let out_name = format!("{cur_id}.fr");
    fs::write(workdir.join(&out_name), text.replace(ref_id, cur_id))?;
    Ok(out_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_input_substitutes_run_id() {
        let dir = tempfile::tempdir().unwrap();
        let ref_id = "run-0001";
        fs::write(
            dir.path().join(ref_id),
            "header run-0001.pdb\n....>A:...12_: run-0001\n",
        )
        .unwrap();
        let derived = derive_reference_input(dir.path(), ref_id, "run-0002").unwrap();
        assert_eq!(derived, "run-0002.fr");
        let text = fs::read_to_string(dir.path().join(&derived)).unwrap();
        assert!(text.contains("run-0002.pdb"));
        assert!(!text.contains("run-0001"));
        // line structure must survive the substitution
        assert_eq!(text.lines().count(), 2);
    }
}

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, error, info};

use super::require_output_file;
use crate::config::ToolConfig;
use crate::error::{DnaParamError, Result};

/// Curves+ is driven through stdin: a namelist block naming the input and
/// listing files, then the strand layout. Strand 1 runs 1..L in file
/// order, strand 2 runs 2L..L+1, i.e. antiparallel.
pub(crate) fn curves_script(pdb_name: &str, lib: &str, strand_len: usize) -> String {
    format!(
        " &inp file={pdb}, lis={pdb},\n lib={lib}\n &end\n2 1 -1 0 0\n1:{len}\n{rev_from}:{rev_to}\n",
        pdb = pdb_name,
        lib = lib,
        len = strand_len,
        rev_from = strand_len * 2,
        rev_to = strand_len + 1,
    )
}

/// Runs Curves+ on a PDB inside `workdir` and returns the path of the
/// `.lis` report it produced.
pub fn run_curves(cfg: &ToolConfig, workdir: &Path, pdb_name: &str, strand_len: usize) -> Result<PathBuf> {
    info!("Running Curves+ on {pdb_name} (strand length {strand_len})");
    let script = curves_script(pdb_name, &cfg.curves_lib.to_string_lossy(), strand_len);
    debug!("Curves+ stdin:\n{script}");

    let mut child = Command::new(&cfg.curves)
        .current_dir(workdir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| DnaParamError::ExternalToolFailure {
            tool: "Cur+".into(),
            status: "spawn failed".into(),
            stderr: e.to_string(),
        })?;
    if let Some(stdin) = child.stdin.take() {
        let mut stdin = stdin;
        stdin.write_all(script.as_bytes())?;
    }
    let output = child.wait_with_output()?;
    debug!("Cur+ stdout:\n{}", String::from_utf8_lossy(&output.stdout));
    debug!("Cur+ stderr:\n{}", String::from_utf8_lossy(&output.stderr));
    if !output.status.success() {
        error!("Cur+ exited with {:?}", output.status);
        return Err(DnaParamError::ExternalToolFailure {
            tool: "Cur+".into(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    let lis = workdir.join(format!("{pdb_name}.lis"));
    require_output_file(&lis, "Cur+")?;
    Ok(lis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_layout_and_strand_ranges() {
        let script = curves_script("model.pdb", "/opt/curves/standard", 147);
        let lines: Vec<&str> = script.lines().collect();
        assert_eq!(lines[0], " &inp file=model.pdb, lis=model.pdb,");
        assert_eq!(lines[1], " lib=/opt/curves/standard");
        assert_eq!(lines[2], " &end");
        assert_eq!(lines[3], "2 1 -1 0 0");
        assert_eq!(lines[4], "1:147");
        assert_eq!(lines[5], "294:148");
    }
}

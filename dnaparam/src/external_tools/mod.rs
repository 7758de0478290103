//! Blocking wrappers around the external executables. Every invocation
//! waits for the child to exit and captures both streams before anything
//! downstream runs; there is no timeout and no retry.

pub mod curves_integration;
pub mod naccess_integration;
pub mod x3dna_integration;

use std::path::Path;
use std::process::{Command, Output};

use tracing::{debug, error};

use crate::error::{DnaParamError, Result};

/// Runs a fully configured command to completion. Nonzero exit is fatal.
pub(crate) fn run_logged(cmd: &mut Command, tool: &str) -> Result<Output> {
    debug!("About to spawn: {:?}", cmd);
    let output = cmd.output().map_err(|e| DnaParamError::ExternalToolFailure {
        tool: tool.to_string(),
        status: "spawn failed".into(),
        stderr: e.to_string(),
    })?;
    debug!("{tool} stdout:\n{}", String::from_utf8_lossy(&output.stdout));
    debug!("{tool} stderr:\n{}", String::from_utf8_lossy(&output.stderr));
    if !output.status.success() {
        error!("{tool} exited with {:?}", output.status);
        return Err(DnaParamError::ExternalToolFailure {
            tool: tool.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(output)
}

/// An exit status of 0 with nothing written is still a failure: there is
/// no geometry to parse.
pub(crate) fn require_output_file(path: &Path, tool: &str) -> Result<()> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.len() > 0 => Ok(()),
        _ => Err(DnaParamError::ExternalToolFailure {
            tool: tool.to_string(),
            status: "completed".into(),
            stderr: format!("expected output file {path:?} is missing or empty"),
        }),
    }
}

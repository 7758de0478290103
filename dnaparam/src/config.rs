use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Immutable bundle of everything the pipeline needs to know about its
/// environment: the external executables, the Curves+ standard library and
/// the NACCESS defaults. Built once, passed by reference into every run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// X3DNA installation root; exported as the `X3DNA` environment
    /// variable for every X3DNA child process.
    pub x3dna_dir: PathBuf,
    pub find_pair: PathBuf,
    pub analyze: PathBuf,
    pub rebuild: PathBuf,
    pub x3dna_utils: PathBuf,

    /// The Curves+ executable (`Cur+`).
    pub curves: PathBuf,
    /// Directory with the Curves+ standard geometry library.
    pub curves_lib: PathBuf,

    pub naccess: PathBuf,
    /// Hydrogen-adding tool (phenix.reduce or Amber reduce), only needed
    /// when SASA runs ask for hydrogens to be added.
    pub reduce: Option<PathBuf>,
    /// Directory with alternative van der Waals radii files for NACCESS.
    pub vdw_radii_dir: Option<PathBuf>,

    #[serde(default = "default_probe_radius")]
    pub probe_radius: f64,
    #[serde(default = "default_slice_width")]
    pub slice_width: f64,
}

fn default_probe_radius() -> f64 {
    1.4
}

fn default_slice_width() -> f64 {
    0.05
}

impl ToolConfig {
    /// Derives all X3DNA binary paths from an installation directory.
    pub fn from_x3dna_dir(
        x3dna_dir: impl Into<PathBuf>,
        curves: impl Into<PathBuf>,
        curves_lib: impl Into<PathBuf>,
        naccess: impl Into<PathBuf>,
    ) -> Self {
        let x3dna_dir = x3dna_dir.into();
        let bin = x3dna_dir.join("bin");
        ToolConfig {
            find_pair: bin.join("find_pair"),
            analyze: bin.join("analyze"),
            rebuild: bin.join("rebuild"),
            x3dna_utils: bin.join("x3dna_utils"),
            x3dna_dir,
            curves: curves.into(),
            curves_lib: curves_lib.into(),
            naccess: naccess.into(),
            reduce: None,
            vdw_radii_dir: None,
            probe_radius: default_probe_radius(),
            slice_width: default_slice_width(),
        }
    }

    /// Locates the executables on `PATH`. Convenient for driver scripts;
    /// real deployments usually load an explicit JSON config instead.
    pub fn discover() -> anyhow::Result<Self> {
        let find_pair = which::which("find_pair")?;
        let x3dna_dir = find_pair
            .parent()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        debug!("Discovered X3DNA under {:?}", x3dna_dir);
        Ok(ToolConfig {
            x3dna_dir,
            find_pair,
            analyze: which::which("analyze")?,
            rebuild: which::which("rebuild")?,
            x3dna_utils: which::which("x3dna_utils")?,
            curves: which::which("Cur+")?,
            curves_lib: PathBuf::from("."),
            naccess: which::which("naccess")?,
            reduce: which::which("phenix.reduce").ok(),
            vdw_radii_dir: None,
            probe_radius: default_probe_radius(),
            slice_width: default_slice_width(),
        })
    }

    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x3dna_binaries_derived_from_root() {
        let cfg = ToolConfig::from_x3dna_dir("/opt/x3dna", "/usr/bin/Cur+", "/opt/curves/standard", "/usr/bin/naccess");
        assert_eq!(cfg.analyze, PathBuf::from("/opt/x3dna/bin/analyze"));
        assert_eq!(cfg.find_pair, PathBuf::from("/opt/x3dna/bin/find_pair"));
        assert_eq!(cfg.probe_radius, 1.4);
        assert_eq!(cfg.slice_width, 0.05);
    }

    #[test]
    fn json_round_trip() {
        let cfg = ToolConfig::from_x3dna_dir("/opt/x3dna", "/usr/bin/Cur+", "/opt/curves/standard", "/usr/bin/naccess");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        cfg.write_json(&path).unwrap();
        let back = ToolConfig::from_json_file(&path).unwrap();
        assert_eq!(back.analyze, cfg.analyze);
        assert_eq!(back.probe_radius, cfg.probe_radius);
    }
}

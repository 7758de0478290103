use std::path::Path;

use crate::error::Result;

// ─── Column naming ───────────────────────────────────────────────────────────
// All parameter names follow the X3DNA/Curves+ reports they come from, so
// downstream analysis scripts can keep using the familiar vocabulary.

pub const BP_NAME_COL: &str = "BPname";
pub const BP_NUM_COL: &str = "BPnum";
pub const PAIRING_COL: &str = "Pairing";

pub const PAIR_PARAM_COLS: [&str; 6] = ["Shear", "Stretch", "Stagger", "Buckle", "Prop-Tw", "Opening"];
pub const STEP_PARAM_COLS: [&str; 6] = ["Shift", "Slide", "Rise", "Tilt", "Roll", "Twist"];

pub const TORSION_ANGLE_COLS: [&str; 8] =
    ["alpha", "beta", "gamma", "delta", "epsilon", "zeta", "e-z", "chi"];
pub const PUCKER_COLS: [&str; 8] = ["v0", "v1", "v2", "v3", "v4", "tm", "P", "Puckering"];

/// Deoxyribonucleotide residue names accepted by the SASA aggregation.
pub const DNA_RESNAMES: [&str; 4] = ["DA", "DC", "DG", "DT"];

// ─── Parsed records ──────────────────────────────────────────────────────────

/// Center of a base pair's local reference frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Six intra-pair parameters, in X3DNA column order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairParams {
    pub shear: f64,
    pub stretch: f64,
    pub stagger: f64,
    pub buckle: f64,
    pub prop_tw: f64,
    pub opening: f64,
}

impl PairParams {
    pub fn as_array(&self) -> [f64; 6] {
        [self.shear, self.stretch, self.stagger, self.buckle, self.prop_tw, self.opening]
    }
}

/// Six rigid-body step parameters describing the transform from the
/// preceding base pair. The first pair of a duplex has no predecessor, so
/// its record carries `None` here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepParams {
    pub shift: f64,
    pub slide: f64,
    pub rise: f64,
    pub tilt: f64,
    pub roll: f64,
    pub twist: f64,
}

impl StepParams {
    pub fn as_array(&self) -> [f64; 6] {
        [self.shift, self.slide, self.rise, self.tilt, self.roll, self.twist]
    }
}

/// One row of the bp_step.par report: the two-letter pair code (e.g. "A-T",
/// "G+C") plus its geometric parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BasePairParams {
    pub name: String,
    pub pair: PairParams,
    pub step: Option<StepParams>,
}

/// Backbone torsion angles of one nucleotide. `None` marks angles the tool
/// printed as `---` (chain termini).
#[derive(Debug, Clone, PartialEq)]
pub struct TorsionRow {
    pub syn: Option<String>,
    pub angles: [Option<f64>; 8],
}

/// Sugar ring conformation of one nucleotide: the five endocyclic torsions,
/// amplitude `tm`, phase `P` and the discrete pucker class.
#[derive(Debug, Clone, PartialEq)]
pub struct PuckerRow {
    pub torsions: [Option<f64>; 7],
    pub puckering: Option<String>,
}

/// One atom of a NACCESS `.asa` report.
#[derive(Debug, Clone, PartialEq)]
pub struct AsaAtom {
    pub record: String,
    pub atnum: i64,
    pub name: String,
    pub resname: String,
    pub chain: String,
    pub resid: i64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub sasa: f64,
    pub vdw: f64,
}

// ─── Structure access ────────────────────────────────────────────────────────

/// The structural-model side of the pipeline. The caller owns atom
/// selection; the pipeline only ever asks for a PDB snapshot of the
/// selected duplex and for its strand length.
///
/// Atom and residue naming must already satisfy the external tools
/// (OP1/OP2 instead of O1P/O2P and so on); that relabeling belongs to the
/// implementor, not to this crate.
pub trait StructureSource {
    /// Writes the selected atoms as PDB to `path`.
    fn write_pdb(&self, path: &Path) -> Result<()>;

    /// Number of nucleotides in one strand of the duplex.
    fn strand_len(&self) -> usize;
}

/// Trivial source backed by an already-written PDB file. Used by the
/// driver binary and handy for tests.
#[derive(Debug, Clone)]
pub struct PdbFileSource {
    pub path: std::path::PathBuf,
    pub strand_len: usize,
}

impl StructureSource for PdbFileSource {
    fn write_pdb(&self, path: &Path) -> Result<()> {
        std::fs::copy(&self.path, path)?;
        Ok(())
    }

    fn strand_len(&self) -> usize {
        self.strand_len
    }
}

//! Orchestration of one analysis run: a scratch directory, unique file
//! tags, the external-tool sequence and the column-wise assembly of the
//! parsed reports into one per-base-pair table.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use polars::prelude::*;
use tempfile::TempDir;
use tracing::info;

use crate::config::ToolConfig;
use crate::error::{DnaParamError, Result};
use crate::external_tools::curves_integration::run_curves;
use crate::external_tools::naccess_integration::{run_naccess, run_reduce, SasaOptions};
use crate::external_tools::x3dna_integration::{
    derive_reference_input, run_analyze, run_analyze_torsions, run_find_pair, BP_STEP_FILE,
    REF_FRAMES_FILE, TORSION_FILE,
};
use crate::models::{AsaAtom, BasePairParams, Point3, StructureSource, BP_NUM_COL, PAIRING_COL};
use crate::rebuild::build_dna;
use crate::report_parsing::bp_step::{bp_step_to_dataframe, parse_bp_step};
use crate::report_parsing::groove::{parse_lis, LisTables};
use crate::report_parsing::pairing::check_pairing;
use crate::report_parsing::ref_frames::{centers_to_dataframe, parse_ref_frames};
use crate::report_parsing::sasa::{full_sasa_table, parse_asa, sugar_sasa_table};
use crate::report_parsing::torsion::parse_tor_param;

/// One analysis session. Owns a scratch directory for the lifetime of
/// the value; every structure written into it gets a session-unique tag,
/// so a reference run and any number of trajectory frames can coexist.
/// The directory and everything in it disappear on drop.
pub struct AnalysisRun {
    cfg: ToolConfig,
    scratch: TempDir,
    next_tag: AtomicU64,
}

impl AnalysisRun {
    pub fn new(cfg: ToolConfig) -> Result<Self> {
        let scratch = TempDir::new()?;
        info!("Analysis scratch directory: {:?}", scratch.path());
        Ok(AnalysisRun { cfg, scratch, next_tag: AtomicU64::new(1) })
    }

    pub fn workdir(&self) -> &Path {
        self.scratch.path()
    }

    fn next_tag(&self) -> String {
        format!("dna-{:04}", self.next_tag.fetch_add(1, Ordering::Relaxed))
    }

    /// Writes the selected structure into the scratch dir under a fresh
    /// tag. Returns (tag, pdb file name).
    fn write_structure(&self, source: &dyn StructureSource) -> Result<(String, String)> {
        let tag = self.next_tag();
        let pdb = format!("{tag}.pdb");
        info!("Writing coordinates to {pdb}");
        source.write_pdb(&self.workdir().join(&pdb))?;
        Ok((tag, pdb))
    }

    /// Runs base-pair detection and returns the run id of the pairing
    /// report. Detecting pairs on a reference structure first, then
    /// passing that id to [`analyze`](Self::analyze) for every
    /// trajectory frame, keeps the row count constant even when pairing
    /// is transiently lost.
    pub fn find_pair(&self, source: &dyn StructureSource) -> Result<String> {
        let (tag, pdb) = self.write_structure(source)?;
        run_find_pair(&self.cfg, self.workdir(), &pdb, &tag)?;
        Ok(tag)
    }

    /// Phase 1 of the forward analysis: pairing detection on the current
    /// structure, geometry analysis under the reference topology, and
    /// in-memory extraction of everything the torsion invocation would
    /// clobber.
    fn analyze_phase1(
        &self,
        source: &dyn StructureSource,
        ref_id: &str,
    ) -> Result<(String, Vec<Point3>, Vec<BasePairParams>, Vec<bool>)> {
        let (cur_id, pdb) = self.write_structure(source)?;
        run_find_pair(&self.cfg, self.workdir(), &pdb, &cur_id)?;

        let derived = derive_reference_input(self.workdir(), ref_id, &cur_id)?;
        run_analyze(&self.cfg, self.workdir(), &derived)?;

        let centers = parse_ref_frames(&self.workdir().join(REF_FRAMES_FILE))?;
        let bp_rows = parse_bp_step(&self.workdir().join(BP_STEP_FILE))?;
        let pairing = check_pairing(&self.workdir().join(ref_id), &self.workdir().join(&cur_id))?;
        Ok((pdb, centers, bp_rows, pairing))
    }

    /// Full forward analysis against a reference pairing run: frame
    /// centers, pair/step parameters, pairing flags and strand-resolved
    /// torsions, column-concatenated into one table with `BPnum` = 1..N
    /// assigned by final row position.
    pub fn analyze(&self, source: &dyn StructureSource, ref_id: &str) -> Result<DataFrame> {
        let (pdb, centers, bp_rows, pairing) = self.analyze_phase1(source, ref_id)?;

        // phase 2: this deletes phase-1 files, which are already parsed
        run_analyze_torsions(&self.cfg, self.workdir(), &pdb)?;
        let torsion = parse_tor_param(&self.workdir().join(TORSION_FILE))?;

        assemble_analysis(&centers, &bp_rows, &pairing, torsion)
    }

    /// Reduced forward analysis returning only the pair/step parameter
    /// table (plus `BPnum`). Cheaper when torsions, frames and pairing
    /// flags are not needed.
    pub fn analyze_bp_step(&self, source: &dyn StructureSource, ref_id: &str) -> Result<DataFrame> {
        let (_pdb, _centers, bp_rows, _pairing) = self.analyze_phase1(source, ref_id)?;
        let mut df = bp_step_to_dataframe(&bp_rows)?;
        append_bp_num(&mut df)?;
        Ok(df)
    }

    /// Groove and backbone geometry via Curves+.
    pub fn groove_analysis(&self, source: &dyn StructureSource) -> Result<LisTables> {
        let (_tag, pdb) = self.write_structure(source)?;
        let lis = run_curves(&self.cfg, self.workdir(), &pdb, source.strand_len())?;
        parse_lis(&lis)
    }

    fn sasa_atoms(&self, source: &dyn StructureSource, opts: &SasaOptions) -> Result<Vec<AsaAtom>> {
        let (tag, pdb) = self.write_structure(source)?;
        let final_pdb = if opts.add_hydrogens {
            let with_h = format!("{tag}_wH.pdb");
            run_reduce(&self.cfg, self.workdir(), &pdb, &with_h)?;
            with_h
        } else {
            pdb
        };
        let asa = run_naccess(&self.cfg, self.workdir(), &final_pdb, opts)?;
        parse_asa(&asa)
    }

    /// Per-base-pair SASA of every sugar hydrogen plus residue totals.
    pub fn sugar_sasa(&self, source: &dyn StructureSource, opts: &SasaOptions) -> Result<DataFrame> {
        sugar_sasa_table(&self.sasa_atoms(source, opts)?)
    }

    /// Per-base-pair residue SASA totals only.
    pub fn full_sasa(&self, source: &dyn StructureSource, opts: &SasaOptions) -> Result<DataFrame> {
        full_sasa_table(&self.sasa_atoms(source, opts)?)
    }

    /// Reconstructs an atomic model from a parameter table, writing the
    /// PDB to `dest`. See [`crate::rebuild::build_dna`].
    pub fn rebuild(&self, df: &DataFrame, dest: &Path, new_seq: Option<&[char]>) -> Result<()> {
        build_dna(&self.cfg, self.workdir(), df, dest, new_seq)
    }
}

/// Column-wise concatenation of the four parsed reports. All of them
/// describe the same base pairs under the reference topology, so their
/// row counts must agree; a disagreement would silently misalign the
/// strand-2 columns.
pub fn assemble_analysis(
    centers: &[Point3],
    bp_rows: &[BasePairParams],
    pairing: &[bool],
    torsion: DataFrame,
) -> Result<DataFrame> {
    let n = bp_rows.len();
    if centers.len() != n || pairing.len() != n || torsion.height() != n {
        return Err(DnaParamError::StrandImbalance(format!(
            "row counts disagree: {} frame centers, {} parameter rows, {} pairing flags, {} torsion rows",
            centers.len(),
            n,
            pairing.len(),
            torsion.height()
        )));
    }

    let mut df = centers_to_dataframe(centers)?;
    df.hstack_mut(bp_step_to_dataframe(bp_rows)?.get_columns())?;
    df.hstack_mut(&[Column::new(PAIRING_COL.into(), pairing.to_vec())])?;
    df.hstack_mut(torsion.get_columns())?;
    append_bp_num(&mut df)?;
    Ok(df)
}

fn append_bp_num(df: &mut DataFrame) -> Result<()> {
    let nums: Vec<i64> = (1..=df.height() as i64).collect();
    df.hstack_mut(&[Column::new(BP_NUM_COL.into(), nums)])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PairParams, StepParams};
    use crate::report_parsing::torsion::{parse_torsion_blocks_str, torsion_to_dataframe};

    fn bp_row(name: &str, first: bool) -> BasePairParams {
        BasePairParams {
            name: name.into(),
            pair: PairParams { shear: 0.1, stretch: 0.2, stagger: 0.3, buckle: 1.0, prop_tw: 2.0, opening: 3.0 },
            step: if first {
                None
            } else {
                Some(StepParams { shift: 0.0, slide: 0.1, rise: 3.3, tilt: 0.2, roll: 0.3, twist: 34.0 })
            },
        }
    }

    fn torsion_df(rows: usize) -> DataFrame {
        // minimal torsion report with `rows` base pairs (2*rows nucleotides)
        let mut text = String::from("title\n");
        for _ in 0..19 {
            text.push_str("preamble preamble preamble preamble preamble preamble\n");
        }
        text.push_str("base alpha beta gamma delta epsilon zeta e-z chi\n");
        for i in 0..rows * 2 {
            text.push_str(&format!(
                "{} A A-T 1.0 2.0 3.0 4.0 5.0 6.0 7.0 8.0\n",
                i + 1
            ));
        }
        text.push_str("****\n****\n");
        for _ in 0..18 {
            text.push_str("preamble preamble preamble preamble preamble preamble\n");
        }
        text.push_str("base v0 v1 v2 v3 v4 tm P Puckering\n");
        for i in 0..rows * 2 {
            text.push_str(&format!(
                "{} A 1.0 2.0 3.0 4.0 5.0 6.0 150.0 C2'-endo\n",
                i + 1
            ));
        }
        let (a, p) = parse_torsion_blocks_str(&text, "backbone.tor").unwrap();
        torsion_to_dataframe(&a, &p, "backbone.tor").unwrap()
    }

    #[test]
    fn bp_num_is_sequential_from_one() {
        let centers = vec![Point3 { x: 0.0, y: 0.0, z: 0.0 }; 2];
        let rows = vec![bp_row("A-T", true), bp_row("G-C", false)];
        let df = assemble_analysis(&centers, &rows, &[true, true], torsion_df(2)).unwrap();
        assert_eq!(df.height(), 2);
        let nums = df.column(BP_NUM_COL).unwrap().i64().unwrap();
        assert_eq!(nums.get(0), Some(1));
        assert_eq!(nums.get(1), Some(2));
        let pairing = df.column(PAIRING_COL).unwrap().bool().unwrap();
        assert_eq!(pairing.get(1), Some(true));
        assert!(df.column("alpha_2").is_ok());
        assert!(df.column("x").is_ok());
    }

    #[test]
    fn misaligned_row_counts_are_fatal() {
        let centers = vec![Point3 { x: 0.0, y: 0.0, z: 0.0 }; 3];
        let rows = vec![bp_row("A-T", true), bp_row("G-C", false)];
        let err = assemble_analysis(&centers, &rows, &[true, true], torsion_df(2)).unwrap_err();
        assert!(matches!(err, DnaParamError::StrandImbalance(_)));
    }

    #[test]
    fn lost_pairing_keeps_reference_row_count() {
        let centers = vec![Point3 { x: 0.0, y: 0.0, z: 0.0 }; 2];
        let rows = vec![bp_row("A-T", true), bp_row("G-C", false)];
        let df = assemble_analysis(&centers, &rows, &[true, false], torsion_df(2)).unwrap();
        let pairing = df.column(PAIRING_COL).unwrap().bool().unwrap();
        assert_eq!(pairing.get(0), Some(true));
        assert_eq!(pairing.get(1), Some(false));
    }
}

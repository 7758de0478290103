//! NACCESS `.asa` report — one whitespace-delimited line per atom with
//! eleven fields. Per-residue values are folded into one row per base
//! pair: strand-1 residues in ascending order matched against strand-2
//! residues in descending order, the same reversal convention the torsion
//! tables use.

use std::collections::BTreeMap;
use std::path::Path;

use polars::prelude::*;

use crate::error::{DnaParamError, Result};
use crate::helper_functions::{read_report, tokens};
use crate::models::{AsaAtom, DNA_RESNAMES};

/// Sugar hydrogens reported individually by the sugar-SASA table.
const SUGAR_HYDROGENS: [&str; 7] = ["H1'", "H2'", "H2''", "H3'", "H4'", "H5'", "H5''"];

pub fn parse_asa(path: &Path) -> Result<Vec<AsaAtom>> {
    let text = read_report(path)?;
    parse_asa_str(&text, &path.to_string_lossy())
}

pub fn parse_asa_str(text: &str, file: &str) -> Result<Vec<AsaAtom>> {
    let mut atoms = Vec::new();
    for line in text.lines() {
        let fields = tokens(line);
        if fields.is_empty() {
            continue;
        }
        if fields.len() != 11 {
            return Err(DnaParamError::format(
                file,
                format!("11-column atom row, got {line:?}"),
            ));
        }
        let num = |idx: usize| -> Result<f64> {
            fields[idx].parse().map_err(|_| {
                DnaParamError::format(file, format!("numeric field {idx}, got {:?}", fields[idx]))
            })
        };
        atoms.push(AsaAtom {
            record: fields[0].to_string(),
            atnum: num(1)? as i64,
            name: fields[2].to_string(),
            resname: fields[3].to_string(),
            chain: fields[4].to_string(),
            resid: num(5)? as i64,
            x: num(6)?,
            y: num(7)?,
            z: num(8)?,
            sasa: num(9)?,
            vdw: num(10)?,
        });
    }
    Ok(atoms)
}

type ResidueMap<'a> = BTreeMap<i64, Vec<&'a AsaAtom>>;

/// Splits the DNA atoms into the two strands (chains, sorted) and groups
/// each by residue id.
fn strand_residues(atoms: &[AsaAtom]) -> Result<(ResidueMap<'_>, ResidueMap<'_>)> {
    let mut chains: BTreeMap<&str, ResidueMap> = BTreeMap::new();
    for atom in atoms {
        if !DNA_RESNAMES.contains(&atom.resname.as_str()) {
            continue;
        }
        chains
            .entry(atom.chain.as_str())
            .or_default()
            .entry(atom.resid)
            .or_default()
            .push(atom);
    }
    let mut groups = chains.into_values();
    match (groups.next(), groups.next()) {
        (Some(one), Some(two)) => Ok((one, two)),
        _ => Err(DnaParamError::StrandImbalance(
            "expected two DNA chains in the .asa report".into(),
        )),
    }
}

/// Ascending strand-1 residue ids zipped against descending strand-2 ids;
/// unequal strand lengths corrupt the pairing and are fatal.
fn paired_residues<'a>(
    one: &'a ResidueMap<'a>,
    two: &'a ResidueMap<'a>,
) -> Result<Vec<(&'a [&'a AsaAtom], &'a [&'a AsaAtom])>> {
    if one.len() != two.len() {
        return Err(DnaParamError::StrandImbalance(format!(
            "strand 1 has {} residues, strand 2 has {}",
            one.len(),
            two.len()
        )));
    }
    Ok(one
        .values()
        .map(Vec::as_slice)
        .zip(two.values().rev().map(Vec::as_slice))
        .collect())
}

fn atom_sasa(residue: &[&AsaAtom], name: &str) -> Result<f64> {
    residue
        .iter()
        .find(|a| a.name == name)
        .map(|a| a.sasa)
        .ok_or_else(|| {
            let (resname, resid) = residue
                .first()
                .map(|a| (a.resname.clone(), a.resid))
                .unwrap_or_default();
            DnaParamError::StrandImbalance(format!(
                "atom {name:?} missing from residue {resname} {resid}"
            ))
        })
}

fn total_sasa(residue: &[&AsaAtom]) -> f64 {
    residue.iter().map(|a| a.sasa).sum()
}

/// One row per base pair with the SASA of each sugar hydrogen and the
/// residue totals, columns `H1'_SASA_1`, `H1'_SASA_2`, ...,
/// `FULL_SASA_1`, `FULL_SASA_2`.
pub fn sugar_sasa_table(atoms: &[AsaAtom]) -> Result<DataFrame> {
    let (one, two) = strand_residues(atoms)?;
    let pairs = paired_residues(&one, &two)?;

    let mut columns = Vec::new();
    for hydrogen in SUGAR_HYDROGENS {
        for (suffix, side) in [("_1", 0usize), ("_2", 1usize)] {
            let mut vals = Vec::with_capacity(pairs.len());
            for &(r1, r2) in &pairs {
                let residue = if side == 0 { r1 } else { r2 };
                vals.push(atom_sasa(residue, hydrogen)?);
            }
            columns.push(Column::new(format!("{hydrogen}_SASA{suffix}").into(), vals));
        }
    }
    let full1: Vec<f64> = pairs.iter().map(|&(r1, _)| total_sasa(r1)).collect();
    let full2: Vec<f64> = pairs.iter().map(|&(_, r2)| total_sasa(r2)).collect();
    columns.push(Column::new("FULL_SASA_1".into(), full1));
    columns.push(Column::new("FULL_SASA_2".into(), full2));
    Ok(DataFrame::new(columns)?)
}

/// One row per base pair with just the residue totals, `SASA_1` /
/// `SASA_2`.
pub fn full_sasa_table(atoms: &[AsaAtom]) -> Result<DataFrame> {
    let (one, two) = strand_residues(atoms)?;
    let pairs = paired_residues(&one, &two)?;
    let full1: Vec<f64> = pairs.iter().map(|&(r1, _)| total_sasa(r1)).collect();
    let full2: Vec<f64> = pairs.iter().map(|&(_, r2)| total_sasa(r2)).collect();
    Ok(DataFrame::new(vec![
        Column::new("SASA_1".into(), full1),
        Column::new("SASA_2".into(), full2),
    ])?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asa_line(atnum: i64, name: &str, resname: &str, chain: &str, resid: i64, sasa: f64) -> String {
        format!("ATOM {atnum} {name} {resname} {chain} {resid} 1.0 2.0 3.0 {sasa:.3} 1.200\n")
    }

    fn residue(text: &mut String, chain: &str, resid: i64, resname: &str, base_sasa: f64) {
        let mut atnum = resid * 100;
        for h in SUGAR_HYDROGENS {
            atnum += 1;
            text.push_str(&asa_line(atnum, h, resname, chain, resid, base_sasa));
        }
        // a heavy atom so FULL differs from the hydrogen sum
        text.push_str(&asa_line(atnum + 1, "C1'", resname, chain, resid, 2.0));
    }

    fn synthetic() -> String {
        let mut text = String::new();
        residue(&mut text, "A", 1, "DA", 0.5);
        residue(&mut text, "A", 2, "DG", 1.0);
        residue(&mut text, "B", 11, "DC", 3.0);
        residue(&mut text, "B", 12, "DT", 4.0);
        // a protein residue that must be filtered out
        text.push_str(&asa_line(999, "CA", "ALA", "C", 50, 9.9));
        text
    }

    #[test]
    fn strand2_pairs_in_reverse_residue_order() {
        let atoms = parse_asa_str(&synthetic(), "test.asa").unwrap();
        let df = full_sasa_table(&atoms).unwrap();
        assert_eq!(df.height(), 2);
        let s1 = df.column("SASA_1").unwrap().f64().unwrap();
        let s2 = df.column("SASA_2").unwrap().f64().unwrap();
        // residue A:1 pairs with B:12, A:2 with B:11
        assert_eq!(s1.get(0), Some(0.5 * 7.0 + 2.0));
        assert_eq!(s2.get(0), Some(4.0 * 7.0 + 2.0));
        assert_eq!(s2.get(1), Some(3.0 * 7.0 + 2.0));
    }

    #[test]
    fn sugar_table_has_per_hydrogen_columns() {
        let atoms = parse_asa_str(&synthetic(), "test.asa").unwrap();
        let df = sugar_sasa_table(&atoms).unwrap();
        assert_eq!(df.shape(), (2, 16));
        let h1 = df.column("H1'_SASA_2").unwrap().f64().unwrap();
        assert_eq!(h1.get(0), Some(4.0));
        let full = df.column("FULL_SASA_1").unwrap().f64().unwrap();
        assert_eq!(full.get(1), Some(9.0));
    }

    #[test]
    fn missing_hydrogen_is_strand_imbalance() {
        let mut text = synthetic();
        // a residue without its H3'
        for h in SUGAR_HYDROGENS {
            if h != "H3'" {
                text.push_str(&asa_line(700, h, "DA", "A", 3, 0.1));
            }
        }
        for h in SUGAR_HYDROGENS {
            text.push_str(&asa_line(800, h, "DT", "B", 10, 0.1));
        }
        let atoms = parse_asa_str(&text, "test.asa").unwrap();
        let err = sugar_sasa_table(&atoms).unwrap_err();
        assert!(matches!(err, DnaParamError::StrandImbalance(_)));
    }

    #[test]
    fn unequal_strands_are_fatal() {
        let mut text = synthetic();
        residue(&mut text, "A", 3, "DA", 0.1);
        let atoms = parse_asa_str(&text, "test.asa").unwrap();
        assert!(matches!(
            full_sasa_table(&atoms).unwrap_err(),
            DnaParamError::StrandImbalance(_)
        ));
    }

    #[test]
    fn single_chain_is_fatal() {
        let mut text = String::new();
        residue(&mut text, "A", 1, "DA", 0.5);
        let atoms = parse_asa_str(&text, "test.asa").unwrap();
        assert!(full_sasa_table(&atoms).is_err());
    }
}

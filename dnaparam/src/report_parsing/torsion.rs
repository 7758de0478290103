//! `backbone.tor` — torsion report from `analyze -t=...`. Two sub-tables
//! separated by `****` marker lines: backbone/chi angles, then sugar
//! pucker parameters. Both list strand 1 followed by strand 2, each in
//! 5'→3' order, so the second half must be renumbered 3'→5' before row
//! *k* of both strands describes the same base pair.

use std::path::Path;

use polars::prelude::*;

use crate::error::{DnaParamError, Result};
use crate::helper_functions::{read_report, skip_until, tokens};
use crate::models::{PuckerRow, TorsionRow, PUCKER_COLS, TORSION_ANGLE_COLS};

/// Preamble lines (angle definitions, syn/anti notes) between the start of
/// each sub-table block and its column-header line.
const ANGLE_HEADER_SKIP: usize = 19;
const PUCKER_HEADER_SKIP: usize = 18;

/// Token count of a fully populated angle row: residue number, base code,
/// pair annotation, syn flag, then eight angles.
const ANGLE_ROW_WIDTH: usize = 12;
/// Where the syn flag sits when the tool printed it.
const SYN_FLAG_POS: usize = 3;
const SYN_PLACEHOLDER: &str = "no";

/// Residue number, base code, v0..v4, tm, P, pucker class.
const PUCKER_ROW_WIDTH: usize = 10;

pub fn parse_tor_param(path: &Path) -> Result<DataFrame> {
    let text = read_report(path)?;
    let file = path.to_string_lossy();
    let (angles, puckers) = parse_torsion_blocks_str(&text, &file)?;
    torsion_to_dataframe(&angles, &puckers, &file)
}

/// Extracts the two raw sub-tables without any strand handling.
pub fn parse_torsion_blocks_str(
    text: &str,
    file: &str,
) -> Result<(Vec<TorsionRow>, Vec<PuckerRow>)> {
    let mut lines = text.lines();
    if lines.next().is_none() {
        return Err(DnaParamError::format(file, "non-empty torsion report"));
    }

    // angle block runs up to the first marker line
    let mut angle_block = Vec::new();
    let mut found_marker = false;
    for line in lines.by_ref() {
        if line.contains("****") {
            found_marker = true;
            break;
        }
        angle_block.push(line);
    }
    if !found_marker {
        return Err(DnaParamError::format(file, "'****' end-of-angles marker"));
    }

    skip_until(&mut lines, |l| l.contains("****"), file, "****")?;
    // pucker block runs to the next marker or end of file
    let pucker_block: Vec<&str> = lines.by_ref().take_while(|l| !l.contains("****")).collect();

    let angles = parse_angle_rows(&angle_block, file)?;
    let puckers = parse_pucker_rows(&pucker_block, file)?;
    Ok((angles, puckers))
}

fn table_header<'a>(block: &[&'a str], skip: usize, file: &str) -> Result<&'a str> {
    let header = block
        .get(skip)
        .ok_or_else(|| DnaParamError::format(file, format!("{} preamble lines + header", skip)))?;
    if tokens(header).first() != Some(&"base") {
        return Err(DnaParamError::format(
            file,
            format!("'base ...' header line, got {header:?}"),
        ));
    }
    Ok(header)
}

/// `---` and other non-numeric cells are absent optional values, not
/// errors.
fn opt_f64(field: &str) -> Option<f64> {
    field.parse().ok()
}

fn parse_angle_rows(block: &[&str], file: &str) -> Result<Vec<TorsionRow>> {
    table_header(block, ANGLE_HEADER_SKIP, file)?;
    let mut rows = Vec::new();
    for line in &block[ANGLE_HEADER_SKIP + 1..] {
        let mut fields: Vec<&str> = tokens(line);
        if fields.len() < 6 {
            continue;
        }
        if fields.len() != ANGLE_ROW_WIDTH {
            // the syn flag is only printed for syn conformations; pad so
            // every row has uniform width before validation
            fields.insert(SYN_FLAG_POS, SYN_PLACEHOLDER);
        }
        if fields.len() != ANGLE_ROW_WIDTH {
            return Err(DnaParamError::format(
                file,
                format!("{ANGLE_ROW_WIDTH}-column angle row, got {line:?}"),
            ));
        }
        let syn = match fields[SYN_FLAG_POS] {
            SYN_PLACEHOLDER => None,
            flag => Some(flag.to_string()),
        };
        let mut angles = [None; 8];
        for (slot, field) in angles.iter_mut().zip(&fields[SYN_FLAG_POS + 1..]) {
            *slot = opt_f64(field);
        }
        rows.push(TorsionRow { syn, angles });
    }
    Ok(rows)
}

fn parse_pucker_rows(block: &[&str], file: &str) -> Result<Vec<PuckerRow>> {
    table_header(block, PUCKER_HEADER_SKIP, file)?;
    let mut rows = Vec::new();
    for line in &block[PUCKER_HEADER_SKIP + 1..] {
        let fields = tokens(line);
        if fields.len() < 6 {
            continue;
        }
        if fields.len() != PUCKER_ROW_WIDTH {
            return Err(DnaParamError::format(
                file,
                format!("{PUCKER_ROW_WIDTH}-column pucker row, got {line:?}"),
            ));
        }
        let mut torsions = [None; 7];
        for (slot, field) in torsions.iter_mut().zip(&fields[2..9]) {
            *slot = opt_f64(field);
        }
        let puckering = match fields[9] {
            "---" => None,
            name => Some(name.to_string()),
        };
        rows.push(PuckerRow { torsions, puckering });
    }
    Ok(rows)
}

/// Splits a sequential two-strand block in half: the first half keeps its
/// order, the second half is index-reversed so that row `k` of both
/// returned strands belongs to the same base pair.
pub fn split_strands<T: Clone>(rows: &[T], what: &str) -> Result<(Vec<T>, Vec<T>)> {
    if rows.len() % 2 != 0 {
        return Err(DnaParamError::StrandImbalance(format!(
            "{what}: odd row count {} cannot be split into two strands",
            rows.len()
        )));
    }
    let half = rows.len() / 2;
    let strand1 = rows[..half].to_vec();
    let strand2: Vec<T> = rows[half..].iter().rev().cloned().collect();
    Ok((strand1, strand2))
}

fn angle_columns(strand: &[TorsionRow], suffix: &str) -> Vec<Column> {
    TORSION_ANGLE_COLS
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let vals: Vec<Option<f64>> = strand.iter().map(|r| r.angles[i]).collect();
            Column::new(format!("{name}{suffix}").into(), vals)
        })
        .collect()
}

fn pucker_columns(strand: &[PuckerRow], suffix: &str) -> Vec<Column> {
    let mut cols: Vec<Column> = PUCKER_COLS[..7]
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let vals: Vec<Option<f64>> = strand.iter().map(|r| r.torsions[i]).collect();
            Column::new(format!("{name}{suffix}").into(), vals)
        })
        .collect();
    let classes: Vec<Option<String>> = strand.iter().map(|r| r.puckering.clone()).collect();
    cols.push(Column::new(format!("{}{suffix}", PUCKER_COLS[7]).into(), classes));
    cols
}

/// One row per base-pair index, strand-1 and strand-2 columns side by
/// side with `_1` / `_2` suffixes.
pub fn torsion_to_dataframe(
    angles: &[TorsionRow],
    puckers: &[PuckerRow],
    file: &str,
) -> Result<DataFrame> {
    let (a1, a2) = split_strands(angles, "angle table")?;
    let (p1, p2) = split_strands(puckers, "pucker table")?;
    if a1.len() != p1.len() {
        return Err(DnaParamError::StrandImbalance(format!(
            "{file}: angle table has {} rows per strand but pucker table has {}",
            a1.len(),
            p1.len()
        )));
    }

    let mut columns = angle_columns(&a1, "_1");
    columns.extend(angle_columns(&a2, "_2"));
    columns.extend(pucker_columns(&p1, "_1"));
    columns.extend(pucker_columns(&p2, "_2"));
    Ok(DataFrame::new(columns)?)
}

//! Curves+ `.lis` report. Section `(D)` lists per-residue backbone
//! parameters, one strand-terminated block per strand; section `(E)`
//! holds the groove geometry table, whose columns sit at fixed byte
//! offsets and may be entirely blank at a given level.

use std::path::Path;
use std::sync::OnceLock;

use polars::prelude::*;
use regex::Regex;

use crate::error::{DnaParamError, Result};
use crate::helper_functions::{read_report, skip_until, tokens};

/// Byte slices of one groove-table row: level number then four
/// measurements. Offsets follow the Curves+ print format; columns can be
/// blank, which whitespace splitting would silently collapse.
const GROOVE_SLICES: [(usize, usize); 5] = [(0, 8), (16, 22), (23, 30), (31, 38), (39, 46)];

fn residue_row_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(\d+)\)\s+[ATGC]").expect("valid residue pattern"))
}

fn level_row_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s+\d+").expect("valid level pattern"))
}

/// Both tables extracted from one `.lis` file. The backbone table is a
/// by-product most callers discard; the groove table is the point.
#[derive(Debug)]
pub struct LisTables {
    pub backbone: DataFrame,
    pub grooves: DataFrame,
}

pub fn parse_lis(path: &Path) -> Result<LisTables> {
    let text = read_report(path)?;
    parse_lis_str(&text, &path.to_string_lossy())
}

struct BackboneRow {
    strand: &'static str,
    resid: i64,
    values: Vec<Option<String>>,
}

fn backbone_strand_rows(
    lines: &mut std::str::Lines<'_>,
    strand: &'static str,
    width: usize,
) -> Vec<BackboneRow> {
    let re = residue_row_re();
    let mut rows = Vec::new();
    for line in lines {
        let Some(cap) = re.captures(line) else { break };
        let resid: i64 = cap[1].parse().unwrap_or_default();
        let mut values: Vec<Option<String>> = tokens(line)
            .into_iter()
            .skip(2)
            .map(|t| if t == "----" { None } else { Some(t.to_string()) })
            .collect();
        values.resize(width, None);
        rows.push(BackboneRow { strand, resid, values });
    }
    rows
}

pub fn parse_lis_str(text: &str, file: &str) -> Result<LisTables> {
    let mut lines = text.lines();

    // ── backbone section ──
    skip_until(&mut lines, |l| l.contains("(D)"), file, "(D)")?;
    let header = skip_until(&mut lines, |l| l.contains("Strand"), file, "Strand")?;
    let value_names: Vec<String> = tokens(header).into_iter().skip(2).map(String::from).collect();
    lines.next(); // blank line under the header

    let mut bb_rows = backbone_strand_rows(&mut lines, "1", value_names.len());
    skip_until(&mut lines, |l| l.contains("Strand"), file, "Strand")?;
    lines.next();
    bb_rows.extend(backbone_strand_rows(&mut lines, "2", value_names.len()));

    // ── groove section ──
    skip_until(&mut lines, |l| l.contains("(E)"), file, "(E)")?;
    let header = skip_until(&mut lines, |l| l.contains("Level"), file, "Level")?;
    let groove_names = tokens(header);
    if groove_names.len() != GROOVE_SLICES.len() {
        return Err(DnaParamError::format(
            file,
            format!("{}-column groove header, got {header:?}", GROOVE_SLICES.len()),
        ));
    }
    lines.next();

    let re = level_row_re();
    let mut levels: Vec<i64> = Vec::new();
    let mut measurements: [Vec<Option<f64>>; 4] = Default::default();
    for line in lines {
        if !re.is_match(line) {
            break;
        }
        let mut fields = GROOVE_SLICES
            .iter()
            .map(|&(lo, hi)| line.get(lo..hi.min(line.len())).unwrap_or("").trim());
        let level_field = fields.next().unwrap_or("");
        let level = level_field.parse().map_err(|_| {
            DnaParamError::format(file, format!("numeric groove level, got {line:?}"))
        })?;
        levels.push(level);
        for (col, field) in measurements.iter_mut().zip(fields) {
            col.push(field.parse().ok());
        }
    }

    let mut bb_columns = vec![
        Column::new("Strand".into(), bb_rows.iter().map(|r| r.strand).collect::<Vec<_>>()),
        Column::new("Resid".into(), bb_rows.iter().map(|r| r.resid).collect::<Vec<_>>()),
    ];
    for (i, name) in value_names.iter().enumerate() {
        let vals: Vec<Option<String>> = bb_rows.iter().map(|r| r.values[i].clone()).collect();
        bb_columns.push(Column::new(name.as_str().into(), vals));
    }

    let mut groove_columns = vec![Column::new(groove_names[0].into(), levels)];
    for (name, vals) in groove_names[1..].iter().zip(measurements) {
        groove_columns.push(Column::new((*name).into(), vals));
    }

    Ok(LisTables {
        backbone: DataFrame::new(bb_columns)?,
        grooves: DataFrame::new(groove_columns)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> String {
        let mut s = String::new();
        s.push_str("Curves+ banner\n\n  (D) Backbone Parameters\n\n");
        s.push_str("  Strand 1     Alpha  Beta   Gamma  Delta  Epsil  Zeta   Chi    Phase  Ampli  Puckr\n\n");
        s.push_str("   1) A   -63.3  171.4   52.1  129.9 -176.6  -97.9 -127.9  153.1   46.0 C2'en\n");
        s.push_str("   2) T   -64.0  170.0   50.0  130.0   ----  -98.0 -120.0  150.0   45.0 C2'en\n");
        s.push_str("   3) G   -65.0  169.0   51.0  131.0 -175.0  -99.0 -121.0  151.0   44.0 C2'en\n");
        s.push_str("\n  Strand 2     Alpha  Beta   Gamma  Delta  Epsil  Zeta   Chi    Phase  Ampli  Puckr\n\n");
        s.push_str("   1) C   -62.0  172.0   53.0  128.0 -177.0  -96.0 -126.0  152.0   47.0 C3'en\n");
        s.push_str("   2) A   -61.0  173.0   54.0  127.0 -178.0  -95.0 -125.0  154.0   48.0 C3'en\n");
        s.push_str("   3) C   -60.0  174.0   55.0  126.0 -179.0  -94.0 -124.0  155.0   49.0 C3'en\n");
        s.push_str("\n  (E) Groove Parameters\n\n");
        s.push_str("   Level        W12     D12     W21     D21\n\n");
        s.push_str(&groove_row(["1", "12.10", "4.20", "11.30", "5.10"]));
        s.push_str(&groove_row(["2", "", "4.30", "11.60", "5.40"]));
        s
    }

    /// Right-justifies each field inside its byte slice, like Curves+
    /// prints them.
    fn groove_row(fields: [&str; 5]) -> String {
        let mut line = String::new();
        for (&(lo, hi), field) in GROOVE_SLICES.iter().zip(fields) {
            while line.len() < lo {
                line.push(' ');
            }
            line.push_str(&format!("{:>width$}", field, width = hi - lo));
        }
        line.push('\n');
        line
    }

    #[test]
    fn synthetic_report_shapes() {
        let tables = parse_lis_str(&report(), "test.lis").unwrap();
        assert_eq!(tables.backbone.height(), 6);
        assert_eq!(tables.grooves.shape(), (2, 5));
        assert_eq!(
            tables.grooves.get_column_names(),
            &["Level", "W12", "D12", "W21", "D21"]
        );
    }

    #[test]
    fn strand_tags_are_row_local() {
        let tables = parse_lis_str(&report(), "test.lis").unwrap();
        let strand = tables.backbone.column("Strand").unwrap().str().unwrap();
        assert_eq!(strand.get(0), Some("1"));
        assert_eq!(strand.get(3), Some("2"));
        let resid = tables.backbone.column("Resid").unwrap().i64().unwrap();
        assert_eq!(resid.get(3), Some(1));
    }

    #[test]
    fn dashes_become_null() {
        let tables = parse_lis_str(&report(), "test.lis").unwrap();
        let epsil = tables.backbone.column("Epsil").unwrap().str().unwrap();
        assert!(epsil.get(1).is_none());
        assert_eq!(epsil.get(0), Some("-176.6"));
    }

    #[test]
    fn blank_slices_become_null() {
        let tables = parse_lis_str(&report(), "test.lis").unwrap();
        let w12 = tables.grooves.column("W12").unwrap().f64().unwrap();
        assert_eq!(w12.get(0), Some(12.1));
        assert!(w12.get(1).is_none());
        let d21 = tables.grooves.column("D21").unwrap().f64().unwrap();
        assert_eq!(d21.get(1), Some(5.4));
    }

    #[test]
    fn missing_groove_section_is_fatal() {
        let text = "  (D) Backbone Parameters\n  Strand 1  Alpha\n\n";
        assert!(parse_lis_str(text, "test.lis").is_err());
    }
}

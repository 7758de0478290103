//! `bp_step.par` — local base-pair and step parameters from X3DNA
//! `analyze`, also the input format of `rebuild`. Two count lines, one
//! column-header line, then one row per base pair: the pair code and
//! twelve numeric parameters.
//!
//! A step parameter describes the transition *into* a pair from its
//! predecessor, so whatever the first data row carries in its step
//! columns is meaningless and gets dropped here.

use std::path::Path;

use polars::prelude::*;

use crate::error::{DnaParamError, Result};
use crate::helper_functions::{read_report, skip_lines, tokens};
use crate::models::{
    BasePairParams, PairParams, StepParams, BP_NAME_COL, PAIR_PARAM_COLS, STEP_PARAM_COLS,
};

/// Pair code column + 6 pair params + 6 step params.
const BP_STEP_WIDTH: usize = 13;

pub fn parse_bp_step(path: &Path) -> Result<Vec<BasePairParams>> {
    let text = read_report(path)?;
    parse_bp_step_str(&text, &path.to_string_lossy())
}

pub fn parse_bp_step_str(text: &str, file: &str) -> Result<Vec<BasePairParams>> {
    let mut lines = text.lines();
    skip_lines(&mut lines, 2, file)?;

    let header = lines
        .next()
        .ok_or_else(|| DnaParamError::format(file, "parameter column header"))?;
    if tokens(header).len() != BP_STEP_WIDTH {
        return Err(DnaParamError::format(
            file,
            format!("{BP_STEP_WIDTH}-column header, got {header:?}"),
        ));
    }

    let mut rows = Vec::new();
    for line in lines {
        let fields = tokens(line);
        if fields.is_empty() {
            continue;
        }
        if fields.len() != BP_STEP_WIDTH {
            return Err(DnaParamError::format(
                file,
                format!("{BP_STEP_WIDTH} columns per row, got {line:?}"),
            ));
        }
        let mut values = [0.0f64; 12];
        for (slot, field) in values.iter_mut().zip(&fields[1..]) {
            *slot = field.parse().map_err(|_| {
                DnaParamError::format(file, format!("numeric parameter, got {field:?}"))
            })?;
        }
        let step = if rows.is_empty() {
            // no preceding pair exists for the first record
            None
        } else {
            Some(StepParams {
                shift: values[6],
                slide: values[7],
                rise: values[8],
                tilt: values[9],
                roll: values[10],
                twist: values[11],
            })
        };
        rows.push(BasePairParams {
            name: fields[0].to_string(),
            pair: PairParams {
                shear: values[0],
                stretch: values[1],
                stagger: values[2],
                buckle: values[3],
                prop_tw: values[4],
                opening: values[5],
            },
            step,
        });
    }
    Ok(rows)
}

/// Column layout: `BPname`, the six pair parameters, the six step
/// parameters. Step cells of row 0 are null.
pub fn bp_step_to_dataframe(rows: &[BasePairParams]) -> PolarsResult<DataFrame> {
    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    let mut columns = vec![Column::new(BP_NAME_COL.into(), names)];

    for (i, col_name) in PAIR_PARAM_COLS.iter().enumerate() {
        let vals: Vec<f64> = rows.iter().map(|r| r.pair.as_array()[i]).collect();
        columns.push(Column::new((*col_name).into(), vals));
    }
    for (i, col_name) in STEP_PARAM_COLS.iter().enumerate() {
        let vals: Vec<Option<f64>> = rows
            .iter()
            .map(|r| r.step.as_ref().map(|s| s.as_array()[i]))
            .collect();
        columns.push(Column::new((*col_name).into(), vals));
    }
    DataFrame::new(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
    3 # base-pairs
    0 # ***local base-pair & step parameters***
 #        Shear    Stretch   Stagger   Buckle   Prop-Tw   Opening     Shift     Slide     Rise      Tilt      Roll      Twist
A-T     0.110    -0.120     0.130     1.100    -2.200     3.300     9.000     9.100     9.200     9.300     9.400     9.500
G-C     0.210    -0.220     0.230     1.200    -2.300     3.400     0.010     0.020     3.320     0.040     0.050    35.600
T-A     0.310    -0.320     0.330     1.300    -2.400     3.500    -0.010    -0.020     3.290    -0.040    -0.050    34.100
";

    #[test]
    fn first_row_step_params_forced_null() {
        let rows = parse_bp_step_str(REPORT, "bp_step.par").unwrap();
        assert_eq!(rows.len(), 3);
        // the source text carries 9.0xx values there; they must not survive
        assert!(rows[0].step.is_none());
        assert_eq!(rows[1].step.unwrap().twist, 35.6);
        assert_eq!(rows[2].step.unwrap().rise, 3.29);
    }

    #[test]
    fn pair_params_preserved_everywhere() {
        let rows = parse_bp_step_str(REPORT, "bp_step.par").unwrap();
        assert_eq!(rows[0].pair.shear, 0.11);
        assert_eq!(rows[0].name, "A-T");
        assert_eq!(rows[2].pair.opening, 3.5);
    }

    #[test]
    fn dataframe_has_null_step_cells_in_row0() {
        let rows = parse_bp_step_str(REPORT, "bp_step.par").unwrap();
        let df = bp_step_to_dataframe(&rows).unwrap();
        assert_eq!(df.shape(), (3, 13));
        let twist = df.column("Twist").unwrap().f64().unwrap();
        assert!(twist.get(0).is_none());
        assert_eq!(twist.get(1), Some(35.6));
    }

    #[test]
    fn ragged_row_is_format_mismatch() {
        let bad = "h\nh\n # a b c d e f g h i j k l\nA-T 1.0 2.0\n";
        assert!(parse_bp_step_str(bad, "bp_step.par").is_err());
    }
}

//! `ref_frames.dat` — base-pair reference frames written by X3DNA
//! `analyze`. Two header lines, then per base pair one origin line
//! followed by four lines (the rotation matrix and the next pair's
//! descriptor) which are not needed here.

use std::path::Path;

use polars::prelude::*;

use crate::error::{DnaParamError, Result};
use crate::helper_functions::{read_report, skip_lines, strip_comment, tokens};
use crate::models::Point3;

pub fn parse_ref_frames(path: &Path) -> Result<Vec<Point3>> {
    let text = read_report(path)?;
    parse_ref_frames_str(&text, &path.to_string_lossy())
}

pub fn parse_ref_frames_str(text: &str, file: &str) -> Result<Vec<Point3>> {
    let mut lines = text.lines();
    skip_lines(&mut lines, 2, file)?;

    let mut centers = Vec::new();
    while let Some(line) = lines.next() {
        let fields = tokens(strip_comment(line));
        if fields.is_empty() {
            break;
        }
        if fields.len() < 3 {
            return Err(DnaParamError::format(
                file,
                format!("x y z origin line, got {:?}", line),
            ));
        }
        let mut xyz = [0.0f64; 3];
        for (slot, field) in xyz.iter_mut().zip(&fields[..3]) {
            *slot = field.parse().map_err(|_| {
                DnaParamError::format(file, format!("numeric origin coordinate, got {field:?}"))
            })?;
        }
        centers.push(Point3 { x: xyz[0], y: xyz[1], z: xyz[2] });

        // rotation matrix rows + the next pair's descriptor line
        for _ in 0..4 {
            lines.next();
        }
    }
    Ok(centers)
}

pub fn centers_to_dataframe(centers: &[Point3]) -> PolarsResult<DataFrame> {
    let xs: Vec<f64> = centers.iter().map(|p| p.x).collect();
    let ys: Vec<f64> = centers.iter().map(|p| p.y).collect();
    let zs: Vec<f64> = centers.iter().map(|p| p.z).collect();
    DataFrame::new(vec![
        Column::new("x".into(), xs),
        Column::new("y".into(), ys),
        Column::new("z".into(), zs),
    ])
}

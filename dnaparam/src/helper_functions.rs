use std::fs::File;
use std::path::Path;

use polars::frame::DataFrame;
use polars::prelude::{CsvWriter, SerWriter};
use tracing::debug;

use crate::error::{DnaParamError, Result};

/// Drops everything from the first `#` on. The external reports annotate
/// data lines with trailing comments that must not reach numeric parsing.
pub fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

/// Splits a raw report line on runs of whitespace.
pub fn tokens(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// Collapses whitespace runs into single tabs, the canonical delimiter all
/// normalized intermediate tables use.
pub fn normalize_line(line: &str) -> String {
    tokens(line).join("\t")
}

/// Consumes `n` lines, failing if the stream ends early. Used for the
/// fixed header blocks every X3DNA report starts with.
pub fn skip_lines<'a, I>(lines: &mut I, n: usize, file: &str) -> Result<()>
where
    I: Iterator<Item = &'a str>,
{
    for i in 0..n {
        if lines.next().is_none() {
            return Err(DnaParamError::format(
                file,
                format!("at least {} header lines, got {}", n, i),
            ));
        }
    }
    Ok(())
}

/// Advances until a line satisfying `pred` is found and returns it. A
/// missing marker means the file is not well-formed output from the
/// expected tool, which is fatal for the run.
pub fn skip_until<'a, I, P>(lines: &mut I, pred: P, file: &str, marker: &str) -> Result<&'a str>
where
    I: Iterator<Item = &'a str>,
    P: Fn(&str) -> bool,
{
    for line in lines {
        if pred(line) {
            return Ok(line);
        }
    }
    Err(DnaParamError::format(file, format!("marker {marker:?}")))
}

pub fn read_report(path: &Path) -> Result<String> {
    debug!("Processing {:?}", path);
    Ok(std::fs::read_to_string(path)?)
}

pub fn dataframe_to_csv(df: &mut DataFrame, path: &Path, include_header: bool) -> Result<()> {
    let file = File::create(path)?;
    CsvWriter::new(file)
        .include_header(include_header)
        .finish(df)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_stripping() {
        assert_eq!(strip_comment("1.0 2.0 3.0 # origin"), "1.0 2.0 3.0 ");
        assert_eq!(strip_comment("no comment here"), "no comment here");
        assert_eq!(strip_comment("# all comment"), "");
    }

    #[test]
    fn whitespace_collapses_to_tabs() {
        assert_eq!(normalize_line("  a   b\tc  "), "a\tb\tc");
        assert_eq!(normalize_line(""), "");
    }

    #[test]
    fn missing_marker_is_format_mismatch() {
        let text = "one\ntwo\nthree";
        let mut lines = text.lines();
        let err = skip_until(&mut lines, |l| l.contains("****"), "backbone.tor", "****")
            .unwrap_err();
        assert!(matches!(err, DnaParamError::FormatMismatch { .. }));
    }

    #[test]
    fn short_header_is_format_mismatch() {
        let mut lines = "only one line".lines();
        assert!(skip_lines(&mut lines, 2, "ref_frames.dat").is_err());
    }
}

//! `find_pair` output — free text in which each detected base pair is a
//! line embedding the strand-1 residue index inside a dotted field, e.g.
//! `....>A:...-73_:[.DA]A-----T[.DT]:..73_:B<....`. Lines that do not
//! match are padding, not errors.
//!
//! Comparing a reference run against the current run tells which pairs of
//! the reference topology are still formed: membership of the index in the
//! current list, not its position, decides. The reference fixes the row
//! count, so every run of a trajectory yields tables of the same height
//! even when pairing is transiently lost.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::helper_functions::read_report;

fn pair_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.\.\.\.>\S:\.*(-?\d+)_:").expect("valid pairing pattern"))
}

pub fn parse_pairing_list(path: &Path) -> Result<Vec<i64>> {
    let text = read_report(path)?;
    Ok(parse_pairing_list_str(&text))
}

pub fn parse_pairing_list_str(text: &str) -> Vec<i64> {
    let re = pair_line_re();
    text.lines()
        .filter_map(|line| re.captures(line))
        .filter_map(|cap| cap[1].parse().ok())
        .collect()
}

/// Position `i` is true iff `reference[i]` is paired anywhere in
/// `current`. Output length always equals the reference length.
pub fn compare_pairing(reference: &[i64], current: &[i64]) -> Vec<bool> {
    reference.iter().map(|idx| current.contains(idx)).collect()
}

pub fn check_pairing(reference: &Path, current: &Path) -> Result<Vec<bool>> {
    let ref_list = parse_pairing_list(reference)?;
    debug!("Reference BP list: {:?}", ref_list);
    let cur_list = parse_pairing_list(current)?;
    debug!("Current BP list: {:?}", cur_list);
    Ok(compare_pairing(&ref_list, &cur_list))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_extracted_from_pair_lines() {
        let text = "\
some banner text
....>A:...-73_:[.DA]A-----T[.DT]:..73_:B<....
not a pair line at all
....>A:....-72_:[.DG]G-----C[.DC]:..72_:B<....
....>A:.....12_:[.DT]T-----A[.DA]:.-12_:B<....
";
        assert_eq!(parse_pairing_list_str(text), vec![-73, -72, 12]);
    }

    #[test]
    fn membership_not_position() {
        assert_eq!(
            compare_pairing(&[1, 2, 3, 4], &[1, 3, 4]),
            vec![true, false, true, true]
        );
    }

    #[test]
    fn empty_reference_gives_empty_output() {
        assert_eq!(compare_pairing(&[], &[5]), Vec::<bool>::new());
    }

    #[test]
    fn comparator_is_asymmetric() {
        let a = [1, 2, 3, 4];
        let b = [1, 3, 4];
        assert_eq!(compare_pairing(&a, &b).len(), 4);
        assert_eq!(compare_pairing(&b, &a).len(), 3);
    }
}

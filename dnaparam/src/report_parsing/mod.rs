//! Parsers for the text reports the external tools write. Each module
//! owns one format; all of them normalize into typed rows first and only
//! then into polars columns, so the schema is fixed before any file is
//! read.

pub mod bp_step;
pub mod groove;
pub mod pairing;
pub mod ref_frames;
pub mod sasa;
pub mod torsion;

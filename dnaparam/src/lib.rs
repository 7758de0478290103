//! DNA conformation analysis driven by external structural-biology
//! tools. X3DNA supplies base-pair frames, pair/step parameters and
//! backbone torsions, Curves+ supplies groove geometry, and NACCESS
//! supplies solvent accessibility; this crate invokes them, parses
//! their text reports and normalizes everything into strand-aware
//! per-base-pair [`polars`] tables. The inverse direction is covered
//! too: a parameter table can be serialized back into X3DNA's input
//! format and rebuilt into an atomic model, optionally with a new
//! sequence.

pub mod analysis;
pub mod config;
pub mod error;
pub mod external_tools;
pub mod helper_functions;
pub mod models;
pub mod rebuild;
pub mod report_parsing;

pub use analysis::AnalysisRun;
pub use config::ToolConfig;
pub use error::{DnaParamError, Result};
pub use models::{PdbFileSource, StructureSource};

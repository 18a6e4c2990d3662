//! Remote enrichment client: drives the two-state melting web form for
//! one sequence at a time and extracts ΔG, ΔH, ΔS and Tm from the
//! rendered results table.
//!
//! Also carries the structure-retrieval client used by lookups.

pub mod error;
pub mod parse;
pub mod service;
pub mod session;
pub mod structure;

pub use error::RemoteError;
pub use parse::{clean_result_text, extract_results_row, parse_thermo_text};
pub use service::{MeltingService, ServiceResponse};
pub use session::UnafoldSession;
pub use structure::{is_valid_pdb_id, StructureClient};

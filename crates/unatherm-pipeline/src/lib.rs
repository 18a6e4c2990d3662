//! Batch driver: walks a sequence table row by row, enriches each row
//! through a `MeltingService`, and rewrites the table after every row.

pub mod driver;
pub mod types;

pub use driver::{plan, BatchDriver};
pub use types::*;

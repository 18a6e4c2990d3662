//! Sequence table handling: CSV load/save, grouped-identifier
//! normalization, artifact naming, and the lookup facade.

pub mod lookup;
pub mod naming;
pub mod normalize;
pub mod table;

pub use lookup::{lookup, normalize_query, LookupHit, LookupSummary, MatchedBy};
pub use naming::{generate_name, generate_names, MAX_GROUP_MEMBERS};
pub use normalize::{is_blank_identifier, normalize_identifiers, NormalizedRow};
pub use table::Table;

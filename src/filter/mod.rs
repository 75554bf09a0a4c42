//! Faceted filtering: the facet schema, the state store, and the
//! active-filter chip derivation built on top of both.

pub mod chips;
pub mod schema;
pub mod state;

pub use chips::{clear_chip, derive_chips, Chip, ClearKey};
pub use schema::{Facet, FacetKind, RangePair, RANGE_PAIRS};
pub use state::{FacetValue, FilterState, FilterStore, DEFAULT_PER_PAGE};

//! Assignment-consistency and partner-matching engine
//!
//! Pure data transformation, no I/O: callers (HTTP handlers, the storage
//! layer) invoke these functions synchronously and persist the results.
//! All functions are total and safe to call repeatedly on the same input.

pub mod normalize;
pub mod prune;
pub mod rank;
pub mod status;

pub use normalize::{normalize_assignments, LegacyFields, Projection};
pub use prune::prune_orphans;
pub use rank::{rank_partners, RankMode};
pub use status::{apply_status, StatusScope};

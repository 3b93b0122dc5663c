//! Pure table logic: header resolution and freshness status derivation.
//!
//! Everything in this module is synchronous and side-effect free. The
//! reference date for status computation is always supplied by the caller;
//! nothing here reads the system clock.

pub mod dates;
pub mod resolver;
pub mod status;

pub use resolver::{normalize, resolve_column, resolve_columns, LogicalField, ResolvedColumns};
pub use status::{evaluate, next_maintenance};

//! ms-core: shared foundation for the mission segment solver.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + finite/divisor checks)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use units::*;

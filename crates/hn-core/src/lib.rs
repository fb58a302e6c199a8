//! hn-core: shared foundation for heatnet.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + tolerances + float helpers)
//! - ids (compact arena handles for junctions, pipes, pumps, consumers)
//! - fluid (constant water properties used by the thermal and hydraulic models)
//! - error (shared error types)

pub mod error;
pub mod fluid;
pub mod ids;
pub mod numeric;
pub mod units;

pub use error::{HnError, HnResult};
pub use fluid::FluidProperties;
pub use ids::*;
pub use numeric::*;
pub use units::*;

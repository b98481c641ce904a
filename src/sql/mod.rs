//! Safe SQL builder: identifiers from the table registry only, values as
//! bound parameters.

mod builder;
pub mod params;
pub use builder::*;
pub use params::*;

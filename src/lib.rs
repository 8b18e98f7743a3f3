//! Fitness studio analytics engine
//!
//! [`core`] holds the pure aggregations over in-memory records; [`source`]
//! loads those records from JSON snapshot files.

pub mod consts;
pub mod core;
pub mod error;
pub mod source;
pub mod utils;

//! Small helpers shared by the Sift crates.
//!
//! # Modules
//!
//! - [`ids`]: Record type name to storage name mapping

pub mod ids;

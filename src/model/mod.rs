//! Core data types for queries and their results.
//!
//! - [`ResourceId`] - a numeric ID or string slug naming one resource
//! - [`IdentifierMap`] - platform name to resource identifier, in order
//! - [`QueryResult`] - status plus the fields extracted per platform
//!
//! # Example
//!
//! ```
//! use mineget::{IdentifierMap, ResourceId};
//!
//! let ids = IdentifierMap::new()
//!     .with("spigot", 83767u64)
//!     .with("github", "WiIIiam278/HuskHomes");
//!
//! assert_eq!(ids.len(), 2);
//! assert_eq!(ids.get("spigot"), Some(&ResourceId::Numeric(83767)));
//! ```

mod identifier;
mod result;

pub use identifier::*;
pub use result::*;

pub mod aggregate;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod fetch;
pub mod model;
pub mod output;
pub mod path;
pub mod query;
pub mod registry;

pub use aggregate::Summary;
pub use cache::Cache;
pub use client::Mineget;
pub use config::Config;
pub use error::{FetchError, QueryError, RegistryError};
pub use model::{IdentifierMap, QueryResult, ResourceId, Status};
pub use registry::{EndpointKind, Registry};

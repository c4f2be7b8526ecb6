//! Resource abstraction layer
//!
//! This module exposes the NetOrca API to an infrastructure-as-code host:
//! typed attribute values, record converters, the change instance resource,
//! the two data sources and the schema registry describing them.
//!
//! # Architecture
//!
//! - [`registry`] - Loads and caches the provider schema from embedded JSON
//! - [`fetcher`] - Reads data sources (one page per read)
//! - [`change_instance`] - CRUD and import handlers for change instances
//! - [`convert`] - Maps decoded records into attribute trees
//! - [`dispatch`] - Routes type names to the handlers above
//!
//! # Example
//!
//! ```ignore
//! use netorca_provider::resource::{AttrValue, NetOrcaProvider};
//!
//! async fn pending(provider: &NetOrcaProvider) -> netorca_provider::netorca::Result<AttrValue> {
//!     let config = AttrValue::object([
//!         ("pov", AttrValue::string("serviceowner")),
//!         ("filters", AttrValue::object([("state", AttrValue::string("PENDING"))])),
//!     ]);
//!     provider.read_data_source("netorca_change_instances", &config).await
//! }
//! ```

pub mod change_instance;
pub mod convert;
pub mod dispatch;
pub mod fetcher;
mod registry;
pub mod value;

pub use change_instance::{parse_import_id, ChangeInstanceResource, ChangeInstanceState};
pub use dispatch::NetOrcaProvider;
pub use fetcher::{fetch_change_instances, fetch_service_items};
pub use registry::*;
pub use value::AttrValue;

//! NetOrca API interaction module
//!
//! This module provides the core functionality for talking to the NetOrca
//! REST API: the HTTP client, the two orcabase collections and their filter
//! queries.
//!
//! # Module Structure
//!
//! - [`client`] - Main NetOrca client (base URL, API key, JSON decoding)
//! - [`http`] - HTTP utilities for REST API calls
//! - [`query`] - Point of view, filter argument validation, query rendering
//! - [`change_instances`] - Change instance records, query, list/get/patch
//! - [`service_items`] - Service item records, query, list
//! - [`error`] - Error taxonomy
//!
//! # Example
//!
//! ```ignore
//! use netorca_provider::netorca::{self, NetOrcaClient, Pov};
//!
//! async fn example() -> netorca_provider::netorca::Result<()> {
//!     let client = NetOrcaClient::new("https://netorca.example", "secret")?;
//!     let ci = netorca::get_change_instance(&client, 123, Pov::Consumer).await?;
//!     println!("{}", ci.state);
//!     Ok(())
//! }
//! ```

pub mod change_instances;
pub mod client;
pub mod error;
pub mod http;
pub mod query;
pub mod service_items;

use serde::{Deserialize, Deserializer, Serialize};

pub use change_instances::{
    get_change_instance, list_change_instances, patch_change_instance, ChangeInstance,
    ChangeInstanceQuery, ChangeInstanceUpdate, Submission,
};
pub use client::NetOrcaClient;
pub use error::{FieldKind, NetOrcaError, Result};
pub use query::{Pov, UnknownKeys};
pub use service_items::{
    list_service_items, Application, NamedRef, Service, ServiceItem, ServiceItemQuery, Team,
};

/// Paginated list envelope returned by orcabase collections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// Decode `null` as the type's zero value
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

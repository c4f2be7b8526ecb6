//! NetOrca infrastructure-as-code provider
//!
//! - [`netorca`] - REST client for the NetOrca orcabase API
//! - [`resource`] - Resource and data source handlers built on the client
//! - [`config`] - Provider input resolution

pub mod config;
pub mod netorca;
pub mod resource;

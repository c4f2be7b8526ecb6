//! Type dispatch
//!
//! Maps resource and data source type names to their handlers. This is the
//! surface a host adapter (or the CLI) drives.

use super::change_instance::{ChangeInstanceResource, ChangeInstanceState};
use super::fetcher;
use super::value::AttrValue;
use crate::config::ProviderConfig;
use crate::netorca::{NetOrcaClient, NetOrcaError, Result};
use std::sync::Arc;

pub const CHANGE_INSTANCES: &str = "netorca_change_instances";
pub const SERVICE_ITEMS: &str = "netorca_service_items";

/// Configured provider: one shared client handed to every handler
#[derive(Debug, Clone)]
pub struct NetOrcaProvider {
    client: Arc<NetOrcaClient>,
}

impl NetOrcaProvider {
    pub fn new(client: Arc<NetOrcaClient>) -> Self {
        Self { client }
    }

    /// Resolve the provider block against the environment and config file,
    /// then build the shared client
    pub fn configure(provider_block: &AttrValue) -> Result<Self> {
        let config = ProviderConfig::from_environment(provider_block)?;
        Ok(Self::new(config.build_client()?))
    }

    /// Read a data source
    pub async fn read_data_source(&self, type_name: &str, config: &AttrValue) -> Result<AttrValue> {
        tracing::debug!("read_data_source: type={}", type_name);

        match type_name {
            CHANGE_INSTANCES => fetcher::fetch_change_instances(&self.client, config).await,
            SERVICE_ITEMS => fetcher::fetch_service_items(&self.client, config).await,
            _ => Err(NetOrcaError::UnknownType(type_name.to_string())),
        }
    }

    fn resource(&self, type_name: &str) -> Result<ChangeInstanceResource> {
        match type_name {
            CHANGE_INSTANCES => Ok(ChangeInstanceResource::new(Arc::clone(&self.client))),
            _ => Err(NetOrcaError::UnknownType(type_name.to_string())),
        }
    }

    pub async fn create_resource(&self, type_name: &str, plan: &AttrValue) -> Result<AttrValue> {
        tracing::debug!("create_resource: type={}", type_name);
        let handler = self.resource(type_name)?;
        let plan = ChangeInstanceState::from_attr(plan)?;
        Ok(handler.create(&plan).await?.to_attr())
    }

    pub async fn read_resource(&self, type_name: &str, state: &AttrValue) -> Result<AttrValue> {
        tracing::debug!("read_resource: type={}", type_name);
        let handler = self.resource(type_name)?;
        let state = ChangeInstanceState::from_attr(state)?;
        Ok(handler.read(&state).await?.to_attr())
    }

    pub async fn update_resource(
        &self,
        type_name: &str,
        plan: &AttrValue,
        prior: &AttrValue,
    ) -> Result<AttrValue> {
        tracing::debug!("update_resource: type={}", type_name);
        let handler = self.resource(type_name)?;
        let plan = ChangeInstanceState::from_attr(plan)?;
        let prior = ChangeInstanceState::from_attr(prior)?;
        Ok(handler.update(&plan, &prior).await?.to_attr())
    }

    pub async fn delete_resource(&self, type_name: &str, state: &AttrValue) -> Result<()> {
        tracing::debug!("delete_resource: type={}", type_name);
        let handler = self.resource(type_name)?;
        let state = ChangeInstanceState::from_attr(state)?;
        handler.delete(&state).await
    }

    pub async fn import_resource(&self, type_name: &str, import_id: &str) -> Result<AttrValue> {
        tracing::debug!("import_resource: type={}, id={}", type_name, import_id);
        let handler = self.resource(type_name)?;
        Ok(handler.import(import_id).await?.to_attr())
    }
}

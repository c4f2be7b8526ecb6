//! Change instance resource
//!
//! The only mutable resource type. The platform creates change instances on
//! its own, so "create" adopts an existing one by PATCHing it, and "delete"
//! only forgets it.

use super::convert::json_string;
use super::value::AttrValue;
use crate::netorca::{
    self, ChangeInstance, ChangeInstanceUpdate, FieldKind, NetOrcaClient, NetOrcaError, Pov,
    Result,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Description sent with every PATCH unless the configuration sets one
pub const DEFAULT_DESCRIPTION: &str = "Updated via terraform";

/// Persisted state of a change instance resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeInstanceState {
    pub id: i64,
    pub pov: Pov,
    #[serde(default)]
    pub state: Option<String>,
    /// JSON object, as text
    pub deployed_item: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl ChangeInstanceState {
    pub fn from_attr(value: &AttrValue) -> Result<Self> {
        let id = value
            .get("id")
            .and_then(AttrValue::as_i64)
            .ok_or_else(|| NetOrcaError::validation("id", FieldKind::Int64))?;
        let pov = value
            .get("pov")
            .and_then(AttrValue::as_str)
            .ok_or_else(|| NetOrcaError::validation("pov", FieldKind::String))?
            .parse::<Pov>()
            .map_err(|_| NetOrcaError::validation("pov", FieldKind::Pov))?;
        let deployed_item = value
            .get("deployed_item")
            .and_then(AttrValue::as_str)
            .ok_or_else(|| NetOrcaError::validation("deployed_item", FieldKind::String))?
            .to_string();

        Ok(Self {
            id,
            pov,
            state: optional_string(value, "state")?,
            deployed_item,
            description: optional_string(value, "description")?,
        })
    }

    pub fn to_attr(&self) -> AttrValue {
        AttrValue::object([
            ("id", AttrValue::Int64(self.id)),
            ("pov", AttrValue::string(self.pov.as_str())),
            ("state", AttrValue::from(self.state.clone())),
            ("deployed_item", AttrValue::string(&self.deployed_item)),
            ("description", AttrValue::from(self.description.clone())),
        ])
    }

    fn update_request(&self) -> ChangeInstanceUpdate {
        ChangeInstanceUpdate {
            state: self.state.clone(),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
            deployed_item: self.deployed_item.clone(),
        }
    }

    /// Whether applying `self` over `prior` needs a PATCH
    pub fn differs_from(&self, prior: &ChangeInstanceState) -> bool {
        self.state != prior.state || payload_changed(&self.deployed_item, &prior.deployed_item)
    }
}

fn optional_string(value: &AttrValue, key: &str) -> Result<Option<String>> {
    match value.get(key) {
        None | Some(AttrValue::Null) | Some(AttrValue::Unknown) => Ok(None),
        Some(AttrValue::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(NetOrcaError::validation(key, FieldKind::String)),
    }
}

/// Compare payloads as JSON when both parse, so formatting alone is not a change
fn payload_changed(planned: &str, prior: &str) -> bool {
    match (
        serde_json::from_str::<Value>(planned),
        serde_json::from_str::<Value>(prior),
    ) {
        (Ok(a), Ok(b)) => a != b,
        _ => planned != prior,
    }
}

/// Parse an import id of the form `{pov}/{id}`
pub fn parse_import_id(input: &str) -> Result<(Pov, i64)> {
    let Some((pov, id)) = input.split_once('/') else {
        return Err(NetOrcaError::format(input, "expected {pov}/{id}"));
    };
    let pov = pov
        .parse::<Pov>()
        .map_err(|e| NetOrcaError::format(input, e))?;
    let id = id
        .parse::<i64>()
        .map_err(|e| NetOrcaError::format(input, format!("invalid id: {}", e)))?;
    Ok((pov, id))
}

/// CRUD handlers for `netorca_change_instances`
#[derive(Debug, Clone)]
pub struct ChangeInstanceResource {
    client: Arc<NetOrcaClient>,
}

impl ChangeInstanceResource {
    pub fn new(client: Arc<NetOrcaClient>) -> Self {
        Self { client }
    }

    /// PATCH the planned values onto an existing change instance, then refresh
    pub async fn create(&self, plan: &ChangeInstanceState) -> Result<ChangeInstanceState> {
        tracing::info!("Adopting change instance {}/{}", plan.pov, plan.id);

        netorca::patch_change_instance(&self.client, plan.id, plan.pov, &plan.update_request())
            .await?;
        self.refresh(plan).await
    }

    pub async fn read(&self, state: &ChangeInstanceState) -> Result<ChangeInstanceState> {
        tracing::debug!("Reading change instance {}/{}", state.pov, state.id);
        self.refresh(state).await
    }

    /// PATCH only when state or payload changed; always refresh afterwards
    pub async fn update(
        &self,
        plan: &ChangeInstanceState,
        prior: &ChangeInstanceState,
    ) -> Result<ChangeInstanceState> {
        if plan.differs_from(prior) {
            netorca::patch_change_instance(&self.client, plan.id, plan.pov, &plan.update_request())
                .await?;
        } else {
            tracing::debug!("Change instance {} unchanged, skipping PATCH", plan.id);
        }
        self.refresh(plan).await
    }

    /// The platform cannot delete change instances; the resource is only
    /// dropped from state.
    pub async fn delete(&self, state: &ChangeInstanceState) -> Result<()> {
        tracing::warn!(
            "Change instance {}/{} removed from state only: NetOrca does not support deleting change instances",
            state.pov,
            state.id
        );
        Ok(())
    }

    pub async fn import(&self, import_id: &str) -> Result<ChangeInstanceState> {
        let (pov, id) = parse_import_id(import_id)?;
        tracing::info!("Importing change instance {}/{}", pov, id);

        let ci = netorca::get_change_instance(&self.client, id, pov).await?;
        to_state(id, pov, None, &ci)
    }

    async fn refresh(&self, base: &ChangeInstanceState) -> Result<ChangeInstanceState> {
        let ci = netorca::get_change_instance(&self.client, base.id, base.pov).await?;
        to_state(base.id, base.pov, base.description.clone(), &ci)
    }
}

fn to_state(
    id: i64,
    pov: Pov,
    description: Option<String>,
    ci: &ChangeInstance,
) -> Result<ChangeInstanceState> {
    Ok(ChangeInstanceState {
        id,
        pov,
        state: Some(ci.state.clone()),
        deployed_item: json_string(&ci.service_item.deployed_item, "service_item.deployed_item")?,
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(s: Option<&str>, payload: &str) -> ChangeInstanceState {
        ChangeInstanceState {
            id: 1,
            pov: Pov::Consumer,
            state: s.map(String::from),
            deployed_item: payload.to_string(),
            description: None,
        }
    }

    #[test]
    fn test_parse_import_id() {
        assert_eq!(parse_import_id("consumer/123").unwrap(), (Pov::Consumer, 123));
        assert_eq!(parse_import_id("serviceowner/7").unwrap(), (Pov::ServiceOwner, 7));
    }

    #[test]
    fn test_parse_import_id_errors() {
        for input in ["consumer", "consumer/abc", "consumer/", "owner/1", "/1", "consumer/1/2"] {
            assert!(
                matches!(parse_import_id(input), Err(NetOrcaError::Format { .. })),
                "{} should fail",
                input
            );
        }
    }

    #[test]
    fn test_differs_from() {
        let prior = state(Some("APPROVED"), r#"{"a":1}"#);
        assert!(!state(Some("APPROVED"), r#"{ "a": 1 }"#).differs_from(&prior));
        assert!(state(Some("COMPLETED"), r#"{"a":1}"#).differs_from(&prior));
        assert!(state(Some("APPROVED"), r#"{"a":2}"#).differs_from(&prior));
        assert!(state(None, r#"{"a":1}"#).differs_from(&prior));
    }

    #[test]
    fn test_payload_changed_falls_back_to_text() {
        assert!(!payload_changed("not json", "not json"));
        assert!(payload_changed("not json", "{}"));
    }

    #[test]
    fn test_default_description() {
        let req = state(None, "{}").update_request();
        assert_eq!(req.description, DEFAULT_DESCRIPTION);
    }

    #[test]
    fn test_attr_roundtrip() {
        let s = ChangeInstanceState {
            description: Some("via pipeline".to_string()),
            ..state(Some("ERROR"), r#"{"x":true}"#)
        };
        assert_eq!(ChangeInstanceState::from_attr(&s.to_attr()).unwrap(), s);
    }

    #[test]
    fn test_from_attr_requires_id_and_pov() {
        let missing_id = AttrValue::object([
            ("pov", AttrValue::string("consumer")),
            ("deployed_item", AttrValue::string("{}")),
        ]);
        assert!(matches!(
            ChangeInstanceState::from_attr(&missing_id),
            Err(NetOrcaError::Validation { ref field, .. }) if field == "id"
        ));

        let bad_pov = AttrValue::object([
            ("id", AttrValue::Int64(1)),
            ("pov", AttrValue::string("everyone")),
            ("deployed_item", AttrValue::string("{}")),
        ]);
        assert!(matches!(
            ChangeInstanceState::from_attr(&bad_pov),
            Err(NetOrcaError::Validation { ref field, expected: FieldKind::Pov }) if field == "pov"
        ));
    }
}

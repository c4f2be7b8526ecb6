//! Record converters
//!
//! Map decoded NetOrca records into [`AttrValue`] object trees. Free-form
//! JSON fields (metadata, declaration, deployed item) are re-serialized to
//! JSON strings so the host can store them without a fixed schema.

use super::value::AttrValue;
use crate::netorca::{
    Application, ChangeInstance, NamedRef, NetOrcaError, Result, Service, ServiceItem,
    Submission, Team,
};
use serde_json::Value;
use std::collections::BTreeMap;

/// Serialize a free-form field to a JSON string
pub fn json_string(value: &Value, context: &str) -> Result<String> {
    serde_json::to_string(value).map_err(|e| NetOrcaError::encode(context, e))
}

fn named_ref(r: &NamedRef) -> AttrValue {
    AttrValue::object([
        ("id", AttrValue::Int64(r.id)),
        ("name", AttrValue::string(&r.name)),
    ])
}

fn team(t: &Team, context: &str) -> Result<AttrValue> {
    Ok(AttrValue::object([
        ("id", AttrValue::Int64(t.id)),
        ("name", AttrValue::string(&t.name)),
        ("metadata", AttrValue::String(json_string(&t.metadata, context)?)),
    ]))
}

fn service(s: &Service) -> AttrValue {
    AttrValue::object([
        ("id", AttrValue::Int64(s.id)),
        ("name", AttrValue::string(&s.name)),
        ("owner", named_ref(&s.owner)),
        ("healthcheck", AttrValue::Bool(s.healthcheck)),
    ])
}

fn application(a: &Application, context: &str) -> Result<AttrValue> {
    Ok(AttrValue::object([
        ("id", AttrValue::Int64(a.id)),
        ("name", AttrValue::string(&a.name)),
        ("metadata", AttrValue::String(json_string(&a.metadata, context)?)),
        ("owner", AttrValue::Int64(a.owner)),
    ]))
}

fn submission(s: &Submission) -> AttrValue {
    AttrValue::object([
        ("id", AttrValue::Int64(s.id)),
        ("commit_id", AttrValue::string(&s.commit_id)),
    ])
}

/// Fields shared by an embedded and a listed service item
fn service_item_fields(item: &ServiceItem) -> Result<BTreeMap<String, AttrValue>> {
    let fields = [
        ("id", AttrValue::Int64(item.id)),
        ("url", AttrValue::string(&item.url)),
        ("name", AttrValue::string(&item.name)),
        ("created", AttrValue::string(&item.created)),
        ("modified", AttrValue::string(&item.modified)),
        ("runtime_state", AttrValue::string(&item.runtime_state)),
        ("change_state", AttrValue::string(&item.change_state)),
        ("service", service(&item.service)),
        (
            "application",
            application(&item.application, "service_item.application.metadata")?,
        ),
        (
            "declaration",
            AttrValue::String(json_string(&item.declaration, "service_item.declaration")?),
        ),
        (
            "deployed_item",
            AttrValue::String(json_string(&item.deployed_item, "service_item.deployed_item")?),
        ),
    ];
    Ok(fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

/// Full service item, as listed by the service items data source
pub fn service_item(item: &ServiceItem) -> Result<AttrValue> {
    let mut fields = service_item_fields(item)?;
    fields.insert(
        "consumer_team".to_string(),
        team(&item.consumer_team, "service_item.consumer_team.metadata")?,
    );
    fields.insert(
        "service_owner_team".to_string(),
        named_ref(&item.service_owner_team),
    );
    fields.insert(
        "healthcheck_status".to_string(),
        AttrValue::from(item.healthcheck_status),
    );
    Ok(AttrValue::Object(fields))
}

pub fn change_instance(ci: &ChangeInstance) -> Result<AttrValue> {
    Ok(AttrValue::object([
        ("id", AttrValue::Int64(ci.id)),
        ("url", AttrValue::string(&ci.url)),
        ("state", AttrValue::string(&ci.state)),
        ("created", AttrValue::string(&ci.created)),
        ("modified", AttrValue::string(&ci.modified)),
        ("owner", named_ref(&ci.owner)),
        ("consumer_team", team(&ci.consumer_team, "consumer_team.metadata")?),
        ("submission", submission(&ci.submission)),
        (
            "service_item",
            AttrValue::Object(service_item_fields(&ci.service_item)?),
        ),
    ]))
}

/// Convert a page of change instances. The first failure aborts the list.
pub fn change_instance_list(items: &[ChangeInstance]) -> Result<AttrValue> {
    items
        .iter()
        .map(change_instance)
        .collect::<Result<Vec<_>>>()
        .map(AttrValue::List)
}

/// Convert a page of service items. The first failure aborts the list.
pub fn service_item_list(items: &[ServiceItem]) -> Result<AttrValue> {
    items
        .iter()
        .map(service_item)
        .collect::<Result<Vec<_>>>()
        .map(AttrValue::List)
}

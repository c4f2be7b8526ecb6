//! NetOrca Change Instances
//!
//! Change instances are created by the platform. This client can list them,
//! fetch one by id, and PATCH its state, description and deployed item.

use super::client::NetOrcaClient;
use super::error::{NetOrcaError, Result};
use super::query::{FilterArgs, Pov, QueryParams, Separator, UnknownKeys};
use super::service_items::{NamedRef, ServiceItem, Team};
use super::{null_as_default, Page};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const COLLECTION: &str = "change_instances";

/// Submission a change instance was raised from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Submission {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub commit_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangeInstance {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(deserialize_with = "null_as_default")]
    pub created: String,
    #[serde(deserialize_with = "null_as_default")]
    pub modified: String,
    #[serde(deserialize_with = "null_as_default")]
    pub owner: NamedRef,
    #[serde(deserialize_with = "null_as_default")]
    pub consumer_team: Team,
    pub service_owner_team: Value,
    #[serde(deserialize_with = "null_as_default")]
    pub submission: Submission,
    #[serde(deserialize_with = "null_as_default")]
    pub service_item: ServiceItem,
}

/// Filters for listing change instances
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeInstanceQuery {
    pub pov: Pov,
    pub application_id: Option<i64>,
    pub change_type: Option<String>,
    pub commit_id: Option<String>,
    pub consumer_team_id: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub ordering: Option<String>,
    pub service_id: Option<i64>,
    pub service_item_id: Option<i64>,
    pub service_name: Option<String>,
    pub service_owner_team_id: Option<i64>,
    pub state: Option<String>,
    pub submission_id: Option<i64>,
}

impl ChangeInstanceQuery {
    /// Every key this query understands, `pov` included
    pub const FIELDS: &'static [&'static str] = &[
        "pov",
        "application_id",
        "change_type",
        "commit_id",
        "consumer_team_id",
        "limit",
        "offset",
        "ordering",
        "service_id",
        "service_item_id",
        "service_name",
        "service_owner_team_id",
        "state",
        "submission_id",
    ];

    /// A query with no filters
    pub fn new(pov: Pov) -> Self {
        Self {
            pov,
            application_id: None,
            change_type: None,
            commit_id: None,
            consumer_team_id: None,
            limit: None,
            offset: None,
            ordering: None,
            service_id: None,
            service_item_id: None,
            service_name: None,
            service_owner_team_id: None,
            state: None,
            submission_id: None,
        }
    }

    /// Build a query from an untyped mapping, ignoring unrecognized keys
    pub fn from_args(args: &Map<String, Value>) -> Result<Self> {
        Self::from_args_with(args, UnknownKeys::Ignore)
    }

    pub fn from_args_with(args: &Map<String, Value>, unknown: UnknownKeys) -> Result<Self> {
        let a = FilterArgs::new(args);
        a.check_unknown(Self::FIELDS, unknown)?;

        Ok(Self {
            pov: a.pov()?,
            application_id: a.int64("application_id")?,
            change_type: a.string("change_type")?,
            commit_id: a.string("commit_id")?,
            consumer_team_id: a.int64("consumer_team_id")?,
            limit: a.int64("limit")?,
            offset: a.int64("offset")?,
            ordering: a.string("ordering")?,
            service_id: a.int64("service_id")?,
            service_item_id: a.int64("service_item_id")?,
            service_name: a.string("service_name")?,
            service_owner_team_id: a.int64("service_owner_team_id")?,
            state: a.string("state")?,
            submission_id: a.int64("submission_id")?,
        })
    }

    /// Render as `?field=value&...`, or `""` when no filter is set
    pub fn to_query_string(&self) -> String {
        QueryParams::new(Separator::Between)
            .int("application_id", self.application_id)
            .string("change_type", self.change_type.as_deref())
            .string("commit_id", self.commit_id.as_deref())
            .int("consumer_team_id", self.consumer_team_id)
            .int("limit", self.limit)
            .int("offset", self.offset)
            .string("ordering", self.ordering.as_deref())
            .int("service_id", self.service_id)
            .int("service_item_id", self.service_item_id)
            .string("service_name", self.service_name.as_deref())
            .int("service_owner_team_id", self.service_owner_team_id)
            .string("state", self.state.as_deref())
            .int("submission_id", self.submission_id)
            .render()
    }
}

/// Desired values for a change instance PATCH.
///
/// `deployed_item` is JSON text and must decode to an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeInstanceUpdate {
    pub state: Option<String>,
    pub description: String,
    pub deployed_item: String,
}

impl ChangeInstanceUpdate {
    /// The PATCH body. `state` is left out when unset.
    pub fn to_body(&self) -> Result<Value> {
        let deployed_item: Map<String, Value> = serde_json::from_str(&self.deployed_item)
            .map_err(|e| NetOrcaError::decode("deployed_item", e))?;

        let mut body = Map::new();
        if let Some(state) = &self.state {
            body.insert("state".to_string(), Value::String(state.clone()));
        }
        body.insert(
            "description".to_string(),
            Value::String(self.description.clone()),
        );
        body.insert("deployed_item".to_string(), Value::Object(deployed_item));
        Ok(Value::Object(body))
    }
}

/// List change instances matching a query (one page)
pub async fn list_change_instances(
    client: &NetOrcaClient,
    query: &ChangeInstanceQuery,
) -> Result<Page<ChangeInstance>> {
    let url = format!(
        "{}{}",
        client.collection_url(query.pov, COLLECTION),
        query.to_query_string()
    );
    let page: Page<ChangeInstance> = client.get(&url).await?;
    tracing::debug!("Fetched {} of {} change instances", page.results.len(), page.count);
    Ok(page)
}

/// Fetch a single change instance
pub async fn get_change_instance(client: &NetOrcaClient, id: i64, pov: Pov) -> Result<ChangeInstance> {
    client.get(&client.record_url(pov, COLLECTION, id)).await
}

/// Update a change instance. The payload is validated before any request is sent.
pub async fn patch_change_instance(
    client: &NetOrcaClient,
    id: i64,
    pov: Pov,
    update: &ChangeInstanceUpdate,
) -> Result<()> {
    let body = update.to_body()?;
    tracing::info!("Updating change instance {} ({})", id, pov);
    client.patch(&client.record_url(pov, COLLECTION, id), &body).await
}

//! NetOrca Service Items
//!
//! Read-only records describing provisioned instances of catalog services,
//! plus the filter query for listing them.

use super::client::NetOrcaClient;
use super::error::Result;
use super::query::{FilterArgs, Pov, QueryParams, Separator, UnknownKeys};
use super::{null_as_default, Page};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const COLLECTION: &str = "service_items";

/// An `{id, name}` reference to another platform record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamedRef {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

/// Consumer team with its free-form metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Team {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub metadata: Value,
}

/// Catalog service a service item was provisioned from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Service {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub owner: NamedRef,
    #[serde(deserialize_with = "null_as_default")]
    pub healthcheck: bool,
}

/// Consumer application owning a service item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Application {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub metadata: Value,
    #[serde(deserialize_with = "null_as_default")]
    pub owner: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceItem {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub created: String,
    #[serde(deserialize_with = "null_as_default")]
    pub modified: String,
    #[serde(deserialize_with = "null_as_default")]
    pub runtime_state: String,
    #[serde(deserialize_with = "null_as_default")]
    pub service_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub change_state: String,
    #[serde(deserialize_with = "null_as_default")]
    pub service: Service,
    #[serde(deserialize_with = "null_as_default")]
    pub application: Application,
    pub deployed_item: Value,
    #[serde(deserialize_with = "null_as_default")]
    pub consumer_team: Team,
    #[serde(deserialize_with = "null_as_default")]
    pub service_owner_team: NamedRef,
    pub declaration: Value,
    pub related: Value,
    /// `None` when the service has no health check, which is not the same as 0
    pub healthcheck_status: Option<i64>,
}

/// Filters for listing service items. Integer filters must be non-negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceItemQuery {
    pub pov: Pov,
    pub application_id: Option<i64>,
    pub change_state: Option<String>,
    pub consumer_team_id: Option<i64>,
    pub limit: Option<i64>,
    pub name: Option<String>,
    pub offset: Option<i64>,
    pub ordering: Option<String>,
    pub runtime_state: Option<String>,
    pub service_name: Option<String>,
    pub service_owner_id: Option<i64>,
    pub service_owner_team_id: Option<i64>,
}

impl ServiceItemQuery {
    /// Every key this query understands, `pov` included
    pub const FIELDS: &'static [&'static str] = &[
        "pov",
        "application_id",
        "change_state",
        "consumer_team_id",
        "limit",
        "name",
        "offset",
        "ordering",
        "runtime_state",
        "service_name",
        "service_owner_id",
        "service_owner_team_id",
    ];

    /// A query with no filters
    pub fn new(pov: Pov) -> Self {
        Self {
            pov,
            application_id: None,
            change_state: None,
            consumer_team_id: None,
            limit: None,
            name: None,
            offset: None,
            ordering: None,
            runtime_state: None,
            service_name: None,
            service_owner_id: None,
            service_owner_team_id: None,
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
            application_id: a.uint64("application_id")?,
            change_state: a.string("change_state")?,
            consumer_team_id: a.uint64("consumer_team_id")?,
            limit: a.uint64("limit")?,
            name: a.string("name")?,
            offset: a.uint64("offset")?,
            ordering: a.string("ordering")?,
            runtime_state: a.string("runtime_state")?,
            service_name: a.string("service_name")?,
            service_owner_id: a.uint64("service_owner_id")?,
            service_owner_team_id: a.uint64("service_owner_team_id")?,
        })
    }

    /// Render as `?&field=value&...`, or `""` when no filter is set.
    ///
    /// The leading `&` is what the platform has always received from this
    /// client for service items, so it is kept as-is.
    pub fn to_query_string(&self) -> String {
        QueryParams::new(Separator::Leading)
            .int("application_id", self.application_id)
            .string("change_state", self.change_state.as_deref())
            .int("consumer_team_id", self.consumer_team_id)
            .int("limit", self.limit)
            .string("name", self.name.as_deref())
            .int("offset", self.offset)
            .string("ordering", self.ordering.as_deref())
            .string("runtime_state", self.runtime_state.as_deref())
            .string("service_name", self.service_name.as_deref())
            .int("service_owner_id", self.service_owner_id)
            .int("service_owner_team_id", self.service_owner_team_id)
            .render()
    }
}

/// List service items matching a query (one page)
pub async fn list_service_items(
    client: &NetOrcaClient,
    query: &ServiceItemQuery,
) -> Result<Page<ServiceItem>> {
    let url = format!(
        "{}{}",
        client.collection_url(query.pov, COLLECTION),
        query.to_query_string()
    );
    let page: Page<ServiceItem> = client.get(&url).await?;
    tracing::debug!("Fetched {} of {} service items", page.results.len(), page.count);
    Ok(page)
}

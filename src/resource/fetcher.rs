//! Data source fetcher
//!
//! Reads one page of change instances or service items for a data source
//! configuration and returns the resulting data source state.

use super::convert;
use super::value::AttrValue;
use crate::netorca::{
    self, ChangeInstanceQuery, NetOrcaClient, Result, ServiceItemQuery,
};
use serde_json::{Map, Value};

/// Merge the top-level `pov` with the `filters` block into one untyped mapping
fn filter_args(config: &AttrValue) -> Map<String, Value> {
    let mut args = config
        .get("filters")
        .map(AttrValue::to_filter_args)
        .unwrap_or_default();

    match config.get("pov") {
        Some(pov) if !pov.is_null() && !pov.is_unknown() => {
            args.insert("pov".to_string(), pov.to_json());
        }
        _ => {
            args.remove("pov");
        }
    }
    args
}

fn filters_echo(config: &AttrValue) -> AttrValue {
    config.get("filters").cloned().unwrap_or(AttrValue::Null)
}

/// Read the `netorca_change_instances` data source
pub async fn fetch_change_instances(client: &NetOrcaClient, config: &AttrValue) -> Result<AttrValue> {
    let query = ChangeInstanceQuery::from_args(&filter_args(config))?;
    let page = netorca::list_change_instances(client, &query).await?;
    let items = convert::change_instance_list(&page.results)?;

    tracing::info!("Read {} change instances ({})", page.results.len(), query.pov);

    Ok(AttrValue::object([
        ("pov", AttrValue::string(query.pov.as_str())),
        ("filters", filters_echo(config)),
        ("change_instance_count", AttrValue::Int64(page.count)),
        ("change_instances", items),
    ]))
}

/// Read the `netorca_service_items` data source
pub async fn fetch_service_items(client: &NetOrcaClient, config: &AttrValue) -> Result<AttrValue> {
    let query = ServiceItemQuery::from_args(&filter_args(config))?;
    let page = netorca::list_service_items(client, &query).await?;
    let items = convert::service_item_list(&page.results)?;

    tracing::info!("Read {} service items ({})", page.results.len(), query.pov);

    Ok(AttrValue::object([
        ("pov", AttrValue::string(query.pov.as_str())),
        ("filters", filters_echo(config)),
        ("service_item_count", AttrValue::Int64(page.count)),
        ("service_items", items),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_args_merges_pov() {
        let config = AttrValue::object([
            ("pov", AttrValue::string("serviceowner")),
            (
                "filters",
                AttrValue::object([
                    ("limit", AttrValue::Int64(5)),
                    ("name", AttrValue::Null),
                ]),
            ),
        ]);
        let args = filter_args(&config);
        assert_eq!(Value::Object(args), json!({"pov": "serviceowner", "limit": 5}));
    }

    #[test]
    fn test_filter_args_without_filters_block() {
        let config = AttrValue::object([("pov", AttrValue::string("consumer"))]);
        assert_eq!(Value::Object(filter_args(&config)), json!({"pov": "consumer"}));
    }

    #[test]
    fn test_pov_inside_filters_is_not_used() {
        let config = AttrValue::object([(
            "filters",
            AttrValue::object([("pov", AttrValue::string("consumer"))]),
        )]);
        assert!(filter_args(&config).is_empty());
    }
}

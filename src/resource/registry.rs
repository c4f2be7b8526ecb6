//! Schema Registry - Load provider, resource and data source schemas from JSON
//!
//! The schemas are embedded at compile time and parsed once on first access.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Provider type name; every resource and data source type is prefixed with it
pub const PROVIDER_TYPE_NAME: &str = "netorca";

/// Embedded schema file (compiled into the binary)
const SCHEMA_FILE: &str = include_str!("../resources/netorca.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    String,
    Int64,
    Bool,
    Object,
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeMode {
    Required,
    Optional,
    Computed,
}

/// Attribute definition from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeDef {
    pub name: String,
    pub kind: AttributeKind,
    pub mode: AttributeMode,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub sensitive: bool,
    #[serde(default)]
    pub description: String,
    /// Nested attributes of an object, or of each element of a list
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<AttributeDef>,
}

/// Schema of the provider block, a resource or a data source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDef {
    pub description: String,
    pub attributes: Vec<AttributeDef>,
}

impl SchemaDef {
    pub fn attribute(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// Root structure of resources/netorca.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSchema {
    pub provider: SchemaDef,
    #[serde(default)]
    pub resources: BTreeMap<String, SchemaDef>,
    #[serde(default)]
    pub data_sources: BTreeMap<String, SchemaDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<ProviderSchema> = OnceLock::new();

/// Get the schema registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static ProviderSchema {
    REGISTRY.get_or_init(|| {
        serde_json::from_str(SCHEMA_FILE)
            .unwrap_or_else(|e| panic!("Failed to parse embedded schema JSON: {}", e))
    })
}

pub fn get_resource_schema(type_name: &str) -> Option<&'static SchemaDef> {
    get_registry().resources.get(type_name)
}

pub fn get_data_source_schema(type_name: &str) -> Option<&'static SchemaDef> {
    get_registry().data_sources.get(type_name)
}

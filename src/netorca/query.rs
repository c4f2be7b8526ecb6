//! Query building shared by the NetOrca collections
//!
//! Filters arrive as an untyped JSON object (the shape the host hands over).
//! [`FilterArgs`] extracts typed values from it, and [`QueryParams`] renders
//! the typed result into a query string in a fixed field order.

use super::error::{FieldKind, NetOrcaError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Point of view a request is scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pov {
    Consumer,
    ServiceOwner,
}

impl Pov {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pov::Consumer => "consumer",
            Pov::ServiceOwner => "serviceowner",
        }
    }
}

impl fmt::Display for Pov {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pov {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "consumer" => Ok(Pov::Consumer),
            "serviceowner" => Ok(Pov::ServiceOwner),
            other => Err(format!(
                "unknown pov '{}', expected consumer or serviceowner",
                other
            )),
        }
    }
}

/// What to do with keys that are not part of a query's field set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownKeys {
    /// Skip them silently
    #[default]
    Ignore,
    /// Fail with [`NetOrcaError::UnknownFilter`]
    Reject,
}

/// Typed accessors over an untyped filter mapping.
///
/// A `null` value counts as unset. Any other value must match the expected
/// type exactly.
pub(crate) struct FilterArgs<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> FilterArgs<'a> {
    pub(crate) fn new(map: &'a Map<String, Value>) -> Self {
        Self { map }
    }

    fn present(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    pub(crate) fn string(&self, key: &str) -> Result<Option<String>> {
        match self.present(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(NetOrcaError::validation(key, FieldKind::String)),
        }
    }

    pub(crate) fn int64(&self, key: &str) -> Result<Option<i64>> {
        match self.present(key) {
            None => Ok(None),
            Some(v) => v
                .as_i64()
                .map(Some)
                .ok_or_else(|| NetOrcaError::validation(key, FieldKind::Int64)),
        }
    }

    pub(crate) fn uint64(&self, key: &str) -> Result<Option<i64>> {
        match self.present(key) {
            None => Ok(None),
            Some(v) => match v.as_i64() {
                Some(i) if i >= 0 => Ok(Some(i)),
                _ => Err(NetOrcaError::validation(key, FieldKind::UnsignedInt64)),
            },
        }
    }

    /// The mandatory point of view. It lives in the URL path, not the query.
    pub(crate) fn pov(&self) -> Result<Pov> {
        let pov = self
            .string("pov")?
            .ok_or_else(|| NetOrcaError::validation("pov", FieldKind::String))?;
        pov.parse()
            .map_err(|_| NetOrcaError::validation("pov", FieldKind::Pov))
    }

    pub(crate) fn check_unknown(&self, known: &[&str], policy: UnknownKeys) -> Result<()> {
        if policy == UnknownKeys::Ignore {
            return Ok(());
        }
        match self.map.keys().find(|k| !known.contains(&k.as_str())) {
            Some(key) => Err(NetOrcaError::UnknownFilter(key.clone())),
            None => Ok(()),
        }
    }
}

/// Where the `&` separators go in a rendered query string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Separator {
    /// `?a=1&b=2`
    Between,
    /// `?&a=1&b=2`
    Leading,
}

/// Ordered query parameters. Zero integers and empty strings are skipped.
pub(crate) struct QueryParams {
    separator: Separator,
    pairs: Vec<(&'static str, String)>,
}

impl QueryParams {
    pub(crate) fn new(separator: Separator) -> Self {
        Self {
            separator,
            pairs: Vec::new(),
        }
    }

    pub(crate) fn int(mut self, key: &'static str, value: Option<i64>) -> Self {
        if let Some(v) = value.filter(|v| *v != 0) {
            self.pairs.push((key, v.to_string()));
        }
        self
    }

    pub(crate) fn string(mut self, key: &'static str, value: Option<&str>) -> Self {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            self.pairs.push((key, urlencoding::encode(v).into_owned()));
        }
        self
    }

    pub(crate) fn render(&self) -> String {
        if self.pairs.is_empty() {
            return String::new();
        }

        let parts: Vec<String> = self
            .pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();

        match self.separator {
            Separator::Between => format!("?{}", parts.join("&")),
            Separator::Leading => format!("?&{}", parts.join("&")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_pov_parses_both_values() {
        assert_eq!("consumer".parse::<Pov>(), Ok(Pov::Consumer));
        assert_eq!("serviceowner".parse::<Pov>(), Ok(Pov::ServiceOwner));
        assert!("owner".parse::<Pov>().is_err());
    }

    #[test]
    fn test_pov_serde_uses_path_segment() {
        assert_eq!(serde_json::to_value(Pov::ServiceOwner).unwrap(), json!("serviceowner"));
    }

    #[test]
    fn test_null_counts_as_unset() {
        let m = map(json!({"limit": null, "name": null}));
        let args = FilterArgs::new(&m);
        assert_eq!(args.int64("limit").unwrap(), None);
        assert_eq!(args.string("name").unwrap(), None);
    }

    #[test]
    fn test_float_is_not_an_int64() {
        let m = map(json!({"limit": 1.5}));
        let err = FilterArgs::new(&m).int64("limit").unwrap_err();
        assert_eq!(err.to_string(), "limit not passed as an int64");
    }

    #[test]
    fn test_uint64_rejects_negative() {
        let m = map(json!({"offset": -1}));
        let err = FilterArgs::new(&m).uint64("offset").unwrap_err();
        assert!(matches!(err, NetOrcaError::Validation { ref field, expected: FieldKind::UnsignedInt64 } if field == "offset"));
    }

    #[test]
    fn test_missing_pov_is_a_validation_error() {
        let m = map(json!({}));
        let err = FilterArgs::new(&m).pov().unwrap_err();
        assert!(matches!(err, NetOrcaError::Validation { ref field, .. } if field == "pov"));
    }

    #[test]
    fn test_unrecognized_pov_names_accepted_values() {
        let m = map(json!({"pov": "everyone"}));
        let err = FilterArgs::new(&m).pov().unwrap_err();
        assert!(matches!(err, NetOrcaError::Validation { expected: FieldKind::Pov, .. }));
        assert_eq!(err.to_string(), "pov not passed as one of consumer|serviceowner");

        let m = map(json!({"pov": 7}));
        let err = FilterArgs::new(&m).pov().unwrap_err();
        assert_eq!(err.to_string(), "pov not passed as a string");
    }

    #[test]
    fn test_reject_policy_names_unknown_key() {
        let m = map(json!({"pov": "consumer", "colour": "blue"}));
        let args = FilterArgs::new(&m);
        assert!(args.check_unknown(&["pov"], UnknownKeys::Ignore).is_ok());
        let err = args.check_unknown(&["pov"], UnknownKeys::Reject).unwrap_err();
        assert!(matches!(err, NetOrcaError::UnknownFilter(ref k) if k == "colour"));
    }

    #[test]
    fn test_render_empty_is_empty_string() {
        assert_eq!(QueryParams::new(Separator::Between).int("a", Some(0)).render(), "");
        assert_eq!(QueryParams::new(Separator::Leading).string("a", Some("")).render(), "");
    }

    #[test]
    fn test_render_separators() {
        let between = QueryParams::new(Separator::Between)
            .int("a", Some(1))
            .string("b", Some("x"))
            .render();
        assert_eq!(between, "?a=1&b=x");

        let leading = QueryParams::new(Separator::Leading)
            .int("a", Some(1))
            .string("b", Some("x"))
            .render();
        assert_eq!(leading, "?&a=1&b=x");
    }

    #[test]
    fn test_render_encodes_values() {
        let q = QueryParams::new(Separator::Between)
            .string("name", Some("web app&co"))
            .render();
        assert_eq!(q, "?name=web%20app%26co");
    }
}

//! Property-based tests using proptest
//!
//! These tests verify filter argument validation and query string rendering
//! for both collections using randomized inputs.

use netorca_provider::netorca::{
    ChangeInstanceQuery, FieldKind, NetOrcaError, ServiceItemQuery, UnknownKeys,
};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

const CHANGE_INSTANCE_INT_FIELDS: &[&str] = &[
    "application_id",
    "consumer_team_id",
    "limit",
    "offset",
    "service_id",
    "service_item_id",
    "service_owner_team_id",
    "submission_id",
];

const CHANGE_INSTANCE_STRING_FIELDS: &[&str] = &[
    "change_type",
    "commit_id",
    "ordering",
    "service_name",
    "state",
];

const SERVICE_ITEM_INT_FIELDS: &[&str] = &[
    "application_id",
    "consumer_team_id",
    "limit",
    "offset",
    "service_owner_id",
    "service_owner_team_id",
];

const SERVICE_ITEM_STRING_FIELDS: &[&str] = &[
    "change_state",
    "name",
    "ordering",
    "runtime_state",
    "service_name",
];

fn arb_pov() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("consumer"), Just("serviceowner")]
}

/// Build a filter mapping inserting pairs in the given order
fn args_of(pov: &str, pairs: &[(String, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("pov".to_string(), json!(pov));
    for (k, v) in pairs {
        map.insert(k.clone(), v.clone());
    }
    map
}

/// Arbitrary JSON scalars
fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::from),
    ]
}

mod rendering {
    use super::*;

    proptest! {
        /// The rendered string does not depend on how the filters were supplied
        #[test]
        fn rendering_is_independent_of_insertion_order(
            pov in arb_pov(),
            service_id in 1i64..10_000,
            service_name in "[a-z]{1,8}",
            state in "[A-Z]{1,8}",
            submission_id in 1i64..10_000,
            order in Just(vec![0usize, 1, 2, 3]).prop_shuffle(),
        ) {
            let all = [
                ("service_id".to_string(), json!(service_id)),
                ("service_name".to_string(), json!(service_name)),
                ("state".to_string(), json!(state)),
                ("submission_id".to_string(), json!(submission_id)),
            ];
            let shuffled: Vec<_> = order.iter().map(|i| all[*i].clone()).collect();

            let query = ChangeInstanceQuery::from_args(&args_of(pov, &shuffled)).unwrap();
            let expected = format!(
                "?service_id={}&service_name={}&state={}&submission_id={}",
                service_id, service_name, state, submission_id
            );
            prop_assert_eq!(query.to_query_string(), expected);
        }

        /// Zero integers and empty strings render nothing at all
        #[test]
        fn zero_and_empty_filters_render_empty(
            pov in arb_pov(),
            int_count in 0usize..=6,
            string_count in 0usize..=5,
        ) {
            let mut pairs: Vec<(String, Value)> = SERVICE_ITEM_INT_FIELDS[..int_count]
                .iter()
                .map(|f| (f.to_string(), json!(0)))
                .collect();
            pairs.extend(
                SERVICE_ITEM_STRING_FIELDS[..string_count]
                    .iter()
                    .map(|f| (f.to_string(), json!(""))),
            );

            let si = ServiceItemQuery::from_args(&args_of(pov, &pairs)).unwrap();
            prop_assert_eq!(si.to_query_string(), "");

            let ci = ChangeInstanceQuery::from_args(&args_of(pov, &pairs)).unwrap();
            prop_assert_eq!(ci.to_query_string(), "");
        }

        /// String values survive percent-encoding unchanged
        #[test]
        fn string_values_are_percent_encoded(pov in arb_pov(), name in "\\PC{1,20}") {
            let pairs = [("service_name".to_string(), json!(name))];
            let query = ChangeInstanceQuery::from_args(&args_of(pov, &pairs)).unwrap();
            let rendered = query.to_query_string();

            let encoded = rendered.strip_prefix("?service_name=").unwrap();
            prop_assert!(!encoded.contains('&'));
            prop_assert!(!encoded.contains(' '));
            prop_assert_eq!(urlencoding::decode(encoded).unwrap(), name);
        }

        /// Service item queries always start with `?&` when anything is set
        #[test]
        fn service_item_queries_use_leading_separator(
            pov in arb_pov(),
            application_id in 1i64..1_000_000,
        ) {
            let pairs = [("application_id".to_string(), json!(application_id))];
            let query = ServiceItemQuery::from_args(&args_of(pov, &pairs)).unwrap();
            prop_assert_eq!(
                query.to_query_string(),
                format!("?&application_id={}", application_id)
            );
        }
    }
}

mod validation {
    use super::*;

    proptest! {
        /// A recognized integer field given a string fails and names the field
        #[test]
        fn wrong_type_for_integer_names_the_field(
            pov in arb_pov(),
            idx in 0usize..CHANGE_INSTANCE_INT_FIELDS.len(),
            text in "[a-z]{1,8}",
        ) {
            let field = CHANGE_INSTANCE_INT_FIELDS[idx];
            let pairs = [(field.to_string(), json!(text))];
            let err = ChangeInstanceQuery::from_args(&args_of(pov, &pairs)).unwrap_err();
            prop_assert!(
                matches!(err, NetOrcaError::Validation { field: ref f, expected: FieldKind::Int64 } if f == field),
                "unexpected error: {}", err
            );
        }

        /// A recognized string field given a number fails and names the field
        #[test]
        fn wrong_type_for_string_names_the_field(
            pov in arb_pov(),
            idx in 0usize..SERVICE_ITEM_STRING_FIELDS.len(),
            number in any::<i64>(),
        ) {
            let field = SERVICE_ITEM_STRING_FIELDS[idx];
            let pairs = [(field.to_string(), json!(number))];
            let err = ServiceItemQuery::from_args(&args_of(pov, &pairs)).unwrap_err();
            prop_assert_eq!(err.to_string(), format!("{} not passed as a string", field));
        }

        /// Negative integers are rejected for service item filters only
        #[test]
        fn negative_integers_rejected_for_service_items(
            pov in arb_pov(),
            idx in 0usize..SERVICE_ITEM_INT_FIELDS.len(),
            value in i64::MIN..0,
        ) {
            let field = SERVICE_ITEM_INT_FIELDS[idx];
            let pairs = [(field.to_string(), json!(value))];

            let err = ServiceItemQuery::from_args(&args_of(pov, &pairs)).unwrap_err();
            prop_assert_eq!(err.to_string(), format!("{} not passed as a uint64", field));

            if CHANGE_INSTANCE_INT_FIELDS.contains(&field) {
                prop_assert!(ChangeInstanceQuery::from_args(&args_of(pov, &pairs)).is_ok());
            }
        }

        /// Unrecognized keys never fail under the default policy
        #[test]
        fn unknown_keys_are_ignored(
            pov in arb_pov(),
            extra in prop::collection::vec(("x_[a-z_]{1,10}", arb_scalar()), 0..8),
        ) {
            let args = args_of(pov, &extra);
            prop_assert!(ChangeInstanceQuery::from_args(&args).is_ok());
            prop_assert!(ServiceItemQuery::from_args(&args).is_ok());
        }

        /// The strict policy rejects the first unrecognized key
        #[test]
        fn unknown_keys_rejected_when_strict(
            pov in arb_pov(),
            key in "x_[a-z_]{1,10}",
            value in arb_scalar(),
        ) {
            let args = args_of(pov, &[(key.clone(), value)]);
            let err = ServiceItemQuery::from_args_with(&args, UnknownKeys::Reject).unwrap_err();
            prop_assert!(matches!(err, NetOrcaError::UnknownFilter(ref k) if *k == key));
        }

        /// `null` is the same as leaving a filter out
        #[test]
        fn null_values_count_as_unset(
            pov in arb_pov(),
            idx in 0usize..CHANGE_INSTANCE_STRING_FIELDS.len(),
        ) {
            let field = CHANGE_INSTANCE_STRING_FIELDS[idx];
            let pairs = [(field.to_string(), Value::Null)];
            let query = ChangeInstanceQuery::from_args(&args_of(pov, &pairs)).unwrap();
            prop_assert_eq!(query.to_query_string(), "");
        }
    }

    #[test]
    fn missing_pov_is_rejected() {
        let err = ChangeInstanceQuery::from_args(&Map::new()).unwrap_err();
        assert_eq!(err.to_string(), "pov not passed as a string");
    }
}

//! Integration tests for dynamically typed datum input.

use serde_json::{Value, json};
use tsdatum::json::{
    metric_from_json, tag_from_json, tag_name_from_json, timestamp_from_json, value_from_json,
};
use tsdatum::{Datum, TypeError};

/// Inputs of every JSON kind, labelled for assertion messages.
fn all_kinds() -> Vec<(&'static str, Value)> {
    vec![
        ("string", json!("cpu")),
        ("number", json!(5)),
        ("float", json!(0.5)),
        ("boolean", json!(true)),
        ("null", Value::Null),
        ("array", json!([])),
        ("object", json!({})),
    ]
}

#[test]
fn test_string_fields_accept_only_strings() {
    for (kind, value) in all_kinds() {
        let is_string = kind == "string";
        assert_eq!(metric_from_json(&value).is_ok(), is_string, "metric {kind}");
        assert_eq!(tag_name_from_json(&value).is_ok(), is_string, "tag name {kind}");
        assert_eq!(
            tag_from_json(&json!("host"), &value).is_ok(),
            is_string,
            "tag value {kind}"
        );
    }
}

#[test]
fn test_value_accepts_only_numbers() {
    for (kind, value) in all_kinds() {
        let is_number = kind == "number" || kind == "float";
        assert_eq!(value_from_json(&value).is_ok(), is_number, "value {kind}");
    }
}

#[test]
fn test_timestamp_accepts_only_valid_times() {
    // Only the integer epoch is a valid time; "cpu" is a string but not a time.
    for (kind, value) in all_kinds() {
        match timestamp_from_json(&value) {
            Ok(_) => assert_eq!(kind, "number"),
            Err(err) => assert!(
                matches!(err, TypeError::InvalidTimestamp { .. }),
                "timestamp {kind}"
            ),
        }
    }
    assert!(timestamp_from_json(&json!(5)).is_ok());
    assert!(timestamp_from_json(&json!(1_700_000_000_000u64)).is_ok());
    assert!(timestamp_from_json(&json!("2014/07/18-09:45:00")).is_ok());
    assert!(timestamp_from_json(&json!("15m-ago")).is_ok());
}

#[test]
fn test_newline_delimited_records() {
    let input = r#"{"metric":"cpu.utilization","timestamp":1700000000,"value":0.42,"tags":{"beep":"boop","foo":"bar"}}
{"metric":"mem.used","timestamp":"2014/07/18 09:45","value":0,"tags":{"host":"web1"}}"#;

    let lines: Vec<String> = input
        .lines()
        .map(|line| {
            let value: Value = serde_json::from_str(line).unwrap();
            Datum::try_from(value).unwrap().to_line().unwrap()
        })
        .collect();

    assert_eq!(
        lines,
        vec![
            "cpu.utilization 1700000000 0.42 beep=boop foo=bar",
            "mem.used 2014/07/18 09:45 0 host=web1",
        ]
    );
}

#[test]
fn test_tag_member_order_is_preserved() {
    let datum = Datum::from_json(&json!({
        "metric": "m",
        "timestamp": 1,
        "value": 1,
        "tags": { "zeta": "1", "alpha": "2", "mid": "3" }
    }))
    .unwrap();
    assert_eq!(datum.to_line().unwrap(), "m 1 1 zeta=1 alpha=2 mid=3");
}

#[test]
fn test_bad_tag_member_rejects_whole_datum() {
    let err = Datum::from_json(&json!({
        "metric": "m",
        "tags": { "ok": "yes", "bad": 5 }
    }))
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "type error: tag value for `bad` must be a string. Value: `5`"
    );
}

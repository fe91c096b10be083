//! Replay the JSON test vectors in `test-vectors/` through the services.
//!
//! Each vector describes the input, the request the client must send, a
//! simulated response, and either the expected parsed result or the expected
//! error. Bodies are compared as parsed JSON (not raw strings) so field order
//! does not matter.

mod common;

use std::fmt::Debug;

use common::{api, ScriptedTransport, BASE_URL};
use rebrandly_core::{
    CreateLink, CreateTag, HttpMethod, Link, LinkFilters, RebrandlyError, Tag, TagFilters,
    UpdateLink, UpdateTag,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn error_kind(err: &RebrandlyError) -> &'static str {
    match err {
        RebrandlyError::InvalidApiKey => "InvalidApiKey",
        RebrandlyError::NotFound(_) => "NotFound",
        RebrandlyError::Api { .. } => "Api",
        RebrandlyError::InvalidResponse(_) => "InvalidResponse",
        RebrandlyError::Network(_) => "Network",
        RebrandlyError::Serialization(_) => "Serialization",
        RebrandlyError::Config(_) => "Config",
        RebrandlyError::InvalidInput(_) => "InvalidInput",
    }
}

fn transport_for(case: &Value) -> std::sync::Arc<ScriptedTransport> {
    let sim = &case["simulated_response"];
    ScriptedTransport::respond(
        sim["status"].as_u64().unwrap() as u16,
        sim["body"].as_str().unwrap(),
    )
}

fn input<T: DeserializeOwned>(case: &Value) -> T {
    serde_json::from_value(case["input"].clone()).unwrap()
}

fn input_id(case: &Value) -> &str {
    case["input_id"].as_str().unwrap()
}

fn check_request(name: &str, case: &Value, transport: &ScriptedTransport) {
    let expected = &case["expected_request"];
    let requests = transport.requests();
    assert_eq!(requests.len(), 1, "{name}: exactly one request");
    let req = &requests[0];

    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.url, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: url");
    assert_eq!(req.header("apikey"), Some(common::API_KEY), "{name}: apikey header");

    match expected.get("body") {
        Some(body) => {
            let sent: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&sent, body, "{name}: body");
        }
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

fn check_outcome<T>(name: &str, case: &Value, outcome: rebrandly_core::Result<T>)
where
    T: DeserializeOwned + PartialEq + Debug,
{
    if let Some(expected_error) = case.get("expected_error") {
        let err = outcome.expect_err(name);
        assert_eq!(error_kind(&err), expected_error.as_str().unwrap(), "{name}: error kind");
        if let Some(message) = case.get("expected_message") {
            assert_eq!(err.to_string(), message.as_str().unwrap(), "{name}: error message");
        }
        return;
    }

    let value = outcome.unwrap_or_else(|e| panic!("{name}: unexpected error {e}"));
    if let Some(expected) = case.get("expected_result") {
        let expected: T = serde_json::from_value(expected.clone()).unwrap();
        assert_eq!(value, expected, "{name}: parsed result");
    }
}

// ---------------------------------------------------------------------------
// Links
// ---------------------------------------------------------------------------

#[test]
fn link_test_vectors() {
    let raw = include_str!("../../test-vectors/links.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let transport = transport_for(case);
        let links = api(&transport).links;

        match case["operation"].as_str().unwrap() {
            "create_link" => check_outcome::<Link>(name, case, links.create_link(&input::<CreateLink>(case))),
            "get_link" => check_outcome::<Link>(name, case, links.get_link(input_id(case))),
            "update_link" => check_outcome::<Link>(
                name,
                case,
                links.update_link(input_id(case), &input::<UpdateLink>(case)),
            ),
            "delete_link" => check_outcome::<()>(name, case, links.delete_link(input_id(case))),
            "list_links" => {
                check_outcome::<Vec<Link>>(name, case, links.list_links(&LinkFilters::default()))
            }
            other => panic!("{name}: unknown operation {other}"),
        }

        check_request(name, case, &transport);
    }
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

#[test]
fn tag_test_vectors() {
    let raw = include_str!("../../test-vectors/tags.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let transport = transport_for(case);
        let tags = api(&transport).tags;

        match case["operation"].as_str().unwrap() {
            "create_tag" => check_outcome::<Tag>(name, case, tags.create_tag(&input::<CreateTag>(case))),
            "get_tag" => check_outcome::<Tag>(name, case, tags.get_tag(input_id(case))),
            "update_tag" => check_outcome::<Tag>(
                name,
                case,
                tags.update_tag(input_id(case), &input::<UpdateTag>(case)),
            ),
            "delete_tag" => check_outcome::<()>(name, case, tags.delete_tag(input_id(case))),
            "list_tags" => check_outcome::<Vec<Tag>>(name, case, tags.list_tags(&TagFilters::default())),
            other => panic!("{name}: unknown operation {other}"),
        }

        check_request(name, case, &transport);
    }
}

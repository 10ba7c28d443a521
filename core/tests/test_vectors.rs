//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results or errors. Comparing parsed JSON (not raw
//! strings) avoids false negatives from field-ordering differences.

use mediashare_core::{
    ApiError, Credentials, HttpMethod, HttpRequest, HttpResponse, LoginResponse, MediaItem,
    MediaListing, MediaPage, MediaShareClient, MessageResponse, UserUpdate,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

fn client() -> MediaShareClient {
    MediaShareClient::new(BASE_URL)
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn simulated(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

/// Method, path, and (when the vector lists them) headers and JSON body.
fn check_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(
        req.path,
        format!("{BASE_URL}{}", expected["path"].as_str().unwrap()),
        "{name}: path"
    );

    if let Some(headers) = expected.get("headers") {
        let expected_headers: Vec<(String, String)> = headers
            .as_array()
            .unwrap()
            .iter()
            .map(|h| {
                let arr = h.as_array().unwrap();
                (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(req.headers, expected_headers, "{name}: headers");
    }

    match expected.get("body") {
        Some(body) => {
            let req_body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&req_body, body, "{name}: body");
        }
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

fn check_error(name: &str, err: ApiError, expected: &Value) {
    assert!(!err.message().is_empty(), "{name}: empty error message");
    assert_eq!(
        err.status().map(u64::from),
        expected["status"].as_u64(),
        "{name}: status"
    );
    if let Some(message) = expected.get("message") {
        assert_eq!(err.message(), message.as_str().unwrap(), "{name}: message");
    }
}

fn cases(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[test]
fn login_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/login.json")) {
        let name = case["name"].as_str().unwrap();
        let input: Credentials = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_login(&input).unwrap();
        check_request(name, &req, &case["expected_request"]);

        let result = c.parse_login(simulated(&case));
        match case.get("expected_error") {
            Some(expected) => check_error(name, result.unwrap_err(), expected),
            None => {
                let expected: LoginResponse =
                    serde_json::from_value(case["expected_result"].clone()).unwrap();
                assert_eq!(result.unwrap(), expected, "{name}: parsed result");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

#[test]
fn list_media_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/list_media.json")) {
        let name = case["name"].as_str().unwrap();
        let page = MediaPage::new(
            case["input"]["start"].as_u64().unwrap() as u32,
            case["input"]["limit"].as_u64().unwrap() as u32,
        );

        let req = c.build_list_media(page);
        check_request(name, &req, &case["expected_request"]);

        let result = c.parse_list_media(simulated(&case));
        match case.get("expected_error") {
            Some(expected) => check_error(name, result.unwrap_err(), expected),
            None => {
                let expected: Vec<MediaListing> =
                    serde_json::from_value(case["expected_result"].clone()).unwrap();
                assert_eq!(result.unwrap(), expected, "{name}: parsed result");
            }
        }
    }
}

#[test]
fn get_media_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/get_media.json")) {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_u64().unwrap();

        let req = c.build_get_media(id);
        check_request(name, &req, &case["expected_request"]);

        let result = c.parse_get_media(simulated(&case));
        match case.get("expected_error") {
            Some(expected) => check_error(name, result.unwrap_err(), expected),
            None => {
                let expected: MediaItem =
                    serde_json::from_value(case["expected_result"].clone()).unwrap();
                assert_eq!(result.unwrap(), expected, "{name}: parsed result");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[test]
fn update_user_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/update_user.json")) {
        let name = case["name"].as_str().unwrap();
        let input: UserUpdate = serde_json::from_value(case["input"].clone()).unwrap();
        let token = case["token"].as_str().unwrap();

        let req = c.build_update_user(&input, token).unwrap();
        check_request(name, &req, &case["expected_request"]);

        let parsed = c.parse_update_user(simulated(&case)).unwrap();
        let expected: MessageResponse =
            serde_json::from_value(case["expected_result"].clone()).unwrap();
        assert_eq!(parsed, expected, "{name}: parsed result");
    }
}

#[test]
fn check_username_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/check_username.json")) {
        let name = case["name"].as_str().unwrap();
        let username = case["input"].as_str().unwrap();

        let req = c.build_check_username(username);
        check_request(name, &req, &case["expected_request"]);

        let result = c.parse_check_username(simulated(&case));
        match case.get("expected_error") {
            Some(expected) => {
                let err = result.unwrap_err();
                assert!(matches!(err, ApiError::Deserialization(_)), "{name}: kind");
                check_error(name, err, expected);
            }
            None => assert_eq!(
                result.unwrap(),
                case["expected_result"].as_bool().unwrap(),
                "{name}: parsed result"
            ),
        }
    }
}

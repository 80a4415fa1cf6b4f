//! HTTP surface of the mock API: verbs, star routes, variable injection,
//! extended definition files.

mod common;

use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{client, fixture, start_server};

#[tokio::test]
async fn test_get_literal_route() {
    let server = start_server(vec![]).await;
    let response = client().get(server.api("/animals")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/json"
    );
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, fixture("animals.json"));
}

#[tokio::test]
async fn test_explicit_get_method_token() {
    let server = start_server(vec![]).await;
    let response = client().get(server.api("/plants")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, fixture("plants.GET.json"));
}

#[tokio::test]
async fn test_route_variables_are_injected() {
    let server = start_server(vec![]).await;

    let body: Value = client()
        .get(server.api("/animals/rex"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({"name": "rex", "type": "dog", "age": 3}));

    let body: Value = client()
        .get(server.api("/animals/rex/friends/42"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        body,
        json!({"friend_id": "42", "friends": [{"name": "rex", "type": "cat"}]})
    );
}

#[tokio::test]
async fn test_star_route_matches_any_depth() {
    let server = start_server(vec![]).await;
    let expected = fixture("users/*.json");

    for path in ["/users", "/users/1/posts", "/users/1/posts/2/comments"] {
        let response = client().get(server.api(path)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "{path}");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, expected, "{path}");
    }

    let body: Value = client()
        .get(server.api("/comments/anything/at/all"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, fixture("comments/*.GET.json"));
}

#[tokio::test]
async fn test_param_beats_star() {
    let server = start_server(vec![]).await;
    let body: Value = client()
        .get(server.api("/users/7"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({"userid": "7", "name": "Alice"}));
}

#[tokio::test]
async fn test_extended_file_sets_status_headers_and_body() {
    let server = start_server(vec![]).await;
    let response = client().post(server.api("/users")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(response.headers()["x-custom-header"], "created");
    assert_eq!(response.headers()["x-count"], "1");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"created": true}));
}

#[tokio::test]
async fn test_extended_file_without_header() {
    let server = start_server(vec![]).await;
    let response = client().delete(server.api("/users/3")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"deleted": true}));
}

#[tokio::test]
async fn test_empty_file_answers_without_body() {
    let server = start_server(vec![]).await;
    let response = client().put(server.api("/users/3")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unmatched_requests_are_404_without_body() {
    let server = start_server(vec![]).await;

    for request in [
        client().get(server.api("/nothing/here")),
        client().patch(server.api("/users/3")),
        client().post(server.api("/animals")),
        client().get(format!("http://{}/animals", server.addr)),
    ] {
        let response = request.send().await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.bytes().await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = start_server(vec![]).await;

    let response = client().get(server.api("/animals")).send().await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));

    let response = client()
        .get(server.api("/animals"))
        .header("x-request-id", "fixed-id")
        .send()
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "fixed-id");
}

#[tokio::test]
async fn test_status_endpoint() {
    let server = start_server(vec![]).await;
    let body: Value = client()
        .get(server.admin("/status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["name"], "mockroute");
    assert_eq!(body["routes"], server.engine.registry().len());
    assert_eq!(body["active_states"], 0);
}

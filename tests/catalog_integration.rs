//! Integration tests for the catalog API client against a mock server.

use emote_downloader::{CatalogClient, CatalogError, ImageFormat};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod support;
use support::fixtures::{emote_set_json, user_json};
use support::socket_guard::start_mock_server_or_skip;

macro_rules! require_mock_server {
    () => {{
        let Some(mock_server) = start_mock_server_or_skip().await else {
            return;
        };
        mock_server
    }};
}

fn client_for(server: &MockServer) -> CatalogClient {
    CatalogClient::new(reqwest::Client::new(), &format!("{}/v3/", server.uri())).unwrap()
}

#[tokio::test]
async fn test_fetch_user_returns_profile() {
    let mock_server = require_mock_server!();
    Mock::given(method("GET"))
        .and(path("/v3/users/60ae9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("alice", &["s1", "s2"])))
        .mount(&mock_server)
        .await;

    let profile = client_for(&mock_server).fetch_user("60ae9").await.unwrap();

    assert_eq!(profile.username, "alice");
    assert_eq!(profile.emote_set_ids, ["s1", "s2"]);
}

#[tokio::test]
async fn test_fetch_user_not_found() {
    let mock_server = require_mock_server!();
    Mock::given(method("GET"))
        .and(path("/v3/users/nobody"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server).fetch_user("nobody").await.unwrap_err();

    assert!(matches!(
        err,
        CatalogError::UserNotFound { status: 404, .. }
    ));
    assert_eq!(err.to_string(), "user nobody not found. Error Code: 404");
}

#[tokio::test]
async fn test_fetch_user_malformed_body_is_decode_error() {
    let mock_server = require_mock_server!();
    Mock::given(method("GET"))
        .and(path("/v3/users/broken"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server).fetch_user("broken").await.unwrap_err();
    assert!(matches!(err, CatalogError::Decode { .. }));
}

#[tokio::test]
async fn test_fetch_catalog_keeps_profile_order_and_skips_failed_sets() {
    let mock_server = require_mock_server!();
    let cdn = mock_server.uri();
    Mock::given(method("GET"))
        .and(path("/v3/users/u1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(user_json("alice", &["s2", "gone", "s1"])),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/emote-sets/s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(emote_set_json(
            "s1",
            "Global",
            &cdn,
            &[("e1", "Pog"), ("e2", "Kappa")],
        )))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/emote-sets/s2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(emote_set_json(
            "s2",
            " Sub Emotes ",
            &cdn,
            &[("e3", "LUL")],
        )))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v3/emote-sets/gone"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let profile = client.fetch_user("u1").await.unwrap();
    let catalog = client.fetch_catalog(&profile).await;

    assert_eq!(catalog.account, "alice");
    let names: Vec<&str> = catalog.sets.iter().map(|set| set.name.as_str()).collect();
    assert_eq!(names, ["Sub Emotes", "Global"]);

    let pog = &catalog.sets[1].emotes[0];
    assert_eq!(pog.name, "Pog");
    assert_eq!(
        pog.url(ImageFormat::Gif, &"2x".parse().unwrap()),
        Some(format!("{cdn}/emote/e1/2x.gif").as_str())
    );
    assert_eq!(catalog.sets[1].to_string(), "Global [2 Emotes]");

    let selected = catalog.select(&["Global"]).unwrap();
    assert_eq!(selected.len(), 1);
    let err = catalog.select(&["Missing"]).unwrap_err();
    assert_eq!(err.to_string(), "emote set 'Missing' not found");
}

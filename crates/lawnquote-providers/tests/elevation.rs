//! Integration tests for `ElevationClient` and terrain fetching.

use lawnquote_core::{Coordinates, Geometry, SlopeCategory};
use lawnquote_providers::{fetch_terrain, ClientSettings, ElevationClient, ProviderError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> ElevationClient {
    ElevationClient::with_base_url("nzdem8m", &ClientSettings::default(), base_url)
        .expect("client construction should not fail")
}

#[tokio::test]
async fn elevations_keep_input_order_and_nulls() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "status": "OK",
        "results": [
            { "elevation": 101.5, "location": { "lat": -45.87, "lng": 170.5 } },
            { "elevation": null, "location": { "lat": -45.86, "lng": 170.6 } }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/nzdem8m"))
        .and(query_param("locations", "-45.87,170.5|-45.86,170.6"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let samples = client
        .elevations(&[
            Coordinates { lat: -45.87, lng: 170.5 },
            Coordinates { lat: -45.86, lng: 170.6 },
        ])
        .await
        .expect("should parse");

    assert_eq!(samples, vec![Some(101.5), None]);
}

#[tokio::test]
async fn error_envelope_is_api_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nzdem8m"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            serde_json::json!({ "status": "INVALID_REQUEST", "error": "bad locations" }),
        ))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .elevations(&[Coordinates { lat: -45.87, lng: 170.5 }])
        .await
        .expect_err("should fail");
    assert!(matches!(err, ProviderError::ApiStatus { provider: "opentopodata", .. }));
}

#[tokio::test]
async fn terrain_degrades_to_none_on_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/nzdem8m"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let boundary = Geometry::Polygon(vec![vec![
        vec![170.5, -45.87],
        vec![170.500_386, -45.87],
        vec![170.500_386, -45.869_729],
        vec![170.5, -45.87],
    ]]);

    let client = test_client(&server.uri());
    assert!(fetch_terrain(&client, &boundary).await.is_none());
}

#[tokio::test]
async fn terrain_from_flat_samples() {
    let server = MockServer::start().await;

    let results: Vec<serde_json::Value> = (0..9)
        .map(|_| serde_json::json!({ "elevation": 42.0 }))
        .collect();
    Mock::given(method("GET"))
        .and(path("/nzdem8m"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "status": "OK", "results": results })),
        )
        .mount(&server)
        .await;

    let boundary = Geometry::Polygon(vec![vec![
        vec![170.5, -45.87],
        vec![170.500_386, -45.87],
        vec![170.500_386, -45.869_729],
        vec![170.5, -45.869_729],
        vec![170.5, -45.87],
    ]]);

    let client = test_client(&server.uri());
    let terrain = fetch_terrain(&client, &boundary).await.expect("terrain");
    assert_eq!(terrain.slope.category, SlopeCategory::Flat);
    assert!((terrain.elevation.min - 42.0).abs() < f64::EPSILON);
}

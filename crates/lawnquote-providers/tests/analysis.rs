//! End-to-end analysis against mocked Addy, LINZ and `OpenTopoData`.

use std::sync::Arc;

use lawnquote_core::{AccessDifficulty, Gradient, ProviderKind};
use lawnquote_providers::{
    AddressProvider, AddressResolver, AddyClient, AnalysisError, AnalysisRequest, AreaSource,
    ClientSettings, ElevationClient, LinzClient, PropertyAnalyzer, QuoteReadiness,
};
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ADDRESS: &str = "12 Main Street, Mornington, Dunedin 9011";

fn analyzer(server: &MockServer, with_linz: bool) -> PropertyAnalyzer {
    let settings = ClientSettings::default();
    let uri = server.uri();

    let addy = AddyClient::with_base_url("test-key", &settings, &format!("{uri}/addy"))
        .expect("addy client");
    let providers: Vec<Arc<dyn AddressProvider>> = vec![Arc::new(addy)];
    let resolver = AddressResolver::new(providers, "Dunedin");

    let linz = with_linz.then(|| {
        LinzClient::with_base_url("linz-key", &settings, &format!("{uri}/linz")).expect("linz client")
    });
    let elevation = ElevationClient::with_base_url("nzdem8m", &settings, &format!("{uri}/topo"))
        .expect("elevation client");

    PropertyAnalyzer::new(resolver, linz, elevation).with_seed(7)
}

async fn mount_addy(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/addy/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "addresses": [{ "id": 1_843_221, "a": ADDRESS, "suburb": "Mornington" }]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/addy/address/1843221"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "a": ADDRESS,
            "x": 170.5,
            "y": -45.87,
            "suburb": "Mornington",
            "city": "Dunedin"
        })))
        .mount(server)
        .await;
}

async fn mount_registry_match(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/linz/.*/wfs$"))
        .and(query_param("typeNames", "layer-105689"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "features": [{
                "properties": { "full_address": ADDRESS },
                "geometry": { "type": "Point", "coordinates": [170.5, -45.87] }
            }]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn analysis_with_parcel_and_terrain() {
    let server = MockServer::start().await;
    mount_addy(&server).await;
    mount_registry_match(&server).await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/linz/.*/wfs$"))
        .and(query_param("typeNames", "layer-50823"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "features": [{
                "id": "layer-50823.1",
                "properties": { "calc_area": 700 },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [170.5, -45.87],
                        [170.500_386, -45.87],
                        [170.500_386, -45.869_729],
                        [170.5, -45.869_729],
                        [170.5, -45.87]
                    ]]
                }
            }]
        })))
        .mount(&server)
        .await;

    let results: Vec<serde_json::Value> = (0..9)
        .map(|i| serde_json::json!({ "elevation": 100.0 + f64::from(i) }))
        .collect();
    Mock::given(method("GET"))
        .and(path("/topo/nzdem8m"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "status": "OK", "results": results })),
        )
        .mount(&server)
        .await;

    let analysis = analyzer(&server, true)
        .analyze(&AnalysisRequest {
            address: Some("12 Main Street".to_string()),
            ..AnalysisRequest::default()
        })
        .await
        .expect("analysis should succeed");

    assert_eq!(analysis.address.source, ProviderKind::Addy);
    assert_eq!(analysis.suburb, "Mornington");
    assert_eq!(analysis.metrics.total_area_sqm, 700);
    assert_eq!(analysis.metrics.lawn_area_sqm, 385);
    assert_eq!(analysis.property.total_area_source, AreaSource::Registry);
    assert_eq!(analysis.property.parcel_id.as_deref(), Some("layer-50823.1"));
    assert!(analysis.terrain.slope.is_some());
    assert!((analysis.confidence - 0.9).abs() < f64::EPSILON);
    assert!(analysis.validation.matched);
    assert_eq!(analysis.quote.status, QuoteReadiness::ReadyForEstimate);
    assert!(analysis
        .imagery
        .aerial_tile_url
        .as_deref()
        .is_some_and(|url| url.ends_with("api=linz%2Dkey")));
}

#[tokio::test]
async fn analysis_without_parcel_uses_suburb_defaults() {
    let server = MockServer::start().await;
    mount_addy(&server).await;
    mount_registry_match(&server).await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/linz/.*/wfs$"))
        .and(query_param("typeNames", "layer-50823"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "features": [] })),
        )
        .mount(&server)
        .await;

    let analysis = analyzer(&server, true)
        .analyze(&AnalysisRequest {
            address: Some("12 Main Street".to_string()),
            ..AnalysisRequest::default()
        })
        .await
        .expect("analysis should succeed");

    assert_eq!(analysis.metrics.total_area_sqm, 600);
    assert_eq!(analysis.metrics.lawn_area_sqm, 330);
    assert_eq!(analysis.metrics.gradient, Gradient::ModerateSlope);
    assert_eq!(analysis.metrics.access_difficulty, AccessDifficulty::Easy);
    assert_eq!(analysis.property.total_area_source, AreaSource::Estimated);
    assert!(analysis.property.boundary.is_none());
    assert!(analysis.terrain.elevation.is_none());
    assert!((analysis.confidence - 0.6).abs() < f64::EPSILON);

    let json = serde_json::to_value(&analysis).expect("serialize");
    assert_eq!(json["status"], "success");
    assert_eq!(json["totalAreaSqm"], 600);
    assert_eq!(json["property"]["totalArea"]["sqft"], 6458);
    assert_eq!(json["imagery"]["zoom"], 19);
    assert_eq!(json["quote"]["status"], "ready_for_estimate");
}

#[tokio::test]
async fn handle_request_skips_search() {
    let server = MockServer::start().await;
    mount_addy(&server).await;

    let analysis = analyzer(&server, false)
        .analyze(&AnalysisRequest {
            handle: Some("1843221".to_string()),
            provider: Some(ProviderKind::Addy),
            ..AnalysisRequest::default()
        })
        .await
        .expect("analysis should succeed");

    assert_eq!(analysis.address.resolved, ADDRESS);
    assert!(analysis.address.input.is_none());
    assert!(!analysis.validation.matched);
    assert_eq!(analysis.quote.status, QuoteReadiness::NeedsVerification);
    assert!(analysis.imagery.aerial_tile_url.is_none());
}

#[tokio::test]
async fn unresolvable_address_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/addy/search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "addresses": [] })),
        )
        .mount(&server)
        .await;

    let err = analyzer(&server, true)
        .analyze(&AnalysisRequest {
            address: Some("999 Nowhere Road".to_string()),
            ..AnalysisRequest::default()
        })
        .await
        .expect_err("should not resolve");

    assert!(matches!(err, AnalysisError::AddressNotResolved { ref input } if input == "999 Nowhere Road"));
}

#[tokio::test]
async fn empty_request_is_invalid() {
    let server = MockServer::start().await;
    let err = analyzer(&server, false)
        .analyze(&AnalysisRequest {
            address: Some("   ".to_string()),
            ..AnalysisRequest::default()
        })
        .await
        .expect_err("should be rejected");
    assert!(matches!(err, AnalysisError::InvalidInput(_)));
}

#[tokio::test]
async fn validate_property_rejects_bad_coordinates() {
    let server = MockServer::start().await;
    let err = analyzer(&server, true)
        .validate_property(123.0, 170.5, None)
        .await
        .expect_err("latitude out of range");
    assert!(matches!(err, AnalysisError::InvalidInput(_)));
}

#[tokio::test]
async fn validate_property_reports_parcel() {
    let server = MockServer::start().await;
    mount_registry_match(&server).await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/linz/.*/wfs$"))
        .and(query_param("typeNames", "layer-50823"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "features": [{
                "properties": { "id": 9, "calc_area": 512.6 },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[170.5, -45.87], [170.5004, -45.87], [170.5004, -45.8697], [170.5, -45.87]]]
                }
            }]
        })))
        .mount(&server)
        .await;

    let result = analyzer(&server, true)
        .validate_property(-45.87, 170.5, Some(ADDRESS))
        .await
        .expect("validation should succeed");

    assert!(result.validation.matched);
    assert_eq!(result.validation.confidence, 100);
    let parcel = result.parcel.expect("parcel");
    assert_eq!(parcel.id, "9");
    assert_eq!(parcel.area, 513);
}

#[tokio::test]
async fn failing_registry_and_elevation_still_produce_a_quote() {
    let server = MockServer::start().await;
    mount_addy(&server).await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/linz/.*/wfs$"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/topo/nzdem8m"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let analysis = analyzer(&server, true)
        .analyze(&AnalysisRequest {
            address: Some("12 Main Street".to_string()),
            ..AnalysisRequest::default()
        })
        .await
        .expect("optional lookups must not abort the analysis");

    assert!(!analysis.validation.matched);
    assert_eq!(analysis.validation.confidence, 0);
    assert_eq!(analysis.quote.status, QuoteReadiness::NeedsVerification);
    assert_eq!(analysis.property.total_area_source, AreaSource::Estimated);
    assert_eq!(analysis.metrics.total_area_sqm, 600);
    assert!(analysis.property.parcel_id.is_none());
    assert!(analysis.terrain.elevation.is_none());
    assert!(analysis.terrain.slope.is_none());
    assert!((analysis.confidence - 0.6).abs() < f64::EPSILON);

    let json = serde_json::to_value(&analysis).expect("serialize");
    assert!(json["terrain"]["elevation"].is_null());
    assert!(json["terrain"]["slope"].is_null());
}

#[tokio::test]
async fn failing_elevation_keeps_parcel_area() {
    let server = MockServer::start().await;
    mount_addy(&server).await;
    mount_registry_match(&server).await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/linz/.*/wfs$"))
        .and(query_param("typeNames", "layer-50823"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "features": [{
                "id": "layer-50823.1",
                "properties": { "calc_area": 700 },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [170.5, -45.87],
                        [170.500_386, -45.87],
                        [170.500_386, -45.869_729],
                        [170.5, -45.869_729],
                        [170.5, -45.87]
                    ]]
                }
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/topo/nzdem8m"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let analysis = analyzer(&server, true)
        .analyze(&AnalysisRequest {
            address: Some("12 Main Street".to_string()),
            ..AnalysisRequest::default()
        })
        .await
        .expect("analysis should succeed");

    assert_eq!(analysis.metrics.total_area_sqm, 700);
    assert_eq!(analysis.property.total_area_source, AreaSource::Registry);
    assert!(analysis.terrain.slope.is_none());
    assert!((analysis.confidence - 0.9).abs() < f64::EPSILON);
}

#[tokio::test]
async fn parcel_without_usable_area_counts_as_estimated() {
    let server = MockServer::start().await;
    mount_addy(&server).await;
    mount_registry_match(&server).await;

    // No registry area and a zero-area ring.
    Mock::given(method("GET"))
        .and(path_regex(r"^/linz/.*/wfs$"))
        .and(query_param("typeNames", "layer-50823"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "features": [{
                "id": "layer-50823.2",
                "properties": {},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [170.5, -45.87],
                        [170.5, -45.87],
                        [170.5, -45.87],
                        [170.5, -45.87]
                    ]]
                }
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/topo/nzdem8m"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let analysis = analyzer(&server, true)
        .analyze(&AnalysisRequest {
            address: Some("12 Main Street".to_string()),
            ..AnalysisRequest::default()
        })
        .await
        .expect("analysis should succeed");

    assert_eq!(analysis.property.total_area_source, AreaSource::Estimated);
    assert_eq!(analysis.metrics.total_area_sqm, 600);
    assert!((analysis.confidence - 0.6).abs() < f64::EPSILON);
}

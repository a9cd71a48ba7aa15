//! End-to-end builds against mocked Nominatim, Overpass and elevation services

use std::sync::{Arc, Mutex};
use std::time::Duration;

use motomap::{
    AttributeNormalizer, Config, EdgeGrades, ElevationProvider, Error, GoogleElevation,
    OpenTopoData, OverpassLoader, Pipeline, RoadGraph, TagValue,
};
use reqwest::Client;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn test_config(server: &MockServer) -> Config {
    let mut config = Config::default().with_base_url(&server.uri());
    config.free_batch.pause = Duration::ZERO;
    config.request_timeout = Duration::from_secs(5);
    config.overpass_timeout = Duration::from_secs(5);
    config
}

/// Pipeline with its own HTTP clients, bound to this test's runtime
fn pipeline(config: &Config) -> Pipeline {
    Pipeline::new(
        OverpassLoader::new(Client::new(), config),
        ElevationProvider::new(
            GoogleElevation::new(Client::new(), config),
            OpenTopoData::new(Client::new(), config),
        ),
        EdgeGrades,
        AttributeNormalizer,
    )
    .with_default_credential(config.default_credential.clone())
}

/// 0.123 m at node 1, then 10 m higher per 0.001 degree of latitude
fn elevation_for(lat: f64) -> f64 {
    ((lat - 40.98) * 1000.0).round() * 10.0 + 0.12345
}

fn echo_elevations(req: &Request) -> ResponseTemplate {
    let locations = req
        .url
        .query_pairs()
        .find(|(k, _)| k == "locations")
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default();
    let results: Vec<_> = locations
        .split('|')
        .map(|loc| {
            let lat: f64 = loc.split(',').next().unwrap().parse().unwrap();
            json!({ "elevation": elevation_for(lat), "location": { "lat": lat } })
        })
        .collect();
    ResponseTemplate::new(200).set_body_json(json!({ "status": "OK", "results": results }))
}

async fn mount_moda(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "display_name": "Moda, Kadıköy, İstanbul, Türkiye",
            "boundingbox": ["40.975", "40.990", "29.015", "29.035"]
        }])))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/interpreter"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "elements": [
                { "type": "node", "id": 1, "lat": 40.980, "lon": 29.020 },
                { "type": "node", "id": 2, "lat": 40.981, "lon": 29.020 },
                { "type": "node", "id": 3, "lat": 40.982, "lon": 29.021 },
                { "type": "node", "id": 4, "lat": 40.983, "lon": 29.022 },
                { "type": "way", "id": 10, "nodes": [1, 2, 3],
                  "tags": { "highway": "residential", "maxspeed": "30", "name": "Moda Caddesi" } },
                { "type": "way", "id": 11, "nodes": [3, 4],
                  "tags": { "highway": "primary", "oneway": "yes", "lanes": "3", "surface": "paving_stones" } },
                { "type": "way", "id": 12, "nodes": [4, 1],
                  "tags": { "highway": "secondary", "oneway": "-1" } }
            ]
        })))
        .mount(server)
        .await;
}

async fn mount_denied_google(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/maps/api/elevation/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid.",
            "results": []
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_open_topo(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/eudem25m"))
        .respond_with(echo_elevations)
        .expect(1)
        .mount(server)
        .await;
}

/// Every edge is fully normalized and graded
fn assert_clean(graph: &RoadGraph) {
    for edge in graph.edges() {
        let data = edge.data;
        let lanes = data.lanes_count().expect("lanes is an integer");
        let maxspeed = data.maxspeed_kmh().expect("maxspeed is an integer");
        assert!(lanes >= 1, "{}->{} lanes {lanes}", edge.u, edge.v);
        assert!(maxspeed >= 1, "{}->{} maxspeed {maxspeed}", edge.u, edge.v);
        assert!(matches!(&data.surface, Some(TagValue::Text(s)) if !s.is_empty()));

        let lanes_forward = data.lanes_forward.expect("lanes_forward set");
        if data.oneway == Some(TagValue::Bool(true)) {
            assert_eq!(lanes_forward, lanes);
        } else {
            assert_eq!(lanes_forward, (lanes / 2).max(1));
        }

        let grade = data.grade.expect("grade set");
        assert_eq!(data.grade_abs, Some(grade.abs()));
    }
}

#[tokio::test]
async fn test_build_with_rejected_key_falls_back() {
    let server = MockServer::start().await;
    mount_moda(&server).await;
    mount_denied_google(&server).await;
    mount_open_topo(&server).await;

    let config = test_config(&server);
    let graph = pipeline(&config)
        .build("Moda, Kadikoy, Istanbul, Turkey", Some("invalid-key"))
        .await
        .unwrap();

    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.edge_count(), 6);
    assert_clean(&graph);

    assert_eq!(graph.node(1).unwrap().elevation, Some(0.123));
    assert_eq!(graph.node(2).unwrap().elevation, Some(10.123));
    assert_eq!(graph.node(4).unwrap().elevation, Some(30.123));

    // Residential way: bidirectional, maxspeed from the tag, defaults for the rest
    let residential = graph.edge(1, 2, 0).unwrap();
    assert_eq!(residential.lanes, Some(TagValue::Int(2)));
    assert_eq!(residential.maxspeed, Some(TagValue::Int(30)));
    assert_eq!(residential.surface, Some(TagValue::from("asphalt")));
    assert_eq!(residential.lanes_forward, Some(1));
    assert!(graph.edge(2, 1, 0).is_some());

    let uphill = residential.grade.unwrap();
    assert!((uphill - 10.0 / residential.length).abs() < 0.001);
    assert!(uphill > 0.0);
    assert!(graph.edge(2, 1, 0).unwrap().grade.unwrap() < 0.0);

    // Oneway primary keeps its tags
    let primary = graph.edge(3, 4, 0).unwrap();
    assert_eq!(primary.lanes, Some(TagValue::Int(3)));
    assert_eq!(primary.maxspeed, Some(TagValue::Int(82)));
    assert_eq!(primary.surface, Some(TagValue::from("paving_stones")));
    assert_eq!(primary.lanes_forward, Some(3));
    assert!(graph.edge(4, 3, 0).is_none());

    // oneway=-1 runs against the node order
    let secondary = graph.edge(1, 4, 0).unwrap();
    assert_eq!(secondary.maxspeed, Some(TagValue::Int(70)));
    assert_eq!(secondary.lanes_forward, Some(2));
    assert!(graph.edge(4, 1, 0).is_none());
}

#[tokio::test]
async fn test_default_credential_from_config() {
    let server = MockServer::start().await;
    mount_moda(&server).await;
    mount_denied_google(&server).await;
    mount_open_topo(&server).await;

    let config = test_config(&server).with_default_credential(Some("env-key".to_string()));
    let graph = pipeline(&config).build("Moda", None).await.unwrap();

    assert_clean(&graph);
    let requests = server.received_requests().await.unwrap();
    assert!(requests
        .iter()
        .any(|req| req.url.path() == "/maps/api/elevation/json"
            && req.url.query_pairs().any(|(k, v)| k == "key" && v == "env-key")));
}

#[tokio::test]
async fn test_no_key_goes_straight_to_open_topo() {
    let server = MockServer::start().await;
    mount_moda(&server).await;
    mount_open_topo(&server).await;
    Mock::given(method("GET"))
        .and(path("/maps/api/elevation/json"))
        .respond_with(echo_elevations)
        .expect(0)
        .mount(&server)
        .await;

    let config = test_config(&server);
    let graph = pipeline(&config).build("Moda", None).await.unwrap();

    assert!(graph.nodes().all(|node| node.elevation.is_some()));
    assert_clean(&graph);
}

#[tokio::test]
async fn test_unknown_place() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/interpreter"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "elements": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let config = test_config(&server);
    let err = pipeline(&config).build("Atlantis", None).await.unwrap_err();

    assert!(matches!(err, Error::PlaceNotFound(ref place) if place == "Atlantis"));
}

#[tokio::test]
async fn test_free_service_outage_fails_the_build() {
    let server = MockServer::start().await;
    mount_moda(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/eudem25m"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = test_config(&server);
    let result = pipeline(&config).build("Moda", None).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_build_with_progress_facade() {
    let server = MockServer::start().await;
    mount_moda(&server).await;
    mount_open_topo(&server).await;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);

    let config = test_config(&server);
    let graph = motomap::build_with_progress("Moda", None, &config, move |done, total| {
        recorder.lock().unwrap().push((done, total));
    })
    .await
    .unwrap();

    assert_eq!(graph.edge_count(), 6);
    assert_eq!(*seen.lock().unwrap(), vec![(1, 1)]);
}

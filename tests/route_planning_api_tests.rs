//! Route planning against a mocked portal backend

use chrono::NaiveDate;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use delivery_console::planning::route_rows;
use delivery_console::{
    GeocodingOps, GeocodingService, NoticeBoard, OriginOutcome, RateLimitedHttpClient, RouteOutcome,
    RoutePlanner, RoutingService,
};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
}

fn address_json() -> Value {
    json!([
        {
            "ADDRESS": "10 BAYFRONT AVENUE MARINA BAY SANDS SINGAPORE 018956",
            "POSTAL": "018956",
            "LATITUDE": "1.2834",
            "LONGITUDE": "103.8607"
        },
        {
            "ADDRESS": "8 BAYFRONT AVENUE SINGAPORE 018955",
            "POSTAL": "018955",
            "LATITUDE": "1.2838",
            "LONGITUDE": "103.8591"
        }
    ])
}

fn stop(id: u64, order_status: &str, delivery_status: &str) -> Value {
    json!({
        "id": id,
        "order": {
            "orderId": id + 1000,
            "orderStatus": order_status,
            "customerAddress": format!("{id} Orchard Road")
        },
        "deliveryStatus": { "status": delivery_status }
    })
}

async fn mock_geocoder(server: &MockServer, response: Value, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/delivery/currentLocation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn planner(server: &MockServer) -> (RoutePlanner, Arc<NoticeBoard>) {
    let client = RateLimitedHttpClient::with_base_url(server.uri()).unwrap();
    let notices = Arc::new(NoticeBoard::new(Duration::from_secs(60)));
    let planner = RoutePlanner::new(
        Arc::new(GeocodingService::new(client.clone())),
        Arc::new(RoutingService::new(client)),
        notices.clone(),
    );
    (planner, notices)
}

#[tokio::test]
async fn test_geocoding_lookups_are_cached() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/delivery/currentLocation"))
        .and(body_json(json!({ "address": "018956" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(address_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = RateLimitedHttpClient::with_base_url(server.uri()).unwrap();
    let geocoder = GeocodingService::new(client.clone());

    let first = geocoder.resolve("018956").await.unwrap();
    let second = geocoder.resolve(" 018956 ").await.unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
    let stats = client.metrics().get_stats();
    assert_eq!(stats.total_requests, 1);
    assert_eq!(stats.cache_hits, 1);
}

#[tokio::test]
async fn test_unknown_location_is_invalid_not_failed() {
    let server = MockServer::start().await;
    mock_geocoder(&server, json!([]), 1).await;
    let (planner, notices) = planner(&server);

    let outcome = planner.resolve_origin("000000").await.unwrap();

    assert_eq!(outcome, OriginOutcome::InvalidLocation);
    assert!(planner.origin().is_none());
    assert_eq!(
        notices.current().unwrap().message,
        "Starting location invalid, please try again!"
    );
}

#[tokio::test]
async fn test_planned_route_strips_depot_markers() {
    let server = MockServer::start().await;
    mock_geocoder(&server, address_json(), 1).await;
    Mock::given(method("POST"))
        .and(path("/delivery/routePlanning"))
        .and(body_json(json!({
            "date": "2026-10-20",
            "userId": "7",
            "address": "018956"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            stop(0, "READY_FOR_DELIVERY", "order_placed"),
            stop(31, "READY_FOR_DELIVERY", "ready_for_pickup"),
            stop(12, "SHIPPED", "untrackable"),
            stop(27, "DELIVERED", "cancelled"),
            stop(0, "READY_FOR_DELIVERY", "order_placed"),
        ])))
        .expect(1)
        .mount(&server)
        .await;
    let (planner, notices) = planner(&server);

    planner.resolve_origin("018956").await.unwrap();
    let outcome = planner.plan_route(day(20), day(18), "7").await.unwrap();

    let RouteOutcome::Planned(stops) = outcome else {
        panic!("expected a planned route, got {outcome:?}");
    };
    let rows = route_rows(&stops);
    let summary: Vec<_> = rows
        .iter()
        .map(|row| (row.sequence.as_str(), row.sales_order_id, row.status))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Stop 1", Some(1031), "Delivery Scheduled"),
            ("Stop 2", Some(1012), "Shipped"),
            ("Stop 3", Some(1027), "Cancelled"),
        ]
    );
    assert_eq!(rows[0].address, "31 Orchard Road");
    assert_eq!(notices.current().unwrap().message, "Route planning is successfully.");
}

#[tokio::test]
async fn test_empty_route_is_planning_failure() {
    let server = MockServer::start().await;
    mock_geocoder(&server, address_json(), 1).await;
    Mock::given(method("POST"))
        .and(path("/delivery/routePlanning"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    let (planner, notices) = planner(&server);

    planner.resolve_origin("018956").await.unwrap();
    let outcome = planner.plan_route(day(18), day(18), "7").await.unwrap();

    assert_eq!(outcome, RouteOutcome::NoRoute);
    assert_eq!(
        notices.current().unwrap().message,
        "Route planning failed, please try again!"
    );
}

//! End-to-end search with trips discovered through a mock provider.

use chrono::NaiveDate;
use serde_json::json;
use tempfile::TempDir;

use bus_server::cache::{CacheConfig, CachedDirections};
use bus_server::directions::{DirectionsBackend, MockDirectionsClient};
use bus_server::domain::{DayType, TripKind};
use bus_server::ingest::IngestConfig;
use bus_server::matcher::{MatchQuery, MatcherConfig};
use bus_server::service::ScheduleService;
use bus_server::store::{Catalog, SnapshotFile};

/// 2024-06-03 10:00 UTC, a Monday.
const MONDAY_10AM: i64 = 1_717_408_800;

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
}

fn transit(line: &str, from: (&str, f64, f64, &str), to: (&str, f64, f64, &str)) -> serde_json::Value {
    json!({
        "travel_mode": "TRANSIT",
        "transit_details": {
            "departure_stop": {"name": from.0, "location": {"lat": from.1, "lng": from.2}},
            "arrival_stop": {"name": to.0, "location": {"lat": to.1, "lng": to.2}},
            "departure_time": {"text": from.3, "value": MONDAY_10AM},
            "arrival_time": {"text": to.3, "value": MONDAY_10AM + 4200},
            "line": {"short_name": line}
        }
    })
}

/// A mock directory answering Ponta Delgada to Furnas with one bus and one
/// inter-island alternative.
fn mock_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let response = json!({
        "status": "OK",
        "routes": [
            {"legs": [{
                "departure_time": {"text": "10:00 AM", "value": MONDAY_10AM},
                "arrival_time": {"text": "11:10 AM", "value": MONDAY_10AM + 4200},
                "steps": [
                    {"travel_mode": "WALKING"},
                    transit(
                        "C318",
                        ("Ponta Delgada", 37.7412, -25.6756, "10:00 AM"),
                        ("Furnas", 37.7722, -25.3119, "11:10 AM")
                    )
                ]
            }]},
            {"legs": [{
                "departure_time": {"text": "9:00 AM", "value": MONDAY_10AM - 3600},
                "steps": [
                    transit(
                        "SATA",
                        ("Ponta Delgada", 37.7412, -25.6756, "9:00 AM"),
                        ("Flores", 39.4531, -31.1278, "11:00 AM")
                    )
                ]
            }]}
        ]
    });
    let fixture = json!({
        "origin": "Ponta Delgada",
        "destination": "Furnas",
        "response": response,
    });
    std::fs::write(dir.path().join("pdl-furnas.json"), fixture.to_string()).unwrap();
    dir
}

fn service(catalog: &Catalog, mock: &MockDirectionsClient, external: bool) -> ScheduleService {
    let provider = CachedDirections::new(
        DirectionsBackend::Mock(mock.clone()),
        &CacheConfig::default(),
    );
    ScheduleService::new(
        catalog.clone(),
        MatcherConfig::default(),
        provider,
        IngestConfig::default(),
    )
    .with_external_lookups(external)
}

#[tokio::test]
async fn miss_is_filled_from_provider_then_served_locally() {
    let dir = mock_dir();
    let mock = MockDirectionsClient::from_dir(dir.path()).unwrap();
    let catalog = Catalog::new();
    let service = service(&catalog, &mock, true);

    let query = MatchQuery::new("ponta delgada", "FURNAS");
    let found = service.find_trips(query.clone(), Some(monday())).await.unwrap();

    assert_eq!(found.len(), 1);
    let trip = &found[0];
    assert_eq!(trip.kind, TripKind::Discovered);
    assert_eq!(trip.route_label, "318");
    assert_eq!(trip.day_type, DayType::Weekday);
    assert_eq!(trip.start_time.to_string(), "10h00");
    assert_eq!(trip.end_time.to_string(), "11h10");
    assert_eq!(mock.calls(), 1);

    // The inter-island alternative left nothing behind.
    assert!(catalog.stops.find_by_name("Flores").await.is_none());
    assert_eq!(catalog.trips.len().await, 1);

    let again = service.find_trips(query, Some(monday())).await.unwrap();
    assert_eq!(again, found);
    assert_eq!(mock.calls(), 1);
}

#[tokio::test]
async fn reverse_direction_finds_nothing_locally() {
    let dir = mock_dir();
    let mock = MockDirectionsClient::from_dir(dir.path()).unwrap();
    let catalog = Catalog::new();
    let service = service(&catalog, &mock, true);

    service
        .find_trips(MatchQuery::new("Ponta Delgada", "Furnas"), Some(monday()))
        .await
        .unwrap();

    let local_only = self::service(&catalog, &mock, false);
    let reversed = local_only
        .find_trips(MatchQuery::new("Furnas", "Ponta Delgada"), Some(monday()))
        .await
        .unwrap();
    assert!(reversed.is_empty());
}

#[tokio::test]
async fn discovered_trips_survive_a_restart() {
    let dir = mock_dir();
    let mock = MockDirectionsClient::from_dir(dir.path()).unwrap();
    let catalog = Catalog::new();
    service(&catalog, &mock, true)
        .find_trips(MatchQuery::new("Ponta Delgada", "Furnas"), Some(monday()))
        .await
        .unwrap();

    let data = tempfile::tempdir().unwrap();
    let file = SnapshotFile::new(data.path().join("snapshot.json"));
    let mut snapshot = catalog.snapshot().await;
    file.save(&mut snapshot).unwrap();

    let restarted = Catalog::new();
    let report = restarted.restore(file.load().unwrap().unwrap()).await;
    assert_eq!(report.trips, 1);
    assert_eq!(report.stops, 2);

    let offline = MockDirectionsClient::new().failing(500);
    let found = service(&restarted, &offline, true)
        .find_trips(MatchQuery::new("Ponta Delgada", "Furnas"), Some(monday()))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(offline.calls(), 0);
}

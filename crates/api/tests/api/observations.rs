use crate::helpers::{spawn_app, spawn_app_with_rows, MockWeatherAccess};
use axum::http::StatusCode;
use serde_json::{from_str, Value};
use std::sync::Arc;
use time::{macros::date, Date};
use weather_api::{Error, ErrorResponse, ObservationRecord};
use weather_core::{db, Observation, DEFAULT_PAGE_SIZE};

fn observation(
    station_id: &str,
    date: Date,
    max: Option<i32>,
    min: Option<i32>,
    prcp: Option<i32>,
) -> Observation {
    Observation {
        station_id: station_id.to_owned(),
        date,
        max_temp: max,
        min_temp: min,
        precipitation: prcp,
    }
}

#[tokio::test]
async fn returns_converted_observation() {
    let test_app = spawn_app_with_rows(
        &[
            observation("STN001", date!(2023 - 01 - 01), Some(300), Some(150), Some(20)),
            observation("STN001", date!(2023 - 01 - 02), Some(310), Some(160), Some(0)),
            observation("STN002", date!(2023 - 01 - 01), Some(100), Some(50), Some(5)),
        ],
        &[],
    )
    .await;

    let (status, body) = test_app
        .get("/api/weather/?station_id=STN001&date=2023-01-01")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        r#"[{"station_id":"STN001","date":"2023-01-01","max_temp":30.0,"min_temp":15.0,"precipitation":2.0}]"#
    );
}

#[tokio::test]
async fn requires_station_or_date() {
    let test_app = spawn_app(Arc::new(MockWeatherAccess::new())).await;

    let (status, body) = test_app.get("/api/weather/").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        r#"{"error":"At least one of station_id or date is required."}"#
    );

    let (status, _) = test_app.get("/api/weather?station_id=&date=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = test_app.get("/api/weather/?page=2&per_page=5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_values_stay_null() {
    let test_app = spawn_app_with_rows(
        &[observation("STN001", date!(2023 - 01 - 01), None, Some(0), None)],
        &[],
    )
    .await;

    let (status, body) = test_app.get("/api/weather?station_id=STN001").await;
    assert_eq!(status, StatusCode::OK);

    let rows: Value = from_str(&body).unwrap();
    assert_eq!(rows[0]["max_temp"], Value::Null);
    assert_eq!(rows[0]["min_temp"], 0.0);
    assert_eq!(rows[0]["precipitation"], Value::Null);
}

#[tokio::test]
async fn paginates_filtered_rows() {
    let rows: Vec<Observation> = (1..=5)
        .map(|day| {
            observation(
                "STN001",
                Date::from_calendar_date(2023, time::Month::January, day).unwrap(),
                Some(100),
                Some(50),
                Some(1),
            )
        })
        .collect();
    let test_app = spawn_app_with_rows(&rows, &[]).await;

    let (_, body) = test_app
        .get("/api/weather/?station_id=STN001&page=1&per_page=2")
        .await;
    let page_one: Vec<ObservationRecord> = from_str(&body).unwrap();
    assert_eq!(
        page_one.iter().map(|r| r.date.as_str()).collect::<Vec<_>>(),
        ["2023-01-01", "2023-01-02"]
    );

    let (_, body) = test_app
        .get("/api/weather/?station_id=STN001&page=3&per_page=2")
        .await;
    let page_three: Vec<ObservationRecord> = from_str(&body).unwrap();
    assert_eq!(page_three.len(), 1);
    assert_eq!(page_three[0].date, "2023-01-05");

    let (status, body) = test_app
        .get("/api/weather/?station_id=STN001&page=4&per_page=2")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");

    let (_, body) = test_app.get("/api/weather/?station_id=STN001").await;
    let default_page: Vec<ObservationRecord> = from_str(&body).unwrap();
    assert_eq!(default_page.len(), 5);
}

#[tokio::test]
async fn blank_page_means_first_page() {
    let mut weather_data = MockWeatherAccess::new();
    weather_data
        .expect_observations()
        .withf(|filter, page| {
            filter.station_id.as_deref() == Some("STN001")
                && page.number() == 1
                && page.size() == DEFAULT_PAGE_SIZE
        })
        .times(1)
        .returning(|_, _| Ok(vec![]));

    let test_app = spawn_app(Arc::new(weather_data)).await;
    let (status, body) = test_app
        .get("/api/weather/?station_id=STN001&page=&per_page=")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
}

#[tokio::test]
async fn passes_filter_and_page_to_query_service() {
    let mut weather_data = MockWeatherAccess::new();
    weather_data
        .expect_observations()
        .withf(|filter, page| {
            filter.station_id.as_deref() == Some("USC00110072")
                && filter.date.is_none()
                && page.number() == 3
                && page.size() == 7
        })
        .times(1)
        .returning(|_, _| Ok(vec![]));

    let test_app = spawn_app(Arc::new(weather_data)).await;
    let (status, body) = test_app
        .get("/api/weather?station_id=USC00110072&page=3&per_page=7")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
}

#[tokio::test]
async fn rejects_malformed_parameters() {
    let mut weather_data = MockWeatherAccess::new();
    weather_data.expect_observations().never();
    let test_app = spawn_app(Arc::new(weather_data)).await;

    for uri in [
        "/api/weather/?date=20230101",
        "/api/weather/?station_id=STN001&page=0",
        "/api/weather/?station_id=STN001&per_page=0",
        "/api/weather/?station_id=STN001&page=abc",
        "/api/weather/?station_id=STN001&per_page=-5",
    ] {
        let (status, body) = test_app.get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        let error: ErrorResponse = from_str(&body).unwrap();
        assert!(!error.error.is_empty());
    }
}

#[tokio::test]
async fn storage_failure_returns_empty_list() {
    let mut weather_data = MockWeatherAccess::new();
    weather_data
        .expect_observations()
        .times(1)
        .returning(|_, _| Err(Error::Store(db::Error::Query(sqlx::Error::PoolTimedOut))));

    let test_app = spawn_app(Arc::new(weather_data)).await;
    let (status, body) = test_app.get("/api/weather/?date=2023-01-01").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
}

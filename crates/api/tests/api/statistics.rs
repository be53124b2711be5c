use crate::helpers::{spawn_app, spawn_app_with_rows, MockWeatherAccess};
use axum::http::StatusCode;
use serde_json::from_str;
use std::sync::Arc;
use weather_api::{Error, StatisticRecord};
use weather_core::{db, YearlyStatistic, DEFAULT_PAGE_SIZE};

fn statistic(station_id: &str, year: i32) -> YearlyStatistic {
    YearlyStatistic {
        station_id: station_id.to_owned(),
        year,
        avg_max_temp: Some(17.5),
        avg_min_temp: Some(4.25),
        total_precipitation: Some(81.5),
    }
}

#[tokio::test]
async fn no_parameters_returns_first_page_of_all_rows() {
    let stats: Vec<YearlyStatistic> = (1985..2010).map(|year| statistic("STN001", year)).collect();
    let test_app = spawn_app_with_rows(&[], &stats).await;

    let (status, body) = test_app.get("/api/weather/statistics").await;
    assert_eq!(status, StatusCode::OK);

    let rows: Vec<StatisticRecord> = from_str(&body).unwrap();
    assert_eq!(rows.len(), DEFAULT_PAGE_SIZE as usize);
    assert_eq!(rows[0].year, 1985);
    assert_eq!(rows[19].year, 2004);

    let (_, body) = test_app.get("/api/weather/statistics?page=2").await;
    let rows: Vec<StatisticRecord> = from_str(&body).unwrap();
    assert_eq!(rows.len(), 5);
}

#[tokio::test]
async fn filters_by_station_and_year() {
    let test_app = spawn_app_with_rows(
        &[],
        &[
            statistic("STN001", 1990),
            statistic("STN001", 1991),
            statistic("STN002", 1990),
        ],
    )
    .await;

    let (status, body) = test_app
        .get("/api/weather/statistics?station_id=STN002&year=1990")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        r#"[{"station_id":"STN002","year":1990,"avg_max_temp":17.5,"avg_min_temp":4.25,"total_precipitation":81.5}]"#
    );

    let (_, body) = test_app.get("/api/weather/statistics?year=1990").await;
    let rows: Vec<StatisticRecord> = from_str(&body).unwrap();
    assert_eq!(
        rows.iter().map(|r| r.station_id.as_str()).collect::<Vec<_>>(),
        ["STN001", "STN002"]
    );
}

#[tokio::test]
async fn blank_numeric_parameters_are_ignored() {
    let stats: Vec<YearlyStatistic> = (1985..2010).map(|year| statistic("STN001", year)).collect();
    let test_app = spawn_app_with_rows(&[], &stats).await;

    let (status, body) = test_app.get("/api/weather/statistics?year=").await;
    assert_eq!(status, StatusCode::OK);
    let rows: Vec<StatisticRecord> = from_str(&body).unwrap();
    assert_eq!(rows.len(), DEFAULT_PAGE_SIZE as usize);
    assert_eq!(rows[0].year, 1985);

    let (status, body) = test_app
        .get("/api/weather/statistics?station_id=STN001&page=&per_page=")
        .await;
    assert_eq!(status, StatusCode::OK);
    let rows: Vec<StatisticRecord> = from_str(&body).unwrap();
    assert_eq!(rows.len(), DEFAULT_PAGE_SIZE as usize);
    assert_eq!(rows[0].year, 1985);
}

#[tokio::test]
async fn rejects_non_integer_year() {
    let mut weather_data = MockWeatherAccess::new();
    weather_data.expect_statistics().never();
    let test_app = spawn_app(Arc::new(weather_data)).await;

    let (status, _) = test_app.get("/api/weather/statistics?year=nineteen").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = test_app.get("/api/weather/statistics?per_page=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn storage_failure_returns_empty_list() {
    let mut weather_data = MockWeatherAccess::new();
    weather_data
        .expect_statistics()
        .times(1)
        .returning(|_, _| Err(Error::Store(db::Error::Query(sqlx::Error::PoolClosed))));

    let test_app = spawn_app(Arc::new(weather_data)).await;
    let (status, body) = test_app.get("/api/weather/statistics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
}

#[tokio::test]
async fn serves_api_docs() {
    let test_app = spawn_app(Arc::new(MockWeatherAccess::new())).await;
    let (status, body) = test_app.get("/docs").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("/api/weather/statistics"));
}

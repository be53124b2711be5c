use crate::{parse_date, AppState, ObservationRecord, StatisticRecord, WeatherData};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    Json,
};
use log::error;
use serde::{Deserialize, Serialize};
use std::{str::FromStr, sync::Arc};
use utoipa::{IntoParams, ToSchema};
use weather_core::{ObservationFilter, Page, StatisticFilter, DEFAULT_PAGE_SIZE};

pub const MISSING_OBSERVATION_FILTER: &str = "At least one of station_id or date is required.";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Empty query values (`?station_id=`) are the same as leaving them out
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Blank is absent, anything else must parse as an integer
fn integer<T: FromStr>(name: &str, value: Option<String>) -> Result<Option<T>, ApiError> {
    non_empty(value)
        .map(|v| {
            v.parse()
                .map_err(|_| bad_request(format!("Invalid {} '{}', expected an integer", name, v)))
        })
        .transpose()
}

fn page(page: Option<String>, per_page: Option<String>) -> Result<Page, ApiError> {
    let number = integer("page", page)?.unwrap_or(1);
    let size = integer("per_page", per_page)?.unwrap_or(DEFAULT_PAGE_SIZE);
    Page::new(number, size).map_err(|e| bad_request(e.to_string()))
}

#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ObservationParams {
    /// Station identifier, e.g. USC00110072
    pub station_id: Option<String>,
    /// Observation day, YYYY-MM-DD
    pub date: Option<String>,
    /// 1-indexed page number, defaults to 1
    #[param(value_type = Option<u32>)]
    pub page: Option<String>,
    /// Page size, defaults to 20
    #[param(value_type = Option<u32>)]
    pub per_page: Option<String>,
}

impl ObservationParams {
    fn into_query(self) -> Result<(ObservationFilter, Page), ApiError> {
        let station_id = non_empty(self.station_id);
        let date = non_empty(self.date);
        if station_id.is_none() && date.is_none() {
            return Err(bad_request(MISSING_OBSERVATION_FILTER));
        }

        let date = date
            .map(|d| {
                parse_date(&d)
                    .map_err(|_| bad_request(format!("Invalid date '{}', expected YYYY-MM-DD", d)))
            })
            .transpose()?;

        Ok((
            ObservationFilter { station_id, date },
            page(self.page, self.per_page)?,
        ))
    }
}

#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatisticParams {
    /// Station identifier, e.g. USC00110072
    pub station_id: Option<String>,
    /// Calendar year
    #[param(value_type = Option<i32>)]
    pub year: Option<String>,
    /// 1-indexed page number, defaults to 1
    #[param(value_type = Option<u32>)]
    pub page: Option<String>,
    /// Page size, defaults to 20
    #[param(value_type = Option<u32>)]
    pub per_page: Option<String>,
}

impl StatisticParams {
    fn into_query(self) -> Result<(StatisticFilter, Page), ApiError> {
        Ok((
            StatisticFilter {
                station_id: non_empty(self.station_id),
                year: integer("year", self.year)?,
            },
            page(self.page, self.per_page)?,
        ))
    }
}

#[utoipa::path(
    get,
    path = "/api/weather/",
    params(ObservationParams),
    responses(
        (status = OK, description = "Daily observations ordered by station and date", body = Vec<ObservationRecord>),
        (status = BAD_REQUEST, description = "Missing or malformed query parameters", body = ErrorResponse)
    ))]
pub async fn observations(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ObservationParams>, QueryRejection>,
) -> Result<Json<Vec<ObservationRecord>>, ApiError> {
    let Query(params) = params.map_err(|e| bad_request(e.body_text()))?;
    let (filter, page) = params.into_query()?;

    match state.weather_db.observations(&filter, page).await {
        Ok(records) => Ok(Json(records)),
        Err(e) => {
            error!("error querying observations: {}", e);
            Ok(Json(vec![]))
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/weather/statistics",
    params(StatisticParams),
    responses(
        (status = OK, description = "Yearly statistics ordered by station and year", body = Vec<StatisticRecord>),
        (status = BAD_REQUEST, description = "Malformed query parameters", body = ErrorResponse)
    ))]
pub async fn statistics(
    State(state): State<Arc<AppState>>,
    params: Result<Query<StatisticParams>, QueryRejection>,
) -> Result<Json<Vec<StatisticRecord>>, ApiError> {
    let Query(params) = params.map_err(|e| bad_request(e.body_text()))?;
    let (filter, page) = params.into_query()?;

    match state.weather_db.statistics(&filter, page).await {
        Ok(records) => Ok(Json(records)),
        Err(e) => {
            error!("error querying statistics: {}", e);
            Ok(Json(vec![]))
        }
    }
}

use crate::{db, observations, routes, statistics, WeatherAccess, WeatherData};
use anyhow::anyhow;
use axum::{
    body::Body,
    extract::Request,
    middleware::{self, Next},
    response::IntoResponse,
    routing::get,
    Router,
};
use hyper::{header::ACCEPT, Method};
use log::info;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};
use weather_core::Database;

#[derive(Clone)]
pub struct AppState {
    pub weather_db: Arc<dyn WeatherData>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::weather::weather_routes::observations,
        routes::weather::weather_routes::statistics,
    ),
    components(
        schemas(
                db::ObservationRecord,
                db::StatisticRecord,
                routes::weather::weather_routes::ErrorResponse
            )
    ),
    tags(
        (name = "weather analytics api", description = "a read-only RESTful api over daily station observations and yearly statistics")
    )
)]
struct ApiDoc;

pub async fn build_app_state(database_url: &str) -> Result<AppState, anyhow::Error> {
    let db = Database::connect(database_url)
        .await
        .map_err(|e| anyhow!("error setting up SQLite database: {}", e))?;

    Ok(AppState {
        weather_db: Arc::new(WeatherAccess::new(Arc::new(db))),
    })
}

pub fn app(app_state: AppState) -> Router {
    let api_docs = ApiDoc::openapi();
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ACCEPT])
        .allow_origin(Any);

    Router::new()
        .route("/api/weather", get(observations))
        .route("/api/weather/", get(observations))
        .route("/api/weather/statistics", get(statistics))
        .with_state(Arc::new(app_state))
        .layer(middleware::from_fn(log_request))
        .merge(Scalar::with_url("/docs", api_docs))
        .layer(cors)
}

async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let now = time::OffsetDateTime::now_utc();
    let method = request.method().clone();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_default();
    info!(target: "http_request", "new request, {} {}", method, path);

    let response = next.run(request).await;
    let response_time = time::OffsetDateTime::now_utc() - now;
    info!(target: "http_response", "response, {} {}, code: {}, time: {}", method, path, response.status().as_str(), response_time);

    response
}

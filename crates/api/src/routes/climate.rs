use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use log::error;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{db, AppState, DailyTempStats, TempStats};

/// Station id and name, keyed the way the original API surface spells them
#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct StationSummary {
    #[serde(rename = "Station")]
    pub station: String,
    #[serde(rename = "Name")]
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct TobsReading {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Temperature")]
    pub temperature: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct TempStatsFromResponse {
    #[serde(rename = "Start Date")]
    pub start_date: String,
    #[serde(rename = "TMIN")]
    pub tmin: Option<f64>,
    #[serde(rename = "TAVG")]
    pub tavg: Option<f64>,
    #[serde(rename = "TMAX")]
    pub tmax: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct TempStatsRangeResponse {
    #[serde(rename = "Start Date")]
    pub start_date: String,
    #[serde(rename = "End Date")]
    pub end_date: String,
    #[serde(rename = "TMIN")]
    pub tmin: Option<f64>,
    #[serde(rename = "TAVG")]
    pub tavg: Option<f64>,
    #[serde(rename = "TMAX")]
    pub tmax: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, ToSchema)]
pub struct DailyTempStatsResponse {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "TMIN")]
    pub tmin: Option<f64>,
    #[serde(rename = "TAVG")]
    pub tavg: Option<f64>,
    #[serde(rename = "TMAX")]
    pub tmax: Option<f64>,
}

impl From<DailyTempStats> for DailyTempStatsResponse {
    fn from(stats: DailyTempStats) -> Self {
        Self {
            date: stats.date,
            tmin: stats.tmin,
            tavg: stats.tavg,
            tmax: stats.tmax,
        }
    }
}

/// The routing layer owns the mapping from query errors to transport failures;
/// the query layer surfaces them unchanged.
fn into_error_response(err: db::Error) -> (StatusCode, String) {
    error!("climate query failed: {}", err);
    match err {
        db::Error::EmptyDataset => (StatusCode::NOT_FOUND, err.to_string()),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1.0/precipitation",
    responses(
        (status = OK, description = "Precipitation for the trailing year, keyed by date", body = Object),
        (status = NOT_FOUND, description = "Dataset has no measurement rows"),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query the dataset")
    ))]
pub async fn precipitation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Map<String, Value>>, (StatusCode, String)> {
    let readings = state
        .climate_db
        .precipitation_last_year()
        .await
        .map_err(into_error_response)?;

    // Duplicate dates across stations collapse to the later row, matching the
    // documented collision policy
    let mut by_date = Map::new();
    for reading in readings {
        by_date.insert(
            reading.date,
            reading.prcp.map(Value::from).unwrap_or(Value::Null),
        );
    }

    Ok(Json(by_date))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/stations",
    responses(
        (status = OK, description = "Every station in the dataset", body = Vec<StationSummary>),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query the dataset")
    ))]
pub async fn stations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StationSummary>>, (StatusCode, String)> {
    let stations = state
        .climate_db
        .stations()
        .await
        .map_err(into_error_response)?;

    let summaries = stations
        .into_iter()
        .map(|station| StationSummary {
            station: station.station_id,
            name: station.name,
        })
        .collect();

    Ok(Json(summaries))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/tobs",
    responses(
        (status = OK, description = "Trailing-year temperature observations for the most active station", body = Vec<TobsReading>),
        (status = NOT_FOUND, description = "Dataset has no measurement rows"),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query the dataset")
    ))]
pub async fn tobs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TobsReading>>, (StatusCode, String)> {
    let readings = state
        .climate_db
        .most_active_station_tobs_last_year()
        .await
        .map_err(into_error_response)?;

    let readings = readings
        .into_iter()
        .map(|reading| TobsReading {
            date: reading.date,
            temperature: reading.tobs,
        })
        .collect();

    Ok(Json(readings))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/{start_date}",
    params(
        ("start_date" = String, Path, description = "Inclusive lower date bound, YYYY-MM-DD"),
    ),
    responses(
        (status = OK, description = "Temperature stats over all dates >= start_date; all null when nothing matches", body = TempStatsFromResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query the dataset")
    ))]
pub async fn temp_stats_from(
    State(state): State<Arc<AppState>>,
    Path(start_date): Path<String>,
) -> Result<Json<TempStatsFromResponse>, (StatusCode, String)> {
    let TempStats { tmin, tavg, tmax } = state
        .climate_db
        .temp_stats_from(&start_date)
        .await
        .map_err(into_error_response)?;

    Ok(Json(TempStatsFromResponse {
        start_date,
        tmin,
        tavg,
        tmax,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/{start_date}/{end_date}",
    params(
        ("start_date" = String, Path, description = "Inclusive lower date bound, YYYY-MM-DD"),
        ("end_date" = String, Path, description = "Inclusive upper date bound, YYYY-MM-DD"),
    ),
    responses(
        (status = OK, description = "Temperature stats over the inclusive date range; all null when nothing matches", body = TempStatsRangeResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query the dataset")
    ))]
pub async fn temp_stats_range(
    State(state): State<Arc<AppState>>,
    Path((start_date, end_date)): Path<(String, String)>,
) -> Result<Json<TempStatsRangeResponse>, (StatusCode, String)> {
    let TempStats { tmin, tavg, tmax } = state
        .climate_db
        .temp_stats_range(&start_date, &end_date)
        .await
        .map_err(into_error_response)?;

    Ok(Json(TempStatsRangeResponse {
        start_date,
        end_date,
        tmin,
        tavg,
        tmax,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/datesearch/{start_date}",
    params(
        ("start_date" = String, Path, description = "Inclusive lower date bound, YYYY-MM-DD"),
    ),
    responses(
        (status = OK, description = "Per-date temperature stats for dates >= start_date", body = Vec<DailyTempStatsResponse>),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query the dataset")
    ))]
pub async fn daily_temp_stats_from(
    State(state): State<Arc<AppState>>,
    Path(start_date): Path<String>,
) -> Result<Json<Vec<DailyTempStatsResponse>>, (StatusCode, String)> {
    let stats = state
        .climate_db
        .daily_temp_stats_from(&start_date)
        .await
        .map_err(into_error_response)?;

    Ok(Json(stats.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1.0/datesearch/{start_date}/{end_date}",
    params(
        ("start_date" = String, Path, description = "Inclusive lower date bound, YYYY-MM-DD"),
        ("end_date" = String, Path, description = "Inclusive upper date bound, YYYY-MM-DD"),
    ),
    responses(
        (status = OK, description = "Per-date temperature stats within the inclusive range", body = Vec<DailyTempStatsResponse>),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to query the dataset")
    ))]
pub async fn daily_temp_stats_range(
    State(state): State<Arc<AppState>>,
    Path((start_date, end_date)): Path<(String, String)>,
) -> Result<Json<Vec<DailyTempStatsResponse>>, (StatusCode, String)> {
    let stats = state
        .climate_db
        .daily_temp_stats_range(&start_date, &end_date)
        .await
        .map_err(into_error_response)?;

    Ok(Json(stats.into_iter().map(Into::into).collect()))
}

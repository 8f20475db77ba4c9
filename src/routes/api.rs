// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Whoop data routes for the dashboard. Bodies are passed through as Whoop
//! returns them.

use crate::error::{AppError, Result};
use crate::services::DateRange;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/whoop/profile", get(get_profile))
        .route("/api/whoop/body", get(get_body_measurement))
        .route("/api/whoop/recovery", get(get_recovery))
        .route("/api/whoop/sleep", get(get_sleep))
        .route("/api/whoop/workouts", get(get_workouts))
        .route("/api/whoop/cycles", get(get_cycles))
}

#[derive(Deserialize)]
struct RangeQuery {
    /// Start of range (RFC3339)
    start: Option<String>,
    /// End of range (RFC3339)
    end: Option<String>,
}

fn parse_timestamp(name: &str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            AppError::BadRequest(format!(
                "Invalid '{}' parameter: must be RFC3339 datetime",
                name
            ))
        })
}

impl RangeQuery {
    /// A range applies only when both bounds are given.
    fn into_range(self) -> Result<Option<DateRange>> {
        let start = self
            .start
            .as_deref()
            .map(|s| parse_timestamp("start", s))
            .transpose()?;
        let end = self
            .end
            .as_deref()
            .map(|s| parse_timestamp("end", s))
            .transpose()?;

        match (start, end) {
            (Some(start), Some(end)) if start > end => Err(AppError::BadRequest(
                "'start' must not be after 'end'".to_string(),
            )),
            (Some(start), Some(end)) => Ok(Some(DateRange { start, end })),
            _ => Ok(None),
        }
    }
}

async fn get_profile(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    Ok(Json(state.whoop.get_profile().await?))
}

async fn get_body_measurement(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    Ok(Json(state.whoop.get_body_measurement().await?))
}

async fn get_recovery(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Value>> {
    let range = query.into_range()?;
    Ok(Json(state.whoop.get_recovery(range).await?))
}

async fn get_sleep(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Value>> {
    let range = query.into_range()?;
    Ok(Json(state.whoop.get_sleep(range).await?))
}

async fn get_workouts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Value>> {
    let range = query.into_range()?;
    Ok(Json(state.whoop.get_workouts(range).await?))
}

async fn get_cycles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Value>> {
    let range = query.into_range()?;
    Ok(Json(state.whoop.get_cycles(range).await?))
}

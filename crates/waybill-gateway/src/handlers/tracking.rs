use crate::error::Result;
use crate::model::{TrackingNumberQuery, TrackingNumberRequest, TrackingNumberResponse};
use crate::state::AppState;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use jiff::Timestamp;
use tracing::info;

pub async fn next_tracking_number_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<TrackingNumberQuery>, QueryRejection>,
) -> Result<Json<TrackingNumberResponse>> {
    let Query(query) = query?;
    let request = TrackingNumberRequest::try_from(query)?;

    let tracking_number = state.generator().generate(&request.shipment())?;

    info!(
        origin = %request.origin_country_id,
        destination = %request.destination_country_id,
        tracking_number = %tracking_number,
        "issued tracking number"
    );

    Ok(Json(TrackingNumberResponse {
        tracking_number,
        created_at: Timestamp::now(),
        origin_country_id: request.origin_country_id,
        destination_country_id: request.destination_country_id,
    }))
}

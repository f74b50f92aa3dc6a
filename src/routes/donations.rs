use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::models::{
    CreateDonationRequest, CreateDonationResponse, DonationFeedEntry, TotalsResponse,
};
use crate::services::donation_service;
use crate::AppState;

const TOTALS_CACHE_KEY: &str = "totals";

pub async fn create_donation(
    State(state): State<AppState>,
    Json(body): Json<CreateDonationRequest>,
) -> AppResult<Json<CreateDonationResponse>> {
    let stripe = state
        .stripe
        .as_ref()
        .ok_or_else(|| AppError::Internal("Stripe not configured".into()))?;

    let resp = donation_service::create_donation_intent(
        stripe,
        state.store.as_ref(),
        &state.config.donation,
        body,
    )
    .await?;

    // New record changes the aggregates.
    state.cache.del(TOTALS_CACHE_KEY).await;

    Ok(Json(resp))
}

/// Everything the checkout modal needs before it can render: the
/// Stripe publishable key and the donation constraints.
pub async fn checkout_config(State(state): State<AppState>) -> Json<Value> {
    let cfg = &state.config.donation;
    Json(json!({
        "publishableKey": state.config.stripe.publishable_key,
        "minAmount": cfg.min_amount,
        "currency": cfg.currency,
    }))
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<i64>,
}

pub async fn recent_donations(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<Value>> {
    let cfg = &state.config.donation;
    let limit = query
        .limit
        .unwrap_or(cfg.feed_default_limit)
        .clamp(1, cfg.feed_max_limit);

    let rows = state.store.recent_donations(limit).await?;
    let donations: Vec<DonationFeedEntry> = rows
        .into_iter()
        .map(|row| row.into_public())
        .collect();

    Ok(Json(json!({ "donations": donations })))
}

pub async fn totals(State(state): State<AppState>) -> AppResult<Json<TotalsResponse>> {
    if let Some(cached) = state.cache.get_json::<TotalsResponse>(TOTALS_CACHE_KEY).await {
        return Ok(Json(cached));
    }

    let team_total = state.store.team_total().await?;
    let player_totals = state.store.player_totals().await?;
    let resp = TotalsResponse {
        team_total,
        player_totals,
    };

    state
        .cache
        .set_json(
            TOTALS_CACHE_KEY,
            &resp,
            state.config.donation.totals_cache_secs,
        )
        .await;

    Ok(Json(resp))
}

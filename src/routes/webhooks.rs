use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde_json::Value;

use crate::error::AppResult;
use crate::storage::DonationStore;
use crate::AppState;

/// Stripe webhook receiver. Payment outcomes are recorded for
/// operational reconciliation of orphaned intents; donation records
/// themselves are never mutated here. Their existence reflects intent
/// to pay, and the provider owns the confirmation state.
///
/// A failed log write answers non-2xx so Stripe redelivers the event
/// instead of it being lost.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, StatusCode> {
    let stripe = match &state.stripe {
        Some(s) => s,
        None => return Ok(StatusCode::OK),
    };

    let sig = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let event = match stripe.verify_webhook_signature(&body, sig) {
        Ok(e) => e,
        Err(_) => return Err(StatusCode::BAD_REQUEST),
    };

    match apply_stripe_event(state.store.as_ref(), &event).await {
        Ok(()) => Ok(StatusCode::OK),
        Err(e) => {
            tracing::error!("Failed to record stripe event: {e}");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Appends payment-intent outcomes to the reconciliation log.
/// Unrecognized event types are acknowledged and ignored; redelivered
/// events deduplicate on the event id inside the store.
async fn apply_stripe_event(store: &dyn DonationStore, event: &Value) -> AppResult<()> {
    let event_id = event["id"].as_str().unwrap_or("");
    let event_type = event["type"].as_str().unwrap_or("");

    match event_type {
        "payment_intent.succeeded"
        | "payment_intent.payment_failed"
        | "payment_intent.canceled" => {
            let intent_id = event["data"]["object"]["id"].as_str().unwrap_or("");
            tracing::info!(intent = intent_id, event = event_type, "stripe payment event");
            store.record_payment_event(event_id, event_type, event).await
        }
        _ => {
            tracing::debug!(event = event_type, "ignoring stripe event");
            Ok(())
        }
    }
}

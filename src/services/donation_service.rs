use async_trait::async_trait;
use uuid::Uuid;

use crate::config::DonationConfig;
use crate::error::{AppError, AppResult};
use crate::models::{CreateDonationRequest, CreateDonationResponse, NewDonation};
use crate::storage::DonationStore;

/// Parameters for a provider-side payment intent.
#[derive(Debug, Clone)]
pub struct IntentRequest {
    pub amount: i64,
    pub currency: String,
    pub receipt_email: String,
    pub donor_name: String,
    pub player_id: Option<Uuid>,
}

/// The slice of the provider's payment intent the service consumes: the
/// opaque identifier it persists and the secret the browser needs to
/// drive confirmation.
#[derive(Debug, Clone)]
pub struct ProviderIntent {
    pub id: String,
    pub client_secret: String,
}

/// External payment provider. Creates charge intents; confirmation is
/// driven by the client directly against the provider and never passes
/// through this server.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_intent(&self, req: &IntentRequest) -> AppResult<ProviderIntent>;
}

/// Creates a payment intent at the provider and persists the matching
/// donation record, returning the client secret and the record id.
///
/// Ordering matters: the provider call happens first because the insert
/// needs the intent id. If the insert then fails, the provider-side
/// intent is left orphaned on purpose. Cancelling it would tear down the
/// donor's in-flight checkout with nothing gained, so the mismatch is
/// logged and left to operational reconciliation (the webhook records
/// intent outcomes for exactly this purpose).
///
/// No retries, no idempotency key: submitting the same request twice
/// creates two independent intents and two records.
pub async fn create_donation_intent(
    provider: &dyn PaymentProvider,
    store: &dyn DonationStore,
    cfg: &DonationConfig,
    req: CreateDonationRequest,
) -> AppResult<CreateDonationResponse> {
    let amount = req.amount.unwrap_or(0);
    if amount < cfg.min_amount {
        return Err(AppError::Validation(format!(
            "Minimum donation amount is ${}.{:02}",
            cfg.min_amount / 100,
            cfg.min_amount % 100
        )));
    }

    let donor_name = req.donor_name.as_deref().map(str::trim).unwrap_or("");
    let donor_email = req.donor_email.as_deref().map(str::trim).unwrap_or("");
    if donor_name.is_empty() || donor_email.is_empty() {
        return Err(AppError::Validation(
            "Donor name and email are required".to_string(),
        ));
    }

    tracing::info!(amount, donor = donor_name, player = ?req.player_id, "creating donation intent");

    let intent = provider
        .create_intent(&IntentRequest {
            amount,
            currency: cfg.currency.clone(),
            receipt_email: donor_email.to_string(),
            donor_name: donor_name.to_string(),
            player_id: req.player_id,
        })
        .await?;

    let donation = match store
        .insert_donation(NewDonation {
            amount,
            donor_name: donor_name.to_string(),
            donor_email: donor_email.to_string(),
            message: req.message.filter(|m| !m.is_empty()),
            player_id: req.player_id,
            display_publicly: req.display_publicly.unwrap_or(false),
            stripe_payment_intent_id: intent.id.clone(),
        })
        .await
    {
        Ok(d) => d,
        Err(e) => {
            tracing::error!(
                intent = %intent.id,
                "donation insert failed after intent creation, intent left for reconciliation: {e}"
            );
            return Err(e);
        }
    };

    tracing::info!(donation_id = %donation.id, intent = %intent.id, "donation recorded");

    Ok(CreateDonationResponse {
        client_secret: intent.client_secret,
        donation_id: donation.id,
    })
}

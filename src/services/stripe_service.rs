use async_trait::async_trait;
use serde_json::Value;

use crate::config::StripeConfig;
use crate::error::{AppError, AppResult};
use crate::services::donation_service::{IntentRequest, PaymentProvider, ProviderIntent};

/// Accepted clock skew between Stripe's webhook timestamp and ours.
const WEBHOOK_TOLERANCE_SECS: i64 = 300;

/// Lightweight Stripe client wrapping raw HTTP calls.
/// This avoids the compile-time weight of async-stripe while providing
/// the two Stripe operations the application needs: creating payment
/// intents and verifying webhook signatures.
#[derive(Clone)]
pub struct StripeClient {
    secret_key: String,
    webhook_secret: String,
    client: reqwest::Client,
}

impl StripeClient {
    pub fn new(config: &StripeConfig) -> Option<Self> {
        if config.secret_key.is_empty() {
            return None;
        }
        Some(Self {
            secret_key: config.secret_key.clone(),
            webhook_secret: config.webhook_secret.clone(),
            client: reqwest::Client::new(),
        })
    }

    async fn post(&self, path: &str, params: &[(&str, &str)]) -> AppResult<Value> {
        let url = format!("https://api.stripe.com/v1{}", path);
        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.secret_key, Option::<&str>::None)
            .form(params)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Stripe request failed: {}", e)))?;

        let status = resp.status();
        let body: Value = resp
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("Stripe response parse failed: {}", e)))?;

        if !status.is_success() {
            let msg = body["error"]["message"]
                .as_str()
                .unwrap_or("Unknown Stripe error");
            return Err(AppError::Provider(format!("Stripe error: {}", msg)));
        }
        Ok(body)
    }

    /// Creates a payment intent for the given amount, with the donor's
    /// email as receipt destination and donor name / target as opaque
    /// metadata for support lookups.
    pub async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
        receipt_email: &str,
        donor_name: &str,
        target: &str,
    ) -> AppResult<Value> {
        let amount_str = amount.to_string();
        self.post(
            "/payment_intents",
            &[
                ("amount", amount_str.as_str()),
                ("currency", currency),
                ("automatic_payment_methods[enabled]", "true"),
                ("receipt_email", receipt_email),
                ("metadata[donor_name]", donor_name),
                ("metadata[player_id]", target),
            ],
        )
        .await
    }

    pub fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> AppResult<Value> {
        // Parse Stripe signature header: t=timestamp,v1=signature
        let mut timestamp = "";
        let mut sig = "";
        for part in signature_header.split(',') {
            let mut kv = part.splitn(2, '=');
            match kv.next() {
                Some("t") => timestamp = kv.next().unwrap_or(""),
                Some("v1") => sig = kv.next().unwrap_or(""),
                _ => {}
            }
        }

        if timestamp.is_empty() || sig.is_empty() {
            return Err(AppError::Validation("Invalid Stripe signature".into()));
        }

        // Verify HMAC-SHA256
        use hmac::{Hmac, Mac};
        use sha2::Sha256;

        type HmacSha256 = Hmac<Sha256>;

        let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));
        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())
            .map_err(|_| AppError::Internal("HMAC key error".into()))?;
        mac.update(signed_payload.as_bytes());

        let expected = hex::encode(mac.finalize().into_bytes());
        if expected != sig {
            return Err(AppError::Validation(
                "Webhook signature verification failed".into(),
            ));
        }

        let ts: i64 = timestamp.parse().unwrap_or(0);
        let now = chrono::Utc::now().timestamp();
        if (now - ts).abs() > WEBHOOK_TOLERANCE_SECS {
            return Err(AppError::Validation("Webhook timestamp too old".into()));
        }

        serde_json::from_slice(payload)
            .map_err(|e| AppError::Validation(format!("Invalid webhook payload: {}", e)))
    }
}

#[async_trait]
impl PaymentProvider for StripeClient {
    async fn create_intent(&self, req: &IntentRequest) -> AppResult<ProviderIntent> {
        let target = req
            .player_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "team".to_string());

        let body = self
            .create_payment_intent(
                req.amount,
                &req.currency,
                &req.receipt_email,
                &req.donor_name,
                &target,
            )
            .await?;

        let id = body["id"]
            .as_str()
            .ok_or_else(|| AppError::Provider("Stripe intent missing id".into()))?
            .to_string();
        let client_secret = body["client_secret"]
            .as_str()
            .ok_or_else(|| AppError::Provider("Stripe intent missing client_secret".into()))?
            .to_string();

        Ok(ProviderIntent { id, client_secret })
    }
}

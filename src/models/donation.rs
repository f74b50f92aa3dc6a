use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A durable donation record. Created exactly once per accepted request,
/// alongside the Stripe payment intent it references. Never mutated or
/// deleted by the server: its existence means "intent to pay", not
/// "payment received".
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Donation {
    pub id: Uuid,
    pub amount: i64,
    pub donor_name: String,
    pub donor_email: String,
    pub message: Option<String>,
    /// None means the donation goes to the team as a whole.
    pub player_id: Option<Uuid>,
    pub display_publicly: bool,
    pub stripe_payment_intent_id: String,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new donation row. The id and timestamp are generated by
/// the database.
#[derive(Debug, Clone)]
pub struct NewDonation {
    pub amount: i64,
    pub donor_name: String,
    pub donor_email: String,
    pub message: Option<String>,
    pub player_id: Option<Uuid>,
    pub display_publicly: bool,
    pub stripe_payment_intent_id: String,
}

/// Client-submitted checkout form. Required fields are modelled as
/// `Option` so that a missing field produces the documented validation
/// message instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct CreateDonationRequest {
    pub amount: Option<i64>,
    #[serde(rename = "donorName")]
    pub donor_name: Option<String>,
    #[serde(rename = "donorEmail")]
    pub donor_email: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "playerId")]
    pub player_id: Option<Uuid>,
    #[serde(rename = "displayPublicly")]
    pub display_publicly: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct CreateDonationResponse {
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
    #[serde(rename = "donationId")]
    pub donation_id: Uuid,
}

/// Row shape for the recent-donations feed: a donation joined with the
/// targeted player's name and number, if any.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DonationFeedRow {
    pub id: Uuid,
    pub amount: i64,
    pub donor_name: String,
    pub message: Option<String>,
    pub display_publicly: bool,
    pub created_at: DateTime<Utc>,
    pub player_name: Option<String>,
    pub player_number: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct FeedPlayer {
    pub name: String,
    pub number: i32,
}

#[derive(Debug, Serialize)]
pub struct DonationFeedEntry {
    pub id: Uuid,
    pub amount: i64,
    pub donor_name: String,
    pub message: Option<String>,
    pub player: Option<FeedPlayer>,
    pub created_at: DateTime<Utc>,
}

impl DonationFeedRow {
    /// Converts a feed row into its public form. Donors who did not opt
    /// into public display are served as "Anonymous" with their message
    /// withheld.
    pub fn into_public(self) -> DonationFeedEntry {
        let player = match (self.player_name, self.player_number) {
            (Some(name), Some(number)) => Some(FeedPlayer { name, number }),
            _ => None,
        };
        let (donor_name, message) = if self.display_publicly {
            (self.donor_name, self.message)
        } else {
            ("Anonymous".to_string(), None)
        };
        DonationFeedEntry {
            id: self.id,
            amount: self.amount,
            donor_name,
            message,
            player,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PlayerTotal {
    pub player_id: Uuid,
    pub total: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TotalsResponse {
    pub team_total: i64,
    pub player_totals: Vec<PlayerTotal>,
}

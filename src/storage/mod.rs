use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Donation, DonationFeedRow, NewDonation, PlayerTotal};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgDonationStore;

/// Persistence contract for donation records and their aggregates.
/// The production implementation is Postgres; tests swap in an
/// in-memory store to exercise partial-failure paths.
#[async_trait]
pub trait DonationStore: Send + Sync {
    /// Inserts a donation row. All-or-nothing: no partial record is ever
    /// persisted.
    async fn insert_donation(&self, new: NewDonation) -> AppResult<Donation>;

    /// Most recent donations, newest first, joined with the targeted
    /// player where there is one.
    async fn recent_donations(&self, limit: i64) -> AppResult<Vec<DonationFeedRow>>;

    /// Sum of all donation amounts, team-wide.
    async fn team_total(&self) -> AppResult<i64>;

    /// Per-player donation sums (team-targeted donations excluded).
    async fn player_totals(&self) -> AppResult<Vec<PlayerTotal>>;

    /// Sum of donation amounts targeting one player.
    async fn sum_for_player(&self, player_id: Uuid) -> AppResult<i64>;

    /// Appends a provider event to the reconciliation log. Redelivered
    /// events (same id) are dropped. Failures must surface to the
    /// caller so the provider redelivers instead of losing the event.
    async fn record_payment_event(
        &self,
        event_id: &str,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> AppResult<()>;
}

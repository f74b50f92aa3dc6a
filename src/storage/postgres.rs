use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Donation, DonationFeedRow, NewDonation, PlayerTotal};

use super::DonationStore;

#[derive(Clone)]
pub struct PgDonationStore {
    pool: PgPool,
}

impl PgDonationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DonationStore for PgDonationStore {
    async fn insert_donation(&self, new: NewDonation) -> AppResult<Donation> {
        let donation: Donation = sqlx::query_as(
            r#"INSERT INTO donations
                (amount, donor_name, donor_email, message, player_id, display_publicly, stripe_payment_intent_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *"#,
        )
        .bind(new.amount)
        .bind(&new.donor_name)
        .bind(&new.donor_email)
        .bind(&new.message)
        .bind(new.player_id)
        .bind(new.display_publicly)
        .bind(&new.stripe_payment_intent_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(donation)
    }

    async fn recent_donations(&self, limit: i64) -> AppResult<Vec<DonationFeedRow>> {
        let rows: Vec<DonationFeedRow> = sqlx::query_as(
            r#"SELECT d.id, d.amount, d.donor_name, d.message, d.display_publicly, d.created_at,
                p.name AS player_name, p.number AS player_number
            FROM donations d
            LEFT JOIN players p ON p.id = d.player_id
            ORDER BY d.created_at DESC
            LIMIT $1"#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn team_total(&self) -> AppResult<i64> {
        let total: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0)::bigint FROM donations")
                .fetch_one(&self.pool)
                .await?;
        Ok(total)
    }

    async fn player_totals(&self) -> AppResult<Vec<PlayerTotal>> {
        let totals: Vec<PlayerTotal> = sqlx::query_as(
            r#"SELECT player_id, SUM(amount)::bigint AS total
            FROM donations
            WHERE player_id IS NOT NULL
            GROUP BY player_id"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(totals)
    }

    async fn sum_for_player(&self, player_id: Uuid) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0)::bigint FROM donations WHERE player_id = $1",
        )
        .bind(player_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    async fn record_payment_event(
        &self,
        event_id: &str,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> AppResult<()> {
        // Redelivered events hit the conflict and are dropped.
        sqlx::query(
            "INSERT INTO stripe_events (id, event_type, payload, status) VALUES ($1, $2, $3, 'processed') ON CONFLICT (id) DO NOTHING",
        )
        .bind(event_id)
        .bind(event_type)
        .bind(payload)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

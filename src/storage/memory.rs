use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Donation, DonationFeedRow, NewDonation, PlayerTotal};

use super::DonationStore;

/// In-memory [`DonationStore`] for tests. Inserts and the event log can
/// be armed to fail so partial-failure paths are reproducible.
pub struct MemoryStore {
    donations: Mutex<Vec<Donation>>,
    events: Mutex<Vec<(String, String)>>,
    fail_insert: bool,
    fail_event_log: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            donations: Mutex::new(Vec::new()),
            events: Mutex::new(Vec::new()),
            fail_insert: false,
            fail_event_log: false,
        }
    }

    /// Store whose donation insert fails, as if the database dropped
    /// the connection mid-request.
    pub fn failing() -> Self {
        Self {
            fail_insert: true,
            ..Self::new()
        }
    }

    /// Store whose reconciliation log write fails.
    pub fn with_failing_event_log() -> Self {
        Self {
            fail_event_log: true,
            ..Self::new()
        }
    }

    pub fn donations(&self) -> Vec<Donation> {
        self.donations.lock().expect("lock").clone()
    }

    pub fn record_count(&self) -> usize {
        self.donations.lock().expect("lock").len()
    }

    pub fn event_log(&self) -> Vec<(String, String)> {
        self.events.lock().expect("lock").clone()
    }
}

#[async_trait]
impl DonationStore for MemoryStore {
    async fn insert_donation(&self, new: NewDonation) -> AppResult<Donation> {
        if self.fail_insert {
            return Err(AppError::Database(sqlx::Error::PoolClosed));
        }
        let donation = Donation {
            id: Uuid::new_v4(),
            amount: new.amount,
            donor_name: new.donor_name,
            donor_email: new.donor_email,
            message: new.message,
            player_id: new.player_id,
            display_publicly: new.display_publicly,
            stripe_payment_intent_id: new.stripe_payment_intent_id,
            created_at: Utc::now(),
        };
        self.donations.lock().expect("lock").push(donation.clone());
        Ok(donation)
    }

    async fn recent_donations(&self, limit: i64) -> AppResult<Vec<DonationFeedRow>> {
        let mut donations = self.donations.lock().expect("lock").clone();
        donations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(donations
            .into_iter()
            .take(limit as usize)
            .map(|d| DonationFeedRow {
                id: d.id,
                amount: d.amount,
                donor_name: d.donor_name,
                message: d.message,
                display_publicly: d.display_publicly,
                created_at: d.created_at,
                player_name: None,
                player_number: None,
            })
            .collect())
    }

    async fn team_total(&self) -> AppResult<i64> {
        Ok(self
            .donations
            .lock()
            .expect("lock")
            .iter()
            .map(|d| d.amount)
            .sum())
    }

    async fn player_totals(&self) -> AppResult<Vec<PlayerTotal>> {
        let donations = self.donations.lock().expect("lock");
        let mut totals: Vec<PlayerTotal> = Vec::new();
        for d in donations.iter() {
            let Some(pid) = d.player_id else { continue };
            match totals.iter_mut().find(|t| t.player_id == pid) {
                Some(t) => t.total += d.amount,
                None => totals.push(PlayerTotal {
                    player_id: pid,
                    total: d.amount,
                }),
            }
        }
        Ok(totals)
    }

    async fn sum_for_player(&self, player_id: Uuid) -> AppResult<i64> {
        Ok(self
            .donations
            .lock()
            .expect("lock")
            .iter()
            .filter(|d| d.player_id == Some(player_id))
            .map(|d| d.amount)
            .sum())
    }

    async fn record_payment_event(
        &self,
        event_id: &str,
        event_type: &str,
        _payload: &serde_json::Value,
    ) -> AppResult<()> {
        if self.fail_event_log {
            return Err(AppError::Database(sqlx::Error::PoolClosed));
        }
        let mut events = self.events.lock().expect("lock");
        if events.iter().any(|(id, _)| id == event_id) {
            return Ok(());
        }
        events.push((event_id.to_string(), event_type.to_string()));
        Ok(())
    }
}

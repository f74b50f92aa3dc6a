use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    pub number: i32,
    pub position: String,
    pub slug: String,
    pub headshot_url: Option<String>,
    pub bio: Option<String>,
}

/// Roster entry with its donation total, computed in SQL.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PlayerWithTotal {
    pub id: Uuid,
    pub name: String,
    pub number: i32,
    pub position: String,
    pub slug: String,
    pub headshot_url: Option<String>,
    pub bio: Option<String>,
    pub total_donations: i64,
}

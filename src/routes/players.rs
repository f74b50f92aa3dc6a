use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::models::{Player, PlayerWithTotal};
use crate::AppState;

pub async fn list_players(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let players: Vec<PlayerWithTotal> = sqlx::query_as(
        r#"SELECT p.id, p.name, p.number, p.position, p.slug, p.headshot_url, p.bio,
            COALESCE(SUM(d.amount), 0)::bigint AS total_donations
        FROM players p
        LEFT JOIN donations d ON d.player_id = p.id
        GROUP BY p.id
        ORDER BY p.name"#,
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(json!({ "players": players })))
}

pub async fn get_player(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<Value>> {
    let player: Option<Player> = sqlx::query_as(
        "SELECT id, name, number, position, slug, headshot_url, bio FROM players WHERE slug = $1",
    )
    .bind(&slug)
    .fetch_optional(&state.db)
    .await?;

    let player = player.ok_or_else(|| AppError::NotFound("Player not found".into()))?;
    let total_donations = state.store.sum_for_player(player.id).await?;

    Ok(Json(json!({
        "player": player,
        "total_donations": total_donations,
    })))
}

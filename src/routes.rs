use axum::Json;
use axum::extract::Path;
use axum::routing::patch;
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;
use tracing::info;

use crate::auth::CurrentUser;
use crate::db::repository;
use crate::error::AppError;
use crate::matcher;
use crate::models::*;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/postings", get(list_postings).post(create_posting))
        .route(
            "/postings/{id}",
            get(get_posting).patch(update_posting).delete(delete_posting),
        )
        .route("/postings/{id}/close", patch(close_posting))
        .route("/matches", get(list_matches))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn list_postings(State(state): State<AppState>) -> Result<Json<Vec<Posting>>, AppError> {
    let postings = repository::fetch_open_postings(&state.db).await?;
    Ok(Json(postings))
}

async fn create_posting(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<NewPostingRequest>,
) -> Result<(StatusCode, Json<Posting>), AppError> {
    let held = posting::canonicalize_held(req.held).map_err(AppError::BadRequest)?;
    let wanted = posting::canonicalize_wanted(req.wanted).map_err(AppError::BadRequest)?;

    let posting =
        repository::insert_posting(&state.db, &user_id, held, wanted, req.reward).await?;
    info!("posting {} created by {}", posting.id, user_id);
    Ok((StatusCode::CREATED, Json(posting)))
}

async fn get_posting(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Posting>, AppError> {
    let posting = repository::find_posting_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(posting))
}

async fn update_posting(
    State(state): State<AppState>,
    Path(id): Path<String>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<UpdatePostingRequest>,
) -> Result<Json<Posting>, AppError> {
    let mut current = repository::find_posting_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    if current.owner_id != user_id {
        return Err(AppError::Forbidden);
    }
    if !current.is_open() {
        return Err(AppError::Conflict("posting is closed".to_string()));
    }

    if let Some(held) = req.held {
        current.held = posting::canonicalize_held(held).map_err(AppError::BadRequest)?;
    }
    if let Some(wanted) = req.wanted {
        current.wanted = posting::canonicalize_wanted(wanted).map_err(AppError::BadRequest)?;
    }
    if let Some(reward) = req.reward {
        current.reward = Some(reward);
    }
    current.updated_at = chrono::Utc::now().to_rfc3339();

    repository::update_posting(&state.db, &current).await?;
    Ok(Json(current))
}

async fn close_posting(
    State(state): State<AppState>,
    Path(id): Path<String>,
    CurrentUser(user_id): CurrentUser,
) -> Result<StatusCode, AppError> {
    let current = repository::find_posting_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    if current.owner_id != user_id {
        return Err(AppError::Forbidden);
    }

    let closed = repository::close_posting(&state.db, &id).await?;
    if closed {
        info!("posting {} closed by {}", id, user_id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Conflict("posting is already closed".to_string()))
    }
}

async fn delete_posting(
    State(state): State<AppState>,
    Path(id): Path<String>,
    CurrentUser(user_id): CurrentUser,
) -> Result<StatusCode, AppError> {
    let current = repository::find_posting_by_id(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;

    let is_admin = state.admin_user_id.as_deref() == Some(user_id.as_str());
    if current.owner_id != user_id && !is_admin {
        return Err(AppError::Forbidden);
    }

    if repository::delete_posting(&state.db, &id).await? {
        info!("posting {} deleted by {}", id, user_id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

/// One of the caller's postings together with the market postings that
/// mutually satisfy it.
#[derive(Debug, Serialize)]
pub struct MatchGroup {
    pub posting: Posting,
    pub matches: Vec<Posting>,
}

async fn list_matches(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<MatchGroup>>, AppError> {
    let snapshot = repository::fetch_open_postings(&state.db).await?;
    let matches = matcher::find_matches(&snapshot, &user_id);

    // Groups follow the order of the caller's own postings in the snapshot;
    // postings without matches are omitted.
    let groups: Vec<MatchGroup> = snapshot
        .iter()
        .filter(|p| p.owner_id == user_id)
        .filter_map(|p| {
            matches.get(&p.id).map(|matched| MatchGroup {
                posting: p.clone(),
                matches: matched.iter().map(|&m| m.clone()).collect(),
            })
        })
        .collect();

    Ok(Json(groups))
}

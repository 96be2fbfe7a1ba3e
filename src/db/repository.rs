use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{HeldItem, Posting, PostingStatus, WantedItem};

const POSTING_COLUMNS: &str =
    "id, owner_id, held, wanted, reward, status, created_at, updated_at";

/// All OPEN postings, newest first. This is the snapshot the matcher and the
/// marketplace listing run against.
pub async fn fetch_open_postings(db: &SqlitePool) -> Result<Vec<Posting>, sqlx::Error> {
    sqlx::query_as::<_, Posting>(&format!(
        "SELECT {POSTING_COLUMNS} FROM postings WHERE status = 'OPEN' ORDER BY created_at DESC"
    ))
    .fetch_all(db)
    .await
}

pub async fn find_posting_by_id(
    db: &SqlitePool,
    id: &str,
) -> Result<Option<Posting>, sqlx::Error> {
    sqlx::query_as::<_, Posting>(&format!(
        "SELECT {POSTING_COLUMNS} FROM postings WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn insert_posting(
    db: &SqlitePool,
    owner_id: &str,
    held: Vec<HeldItem>,
    wanted: Vec<WantedItem>,
    reward: Option<String>,
) -> Result<Posting, sqlx::Error> {
    let now = Utc::now().to_rfc3339();
    let posting = Posting {
        id: Uuid::new_v4().to_string(),
        owner_id: owner_id.to_string(),
        held,
        wanted,
        reward,
        status: PostingStatus::Open,
        created_at: now.clone(),
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO postings (id, owner_id, held, wanted, reward, status, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&posting.id)
    .bind(&posting.owner_id)
    .bind(encode_json(&posting.held)?)
    .bind(encode_json(&posting.wanted)?)
    .bind(&posting.reward)
    .bind(posting.status.as_str())
    .bind(&posting.created_at)
    .bind(&posting.updated_at)
    .execute(db)
    .await?;

    Ok(posting)
}

/// Persist edited held/wanted/reward for a posting. Ownership and the
/// OPEN-only rule are enforced by the caller, which holds the loaded row.
pub async fn update_posting(db: &SqlitePool, posting: &Posting) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE postings SET held = ?, wanted = ?, reward = ?, updated_at = ? WHERE id = ?",
    )
    .bind(encode_json(&posting.held)?)
    .bind(encode_json(&posting.wanted)?)
    .bind(&posting.reward)
    .bind(&posting.updated_at)
    .bind(&posting.id)
    .execute(db)
    .await?;

    Ok(())
}

/// OPEN -> CLOSED. Returns false when the posting was already CLOSED (the
/// transition is irreversible) or does not exist.
pub async fn close_posting(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let now = Utc::now().to_rfc3339();
    let result = sqlx::query(
        "UPDATE postings SET status = 'CLOSED', updated_at = ? WHERE id = ? AND status = 'OPEN'",
    )
    .bind(now)
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

pub async fn delete_posting(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM postings WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

fn encode_json<T: serde::Serialize>(value: &T) -> Result<String, sqlx::Error> {
    serde_json::to_string(value).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use log::debug;
use rusqlite::{params, Connection, Row};

use crate::{
    db::{
        helpers::{format_timestamp, parse_datetime},
        models::QrCode,
        Database,
    },
    error::AppError,
};

/// Page size used when a caller passes a non-positive limit.
pub const DEFAULT_LIST_LIMIT: i64 = 50;

const SELECT_COLUMNS: &str =
    "SELECT id, content, label, image_data, created_at, updated_at FROM qr_codes";

fn row_to_qr_code(row: &Row) -> Result<QrCode> {
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    Ok(QrCode {
        id: row.get("id")?,
        content: row.get("content")?,
        label: row.get("label")?,
        image_data: row.get("image_data")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

fn fetch_qr_code(conn: &Connection, id: i64) -> Result<Option<QrCode>> {
    let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE id = ?1"))?;
    let mut rows = stmt.query(params![id])?;
    let qr_code = match rows.next()? {
        Some(row) => Some(row_to_qr_code(row)?),
        None => None,
    };
    Ok(qr_code)
}

impl Database {
    /// Insert a new QR code and return the stored row.
    pub async fn create_qr_code(
        &self,
        content: String,
        label: String,
        image_data: Vec<u8>,
    ) -> Result<QrCode, AppError> {
        if content.is_empty() {
            return Err(AppError::validation("content cannot be empty"));
        }
        if image_data.is_empty() {
            return Err(AppError::validation("image data cannot be empty"));
        }

        let qr_code = self
            .execute(move |conn| {
                let now = format_timestamp(Utc::now());
                conn.execute(
                    "INSERT INTO qr_codes (content, label, image_data, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?4)",
                    params![content, label, image_data, now],
                )
                .context("failed to insert qr code")?;

                let id = conn.last_insert_rowid();
                fetch_qr_code(conn, id)?.ok_or_else(|| anyhow!("qr code {id} missing after insert"))
            })
            .await?;

        debug!("Stored qr code {}", qr_code.id);
        Ok(qr_code)
    }

    /// Look up a QR code. A missing row is `Ok(None)`, not an error.
    pub async fn get_qr_code(&self, id: i64) -> Result<Option<QrCode>, AppError> {
        let qr_code = self
            .execute(move |conn| fetch_qr_code(conn, id).context("failed to get qr code"))
            .await?;
        Ok(qr_code)
    }

    /// Most recent first. `limit <= 0` falls back to [`DEFAULT_LIST_LIMIT`].
    pub async fn list_qr_codes(&self, limit: i64, offset: i64) -> Result<Vec<QrCode>, AppError> {
        let limit = if limit <= 0 { DEFAULT_LIST_LIMIT } else { limit };
        let offset = offset.max(0);

        let qr_codes = self
            .execute(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    "{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC LIMIT ?1 OFFSET ?2"
                ))?;

                let mut rows = stmt
                    .query(params![limit, offset])
                    .context("failed to list qr codes")?;
                let mut qr_codes = Vec::new();
                while let Some(row) = rows.next()? {
                    qr_codes.push(row_to_qr_code(row)?);
                }

                Ok(qr_codes)
            })
            .await?;
        Ok(qr_codes)
    }

    pub async fn count_qr_codes(&self) -> Result<i64, AppError> {
        let count = self
            .execute(|conn| {
                conn.query_row("SELECT COUNT(*) FROM qr_codes", [], |row| row.get(0))
                    .context("failed to count qr codes")
            })
            .await?;
        Ok(count)
    }

    /// Replace the label and bump `updated_at`.
    pub async fn update_qr_code_label(&self, id: i64, label: String) -> Result<(), AppError> {
        let rows_affected = self
            .execute(move |conn| {
                let now = format_timestamp(Utc::now());
                conn.execute(
                    "UPDATE qr_codes SET label = ?1, updated_at = ?2 WHERE id = ?3",
                    params![label, now, id],
                )
                .context("failed to update label")
            })
            .await?;

        if rows_affected == 0 {
            return Err(AppError::NotFound(id));
        }
        Ok(())
    }

    pub async fn delete_qr_code(&self, id: i64) -> Result<(), AppError> {
        let rows_affected = self
            .execute(move |conn| {
                conn.execute("DELETE FROM qr_codes WHERE id = ?1", params![id])
                    .context("failed to delete qr code")
            })
            .await?;

        if rows_affected == 0 {
            return Err(AppError::NotFound(id));
        }
        Ok(())
    }
}

//! QR code record stored in the `qr_codes` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QrCode {
    pub id: i64,
    pub content: String,
    pub label: String,
    /// PNG bytes. Served from `/qr/{id}`, never inlined in JSON.
    #[serde(skip_serializing, default)]
    pub image_data: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `PUT /qr/{id}`. A missing `label` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelInput {
    #[serde(default)]
    pub label: String,
}

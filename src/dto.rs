//! # Bloom: shared request/response shapes
//!
//! Conventions:
//! - `*Query`  → deserialized from query params
//! - `*Response` → serialized to client JSON
//! - Domain rows live in `models`; this module only holds cross-cutting shapes

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

// ============================================================================
// Errors
// ============================================================================

/// Stable error envelope; every error response uses this shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

// ============================================================================
// Local time
// ============================================================================

/// Largest UTC offset in use anywhere (UTC+14 / UTC-12 rounded up).
const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Client's UTC offset, in minutes east of UTC. Calendar-day grouping,
/// weekday buckets and "today" are all computed in this offset.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LocalTimeQuery {
    pub tz_offset_minutes: Option<i32>,
}

impl LocalTimeQuery {
    pub fn offset(&self) -> AppResult<FixedOffset> {
        let minutes = self.tz_offset_minutes.unwrap_or(0);
        if minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(AppError::Validation(
                "tz_offset_minutes must be between -840 and 840".into(),
            ));
        }
        FixedOffset::east_opt(minutes * 60)
            .ok_or_else(|| AppError::Validation("Invalid tz_offset_minutes".into()))
    }
}

pub fn local_today(now: DateTime<Utc>, offset: &FixedOffset) -> NaiveDate {
    now.with_timezone(offset).date_naive()
}

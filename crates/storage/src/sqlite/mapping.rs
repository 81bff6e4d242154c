use peyv_core::model::{ItemKey, LessonStatus};
use std::collections::BTreeSet;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn status_from_str(raw: &str) -> Result<LessonStatus, StorageError> {
    LessonStatus::parse(raw)
        .ok_or_else(|| StorageError::Serialization(format!("invalid lesson status: {raw}")))
}

pub(crate) fn percent_from_i64(v: i64) -> Result<u8, StorageError> {
    u8::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid percent: {v}")))
}

pub(crate) fn score_from_i64(v: Option<i64>) -> Result<Option<u8>, StorageError> {
    v.map(|s| {
        u8::try_from(s).map_err(|_| StorageError::Serialization(format!("invalid score: {s}")))
    })
    .transpose()
}

pub(crate) fn minutes_from_i64(v: i64) -> Result<u32, StorageError> {
    u32::try_from(v)
        .map_err(|_| StorageError::Serialization(format!("invalid time_spent_minutes: {v}")))
}

/// Encode the played-key set as a JSON array of strings. `None` (legacy
/// records) maps to SQL NULL.
pub(crate) fn keys_to_json(keys: Option<&BTreeSet<ItemKey>>) -> Result<Option<String>, StorageError> {
    keys.map(|set| {
        let raw: Vec<&str> = set.iter().map(ItemKey::as_str).collect();
        serde_json::to_string(&raw).map_err(ser)
    })
    .transpose()
}

/// Decode the played-key set from its JSON column.
pub(crate) fn keys_from_json(
    raw: Option<&str>,
) -> Result<Option<BTreeSet<ItemKey>>, StorageError> {
    raw.map(|json| {
        let parsed: Vec<String> = serde_json::from_str(json).map_err(ser)?;
        Ok(parsed.into_iter().map(ItemKey::from_stored).collect())
    })
    .transpose()
}

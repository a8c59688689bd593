use crate::clock::Clock;
use crate::errors::StoreError;
use crate::models::{
    ProgressDocument, ProgressRecord, RawProgressDocument, SCHEMA_VERSION, UserId,
};
use crate::storage::{DocumentClient, progress_path};
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{info, warn};

/// Loads, saves and resets per-user progress. Holds no state of its own;
/// every call is a fresh round trip to the store.
#[derive(Clone)]
pub struct ProgressService {
    client: DocumentClient,
    clock: Arc<dyn Clock>,
    total_days: u32,
}

impl ProgressService {
    pub fn new(client: DocumentClient, clock: Arc<dyn Clock>, total_days: u32) -> Self {
        Self {
            client,
            clock,
            total_days,
        }
    }

    /// Absent documents load as an empty record with no version; nothing is
    /// created remotely.
    pub async fn load(&self, uid: &UserId) -> Result<ProgressRecord, StoreError> {
        let path = progress_path(uid);
        match self.client.fetch(&path).await? {
            None => Ok(ProgressRecord::empty()),
            Some(doc) => {
                let mut record = normalize(&doc.bytes, self.total_days);
                record.version = Some(doc.version);
                Ok(record)
            }
        }
    }

    /// Writes `record` and returns a copy carrying the refreshed version.
    /// On error `record` is left as the caller had it.
    pub async fn save(
        &self,
        uid: &UserId,
        record: &ProgressRecord,
    ) -> Result<ProgressRecord, StoreError> {
        let path = progress_path(uid);
        let document = to_document(uid, record, &self.clock.now().to_rfc3339());
        let bytes = serde_json::to_vec_pretty(&document)?;

        self.client
            .put_with_retry(&path, &bytes, record.version.as_deref())
            .await?;

        let mut saved = record.clone();
        if let Some(doc) = self.client.fetch(&path).await? {
            saved.version = Some(doc.version);
        }
        info!(%uid, completed = saved.completed.len(), "progress saved");
        Ok(saved)
    }

    pub async fn reset(&self, uid: &UserId) -> Result<(), StoreError> {
        let path = progress_path(uid);
        if let Some(doc) = self.client.fetch(&path).await? {
            self.client.delete(&path, &doc.version).await?;
            info!(%uid, "progress reset");
        }
        Ok(())
    }
}

pub fn to_document(uid: &UserId, record: &ProgressRecord, updated_at: &str) -> ProgressDocument {
    ProgressDocument {
        uid: uid.to_string(),
        updated_at: updated_at.to_string(),
        completed: record.completed.iter().copied().collect(),
        favorites: record.favorites.iter().copied().collect(),
        reactions: record
            .reactions
            .iter()
            .map(|(day, tag)| (day.to_string(), tag.clone()))
            .collect(),
        started_on: record.started_on,
        schema_version: SCHEMA_VERSION,
    }
}

/// Best-effort parse of a stored document. Entries that do not make sense
/// are dropped; the rest survives. Never fails.
pub fn normalize(bytes: &[u8], total_days: u32) -> ProgressRecord {
    let raw: RawProgressDocument = match serde_json::from_slice(bytes) {
        Ok(raw) => raw,
        Err(err) => {
            warn!("stored progress is not a JSON object, treating as empty: {err}");
            RawProgressDocument::default()
        }
    };

    if let Some(version) = raw.schema_version.as_ref().and_then(Value::as_u64) {
        if version > u64::from(SCHEMA_VERSION) {
            warn!(version, "stored progress has a newer schema version");
        }
    }

    ProgressRecord {
        completed: day_set(raw.completed.as_ref(), total_days),
        favorites: day_set(raw.favorites.as_ref(), total_days),
        reactions: reaction_map(raw.reactions.as_ref(), total_days),
        started_on: raw
            .started_on
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|value| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()),
        version: None,
    }
}

fn day_set(value: Option<&Value>, total_days: u32) -> BTreeSet<u32> {
    let Some(Value::Array(items)) = value else {
        return BTreeSet::new();
    };
    let days: BTreeSet<u32> = items
        .iter()
        .filter_map(|item| day_ordinal(item, total_days))
        .collect();
    let dropped = items.len().saturating_sub(days.len());
    if dropped > 0 {
        warn!(dropped, "discarded invalid or duplicate day entries");
    }
    days
}

/// Integers, integral floats and numeric strings inside `[1, total_days]`.
fn day_ordinal(item: &Value, total_days: u32) -> Option<u32> {
    let day = match item {
        Value::Number(number) => match number.as_u64() {
            Some(day) => day,
            None => {
                let float = number.as_f64()?;
                if float.fract() != 0.0 || float < 0.0 {
                    return None;
                }
                float as u64
            }
        },
        Value::String(text) => text.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    in_range(day, total_days)
}

fn in_range(day: u64, total_days: u32) -> Option<u32> {
    let day = u32::try_from(day).ok()?;
    (1..=total_days).contains(&day).then_some(day)
}

fn reaction_map(value: Option<&Value>, total_days: u32) -> BTreeMap<u32, String> {
    let Some(Value::Object(entries)) = value else {
        return BTreeMap::new();
    };
    entries
        .iter()
        .filter_map(|(key, tag)| {
            let day = in_range(key.trim().parse::<u64>().ok()?, total_days)?;
            match tag {
                Value::String(tag) if !tag.is_empty() => Some((day, tag.clone())),
                _ => None,
            }
        })
        .collect()
}

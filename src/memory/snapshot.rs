use crate::error::MemoryError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const TIER_IMMUTABLE: &str = "immutable";
pub const TIER_MUTABLE: &str = "mutable";
pub const TIER_ARCHIVE: &str = "archive";
pub const TIERS: [&str; 3] = [TIER_IMMUTABLE, TIER_MUTABLE, TIER_ARCHIVE];

/// The three-tier user memory document.
///
/// - `immutable`: identity and core facts. Only an out-of-band seed may change it.
/// - `mutable`: current user state, restructured freely by the model.
/// - `archive`: compressed long-term summaries, never raw transcripts.
///
/// Serialized form always has exactly these three keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemorySnapshot {
    pub immutable: Value,
    pub mutable: Value,
    pub archive: Value,
}

impl Default for MemorySnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl MemorySnapshot {
    pub fn empty() -> Self {
        Self {
            immutable: Value::Object(Map::new()),
            mutable: Value::Object(Map::new()),
            archive: Value::Object(Map::new()),
        }
    }

    /// Parse a document that must carry exactly the three tiers, each an object.
    pub fn from_value_strict(value: Value) -> Result<Self, MemoryError> {
        let snapshot: Self =
            serde_json::from_value(value).map_err(|e| MemoryError::Invalid(e.to_string()))?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Rebuild a snapshot from a stored document.
    ///
    /// Missing tiers become empty objects (a freshly initialised store holds
    /// `{}`); unknown top-level keys are dropped so they are never written back.
    pub fn from_stored(value: Value) -> Result<Self, MemoryError> {
        let Value::Object(mut map) = value else {
            return Err(MemoryError::Invalid(
                "stored memory is not a JSON object".to_string(),
            ));
        };

        let dropped: Vec<String> = map
            .keys()
            .filter(|key| !TIERS.contains(&key.as_str()))
            .cloned()
            .collect();
        if !dropped.is_empty() {
            tracing::warn!(keys = ?dropped, "dropping unknown top-level memory keys");
        }

        let mut take = |tier: &str| map.remove(tier).unwrap_or_else(|| Value::Object(Map::new()));
        let snapshot = Self {
            immutable: take(TIER_IMMUTABLE),
            mutable: take(TIER_MUTABLE),
            archive: take(TIER_ARCHIVE),
        };
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn validate(&self) -> Result<(), MemoryError> {
        for (tier, value) in [
            (TIER_IMMUTABLE, &self.immutable),
            (TIER_MUTABLE, &self.mutable),
            (TIER_ARCHIVE, &self.archive),
        ] {
            if !value.is_object() {
                return Err(MemoryError::Invalid(format!(
                    "tier '{tier}' must be a JSON object"
                )));
            }
        }
        Ok(())
    }

    /// Build the next snapshot from a model-proposed replacement.
    ///
    /// `mutable` and `archive` are taken wholesale from `proposed`; `immutable`
    /// is always carried over from `self`.
    pub fn adopt(&self, proposed: Self) -> Self {
        if proposed.immutable != self.immutable {
            tracing::warn!("model proposed changes to the immutable tier; keeping stored value");
        }
        Self {
            immutable: self.immutable.clone(),
            mutable: proposed.mutable,
            archive: proposed.archive,
        }
    }

    /// Whether `archive` holds `text` verbatim anywhere in its string leaves.
    pub fn archive_contains_verbatim(&self, text: &str) -> bool {
        let needle = text.trim();
        !needle.is_empty() && contains_string(&self.archive, needle)
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            TIER_IMMUTABLE: self.immutable,
            TIER_MUTABLE: self.mutable,
            TIER_ARCHIVE: self.archive,
        })
    }
}

fn contains_string(value: &Value, needle: &str) -> bool {
    match value {
        Value::String(s) => s.contains(needle),
        Value::Array(items) => items.iter().any(|item| contains_string(item, needle)),
        Value::Object(map) => map.values().any(|item| contains_string(item, needle)),
        Value::Null | Value::Bool(_) | Value::Number(_) => false,
    }
}

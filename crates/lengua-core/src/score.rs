//! Score tracking and best-effort persistence.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CorruptPersistedState;
use crate::grading::GradeOutcome;

/// Storage key of the score snapshot.
pub const SCORE_KEY: &str = "lp_score";

/// Read-only view of the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub correct: u32,
    pub total: u32,
}

impl ScoreSnapshot {
    pub fn incorrect(&self) -> u32 {
        self.total - self.correct
    }

    /// Share of correct answers in percent; 0 when nothing was graded.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64 * 100.0
        }
    }
}

/// Correct/total counters for the whole session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreTracker {
    snapshot: ScoreSnapshot,
}

impl ScoreTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: ScoreSnapshot) -> Self {
        Self { snapshot }
    }

    /// Count a graded attempt. `NoAnswerGiven` is not an attempt and leaves
    /// the counters untouched. Counters saturate at `u32::MAX`.
    pub fn record(&mut self, outcome: GradeOutcome) {
        let snapshot = &mut self.snapshot;
        match outcome {
            GradeOutcome::Correct if snapshot.total < u32::MAX => {
                snapshot.correct += 1;
                snapshot.total += 1;
            }
            GradeOutcome::Incorrect => snapshot.total = snapshot.total.saturating_add(1),
            GradeOutcome::Correct | GradeOutcome::NoAnswerGiven => {}
        }
    }

    pub fn reset(&mut self) {
        self.snapshot = ScoreSnapshot::default();
    }

    pub fn snapshot(&self) -> ScoreSnapshot {
        self.snapshot
    }

    pub fn accuracy(&self) -> f64 {
        self.snapshot.accuracy()
    }
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// A string key-value store, in the manner of browser local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a single JSON object file of string values.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", self.path.display()))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        // a corrupt file is overwritten rather than blocking saves forever
        let mut entries = self.read_all().unwrap_or_default();
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&entries).context("failed to serialize store")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }
}

fn counter(value: Option<&Value>, field: &str) -> Result<u32, CorruptPersistedState> {
    value
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| CorruptPersistedState(format!("{field} is not a non-negative integer")))
}

/// Validate a stored snapshot.
///
/// Accepts `{"correct": n, "total": m}` and the older `{"ok": n, "ko": m}`
/// shape (right and wrong answers).
pub fn parse_snapshot(raw: &str) -> Result<ScoreSnapshot, CorruptPersistedState> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| CorruptPersistedState(e.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(CorruptPersistedState("not a JSON object".into()));
    };

    let snapshot = if fields.contains_key("correct") || fields.contains_key("total") {
        ScoreSnapshot {
            correct: counter(fields.get("correct"), "correct")?,
            total: counter(fields.get("total"), "total")?,
        }
    } else {
        let ok = counter(fields.get("ok"), "ok")?;
        let ko = counter(fields.get("ko"), "ko")?;
        ScoreSnapshot {
            correct: ok,
            total: ok
                .checked_add(ko)
                .ok_or_else(|| CorruptPersistedState("counter overflow".into()))?,
        }
    };

    if snapshot.correct > snapshot.total {
        return Err(CorruptPersistedState(format!(
            "correct ({}) exceeds total ({})",
            snapshot.correct, snapshot.total
        )));
    }
    Ok(snapshot)
}

/// Loads and saves the score snapshot through a [`KeyValueStore`].
///
/// Never fails: unreadable or corrupt state starts from zero, and failed
/// saves are logged.
pub struct ScoreStore<S> {
    store: S,
}

impl<S: KeyValueStore> ScoreStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn load(&self) -> ScoreTracker {
        let raw = match self.store.get(SCORE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return ScoreTracker::new(),
            Err(e) => {
                tracing::warn!("score store unreadable, starting from zero: {e:#}");
                return ScoreTracker::new();
            }
        };

        match parse_snapshot(&raw) {
            Ok(snapshot) => ScoreTracker::from_snapshot(snapshot),
            Err(e) => {
                tracing::warn!("{e}; starting from zero");
                ScoreTracker::new()
            }
        }
    }

    pub fn save(&mut self, snapshot: &ScoreSnapshot) {
        let result = serde_json::to_string(snapshot)
            .map_err(anyhow::Error::from)
            .and_then(|json| self.store.set(SCORE_KEY, &json));
        if let Err(e) = result {
            tracing::warn!("failed to persist score: {e:#}");
        }
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Persisted outcome of one payload task.
///
/// Written twice per task: a placeholder with `ok == false` at spawn, then
/// exactly one terminal snapshot with `ok == true`. Only terminal results
/// are eligible for harvest.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskResult {
    pub success: bool,
    pub flag: String,
    pub err: String,
    pub ok: bool,
}

impl TaskResult {
    /// Placeholder written before the exploit runs.
    pub fn pending() -> Self {
        Self::default()
    }

    /// Terminal state carrying whatever the exploit reported.
    pub fn finished(success: bool, flag: impl Into<String>, err: impl Into<String>) -> Self {
        Self {
            success,
            flag: flag.into(),
            err: err.into(),
            ok: true,
        }
    }

    /// Terminal state for a task that never produced a flag: timeout,
    /// instantiation failure, missing capability, crash.
    pub fn failed(err: impl Into<String>) -> Self {
        Self::finished(false, "", err)
    }

    pub fn is_terminal(&self) -> bool {
        self.ok
    }

    /// Store representation.
    pub fn as_value(&self) -> Value {
        json!({
            "success": self.success,
            "flag": self.flag,
            "err": self.err,
            "ok": self.ok,
        })
    }

    /// Decode a store entry; anything undecodable counts as not yet
    /// finished and is therefore never harvested.
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }
}

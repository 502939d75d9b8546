//! Key schema shared by the engine (writer) and the harvester (reader).

/// Index of task-group ids awaiting harvest. Extended by the engine via
/// [`super::KvStore::append`]; the harvester only reads it.
pub const TASKS_INDEX: &str = "tasks:";

const RESULT_PREFIX: &str = "p:";

/// Key of one task's result: `p:{group}:{subject}:{index}`.
pub fn result_key(group: &str, subject: &str, index: usize) -> String {
    format!("{}{}:{}:{}", RESULT_PREFIX, group, subject, index)
}

/// Prefix matching every result key of one task group.
pub fn group_prefix(group: &str) -> String {
    format!("{}{}:", RESULT_PREFIX, group)
}

/// Recover `(subject, index)` from a result key belonging to `group`.
pub fn parse_result_key<'a>(group: &str, key: &'a str) -> Option<(&'a str, usize)> {
    let rest = key
        .strip_prefix(RESULT_PREFIX)?
        .strip_prefix(group)?
        .strip_prefix(':')?;
    let (subject, index) = rest.rsplit_once(':')?;
    if subject.is_empty() {
        return None;
    }
    Some((subject, index.parse().ok()?))
}

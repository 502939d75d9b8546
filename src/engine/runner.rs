use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use dashmap::DashMap;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tokio_util::task::AbortOnDropHandle;
use tracing::{debug, info, warn};

use crate::errors::AwdError;
use crate::exploit::{ExploitFactory, ExploitRegistry, ExploitRunner};
use crate::store::{keys, KvStore};
use crate::subject::SubjectStore;

use super::group::{TaskGroup, TaskOutcome};
use super::result::TaskResult;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

const LOG_SEPARATOR: &str = "~~~~~~~~~~~~~~~~~~~~";

/// Runs registered exploits against every known opponent of a subject.
///
/// `start` spawns one task per target IP and returns immediately; each task
/// writes a placeholder result, drives the exploit under a per-task
/// deadline, appends one log line, and overwrites the placeholder with the
/// terminal result. Group handles stay in an in-memory registry for
/// awaiting, cancellation, and cleanup.
pub struct AttackEngine {
    store: Arc<dyn KvStore>,
    registry: Arc<ExploitRegistry>,
    subjects: SubjectStore,
    groups: DashMap<String, Arc<TaskGroup>>,
    log_lock: Arc<Mutex<()>>,
    default_timeout: Duration,
}

impl AttackEngine {
    pub fn new(store: Arc<dyn KvStore>, registry: Arc<ExploitRegistry>, subjects: SubjectStore) -> Self {
        Self::with_timeout(store, registry, subjects, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        store: Arc<dyn KvStore>,
        registry: Arc<ExploitRegistry>,
        subjects: SubjectStore,
        default_timeout: Duration,
    ) -> Self {
        Self {
            store,
            registry,
            subjects,
            groups: DashMap::new(),
            log_lock: Arc::new(Mutex::new(())),
            default_timeout,
        }
    }

    /// Launch one attack wave for `subject`.
    ///
    /// Returns the generated group id and the number of tasks spawned. A
    /// subject with no targets or no registered exploit yields `("", 0)`
    /// without touching the store. Never blocks on exploit execution.
    pub async fn start(
        &self,
        subject: &str,
        timeout: Option<Duration>,
    ) -> Result<(String, usize), AwdError> {
        let ips = self.subjects.read_ip_list(subject).await?;
        if ips.is_empty() {
            debug!(subject = %subject, "No targets listed, skipping");
            return Ok((String::new(), 0));
        }
        let factory = match self.registry.load(subject) {
            Ok(factory) => factory,
            Err(e) => {
                warn!(subject = %subject, error = %e, "No exploit registered, skipping");
                return Ok((String::new(), 0));
            }
        };

        let group_id = uuid::Uuid::new_v4().simple().to_string();
        let timeout = timeout.unwrap_or(self.default_timeout);
        let log_path = self.subjects.log_path(subject);

        let mut handles = Vec::with_capacity(ips.len());
        for (index, ip) in ips.into_iter().enumerate() {
            let task = PayloadTask {
                store: self.store.clone(),
                factory: factory.clone(),
                log_lock: self.log_lock.clone(),
                log_path: log_path.clone(),
                group_id: group_id.clone(),
                subject: subject.to_string(),
                ip,
                index,
                timeout,
            };
            handles.push(tokio::spawn(task.run()));
        }

        let count = handles.len();
        self.groups.insert(group_id.clone(), Arc::new(TaskGroup::new(handles)));
        self.store
            .append(keys::TASKS_INDEX, Value::String(group_id.clone()))
            .await;
        info!(subject = %subject, group = %group_id, tasks = count, "Attack wave launched");
        Ok((group_id, count))
    }

    /// Block until every task in the group is terminal. Unknown groups
    /// yield an empty list. Blocks the caller only, never sibling groups.
    pub async fn await_group(&self, group_id: &str) -> Vec<TaskOutcome> {
        let group = self.groups.get(group_id).map(|entry| entry.value().clone());
        match group {
            Some(group) => group.join_all().await,
            None => Vec::new(),
        }
    }

    /// Request cancellation of every unfinished task in the group. Tasks
    /// already terminal are unaffected; store entries are never rolled
    /// back. False for an unknown group.
    pub fn cancel(&self, group_id: &str) -> bool {
        match self.groups.get(group_id) {
            Some(group) => {
                group.cancel();
                info!(group = %group_id, "Cancellation requested");
                true
            }
            None => false,
        }
    }

    /// Drop bookkeeping for a group whose tasks are all terminal. Store
    /// entries persist until harvested.
    pub fn cleanup_completed(&self, group_id: &str) -> bool {
        let finished = self
            .groups
            .get(group_id)
            .map(|entry| entry.value().all_finished())
            .unwrap_or(false);
        if finished {
            self.groups.remove(group_id);
        }
        finished
    }

    /// Drop bookkeeping for every completed group, returning their ids.
    pub fn cleanup_all_completed(&self) -> Vec<String> {
        let done: Vec<String> = self
            .groups
            .iter()
            .filter(|entry| entry.value().all_finished())
            .map(|entry| entry.key().clone())
            .collect();
        for group_id in &done {
            self.groups.remove(group_id);
        }
        done
    }

    /// Number of groups still tracked by the engine.
    pub fn tracked_groups(&self) -> usize {
        self.groups.len()
    }
}

/// One exploit invocation against one IP.
struct PayloadTask {
    store: Arc<dyn KvStore>,
    factory: Arc<dyn ExploitFactory>,
    log_lock: Arc<Mutex<()>>,
    log_path: PathBuf,
    group_id: String,
    subject: String,
    ip: String,
    index: usize,
    timeout: Duration,
}

impl PayloadTask {
    async fn run(self) -> TaskResult {
        let key = keys::result_key(&self.group_id, &self.subject, self.index);
        self.store.add(&key, TaskResult::pending().as_value()).await;

        let result = self.invoke().await;

        self.append_log(&result).await;
        self.store.add(&key, result.as_value()).await;
        debug!(
            subject = %self.subject,
            ip = %self.ip,
            index = self.index,
            success = result.success,
            "Payload task finished"
        );
        result
    }

    /// Drive the exploit under the task deadline, mapping every failure
    /// mode into a terminal result.
    async fn invoke(&self) -> TaskResult {
        let runner = match self.factory.build(&self.ip) {
            Ok(Some(runner)) => runner,
            Ok(None) => return TaskResult::failed("[no exploit run() or run_async()]"),
            Err(e) => return TaskResult::failed(format!("[exploit instantiation failed] {}", e)),
        };

        let execution = async {
            match runner {
                // A nested task, so a panicking exploit only kills itself;
                // abort-on-drop ties its lifetime to this task's deadline.
                ExploitRunner::Async(body) => {
                    AbortOnDropHandle::new(tokio::spawn(async move { body.run().await })).await
                }
                ExploitRunner::Blocking(body) => {
                    tokio::task::spawn_blocking(move || body.run()).await
                }
            }
        };

        match tokio::time::timeout(self.timeout, execution).await {
            Ok(Ok(outcome)) => TaskResult::finished(outcome.success, outcome.flag, outcome.err),
            Ok(Err(join_err)) => TaskResult::failed(format!("[exploit crashed] {}", join_err)),
            Err(_) => TaskResult::failed(format!(
                "timeout after {} seconds",
                format_secs(self.timeout)
            )),
        }
    }

    /// One line per task, serialized through the engine-wide log lock so
    /// lines from concurrent tasks never interleave mid-line.
    async fn append_log(&self, result: &TaskResult) {
        let line = format!(
            "[{}] IP: {}, Task: {}\n{}\n{}\n",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            self.ip,
            self.index,
            result.as_value(),
            LOG_SEPARATOR,
        );

        let _guard = self.log_lock.lock().await;
        match tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .await
        {
            Ok(mut file) => {
                if let Err(e) = file.write_all(line.as_bytes()).await {
                    warn!(path = %self.log_path.display(), error = %e, "Log write failed");
                }
            }
            Err(e) => warn!(path = %self.log_path.display(), error = %e, "Log open failed"),
        }
    }
}

fn format_secs(timeout: Duration) -> String {
    let secs = timeout.as_secs_f64();
    if secs.fract() == 0.0 {
        format!("{}", secs as u64)
    } else {
        format!("{}", secs)
    }
}

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::AwdConfig;
use crate::engine::TaskResult;
use crate::store::{keys, KvStore};

use super::sender::FlagSender;
use super::template::{build_flag_info, FlagInfo};

/// Outcome of one orchestrated submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResult {
    pub accepted: bool,
    pub subject: String,
    pub detail: String,
}

/// Harvests finished task results and drives the submission client.
pub struct SubmitOrchestrator {
    store: Arc<dyn KvStore>,
    sender: FlagSender,
}

impl SubmitOrchestrator {
    pub fn new(store: Arc<dyn KvStore>, sender: FlagSender) -> Self {
        Self { store, sender }
    }

    pub fn sender(&self) -> &FlagSender {
        &self.sender
    }

    /// Collect every terminal, successful result left by task groups and
    /// turn each into a submission descriptor. Every terminal key visited
    /// is deleted, whether or not it produced a descriptor, so a result is
    /// harvested exactly once. Placeholders of still-running tasks are
    /// left for a later pass.
    pub async fn harvest(&self, config: &AwdConfig) -> Vec<FlagInfo> {
        let mut descriptors = Vec::new();
        let groups = match self.store.get(keys::TASKS_INDEX).await {
            Some(Value::Array(groups)) => groups,
            _ => return descriptors,
        };

        for group in &groups {
            let Some(group_id) = group.as_str() else { continue };
            let prefix = keys::group_prefix(group_id);
            for key in self.store.keys_with_prefix(&prefix).await {
                let Some(raw) = self.store.get(&key).await else { continue };
                let result = TaskResult::from_value(raw);
                if !result.ok {
                    // Still running; not eligible for harvest yet.
                    continue;
                }
                if result.success {
                    match keys::parse_result_key(group_id, &key) {
                        Some((subject, _index)) => {
                            descriptors.push(build_flag_info(config, subject, &result.flag, None));
                        }
                        None => warn!(key = %key, "Malformed result key, discarding"),
                    }
                }
                self.store.delete(&key).await;
            }
        }

        debug!(flags = descriptors.len(), "Harvest complete");
        descriptors
    }

    /// Submit each descriptor in turn; one rejection or transport failure
    /// never stops the rest.
    pub async fn submit_all(&self, descriptors: &[FlagInfo]) -> Vec<SubmissionResult> {
        let mut results = Vec::with_capacity(descriptors.len());
        for info in descriptors {
            let verdict = self.sender.send_flag(info).await;
            if verdict.accepted {
                info!(subject = %info.subject, "Flag accepted");
            } else {
                debug!(subject = %info.subject, detail = %verdict.detail, "Flag rejected");
            }
            results.push(SubmissionResult {
                accepted: verdict.accepted,
                subject: info.subject.clone(),
                detail: verdict.detail,
            });
        }
        results
    }
}

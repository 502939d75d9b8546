use std::sync::Arc;
use std::time::Duration;

use crate::config::AwdConfig;
use crate::engine::{AttackEngine, TaskOutcome};
use crate::errors::AwdError;
use crate::exploit::ExploitRegistry;
use crate::store::{KvStore, MemoryStore};
use crate::subject::SubjectStore;
use crate::submit::{FlagInfo, FlagSender, SubmissionResult, SubmitOrchestrator, DEFAULT_SUBMIT_TIMEOUT};

/// Wires the whole pipeline together, from exploit waves through harvest
/// to scoring-server submission.
pub struct AwdRun {
    config: AwdConfig,
    store: Arc<dyn KvStore>,
    registry: Arc<ExploitRegistry>,
    engine: AttackEngine,
    orchestrator: SubmitOrchestrator,
}

impl AwdRun {
    /// Build the pipeline around an in-process store.
    pub fn new(config: AwdConfig, subjects: SubjectStore) -> Result<Self, AwdError> {
        Self::with_store(config, subjects, Arc::new(MemoryStore::new()))
    }

    /// Build the pipeline around a caller-provided store.
    pub fn with_store(
        config: AwdConfig,
        subjects: SubjectStore,
        store: Arc<dyn KvStore>,
    ) -> Result<Self, AwdError> {
        let registry = Arc::new(ExploitRegistry::new());
        let engine = AttackEngine::new(store.clone(), registry.clone(), subjects);

        let mut sender = FlagSender::new(&config.server, config.port, DEFAULT_SUBMIT_TIMEOUT)?;
        sender.set_headers(&config.auth_headers)?;
        let orchestrator = SubmitOrchestrator::new(store.clone(), sender);

        Ok(Self {
            config,
            store,
            registry,
            engine,
            orchestrator,
        })
    }

    pub fn config(&self) -> &AwdConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn KvStore> {
        &self.store
    }

    pub fn registry(&self) -> &ExploitRegistry {
        &self.registry
    }

    pub fn engine(&self) -> &AttackEngine {
        &self.engine
    }

    /// Launch one attack wave for `subject` with the engine default
    /// timeout.
    pub async fn attack(&self, subject: &str) -> Result<(String, usize), AwdError> {
        self.engine.start(subject, None).await
    }

    /// Launch one attack wave with an explicit per-task timeout.
    pub async fn attack_with_timeout(
        &self,
        subject: &str,
        timeout: Duration,
    ) -> Result<(String, usize), AwdError> {
        self.engine.start(subject, Some(timeout)).await
    }

    /// Wait for a launched wave to finish.
    pub async fn await_wave(&self, group_id: &str) -> Vec<TaskOutcome> {
        self.engine.await_group(group_id).await
    }

    /// Harvest all finished, successful results into submission
    /// descriptors.
    pub async fn harvest(&self) -> Vec<FlagInfo> {
        self.orchestrator.harvest(&self.config).await
    }

    /// Submit harvested descriptors to the scoring server.
    pub async fn submit(&self, descriptors: &[FlagInfo]) -> Vec<SubmissionResult> {
        self.orchestrator.submit_all(descriptors).await
    }
}

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::errors::AwdError;

use super::capability::ExploitFactory;

/// Maps subject names to exploit factories.
///
/// A missing registration is a typed lookup failure; nothing an exploit
/// module does during registration or lookup can panic past this boundary.
#[derive(Default)]
pub struct ExploitRegistry {
    factories: DashMap<String, Arc<dyn ExploitFactory>>,
}

impl ExploitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, subject: impl Into<String>, factory: Arc<dyn ExploitFactory>) {
        let subject = subject.into();
        debug!(subject = %subject, "Exploit registered");
        self.factories.insert(subject, factory);
    }

    pub fn load(&self, subject: &str) -> Result<Arc<dyn ExploitFactory>, AwdError> {
        self.factories
            .get(subject)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AwdError::UnknownSubject(subject.to_string()))
    }

    pub fn contains(&self, subject: &str) -> bool {
        self.factories.contains_key(subject)
    }

    pub fn subjects(&self) -> Vec<String> {
        self.factories.iter().map(|entry| entry.key().clone()).collect()
    }
}

use async_trait::async_trait;

use crate::errors::AwdError;

/// Result of one exploit invocation against one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExploitOutcome {
    pub success: bool,
    pub flag: String,
    pub err: String,
}

impl ExploitOutcome {
    /// A captured flag.
    pub fn flag(flag: impl Into<String>) -> Self {
        Self {
            success: true,
            flag: flag.into(),
            err: String::new(),
        }
    }

    /// No flag; `err` states why.
    pub fn failure(err: impl Into<String>) -> Self {
        Self {
            success: false,
            flag: String::new(),
            err: err.into(),
        }
    }
}

/// Suspending exploit body, driven directly on the runtime.
#[async_trait]
pub trait AsyncRun: Send + Sync {
    async fn run(&self) -> ExploitOutcome;
}

/// Blocking exploit body, driven on the blocking pool so it cannot stall
/// sibling tasks.
pub trait BlockingRun: Send + Sync {
    fn run(&self) -> ExploitOutcome;
}

/// The invocation forms an exploit module can expose. The async form is
/// preferred when a module implements both.
pub enum ExploitRunner {
    Async(Box<dyn AsyncRun>),
    Blocking(Box<dyn BlockingRun>),
}

/// What a factory yields: a runner, `None` when the module exposes no
/// runnable form, or an instantiation error.
pub type FactoryResult = Result<Option<ExploitRunner>, AwdError>;

/// Builds one exploit instance per target IP.
///
/// `Ok(None)` means the module loaded but exposes no runnable form; the
/// engine records that as an invocation error on the task rather than
/// failing the group.
pub trait ExploitFactory: Send + Sync {
    fn build(&self, ip: &str) -> FactoryResult;
}

/// Factory wrapping a plain closure, convenient for exploits written
/// directly against the capability traits.
pub struct FactoryFn<F>(pub F);

impl<F> ExploitFactory for FactoryFn<F>
where
    F: Fn(&str) -> FactoryResult + Send + Sync,
{
    fn build(&self, ip: &str) -> FactoryResult {
        (self.0)(ip)
    }
}

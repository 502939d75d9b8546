pub mod group;
pub mod result;
pub mod runner;

pub use group::TaskOutcome;
pub use result::TaskResult;
pub use runner::{AttackEngine, DEFAULT_TIMEOUT};

pub mod classify;
pub mod orchestrator;
pub mod sender;
pub mod template;

pub use classify::{classify_response, SubmitVerdict};
pub use orchestrator::{SubmissionResult, SubmitOrchestrator};
pub use sender::{FlagSender, DEFAULT_SUBMIT_TIMEOUT};
pub use template::{build_flag_info, FieldOverride, FlagInfo};

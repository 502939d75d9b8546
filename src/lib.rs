//! Automated exploit execution and flag submission for attack-defense
//! (AWD) CTF competitions.
//!
//! The pipeline: an [`engine::AttackEngine`] runs a registered exploit
//! against every known opponent of a subject, one concurrent task per
//! target IP with a per-task deadline. Terminal results land in a shared
//! [`store::KvStore`]. A [`submit::SubmitOrchestrator`] harvests successful
//! results exactly once, merges them with the per-subject submission
//! template, and drives the scoring server through a
//! [`submit::FlagSender`], classifying its heterogeneous responses into
//! accept/reject verdicts.

pub mod app;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exploit;
pub mod store;
pub mod subject;
pub mod submit;

pub use app::AwdRun;
pub use errors::AwdError;

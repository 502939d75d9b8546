pub mod types;

pub use types::AwdError;

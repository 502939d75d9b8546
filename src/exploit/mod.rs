pub mod capability;
pub mod registry;

pub use capability::{
    AsyncRun, BlockingRun, ExploitFactory, ExploitOutcome, ExploitRunner, FactoryFn, FactoryResult,
};
pub use registry::ExploitRegistry;

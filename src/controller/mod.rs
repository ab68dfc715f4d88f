pub mod driver;
pub mod error;
pub mod poll;
pub mod retry;
pub mod spec;
pub mod state;
pub mod tags;

pub use driver::{ConvergenceDriver, DriverConfig, ReadOutcome};
pub use error::{Error, Result};
pub use poll::{PollConfig, PENDING_STATES, STATUS_AVAILABLE};
pub use spec::InstanceSpec;
pub use state::InstanceState;
pub use tags::TagDiff;

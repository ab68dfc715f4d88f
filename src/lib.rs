//! Convergence controller for cluster member DB instances
//!
//! Drives a single declared member instance of a clustered relational
//! database to matching remote reality, and keeps the two synchronized
//! across create, update and delete against an asynchronous, eventually
//! consistent control plane.
//!
//! The control plane is consumed through the [`RemoteApi`] trait; the
//! [`ConvergenceDriver`] composes bounded retry for transient errors,
//! status polling until the instance settles, the secondary modify+reboot
//! pass for configuration the create call cannot apply atomically, and the
//! projection of remote truth (including the two-tier tag model) back onto
//! declared state.

pub mod api;
pub mod controller;

pub use api::types::{
    ClusterMember, ClusterMembership, CreateInstanceInput, Endpoint, InstanceSnapshot,
    ModifyInstanceInput, TagMap,
};
pub use api::{ApiError, RemoteApi};
pub use controller::{
    ConvergenceDriver, DriverConfig, Error, InstanceSpec, InstanceState, PollConfig, ReadOutcome,
    Result, PENDING_STATES, STATUS_AVAILABLE,
};

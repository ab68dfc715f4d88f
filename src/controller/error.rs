//! Error types for the member instance controller

use thiserror::Error;

use crate::api::ApiError;

/// Fatal outcomes of a lifecycle operation.
///
/// The non-fatal classifications (permission propagation, not-found on
/// delete or read-of-gone, the replica ordering conflict, and the
/// already-being-deleted race) are consumed inside the driver and never
/// surface here. Everything that does surface carries the operation name
/// and instance identifier so the failure can be diagnosed without
/// re-querying the control plane.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{op} failed for DB instance ({id}): {source}")]
    Api {
        op: &'static str,
        id: String,
        #[source]
        source: ApiError,
    },

    #[error("DB instance ({id}) not found")]
    NotFound { id: String },

    #[error("timeout waiting for DB instance ({id}); last observed status: {last_status:?}")]
    PollTimeout {
        id: String,
        last_status: Option<String>,
    },

    #[error("DB instance ({id}) entered unexpected status {status:?}")]
    UnexpectedStatus { id: String, status: String },

    #[error("DB instance ({id}) disappeared while waiting for status {target:?}")]
    VanishedWhileWaiting { id: String, target: String },

    #[error(
        "DB cluster identifier is missing from DB instance ({id}); \
         standalone instances must be managed through the standalone instance resource"
    )]
    MissingClusterIdentifier { id: String },
}

impl Error {
    /// Wrap a control-plane error with the failing operation and instance.
    pub fn api(op: &'static str, id: impl Into<String>, source: ApiError) -> Self {
        Error::Api {
            op,
            id: id.into(),
            source,
        }
    }

    /// Whether this error reports the instance as missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound { .. } => true,
            Error::Api { source, .. } => source.is_instance_not_found(),
            _ => false,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

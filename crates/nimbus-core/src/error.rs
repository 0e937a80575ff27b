//! Error taxonomy shared by the task engine and the sync orchestrator.

use thiserror::Error;

use crate::vendor::Vendor;

/// Control-plane errors.
///
/// The variants map to fixed retry semantics: `InvalidParameter` and
/// `Aborted` are never retried automatically, `VendorCallFailed` leaves
/// the retry decision to the caller, and `TooManyRequest` is rejected
/// before any work starts.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or mismatched input, unsupported vendor, or a state-guard
    /// violation.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A post-condition check failed, e.g. a read-back after create did not
    /// return exactly one match.
    #[error("aborted: {0}")]
    Aborted(String),

    /// The vendor facade returned an error. Carries the vendor so callers
    /// can attribute the failure without unwrapping the message.
    #[error("vendor {vendor} call failed: {message}")]
    VendorCallFailed { vendor: Vendor, message: String },

    /// Request exceeds a configured size cap.
    #[error("too many requests: {0}")]
    TooManyRequest(String),

    /// The detail store or resource record store failed.
    #[error("store error: {0}")]
    Store(String),

    /// Parameter or result payload could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidParameter(msg.into())
    }

    pub fn aborted(msg: impl Into<String>) -> Self {
        Error::Aborted(msg.into())
    }

    pub fn vendor_call(vendor: Vendor, msg: impl Into<String>) -> Self {
        Error::VendorCallFailed {
            vendor,
            message: msg.into(),
        }
    }

    /// True for errors the engine classifies as input problems rather than
    /// remote failures.
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, Error::InvalidParameter(_))
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Error::Aborted(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

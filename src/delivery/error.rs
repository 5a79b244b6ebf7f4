//! Delivery error types

use thiserror::Error;

/// Strategy selection and delivery failures
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("no delivery strategy configured")]
    Unconfigured,

    #[error("unknown delivery strategy '{name}'")]
    UnknownStrategy { name: String },

    #[error("invalid value for header {name}")]
    InvalidHeader { name: &'static str },

    #[error("resolved file is outside the storage root")]
    OutsideRoot,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DeliveryError {
    /// Whether this is a configuration problem rather than a delivery failure
    pub fn is_configuration(&self) -> bool {
        matches!(self, DeliveryError::Unconfigured | DeliveryError::UnknownStrategy { .. })
    }
}

use crate::matter::attribute::AttributeKey;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum AdapterError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown profile token: {0}")]
    UnknownProfileToken(String),

    #[error("Unexpected payload for {key}: expected {expected}")]
    UnexpectedValue {
        key: AttributeKey,
        expected: &'static str,
    },

    #[error("Field store error: {0}")]
    FieldStore(String),

    #[error("Profile update failed for device {device}: {reason}")]
    ProfileUpdateFailed { device: String, reason: String },

    #[error("Subscription failed for device {device}: {reason}")]
    SubscribeFailed { device: String, reason: String },

    #[error("Unknown device: {0}")]
    UnknownDevice(String),

    #[error("Host channel closed")]
    ChannelClosed,

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AdapterError>;

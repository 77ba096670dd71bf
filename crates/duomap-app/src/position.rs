//! The platform location service, behind a seam so tests can script it.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Options forwarded to the platform location service.
#[derive(Debug, Clone, Copy)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    pub timeout: Duration,
    pub maximum_age: Duration,
}

/// The options every locate flow uses: best accuracy, 10s deadline, no
/// cached fixes.
pub const REQUEST_OPTIONS: PositionOptions = PositionOptions {
    enable_high_accuracy: true,
    timeout: Duration::from_secs(10),
    maximum_age: Duration::ZERO,
};

/// Why the device position could not be obtained. Always terminal for the
/// locate flow that asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionError {
    PermissionDenied,
    Unavailable,
    Timeout,
    Unknown,
}

impl fmt::Display for PositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionDenied => f.write_str("permission denied"),
            Self::Unavailable => f.write_str("position unavailable"),
            Self::Timeout => f.write_str("timed out"),
            Self::Unknown => f.write_str("unknown failure"),
        }
    }
}

impl std::error::Error for PositionError {}

/// Provider of the device's current coordinates.
pub trait PositionSource: Send {
    fn current_position(
        &self,
        options: PositionOptions,
    ) -> Pin<Box<dyn Future<Output = Result<(f64, f64), PositionError>> + Send + '_>>;
}

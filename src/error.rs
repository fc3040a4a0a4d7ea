//! Probe error types

use thiserror::Error;

/// Errors surfaced while scanning and probing HID interfaces.
///
/// `EnumerationUnavailable` is fatal to the run; the per-device variants
/// are reported and the scan continues with the next candidate.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("HID enumeration unavailable: {0}")]
    EnumerationUnavailable(String),

    #[error("Failed to open device {path}: {reason}")]
    DeviceOpenFailed { path: String, reason: String },

    #[error("Write failed on {path}: {reason}")]
    WriteFailed { path: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_device_context() {
        let err = ProbeError::DeviceOpenFailed {
            path: "/dev/hidraw2".to_string(),
            reason: "Permission denied".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/dev/hidraw2"));
        assert!(msg.contains("Permission denied"));
    }
}

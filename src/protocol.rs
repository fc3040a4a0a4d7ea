//! Protocol constants for the Preonic PloverHID interface.

/// Device identification
pub mod device {
    /// Keyboard.io vendor ID
    pub const VENDOR_ID: u16 = 0x3496;

    /// Preonic keyboard
    pub const PID_PREONIC: u16 = 0x00A1;

    /// HID usage page for the PloverHID vendor interface
    pub const USAGE_PAGE_PLOVER: u16 = 0xFF50;
    /// HID usage for the PloverHID vendor interface ("LV")
    pub const USAGE_PLOVER: u16 = 0x4C56;
}

/// PloverHID report ID, first byte of every report ('P')
pub const REPORT_ID: u8 = 0x50;

/// Report ID plus 8 data bytes
pub const REPORT_SIZE: usize = 9;

/// Fixed diagnostic report: report ID followed by 8 zero bytes.
///
/// An all-zero payload is the "no keys pressed" PloverHID state, so a
/// firmware that accepts it proves the interface is writable without
/// producing steno input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestReport {
    bytes: [u8; REPORT_SIZE],
}

impl TestReport {
    pub fn new() -> Self {
        let mut bytes = [0u8; REPORT_SIZE];
        bytes[0] = REPORT_ID;
        Self { bytes }
    }

    /// Wire bytes, report ID first.
    pub fn as_bytes(&self) -> &[u8; REPORT_SIZE] {
        &self.bytes
    }
}

impl Default for TestReport {
    fn default() -> Self {
        Self::new()
    }
}

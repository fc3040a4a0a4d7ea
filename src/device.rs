//! Device snapshot types produced by HID enumeration.

use std::ffi::CString;
use std::fmt;

use crate::protocol::device;

/// Read-only snapshot of one enumerated HID interface.
///
/// Each OS-level HID interface gets its own record, so a single physical
/// keyboard typically shows up several times with different usage pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    /// USB vendor ID
    pub vendor_id: u16,
    /// USB product ID
    pub product_id: u16,
    /// Product string if the OS reports one
    pub product_name: Option<String>,
    /// HID usage page of this interface
    pub usage_page: u16,
    /// HID usage of this interface
    pub usage: u16,
    /// USB interface number, -1 when the platform does not expose one
    pub interface_number: i32,
    /// Platform-specific path used to open the device
    pub path: CString,
}

impl DeviceRecord {
    /// Preonic vendor/product match.
    pub fn is_preonic(&self) -> bool {
        self.vendor_id == device::VENDOR_ID && self.product_id == device::PID_PREONIC
    }

    /// Exact PloverHID interface match: Preonic device exposing the
    /// vendor usage pair.
    pub fn is_plover_interface(&self) -> bool {
        self.is_preonic()
            && self.usage_page == device::USAGE_PAGE_PLOVER
            && self.usage == device::USAGE_PLOVER
    }

    /// Product name for display.
    pub fn display_name(&self) -> &str {
        self.product_name.as_deref().unwrap_or("Unknown")
    }
}

impl fmt::Display for DeviceRecord {
    /// Four-line listing block used by the device scan output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  VID: 0x{:04x}, PID: 0x{:04x}",
            self.vendor_id, self.product_id
        )?;
        writeln!(f, "    Name: {}", self.display_name())?;
        writeln!(
            f,
            "    Usage Page: 0x{:04x}, Usage: 0x{:04x}",
            self.usage_page, self.usage
        )?;
        write!(f, "    Interface: {}", self.interface_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(vendor_id: u16, product_id: u16, usage_page: u16, usage: u16) -> DeviceRecord {
        DeviceRecord {
            vendor_id,
            product_id,
            product_name: Some("Preonic".to_string()),
            usage_page,
            usage,
            interface_number: 2,
            path: CString::new("/dev/hidraw3").unwrap(),
        }
    }

    #[test]
    fn preonic_match_is_vid_pid_only() {
        assert!(record(0x3496, 0x00A1, 0x0001, 0x0006).is_preonic());
        assert!(!record(0x3496, 0x00A2, 0xFF50, 0x4C56).is_preonic());
        assert!(!record(0x1234, 0x00A1, 0xFF50, 0x4C56).is_preonic());
    }

    #[test]
    fn plover_match_requires_preonic_and_usage_pair() {
        assert!(record(0x3496, 0x00A1, 0xFF50, 0x4C56).is_plover_interface());
        // Right usage pair on a foreign device is not the PloverHID interface
        assert!(!record(0x1234, 0x5678, 0xFF50, 0x4C56).is_plover_interface());
        // Preonic keyboard interface without the vendor usage pair
        assert!(!record(0x3496, 0x00A1, 0x0001, 0x0006).is_plover_interface());
    }

    #[test]
    fn listing_block_formats_hex_fields() {
        let block = record(0x3496, 0x00A1, 0xFF50, 0x4C56).to_string();
        assert!(block.contains("VID: 0x3496, PID: 0x00a1"));
        assert!(block.contains("Name: Preonic"));
        assert!(block.contains("Usage Page: 0xff50, Usage: 0x4c56"));
        assert!(block.contains("Interface: 2"));
    }

    #[test]
    fn missing_product_name_prints_unknown() {
        let mut rec = record(0x046D, 0xC52B, 0x0001, 0x0002);
        rec.product_name = None;
        assert_eq!(rec.display_name(), "Unknown");
        assert!(rec.to_string().contains("Name: Unknown"));
    }
}

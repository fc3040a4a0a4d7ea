//! HID capability seam over hidapi.
//!
//! The probe only needs enumerate, open, and a single write, so the
//! whole platform surface sits behind two small traits. The binary uses
//! [`HidapiBackend`]; tests use the [`mock`] backend, which counts
//! opens, closes, and writes.

use std::ffi::CStr;

use hidapi::HidApi;
use tracing::debug;

use crate::device::DeviceRecord;
use crate::error::ProbeError;

/// Open handle to one HID interface. Dropping the handle closes it.
pub trait HidHandle {
    /// Write one report, report ID first. Returns the byte count the
    /// transport accepted.
    fn write(&mut self, data: &[u8]) -> Result<usize, ProbeError>;
}

/// Enumeration and open capability.
pub trait HidBackend {
    /// Snapshot of all HID interfaces currently visible to the OS.
    fn enumerate(&self) -> Result<Vec<DeviceRecord>, ProbeError>;

    /// Open a device by the path from its [`DeviceRecord`].
    fn open(&self, path: &CStr) -> Result<Box<dyn HidHandle>, ProbeError>;
}

/// hidapi-backed implementation used by the binary.
pub struct HidapiBackend {
    api: HidApi,
}

impl HidapiBackend {
    /// Initialize the hidapi context. Fails when the library or its
    /// hidraw backend is unavailable, which maps to
    /// [`ProbeError::EnumerationUnavailable`].
    pub fn new() -> Result<Self, ProbeError> {
        let api = HidApi::new().map_err(|e| ProbeError::EnumerationUnavailable(e.to_string()))?;
        Ok(Self { api })
    }
}

impl HidBackend for HidapiBackend {
    fn enumerate(&self) -> Result<Vec<DeviceRecord>, ProbeError> {
        let mut records = Vec::new();
        for device_info in self.api.device_list() {
            records.push(DeviceRecord {
                vendor_id: device_info.vendor_id(),
                product_id: device_info.product_id(),
                product_name: device_info.product_string().map(|s| s.to_string()),
                usage_page: device_info.usage_page(),
                usage: device_info.usage(),
                interface_number: device_info.interface_number(),
                path: device_info.path().to_owned(),
            });
        }
        debug!("enumerated {} HID interfaces", records.len());
        Ok(records)
    }

    fn open(&self, path: &CStr) -> Result<Box<dyn HidHandle>, ProbeError> {
        let device = self
            .api
            .open_path(path)
            .map_err(|e| ProbeError::DeviceOpenFailed {
                path: path.to_string_lossy().into_owned(),
                reason: e.to_string(),
            })?;
        debug!("opened {}", path.to_string_lossy());
        Ok(Box::new(HidapiHandle {
            device,
            path: path.to_string_lossy().into_owned(),
        }))
    }
}

struct HidapiHandle {
    device: hidapi::HidDevice,
    path: String,
}

impl HidHandle for HidapiHandle {
    fn write(&mut self, data: &[u8]) -> Result<usize, ProbeError> {
        self.device.write(data).map_err(|e| ProbeError::WriteFailed {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }
}

/// In-memory fake backend for exercising probe flows without hardware.
pub mod mock {
    use std::ffi::{CStr, CString};
    use std::sync::{Arc, Mutex};

    use super::{HidBackend, HidHandle};
    use crate::device::DeviceRecord;
    use crate::error::ProbeError;

    /// Counters shared between the backend and its handles.
    #[derive(Debug, Default)]
    struct MockStats {
        opens: usize,
        closes: usize,
        writes: Vec<Vec<u8>>,
    }

    /// Scriptable [`HidBackend`] serving a fixed enumeration snapshot.
    pub struct MockBackend {
        records: Vec<DeviceRecord>,
        fail_enumeration: bool,
        refuse_open: Vec<CString>,
        refuse_write: Vec<CString>,
        stats: Arc<Mutex<MockStats>>,
    }

    impl MockBackend {
        pub fn new(records: Vec<DeviceRecord>) -> Self {
            Self {
                records,
                fail_enumeration: false,
                refuse_open: Vec::new(),
                refuse_write: Vec::new(),
                stats: Arc::new(Mutex::new(MockStats::default())),
            }
        }

        /// Backend whose enumeration fails outright, as when hidapi
        /// itself cannot be initialized.
        pub fn unavailable() -> Self {
            let mut backend = Self::new(Vec::new());
            backend.fail_enumeration = true;
            backend
        }

        /// Make `open()` fail for the device at `path`.
        pub fn refuse_open(&mut self, path: &str) {
            self.refuse_open.push(CString::new(path).expect("mock path"));
        }

        /// Make `write()` fail on handles opened for `path`.
        pub fn refuse_write(&mut self, path: &str) {
            self.refuse_write.push(CString::new(path).expect("mock path"));
        }

        /// Number of successful opens so far.
        pub fn open_count(&self) -> usize {
            self.stats.lock().unwrap_or_else(|e| e.into_inner()).opens
        }

        /// Number of handles dropped so far.
        pub fn close_count(&self) -> usize {
            self.stats.lock().unwrap_or_else(|e| e.into_inner()).closes
        }

        /// Every payload written through any handle, in order.
        pub fn write_history(&self) -> Vec<Vec<u8>> {
            self.stats
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .writes
                .clone()
        }
    }

    impl HidBackend for MockBackend {
        fn enumerate(&self) -> Result<Vec<DeviceRecord>, ProbeError> {
            if self.fail_enumeration {
                return Err(ProbeError::EnumerationUnavailable(
                    "hidraw backend not available".to_string(),
                ));
            }
            Ok(self.records.clone())
        }

        fn open(&self, path: &CStr) -> Result<Box<dyn HidHandle>, ProbeError> {
            if self.refuse_open.iter().any(|p| p.as_c_str() == path) {
                return Err(ProbeError::DeviceOpenFailed {
                    path: path.to_string_lossy().into_owned(),
                    reason: "Permission denied".to_string(),
                });
            }
            let mut stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
            stats.opens += 1;
            Ok(Box::new(MockHandle {
                path: path.to_string_lossy().into_owned(),
                fail_write: self.refuse_write.iter().any(|p| p.as_c_str() == path),
                stats: Arc::clone(&self.stats),
            }))
        }
    }

    struct MockHandle {
        path: String,
        fail_write: bool,
        stats: Arc<Mutex<MockStats>>,
    }

    impl HidHandle for MockHandle {
        fn write(&mut self, data: &[u8]) -> Result<usize, ProbeError> {
            if self.fail_write {
                return Err(ProbeError::WriteFailed {
                    path: self.path.clone(),
                    reason: "Transport error".to_string(),
                });
            }
            let mut stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
            stats.writes.push(data.to_vec());
            Ok(data.len())
        }
    }

    impl Drop for MockHandle {
        fn drop(&mut self) {
            let mut stats = self.stats.lock().unwrap_or_else(|e| e.into_inner());
            stats.closes += 1;
        }
    }
}

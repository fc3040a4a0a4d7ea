// Preonic PloverHID Diagnostic Probe - Shared Library
// Device classification, HID access, and the one-shot probe pass

pub mod device;
pub mod error;
pub mod hid;
pub mod probe;
pub mod protocol;

pub use device::DeviceRecord;
pub use error::ProbeError;
pub use hid::{HidBackend, HidHandle, HidapiBackend};
pub use probe::{
    classify, probe_write, run, Classification, ProbeEvent, ProbeOutcome, ProbeProgress, ProbeRun,
    RecordedProgress,
};
pub use protocol::{TestReport, REPORT_ID, REPORT_SIZE};

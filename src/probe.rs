//! Probe control flow over an enumeration snapshot: exact PloverHID
//! test first, then a fallback pass over every Preonic candidate when
//! no exact match exists.
//!
//! Single pass, no retries. Per-device open/write failures are reported
//! through [`ProbeEvent`] and never abort the scan; only a failed
//! enumeration does.

use std::fmt;

use tracing::debug;

use crate::device::DeviceRecord;
use crate::error::ProbeError;
use crate::hid::HidBackend;
use crate::protocol::{device, TestReport, REPORT_ID, REPORT_SIZE};

/// Index partition of an enumeration snapshot.
///
/// Indices refer into the input slice and preserve enumeration order.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Classification {
    /// Records matching the Preonic vendor/product pair.
    pub preonic: Vec<usize>,
    /// Subset of `preonic` that also matches the PloverHID usage pair.
    pub plover: Vec<usize>,
}

/// Partition a snapshot by Preonic identity and PloverHID capability.
pub fn classify(records: &[DeviceRecord]) -> Classification {
    let mut classes = Classification::default();
    for (index, record) in records.iter().enumerate() {
        if record.is_preonic() {
            classes.preonic.push(index);
            if record.is_plover_interface() {
                classes.plover.push(index);
            }
        }
    }
    classes
}

/// Overall verdict of one probe pass.
#[derive(Debug)]
pub enum ProbeOutcome {
    /// Exact PloverHID interface found and the test write was accepted.
    Found { written: usize },
    /// Exact interface found, but its test write failed. Still counts
    /// as found for the exit status: the interface exists.
    FoundUnwritable { error: ProbeError },
    /// No exact interface. Fallback writes were attempted on every
    /// Preonic candidate; `fallback_writes` counts the accepted ones.
    NotFound { fallback_writes: usize },
}

impl ProbeOutcome {
    /// Whether the PloverHID interface was identified, write result aside.
    pub fn interface_found(&self) -> bool {
        !matches!(self, Self::NotFound { .. })
    }

    /// Process exit status: 0 when the interface was found, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.interface_found() {
            0
        } else {
            1
        }
    }
}

/// Aggregated result of one probe pass.
#[derive(Debug)]
pub struct ProbeRun {
    /// Total HID interfaces in the enumeration snapshot.
    pub device_count: usize,
    /// Interfaces matching the Preonic vendor/product pair.
    pub preonic_count: usize,
    pub outcome: ProbeOutcome,
}

/// One reportable step of a probe run. Display renders the exact
/// stdout text for the step.
#[derive(Debug, Clone)]
pub enum ProbeEvent {
    ScanStart,
    Enumerated { count: usize },
    Device(DeviceRecord),
    PloverFound,
    Opening { path: String },
    SendingReport { bytes: [u8; REPORT_SIZE] },
    ReportSent,
    ReportFailed { error: String },
    PreonicSummary { count: usize },
    NoExactMatch,
    FallbackStart,
    FallbackCandidate { usage_page: u16, usage: u16 },
    FallbackSending { bytes: [u8; REPORT_SIZE] },
    FallbackWriteOk { written: usize },
    FallbackFailed { error: String },
    DescriptorHints,
    Verdict { found: bool },
}

impl fmt::Display for ProbeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScanStart => {
                writeln!(f, "=== PloverHID Interface Test ===")?;
                write!(f, "Searching for HID devices...")
            }
            Self::Enumerated { count } => write!(f, "Found {count} HID devices:"),
            // Trailing newline: listing blocks are separated by a blank line.
            Self::Device(record) => writeln!(f, "{record}"),
            Self::PloverFound => write!(f, "  *** FOUND PloverHID INTERFACE! ***"),
            Self::Opening { path } => write!(f, "  Opening device at path: {path}"),
            Self::SendingReport { bytes } => write!(f, "  Sending test report: {bytes:?}"),
            Self::ReportSent => write!(f, "  ✓ Successfully sent PloverHID test report!"),
            Self::ReportFailed { error } => {
                write!(f, "  ✗ Failed to test PloverHID interface: {error}")
            }
            Self::PreonicSummary { count } => {
                writeln!(f)?;
                write!(f, "Found {count} Preonic HID interfaces")
            }
            Self::NoExactMatch => {
                writeln!(f)?;
                write!(
                    f,
                    "No PloverHID interface found with usage page 0x{:04X} and usage 0x{:04X}",
                    device::USAGE_PAGE_PLOVER,
                    device::USAGE_PLOVER
                )
            }
            Self::FallbackStart => {
                writeln!(f)?;
                write!(
                    f,
                    "=== Alternative Test: Check if any Preonic interface accepts PloverHID reports ==="
                )
            }
            Self::FallbackCandidate { usage_page, usage } => write!(
                f,
                "Testing interface with Usage Page: 0x{usage_page:04x}, Usage: 0x{usage:04x}"
            ),
            Self::FallbackSending { bytes } => {
                write!(f, "  Sending PloverHID test report: {bytes:?}")
            }
            Self::FallbackWriteOk { written } => {
                writeln!(f, "  ✓ Write returned: {written} bytes")?;
                write!(f, "  ✓ Successfully sent PloverHID report to this interface!")
            }
            Self::FallbackFailed { error } => {
                write!(f, "  ✗ Failed to send PloverHID report: {error}")
            }
            Self::DescriptorHints => {
                writeln!(f)?;
                writeln!(f, "This could mean:")?;
                writeln!(f, "  1. The PloverHID interface is not being enumerated")?;
                writeln!(f, "  2. The HID descriptor values are incorrect")?;
                writeln!(f, "  3. The interface is not being registered properly")?;
                writeln!(f)?;
                writeln!(f, "Next steps:")?;
                writeln!(
                    f,
                    "  - Check if TinyUSB is properly registering the MultiReport interface"
                )?;
                writeln!(
                    f,
                    "  - Verify the HID descriptor is being included in the USB configuration"
                )?;
                write!(
                    f,
                    "  - Check if the Report ID 0x{REPORT_ID:02X} is being handled correctly"
                )
            }
            Self::Verdict { found: true } => {
                writeln!(f)?;
                write!(f, "✓ PloverHID interface test PASSED")
            }
            Self::Verdict { found: false } => {
                writeln!(f)?;
                write!(f, "✗ PloverHID interface test FAILED")
            }
        }
    }
}

/// Run observer. Implement for CLI printing or capture in tests.
pub trait ProbeProgress {
    fn on_event(&mut self, event: &ProbeEvent);
}

/// Collects rendered events for assertions.
#[derive(Debug, Default)]
pub struct RecordedProgress {
    pub lines: Vec<String>,
}

impl ProbeProgress for RecordedProgress {
    fn on_event(&mut self, event: &ProbeEvent) {
        self.lines.push(event.to_string());
    }
}

/// Open `record`'s path, write the report once, and release the handle.
///
/// The handle is dropped on every exit path; a close failure never
/// surfaces. Errors are per-device and left to the caller to contain.
pub fn probe_write(
    backend: &dyn HidBackend,
    record: &DeviceRecord,
    report: &TestReport,
) -> Result<usize, ProbeError> {
    let mut handle = backend.open(record.path.as_c_str())?;
    let written = handle.write(report.as_bytes())?;
    debug!("wrote {} bytes to {}", written, record.path.to_string_lossy());
    Ok(written)
}

/// Execute one full probe pass.
///
/// Emits every stdout step through `progress`, including the final
/// verdict. Returns the structured outcome; the only error is a failed
/// enumeration, which the caller reports and maps to exit status 1.
pub fn run(
    backend: &dyn HidBackend,
    progress: &mut dyn ProbeProgress,
) -> Result<ProbeRun, ProbeError> {
    progress.on_event(&ProbeEvent::ScanStart);
    let records = backend.enumerate()?;
    progress.on_event(&ProbeEvent::Enumerated {
        count: records.len(),
    });

    for record in &records {
        progress.on_event(&ProbeEvent::Device(record.clone()));
    }

    let classes = classify(&records);
    debug!(
        "classified {} Preonic interfaces, {} exact PloverHID",
        classes.preonic.len(),
        classes.plover.len()
    );

    let outcome = if let Some(&index) = classes.plover.first() {
        progress.on_event(&ProbeEvent::PloverFound);
        let outcome = exact_probe(backend, &records[index], progress);
        progress.on_event(&ProbeEvent::PreonicSummary {
            count: classes.preonic.len(),
        });
        outcome
    } else {
        progress.on_event(&ProbeEvent::PreonicSummary {
            count: classes.preonic.len(),
        });
        progress.on_event(&ProbeEvent::NoExactMatch);
        progress.on_event(&ProbeEvent::FallbackStart);
        let fallback_writes = fallback_probe(backend, &records, &classes.preonic, progress);
        progress.on_event(&ProbeEvent::DescriptorHints);
        ProbeOutcome::NotFound { fallback_writes }
    };

    progress.on_event(&ProbeEvent::Verdict {
        found: outcome.interface_found(),
    });

    Ok(ProbeRun {
        device_count: records.len(),
        preonic_count: classes.preonic.len(),
        outcome,
    })
}

/// Test write against the first exact PloverHID match.
fn exact_probe(
    backend: &dyn HidBackend,
    record: &DeviceRecord,
    progress: &mut dyn ProbeProgress,
) -> ProbeOutcome {
    let report = TestReport::new();
    let sending = ProbeEvent::SendingReport {
        bytes: *report.as_bytes(),
    };

    progress.on_event(&ProbeEvent::Opening {
        path: record.path.to_string_lossy().into_owned(),
    });

    match probe_write(backend, record, &report) {
        Ok(written) => {
            progress.on_event(&sending);
            progress.on_event(&ProbeEvent::ReportSent);
            ProbeOutcome::Found { written }
        }
        // A write failure implies the open succeeded, so the send line
        // is truthful; on a failed open it is skipped.
        Err(error @ ProbeError::WriteFailed { .. }) => {
            progress.on_event(&sending);
            progress.on_event(&ProbeEvent::ReportFailed {
                error: error.to_string(),
            });
            ProbeOutcome::FoundUnwritable { error }
        }
        Err(error) => {
            progress.on_event(&ProbeEvent::ReportFailed {
                error: error.to_string(),
            });
            ProbeOutcome::FoundUnwritable { error }
        }
    }
}

/// Try the fixed report against every Preonic candidate. All candidates
/// are attempted regardless of earlier results; returns how many
/// accepted the write.
fn fallback_probe(
    backend: &dyn HidBackend,
    records: &[DeviceRecord],
    preonic: &[usize],
    progress: &mut dyn ProbeProgress,
) -> usize {
    let report = TestReport::new();
    let mut accepted = 0;

    for &index in preonic {
        let record = &records[index];
        let sending = ProbeEvent::FallbackSending {
            bytes: *report.as_bytes(),
        };

        progress.on_event(&ProbeEvent::FallbackCandidate {
            usage_page: record.usage_page,
            usage: record.usage,
        });

        match probe_write(backend, record, &report) {
            Ok(written) => {
                progress.on_event(&sending);
                progress.on_event(&ProbeEvent::FallbackWriteOk { written });
                accepted += 1;
            }
            Err(error @ ProbeError::WriteFailed { .. }) => {
                progress.on_event(&sending);
                progress.on_event(&ProbeEvent::FallbackFailed {
                    error: error.to_string(),
                });
            }
            Err(error) => {
                progress.on_event(&ProbeEvent::FallbackFailed {
                    error: error.to_string(),
                });
            }
        }
    }

    accepted
}

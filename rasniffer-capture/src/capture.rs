//! Packet capture wrapper around pcap

use parking_lot::RwLock;
use pcap::{Active, Capture, Device, Linktype};
use rasniffer_core::{Error, Interface, Packet, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info};

use crate::stats::{CaptureStats, StatsAccumulator};

/// Default snapshot length (maximum bytes per packet)
pub const DEFAULT_SNAPLEN: i32 = 65535;

/// Default read timeout (milliseconds); also bounds how long a stop request waits
pub const DEFAULT_TIMEOUT_MS: i32 = 500;

/// Configuration for packet capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Maximum bytes to capture per packet
    pub snaplen: i32,
    /// Read timeout in milliseconds
    pub timeout_ms: i32,
    /// Enable promiscuous mode
    pub promiscuous: bool,
    /// Buffer size (0 = default)
    pub buffer_size: i32,
    /// Enable immediate mode (deliver packets immediately)
    pub immediate_mode: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            snaplen: DEFAULT_SNAPLEN,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            promiscuous: true,
            buffer_size: 0,
            immediate_mode: true,
        }
    }
}

impl CaptureConfig {
    /// Reject values libpcap would misbehave on
    pub fn validate(&self) -> Result<()> {
        if self.snaplen <= 0 {
            return Err(Error::invalid_parameter("snaplen", "must be positive"));
        }
        if self.timeout_ms <= 0 {
            return Err(Error::invalid_parameter(
                "timeout",
                "must be positive so a stop request is noticed",
            ));
        }
        if self.buffer_size < 0 {
            return Err(Error::invalid_parameter("buffer_size", "must not be negative"));
        }
        Ok(())
    }
}

/// State of packet capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Capture is not running
    Stopped,
    /// Capture is actively running
    Running,
}

/// Cooperative cancellation flag checked between packet reads
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the capture loop to finish after the current read
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Check that `bpf` compiles for an Ethernet link without opening a device
pub fn compile_filter(bpf: &str) -> Result<()> {
    let capture = Capture::dead(Linktype::ETHERNET)
        .map_err(|e| Error::capture(format!("Failed to create filter context: {}", e)))?;
    capture
        .compile(bpf, true)
        .map_err(|e| Error::capture(format!("Invalid BPF filter '{}': {}", bpf, e)))?;
    Ok(())
}

/// Blocking packet capture on one interface
pub struct PacketCapture {
    /// Interface information
    interface: Interface,
    /// Capture configuration
    config: CaptureConfig,
    /// Current BPF filter
    filter: Option<String>,
    /// Current capture state
    state: RwLock<CaptureState>,
    /// Statistics accumulator
    stats: StatsAccumulator,
}

impl PacketCapture {
    /// Create a new packet capture on the specified interface
    pub fn new(interface: &str) -> Result<Self> {
        let interface = Interface::by_name(interface)?;

        if !interface.is_up {
            return Err(Error::capture(format!(
                "Interface '{}' is not up",
                interface.name
            )));
        }

        info!("Created packet capture on interface: {}", interface.name);

        Ok(Self {
            interface,
            config: CaptureConfig::default(),
            filter: None,
            state: RwLock::new(CaptureState::Stopped),
            stats: StatsAccumulator::new(),
        })
    }

    /// Create a new packet capture with custom configuration
    pub fn with_config(interface: &str, config: CaptureConfig) -> Result<Self> {
        config.validate()?;
        let mut capture = Self::new(interface)?;
        capture.config = config;
        Ok(capture)
    }

    /// Set BPF filter applied when the capture opens
    pub fn set_filter(&mut self, bpf: &str) -> Result<()> {
        compile_filter(bpf)?;
        self.filter = Some(bpf.to_string());
        info!("BPF filter set: {}", bpf);
        Ok(())
    }

    /// Get interface information
    pub fn interface(&self) -> &Interface {
        &self.interface
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Get current capture state
    pub fn state(&self) -> CaptureState {
        *self.state.read()
    }

    /// Get current statistics
    pub fn stats(&self) -> CaptureStats {
        self.stats.snapshot()
    }

    /// Initialize pcap capture
    fn init_capture(&self) -> Result<Capture<Active>> {
        debug!("Initializing pcap capture on {}", self.interface.name);

        let device = Device::from(self.interface.name.as_str());
        let mut capture = Capture::from_device(device)
            .map_err(|e| Error::capture(format!("Failed to create capture: {}", e)))?
            .promisc(self.config.promiscuous)
            .snaplen(self.config.snaplen)
            .timeout(self.config.timeout_ms)
            .immediate_mode(self.config.immediate_mode);

        if self.config.buffer_size > 0 {
            capture = capture.buffer_size(self.config.buffer_size);
        }

        let mut capture = capture
            .open()
            .map_err(|e| Error::capture(format!("Failed to open capture: {}", e)))?;

        if capture.get_datalink() != Linktype::ETHERNET {
            return Err(Error::capture(format!(
                "Interface '{}' is not an Ethernet link",
                self.interface.name
            )));
        }

        if let Some(filter) = self.filter.as_ref() {
            capture
                .filter(filter, true)
                .map_err(|e| Error::capture(format!("Failed to apply filter: {}", e)))?;
            debug!("Applied filter: {}", filter);
        }

        info!("Capture initialized on {}", self.interface.name);
        Ok(capture)
    }

    /// Capture until `stop` is set, a read fails, or `callback` returns an
    /// error. Frames are handled one at a time on the calling thread.
    pub fn run<F>(&self, stop: &StopToken, mut callback: F) -> Result<CaptureStats>
    where
        F: FnMut(&Packet) -> Result<()>,
    {
        if self.state() != CaptureState::Stopped {
            return Err(Error::capture("Capture already running"));
        }

        let mut capture = self.init_capture()?;
        *self.state.write() = CaptureState::Running;
        info!("Starting packet capture on {}", self.interface.name);

        let result = loop {
            if stop.is_stopped() {
                debug!("Capture stopped");
                break Ok(());
            }

            match capture.next_packet() {
                Ok(frame) => {
                    self.stats.record_packet(frame.data.len());

                    let ts = frame.header.ts;
                    let timestamp = UNIX_EPOCH
                        .checked_add(Duration::new(
                            ts.tv_sec as u64,
                            (ts.tv_usec as u32).saturating_mul(1000),
                        ))
                        .unwrap_or_else(SystemTime::now);

                    let packet = Packet {
                        timestamp,
                        interface: self.interface.name.clone(),
                        data: frame.data.to_vec(),
                        len: frame.header.len as usize,
                    };

                    if let Err(e) = callback(&packet) {
                        break Err(e);
                    }
                }
                Err(pcap::Error::TimeoutExpired) => {
                    // Timeout is normal, just continue
                    continue;
                }
                Err(e) => {
                    error!("Packet capture error: {}", e);
                    break Err(Error::capture(e.to_string()));
                }
            }
        };

        if let Ok(stat) = capture.stats() {
            self.stats
                .record_drops(stat.dropped as u64, stat.if_dropped as u64);
        }

        *self.state.write() = CaptureState::Stopped;
        info!("Capture on {} finished", self.interface.name);

        result.map(|()| self.stats.snapshot())
    }
}

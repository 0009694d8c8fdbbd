//! CLI argument parsing

use clap::Parser;
use rasniffer_capture::CaptureConfig;
use rasniffer_core::{Error, Result, SnifferConfig};

#[derive(Parser, Debug)]
#[command(name = "rasniffer")]
#[command(
    version,
    about = "IPv6 Router Advertisement sniffer and spoofer",
    long_about = "Prints every Router Advertisement seen on an interface. Optionally \
                  re-sends each foreign advertisement with its default router \
                  preference set to low, and solicits routers at startup."
)]
pub struct Cli {
    /// Network interface to sniff on and send from
    #[arg(short, long, required_unless_present = "list_interfaces")]
    pub interface: Option<String>,

    /// Re-send every foreign router advertisement with low preference
    #[arg(short = 'r', long)]
    pub emit: bool,

    /// Send a router solicitation before capturing
    #[arg(short, long)]
    pub solicit: bool,

    /// List available network interfaces and exit
    #[arg(short, long)]
    pub list_interfaces: bool,

    /// Extra BPF expression ANDed with the ICMPv6 filter
    #[arg(short, long, value_name = "BPF")]
    pub filter: Option<String>,

    /// Filter router advertisements in the kernel (misses extension headers)
    #[arg(long)]
    pub ra_only: bool,

    /// Maximum bytes captured per frame
    #[arg(long, value_name = "BYTES", default_value_t = rasniffer_capture::capture::DEFAULT_SNAPLEN)]
    pub snaplen: i32,

    /// Capture read timeout; bounds how long Ctrl-C takes to stop the capture
    #[arg(long, value_name = "MS", default_value_t = rasniffer_capture::capture::DEFAULT_TIMEOUT_MS)]
    pub timeout: i32,

    /// Do not put the interface into promiscuous mode
    #[arg(long)]
    pub no_promisc: bool,

    /// Verbose output (-v, -vv, -vvv for increasing verbosity)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Operating mode for the sniffer core
    pub fn sniffer_config(&self) -> Result<SnifferConfig> {
        let interface = self
            .interface
            .as_deref()
            .ok_or_else(|| Error::invalid_parameter("interface", "an interface is required"))?;

        let config = SnifferConfig::new(interface)
            .with_emit(self.emit)
            .with_solicit(self.solicit);
        config.validate()?;
        Ok(config)
    }

    /// pcap settings
    pub fn capture_config(&self) -> Result<CaptureConfig> {
        let config = CaptureConfig {
            snaplen: self.snaplen,
            timeout_ms: self.timeout,
            promiscuous: !self.no_promisc,
            ..Default::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Maximum log level for the `-v` count
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

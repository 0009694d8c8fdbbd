//! Wires the capture loop, the sniffer core and the raw socket together

use rasniffer_capture::{filters, PacketCapture, StopToken};
use rasniffer_core::{Error, Interface, RawIcmpv6Sender, Result, SystemMacLookup};
use rasniffer_protocols::NdSniffer;
use std::io::{self, ErrorKind};
use tracing::{info, warn};

use crate::args::Cli;

/// Print every interface the capture could use
pub fn print_interfaces() {
    for interface in Interface::list_all() {
        let mut flags = Vec::new();
        if interface.is_up {
            flags.push("up");
        }
        if interface.is_loopback {
            flags.push("loopback");
        }
        println!("{} [{}]", interface, flags.join(", "));
    }
}

/// Run the sniffer until Ctrl-C or a fatal error
pub async fn run(cli: Cli) -> Result<()> {
    if cli.list_interfaces {
        print_interfaces();
        return Ok(());
    }

    let config = cli.sniffer_config()?;
    let capture_config = cli.capture_config()?;
    let interface = Interface::by_name(&config.interface)?;
    info!(%interface, emit = config.emit, solicit = config.solicit, "Starting rasniffer");

    // Passive runs never open a raw socket
    let sender = if config.is_active() {
        Some(RawIcmpv6Sender::open(&interface)?)
    } else {
        None
    };
    let mut sniffer = NdSniffer::new(config.clone(), SystemMacLookup, sender);

    if config.solicit {
        match sniffer.solicit() {
            Ok(_) => {}
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => warn!("Cannot send router solicitation: {}", e),
        }
    }

    let mut capture = PacketCapture::with_config(&config.interface, capture_config)?;
    capture.set_filter(&filters::sniffer_filter(cli.ra_only, cli.filter.as_deref()))?;

    let stop = StopToken::new();
    let signal_stop = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, stopping capture");
            signal_stop.stop();
        }
    });

    let (result, sniffer_stats) = tokio::task::spawn_blocking(move || {
        let stdout = io::stdout();
        let mut out = stdout.lock();

        let result = capture.run(&stop, |packet| match sniffer.handle_frame(packet, &mut out) {
            Ok(_) => Ok(()),
            Err(e) if e.is_fatal() => Err(e),
            Err(Error::Io(e)) if e.kind() == ErrorKind::BrokenPipe => Err(Error::Io(e)),
            Err(e) => {
                warn!("Frame handling failed: {}", e);
                Ok(())
            }
        });

        (result, sniffer.stats())
    })
    .await
    .map_err(|e| Error::capture(format!("capture task failed: {}", e)))?;

    info!("Sniffer: {}", sniffer_stats);
    let capture_stats = result?;
    info!("Capture: {}", capture_stats);
    Ok(())
}

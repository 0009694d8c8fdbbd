//! Operator configuration handed to the sniffer core

use crate::{Error, Result};

/// Immutable operating mode, read-only for the lifetime of the process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnifferConfig {
    /// Capture and send interface (e.g., "eth0")
    pub interface: String,
    /// Re-inject every foreign RA with low router preference
    pub emit: bool,
    /// Send one Router Solicitation before capture starts
    pub solicit: bool,
}

impl SnifferConfig {
    /// Create a passive configuration for `interface`
    pub fn new<S: Into<String>>(interface: S) -> Self {
        Self {
            interface: interface.into(),
            emit: false,
            solicit: false,
        }
    }

    pub fn with_emit(mut self, emit: bool) -> Self {
        self.emit = emit;
        self
    }

    pub fn with_solicit(mut self, solicit: bool) -> Self {
        self.solicit = solicit;
        self
    }

    /// Check the configuration before any socket or capture is opened
    pub fn validate(&self) -> Result<()> {
        if self.interface.trim().is_empty() {
            return Err(Error::invalid_parameter(
                "interface",
                "interface name must not be empty",
            ));
        }
        // IFNAMSIZ includes the trailing NUL
        if self.interface.len() >= 16 {
            return Err(Error::invalid_parameter(
                "interface",
                "interface name is longer than 15 bytes",
            ));
        }
        Ok(())
    }

    /// Whether this configuration ever transmits
    pub fn is_active(&self) -> bool {
        self.emit || self.solicit
    }
}

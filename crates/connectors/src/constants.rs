//! Centralized configuration defaults for the connector system
//!
//! **Before changing any constant:** read its comment and check the hardware
//! note; these values were chosen against real USB serial adapters.

/// Watchdog polling cadence
pub mod watchdog {
    /// Interval between two `poll()` calls in the monitor loop (milliseconds)
    ///
    /// **Value**: 500ms
    ///
    /// **Rationale**: USB CDC/FTDI/CH340 adapters show up in the OS port list
    /// 100-300ms after plug-in. Half a second keeps hotplug detection feeling
    /// immediate while enumeration cost (a sysfs scan or a SetupAPI query)
    /// stays negligible.
    ///
    /// **Trade-offs**:
    /// - Shorter: more enumeration churn, no visible gain
    /// - Longer: a quick unplug/replug can fall between two polls and go
    ///   unnoticed (the resource reads as present both times)
    pub const POLL_INTERVAL_MS: u64 = 500;

    /// Lower bound accepted from configuration (milliseconds)
    pub const MIN_POLL_INTERVAL_MS: u64 = 50;
}

/// Serial line defaults
pub mod serial {
    /// Baud rate used when no device profile is configured
    ///
    /// **Value**: 115200, the default of most USB-serial firmware consoles.
    pub const DEFAULT_BAUD: u32 = 115_200;

    /// Framing used when no device profile is configured
    pub const DEFAULT_FRAMING: &str = "8N1";
}

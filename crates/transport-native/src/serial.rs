use crate::{map_serial_error, SystemPorts};
use core_types::{
    DeviceProfile, FlowControl, ParityMode, PortEnumerator, ResourceId, TransportBinding,
    TransportError,
};
use serialport::SerialPort;
use std::io::{self, Read, Write};
use std::time::Duration;

/// A serial port configured from a [`DeviceProfile`] but not yet open.
///
/// Line settings are fixed at construction, before the first open. The
/// binding keeps its own handle to the open port; the conduit it hands out
/// is a duplicate of that handle.
pub struct SerialBinding<E = SystemPorts> {
    resource: ResourceId,
    profile: DeviceProfile,
    port: Option<Box<dyn SerialPort>>,
    enumerator: E,
}

impl SerialBinding<SystemPorts> {
    pub fn new(resource: ResourceId, profile: DeviceProfile) -> Self {
        Self::with_enumerator(resource, profile, SystemPorts)
    }
}

impl<E: PortEnumerator> SerialBinding<E> {
    pub fn with_enumerator(resource: ResourceId, profile: DeviceProfile, enumerator: E) -> Self {
        Self {
            resource,
            profile,
            port: None,
            enumerator,
        }
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    fn open_port(&self) -> Result<Box<dyn SerialPort>, TransportError> {
        let p = &self.profile;

        let data_bits = match p.data_bits {
            5 => serialport::DataBits::Five,
            6 => serialport::DataBits::Six,
            7 => serialport::DataBits::Seven,
            8 => serialport::DataBits::Eight,
            n => {
                return Err(TransportError::Other(format!(
                    "Unsupported data bits {}: must be 5 to 8",
                    n
                )))
            }
        };
        let stop_bits = match p.stop_bits {
            1 => serialport::StopBits::One,
            2 => serialport::StopBits::Two,
            n => {
                return Err(TransportError::Other(format!(
                    "Unsupported stop bits {}: must be 1 or 2",
                    n
                )))
            }
        };
        let parity = match p.parity {
            ParityMode::None => serialport::Parity::None,
            ParityMode::Even => serialport::Parity::Even,
            ParityMode::Odd => serialport::Parity::Odd,
        };
        let flow_control = match p.flow_control {
            FlowControl::None => serialport::FlowControl::None,
            FlowControl::Hardware => serialport::FlowControl::Hardware,
            FlowControl::Software => serialport::FlowControl::Software,
        };

        serialport::new(self.resource.as_str(), p.baud_rate)
            .data_bits(data_bits)
            .stop_bits(stop_bits)
            .parity(parity)
            .flow_control(flow_control)
            .timeout(Duration::from_millis(p.read_timeout_ms))
            .open()
            .map_err(map_serial_error)
    }
}

impl<E: PortEnumerator> TransportBinding for SerialBinding<E> {
    type Conduit = SerialConduit;

    fn resource(&self) -> &ResourceId {
        &self.resource
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn attempt_open(&mut self) -> Result<SerialConduit, TransportError> {
        // Already open: hand out another handle instead of reopening
        if let Some(port) = &self.port {
            let dup = port.try_clone().map_err(map_serial_error)?;
            return Ok(SerialConduit::new(self.resource.clone(), dup));
        }

        let port = match self.open_port() {
            Ok(port) => port,
            Err(e) => {
                tracing::warn!(resource = %self.resource, error = %e, "Error opening serial port");
                return Err(e);
            }
        };
        let dup = port.try_clone().map_err(map_serial_error)?;

        tracing::info!(
            resource = %self.resource,
            baud = self.profile.baud_rate,
            framing = %self.profile.framing(),
            "Opened serial port"
        );
        self.port = Some(port);
        Ok(SerialConduit::new(self.resource.clone(), dup))
    }

    fn attempt_close(&mut self) -> Result<(), TransportError> {
        // Dropping the handle closes the descriptor; there is nothing to report
        if self.port.take().is_some() {
            tracing::debug!(resource = %self.resource, "Closed serial port");
        }
        Ok(())
    }

    fn is_available(&self) -> bool {
        match self.enumerator.enumerate_present() {
            Ok(present) => present.contains(&self.resource),
            Err(e) => {
                tracing::debug!(resource = %self.resource, error = %e, "Port enumeration failed");
                false
            }
        }
    }
}

/// Blocking read/write handle over an open serial port
pub struct SerialConduit {
    resource: ResourceId,
    port: Box<dyn SerialPort>,
}

impl SerialConduit {
    fn new(resource: ResourceId, port: Box<dyn SerialPort>) -> Self {
        Self { resource, port }
    }

    pub fn resource(&self) -> &ResourceId {
        &self.resource
    }

    /// Bytes waiting in the OS receive buffer
    pub fn bytes_to_read(&self) -> Result<u32, TransportError> {
        self.port.bytes_to_read().map_err(map_serial_error)
    }
}

impl Read for SerialConduit {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }
}

impl Write for SerialConduit {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.port.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.port.flush()
    }
}

impl std::fmt::Debug for SerialConduit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialConduit")
            .field("resource", &self.resource)
            .field("port", &"<SerialPort>")
            .finish()
    }
}

use crate::map_serial_error;
use core_types::{PortEnumerator, ResourceId, TransportError};
use serialport::{SerialPortInfo, SerialPortType};
use std::collections::HashSet;

/// Ports the operating system currently exposes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPorts;

impl PortEnumerator for SystemPorts {
    fn enumerate_present(&self) -> Result<HashSet<ResourceId>, TransportError> {
        let ports = serialport::available_ports().map_err(|e| {
            TransportError::Enumeration(map_serial_error(e).to_string())
        })?;
        Ok(ports.into_iter().map(|p| ResourceId::from(p.port_name)).collect())
    }
}

/// One line per present port, with USB identity where the OS reports it.
pub fn port_summary() -> Result<String, TransportError> {
    let ports = serialport::available_ports()
        .map_err(|e| TransportError::Enumeration(map_serial_error(e).to_string()))?;
    Ok(describe_ports(&ports))
}

fn describe_ports(ports: &[SerialPortInfo]) -> String {
    if ports.is_empty() {
        return "No serial ports found".to_string();
    }

    let lines: Vec<String> = ports
        .iter()
        .map(|p| match &p.port_type {
            SerialPortType::UsbPort(usb) => format!(
                "{} [USB {:04X}:{:04X}] {} {} {}",
                p.port_name,
                usb.vid,
                usb.pid,
                usb.manufacturer.as_deref().unwrap_or("-"),
                usb.product.as_deref().unwrap_or("-"),
                usb.serial_number.as_deref().unwrap_or("-"),
            ),
            SerialPortType::PciPort => format!("{} [PCI]", p.port_name),
            SerialPortType::BluetoothPort => format!("{} [Bluetooth]", p.port_name),
            _ => format!("{} [Unknown]", p.port_name),
        })
        .collect();

    format!("{} serial port(s):\n  {}", lines.len(), lines.join("\n  "))
}

//! Serial device discovery and acquisition.
//!
//! The instrument side of the link is an external collaborator: a dial
//! indicator or caliper behind a USB-serial adapter streaming text lines.
//! This module only enumerates candidate ports and opens the chosen one as a
//! non-blocking fd; all reading happens in the event loop off poll(2)
//! readiness.

use std::os::unix::io::AsRawFd;

use nix::fcntl::{fcntl, FcntlArg, OFlag};
use serialport::{SerialPortInfo, SerialPortType, TTYPort};

use crate::error::Error;

/// Default baud rate of the instrument link.
pub const DEFAULT_BAUD: u32 = 115_200;

/// Enumerate serial ports visible to the OS.
pub fn list_ports() -> Result<Vec<SerialPortInfo>, Error> {
    serialport::available_ports().map_err(Error::ListPorts)
}

/// One listing line for a discovered port.
pub fn describe(info: &SerialPortInfo) -> String {
    match &info.port_type {
        SerialPortType::UsbPort(usb) => format!(
            "port={}, desc={}, hwid={:04x}:{:04x}",
            info.port_name,
            usb.product.as_deref().unwrap_or("?"),
            usb.vid,
            usb.pid,
        ),
        SerialPortType::BluetoothPort => format!("port={}, desc=bluetooth", info.port_name),
        SerialPortType::PciPort => format!("port={}, desc=pci", info.port_name),
        SerialPortType::Unknown => format!("port={}, desc=?", info.port_name),
    }
}

/// Open a port at the given baud rate as a non-blocking byte source.
pub fn open_port(path: &str, baud: u32) -> Result<TTYPort, Error> {
    let port = serialport::new(path, baud)
        .open_native()
        .map_err(|source| Error::OpenPort {
            path: path.to_string(),
            source,
        })?;

    // Reads are driven by poll readiness, never by the port's own timeout.
    let flags = fcntl(port.as_raw_fd(), FcntlArg::F_GETFL).map_err(Error::PortSetup)?;
    let flags = OFlag::from_bits_truncate(flags);
    fcntl(port.as_raw_fd(), FcntlArg::F_SETFL(flags | OFlag::O_NONBLOCK))
        .map_err(Error::PortSetup)?;

    Ok(port)
}

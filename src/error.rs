//! Error types for startup and runtime failures.

use std::io;

use thiserror::Error;

use crate::font::sheet::SheetError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to enumerate serial ports: {0}")]
    ListPorts(#[source] serialport::Error),

    #[error("failed to open serial port {path}: {source}")]
    OpenPort {
        path: String,
        #[source]
        source: serialport::Error,
    },

    #[error("failed to set serial port non-blocking: {0}")]
    PortSetup(#[source] nix::Error),

    #[error("serial read failed: {0}")]
    SerialRead(#[source] nix::Error),

    #[error("serial device disconnected")]
    Disconnected,

    #[error("standard input is not a terminal")]
    NotATty,

    #[error("failed to switch terminal mode: {0}")]
    TermMode(#[source] nix::Error),

    #[error("failed to register resize notification: {0}")]
    ResizePipe(#[source] io::Error),

    #[error("readiness wait failed: {0}")]
    Wait(#[source] nix::Error),

    #[error("keyboard read failed: {0}")]
    InputRead(#[source] nix::Error),

    #[error("font data: {0}")]
    Font(#[from] SheetError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

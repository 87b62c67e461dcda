//! Big-digit rendering.
//!
//! [`Readout`] is the pure display state machine; [`Renderer`] pairs it with
//! the acquired [`Tty`] and repaints after every mutation. There is no
//! incremental redraw: each operation recomposes and presents a full frame,
//! trading a little flicker for simple correctness.

pub mod display;
pub mod surface;

pub use display::{Readout, FILL_SYMBOLS};
pub use surface::{Cell, ColorPair, Surface};

use crate::font::FontCatalog;
use crate::term::Tty;

/// Draws the readout onto the terminal.
pub struct Renderer<'a> {
    tty: Tty,
    readout: Readout<'a>,
}

impl<'a> Renderer<'a> {
    pub fn new(tty: Tty, catalog: &'a FontCatalog) -> Self {
        Renderer {
            tty,
            readout: Readout::new(catalog),
        }
    }

    /// Parse a serial line, update the reading and repaint.
    pub fn display_line(&mut self, line: &str) {
        self.readout.apply_line(line);
        self.repaint();
    }

    /// Switch to the next font variant and repaint.
    pub fn cycle_font(&mut self) {
        self.readout.cycle_font();
        self.repaint();
    }

    /// Switch to the next fill symbol and repaint.
    pub fn cycle_style(&mut self) {
        self.readout.cycle_style();
        self.repaint();
    }

    /// Recompose and present a full frame.
    ///
    /// Failures here are transient terminal-geometry races; the frame is
    /// dropped and the resize notification triggers a fresh repaint.
    pub fn repaint(&mut self) {
        let (rows, cols) = match self.tty.size() {
            Ok(size) => size,
            Err(err) => {
                tracing::debug!("skipping repaint, no terminal size: {err}");
                return;
            }
        };
        let frame = self.readout.compose(rows, cols);
        if let Err(err) = self.tty.present(&frame) {
            tracing::debug!("dropped frame: {err}");
        }
    }
}

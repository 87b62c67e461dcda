//! Display state and frame composition.
//!
//! [`Readout`] holds everything the renderer needs to draw a frame: the
//! active font variant, the active fill symbol, and the last measurement.
//! Composition is a pure function of this state plus the frame geometry,
//! which keeps it testable without a terminal.

use crate::font::FontCatalog;
use crate::protocol::{self, Unit};

use super::surface::{ColorPair, Surface};

/// Fill symbols cycled by the style hotkey. The first entry is the blank
/// sentinel: filled cells are then drawn as same-on-same color blocks
/// instead of printed symbols.
pub const FILL_SYMBOLS: [char; 8] = [' ', '#', '•', '⬤', '⏺', '●', '⬩', '♦'];

/// Index into [`FILL_SYMBOLS`] used at startup.
const DEFAULT_FILL: usize = 4;

/// Value displayed when a line fails to parse.
const PLACEHOLDER_VALUE: f64 = 9.999;

const FOOTER_EXIT: &str = "<ESC> or <EOT> to exit";
const FOOTER_KEYS: &str = "F1 - Change font, F2 - Change style";

/// The measurement readout: display state plus frame composition.
pub struct Readout<'a> {
    catalog: &'a FontCatalog,
    variant: usize,
    fill: usize,
    value: f64,
    unit: Unit,
}

impl<'a> Readout<'a> {
    pub fn new(catalog: &'a FontCatalog) -> Self {
        Readout {
            catalog,
            variant: 0,
            fill: DEFAULT_FILL,
            value: 0.0,
            unit: Unit::Millimeters,
        }
    }

    pub fn variant_index(&self) -> usize {
        self.variant
    }

    pub fn fill_index(&self) -> usize {
        self.fill
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Parse a raw serial line and update the stored measurement. Lines that
    /// fail to parse show the placeholder reading instead of being dropped,
    /// so malformed input is visible on screen.
    pub fn apply_line(&mut self, line: &str) {
        match protocol::parse_line(line) {
            Some(m) => {
                self.value = m.value;
                self.unit = m.unit;
            }
            None => {
                self.value = PLACEHOLDER_VALUE;
                self.unit = Unit::Unknown;
            }
        }
    }

    /// Advance to the next font variant, wrapping around.
    pub fn cycle_font(&mut self) {
        self.variant = (self.variant + 1) % self.catalog.len();
    }

    /// Advance to the next fill symbol, wrapping around.
    pub fn cycle_style(&mut self) {
        self.fill = (self.fill + 1) % FILL_SYMBOLS.len();
    }

    /// Color pair for the current sign and style.
    pub fn active_pair(&self) -> ColorPair {
        let blank_fill = self.fill == 0;
        if self.value < 0.0 {
            if blank_fill {
                ColorPair::RedOnRed
            } else {
                ColorPair::RedOnBlack
            }
        } else if blank_fill {
            ColorPair::GreenOnGreen
        } else {
            ColorPair::GreenOnBlack
        }
    }

    /// The reading as drawn: sign character, magnitude at the unit's
    /// precision, then the unit label, e.g. `" 12.30 mm"` or `"-0.5000 in"`.
    pub fn formatted(&self) -> String {
        let sign = if self.value < 0.0 { '-' } else { ' ' };
        format!(
            "{sign}{:.prec$} {}",
            self.value.abs(),
            self.unit.label(),
            prec = self.unit.precision()
        )
    }

    /// Composite a full frame for the given geometry.
    ///
    /// Glyphs are blitted left-to-right from the origin, each advancing the
    /// write column by its own width. The footer goes on the last two rows.
    /// A geometry too small for the glyph block simply clips.
    pub fn compose(&self, rows: usize, cols: usize) -> Surface {
        let mut surface = Surface::new(rows, cols);
        let variant = self.catalog.variant(self.variant);
        let pair = self.active_pair();
        let fill = FILL_SYMBOLS[self.fill];

        let mut col = 0;
        for ch in self.formatted().chars() {
            let glyph = variant.glyph(ch);
            for row in 0..glyph.height() {
                for offset in 0..glyph.width() {
                    if glyph.filled(row, offset) {
                        surface.put(row, col + offset, fill, Some(pair));
                    }
                }
            }
            col += glyph.width();
        }

        if let Some(row) = rows.checked_sub(2) {
            surface.write_str(row, 0, FOOTER_EXIT);
        }
        if let Some(row) = rows.checked_sub(1) {
            surface.write_str(row, 0, FOOTER_KEYS);
        }
        surface
    }
}

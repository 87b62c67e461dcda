//! End-to-end tests for the serial-bytes-to-frame pipeline.
//!
//! These drive the same components the event loop wires together — line
//! accumulation, protocol parsing, display state and frame composition —
//! without a terminal or a serial device.

use dialview::font::FontCatalog;
use dialview::protocol::Unit;
use dialview::reactor::LineBuffer;
use dialview::render::{ColorPair, Readout, FILL_SYMBOLS};

fn catalog() -> FontCatalog {
    FontCatalog::builtin().expect("embedded sheets should parse")
}

/// Feed raw serial bytes through a LineBuffer into a Readout, returning how
/// many complete lines were dispatched.
fn feed(buffer: &mut LineBuffer, readout: &mut Readout<'_>, bytes: &[u8]) -> usize {
    buffer.extend(bytes);
    let mut dispatched = 0;
    while let Some(line) = buffer.take_line() {
        readout.apply_line(&line);
        dispatched += 1;
    }
    dispatched
}

#[test]
fn complete_line_updates_the_reading() {
    let catalog = catalog();
    let mut readout = Readout::new(&catalog);
    let mut buffer = LineBuffer::new();

    let dispatched = feed(&mut buffer, &mut readout, b"12.34 mm\n");
    assert_eq!(dispatched, 1);
    assert!(buffer.pending().is_empty());
    assert_eq!(readout.value(), 12.34);
    assert_eq!(readout.unit(), Unit::Millimeters);
}

#[test]
fn partial_line_dispatches_nothing() {
    let catalog = catalog();
    let mut readout = Readout::new(&catalog);
    let mut buffer = LineBuffer::new();

    let dispatched = feed(&mut buffer, &mut readout, b"12.3");
    assert_eq!(dispatched, 0);
    assert_eq!(buffer.pending(), b"12.3");
    // The default reading is untouched.
    assert_eq!(readout.value(), 0.0);
}

#[test]
fn garbage_line_shows_the_placeholder() {
    let catalog = catalog();
    let mut readout = Readout::new(&catalog);
    let mut buffer = LineBuffer::new();

    feed(&mut buffer, &mut readout, b"burst of noise\n");
    assert_eq!(readout.value(), 9.999);
    assert_eq!(readout.unit(), Unit::Unknown);
    assert_eq!(readout.formatted(), " 9.9990 xx");
}

#[test]
fn readings_arriving_in_fragments() {
    let catalog = catalog();
    let mut readout = Readout::new(&catalog);
    let mut buffer = LineBuffer::new();

    assert_eq!(feed(&mut buffer, &mut readout, b"-0.0"), 0);
    assert_eq!(feed(&mut buffer, &mut readout, b"01 in"), 0);
    assert_eq!(feed(&mut buffer, &mut readout, b"\n"), 1);
    assert_eq!(readout.value(), -0.001);
    assert_eq!(readout.unit(), Unit::Inches);
    assert_eq!(readout.formatted(), "-0.0010 in");
}

#[test]
fn negative_reading_paints_red_on_every_font() {
    let catalog = catalog();
    let mut readout = Readout::new(&catalog);
    let mut buffer = LineBuffer::new();
    feed(&mut buffer, &mut readout, b"-1.00 mm\n");

    for _ in 0..catalog.len() {
        let surface = readout.compose(40, 160);
        let fill = FILL_SYMBOLS[readout.fill_index()];
        let mut filled = 0;
        for row in 0..surface.rows() {
            for col in 0..surface.cols() {
                let cell = surface.cell(row, col);
                if let Some(pair) = cell.pair {
                    assert_eq!(pair, ColorPair::RedOnBlack);
                    assert_eq!(cell.symbol, fill);
                    filled += 1;
                }
            }
        }
        assert!(filled > 0, "frame should contain glyph cells");
        readout.cycle_font();
    }
}

#[test]
fn repainting_without_new_data_is_stable() {
    let catalog = catalog();
    let mut readout = Readout::new(&catalog);
    let mut buffer = LineBuffer::new();
    feed(&mut buffer, &mut readout, b"7.77 mm\n");

    let first = readout.compose(24, 80);
    let second = readout.compose(24, 80);
    assert_eq!(first, second);
}

#[test]
fn style_cycle_through_blank_toggles_solid_blocks() {
    let catalog = catalog();
    let mut readout = Readout::new(&catalog);
    let mut buffer = LineBuffer::new();
    feed(&mut buffer, &mut readout, b"3.14 mm\n");

    // Walk the full style cycle once; exactly one stop is the blank symbol.
    let mut blank_stops = 0;
    for _ in 0..FILL_SYMBOLS.len() {
        readout.cycle_style();
        if readout.fill_index() == 0 {
            blank_stops += 1;
            assert_eq!(readout.active_pair(), ColorPair::GreenOnGreen);
        } else {
            assert_eq!(readout.active_pair(), ColorPair::GreenOnBlack);
        }
    }
    assert_eq!(blank_stops, 1);
}

#[test]
fn shrunken_terminal_never_panics() {
    let catalog = catalog();
    let mut readout = Readout::new(&catalog);
    let mut buffer = LineBuffer::new();
    feed(&mut buffer, &mut readout, b"-999.9999 in\n");

    for rows in 0..6 {
        for cols in 0..6 {
            let surface = readout.compose(rows, cols);
            assert_eq!(surface.rows(), rows);
            assert_eq!(surface.cols(), cols);
        }
    }
}

#[test]
fn successive_readings_replace_each_other() {
    let catalog = catalog();
    let mut readout = Readout::new(&catalog);
    let mut buffer = LineBuffer::new();

    feed(&mut buffer, &mut readout, b"1.00 mm\n");
    assert_eq!(readout.formatted(), " 1.00 mm");
    feed(&mut buffer, &mut readout, b"2.50 mm\n");
    assert_eq!(readout.formatted(), " 2.50 mm");
    feed(&mut buffer, &mut readout, b"junk\n");
    assert_eq!(readout.formatted(), " 9.9990 xx");
    feed(&mut buffer, &mut readout, b"0.25 in\n");
    assert_eq!(readout.formatted(), " 0.2500 in");
}

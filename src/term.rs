//! Terminal resource: raw-mode acquisition and frame presentation.
//!
//! [`Tty`] owns the terminal state for the lifetime of the program. Acquiring
//! it saves the termios settings, switches to raw mode, hides the cursor and
//! clears the screen; dropping it restores all of that, so the terminal is
//! never left raw on any exit path, including panics unwinding through main.
//!
//! Presentation is a full-frame repaint: every cell of the current
//! [`Surface`] is written with explicit cursor addressing, so no incremental
//! damage tracking is needed and a resize race at worst garbles one frame.

use std::io::{self, Write};
use std::os::unix::io::AsRawFd;

use nix::fcntl::{fcntl, FcntlArg, OFlag};
use nix::libc;
use nix::sys::termios::{self, SetArg, Termios};
use nix::unistd::isatty;
use unicode_width::UnicodeWidthChar;

use crate::error::Error;
use crate::render::surface::{ColorPair, Surface};

/// Exclusive handle on the terminal while the display is up.
pub struct Tty {
    out: io::Stdout,
    saved: Termios,
    saved_flags: OFlag,
}

impl Tty {
    /// Switch the terminal to raw, no-echo, hidden-cursor mode.
    ///
    /// Stdin is also set non-blocking so that key reads after a readiness
    /// wakeup can drain whatever arrived without stalling the loop.
    pub fn acquire() -> Result<Self, Error> {
        let stdin = io::stdin();
        if !isatty(stdin.as_raw_fd()).unwrap_or(false) {
            return Err(Error::NotATty);
        }

        let saved = termios::tcgetattr(&stdin).map_err(Error::TermMode)?;
        let mut raw = saved.clone();
        termios::cfmakeraw(&mut raw);
        termios::tcsetattr(&stdin, SetArg::TCSANOW, &raw).map_err(Error::TermMode)?;

        let flags = fcntl(stdin.as_raw_fd(), FcntlArg::F_GETFL).map_err(Error::TermMode)?;
        let saved_flags = OFlag::from_bits_truncate(flags);
        fcntl(
            stdin.as_raw_fd(),
            FcntlArg::F_SETFL(saved_flags | OFlag::O_NONBLOCK),
        )
        .map_err(Error::TermMode)?;

        let mut out = io::stdout();
        out.write_all(b"\x1b[2J\x1b[H\x1b[?25l")?;
        out.flush()?;

        Ok(Tty {
            out,
            saved,
            saved_flags,
        })
    }

    /// Current terminal geometry as (rows, cols).
    pub fn size(&self) -> io::Result<(usize, usize)> {
        let mut ws = libc::winsize {
            ws_row: 0,
            ws_col: 0,
            ws_xpixel: 0,
            ws_ypixel: 0,
        };

        // SAFETY: TIOCGWINSZ reads the window size into a valid winsize
        let result = unsafe { libc::ioctl(self.out.as_raw_fd(), libc::TIOCGWINSZ, &mut ws) };
        if result < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok((ws.ws_row as usize, ws.ws_col as usize))
        }
    }

    /// Write a composed frame to the terminal.
    pub fn present(&mut self, frame: &Surface) -> io::Result<()> {
        let bytes = frame_bytes(frame);
        self.out.write_all(&bytes)?;
        self.out.flush()
    }
}

impl Drop for Tty {
    fn drop(&mut self) {
        let _ = self.out.write_all(b"\x1b[0m\x1b[2J\x1b[H\x1b[?25h");
        let _ = self.out.flush();
        let stdin = io::stdin();
        let _ = fcntl(stdin.as_raw_fd(), FcntlArg::F_SETFL(self.saved_flags));
        let _ = termios::tcsetattr(&stdin, SetArg::TCSANOW, &self.saved);
    }
}

fn push_sgr(buf: &mut Vec<u8>, pair: Option<ColorPair>) {
    match pair {
        Some(pair) => {
            buf.extend_from_slice(format!("\x1b[38;5;{};48;5;{}m", pair.fg(), pair.bg()).as_bytes())
        }
        None => buf.extend_from_slice(b"\x1b[0m"),
    }
}

/// Serialize a frame into a byte stream of cursor addressing, SGR color runs
/// and cell symbols.
///
/// A double-width symbol occupies the following cell as well, so that cell is
/// skipped instead of emitted. Each row ends with an attribute reset and a
/// clear-to-end-of-line, which erases leftovers when the terminal is wider
/// than the frame.
pub(crate) fn frame_bytes(frame: &Surface) -> Vec<u8> {
    let mut buf = Vec::with_capacity(frame.rows() * frame.cols() * 4);
    let mut encoded = [0u8; 4];

    for row in 0..frame.rows() {
        buf.extend_from_slice(format!("\x1b[{};1H", row + 1).as_bytes());
        let mut active: Option<ColorPair> = None;
        let mut col = 0;
        while col < frame.cols() {
            let cell = frame.cell(row, col);
            if cell.pair != active {
                push_sgr(&mut buf, cell.pair);
                active = cell.pair;
            }
            buf.extend_from_slice(cell.symbol.encode_utf8(&mut encoded).as_bytes());
            col += UnicodeWidthChar::width(cell.symbol).unwrap_or(1).max(1);
        }
        if active.is_some() {
            buf.extend_from_slice(b"\x1b[0m");
        }
        buf.extend_from_slice(b"\x1b[K");
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_bytes_addresses_every_row() {
        let frame = Surface::new(3, 4);
        let text = String::from_utf8(frame_bytes(&frame)).expect("frames are valid utf-8");
        assert!(text.contains("\x1b[1;1H"));
        assert!(text.contains("\x1b[2;1H"));
        assert!(text.contains("\x1b[3;1H"));
    }

    #[test]
    fn frame_bytes_emits_color_runs() {
        let mut frame = Surface::new(1, 3);
        frame.put(0, 0, '#', Some(ColorPair::GreenOnBlack));
        frame.put(0, 1, '#', Some(ColorPair::GreenOnBlack));
        let text = String::from_utf8(frame_bytes(&frame)).expect("frames are valid utf-8");
        // One SGR for the run of two identical cells, one reset for the blank.
        assert_eq!(text.matches("\x1b[38;5;46;48;5;0m").count(), 1);
        assert!(text.contains("##"));
    }

    #[test]
    fn frame_bytes_same_on_same_blocks() {
        let mut frame = Surface::new(1, 1);
        frame.put(0, 0, ' ', Some(ColorPair::RedOnRed));
        let text = String::from_utf8(frame_bytes(&frame)).expect("frames are valid utf-8");
        assert!(text.contains("\x1b[38;5;196;48;5;196m"));
    }

    #[test]
    fn identical_frames_serialize_identically() {
        let mut a = Surface::new(2, 2);
        a.put(0, 0, '#', Some(ColorPair::RedOnBlack));
        let b = a.clone();
        assert_eq!(frame_bytes(&a), frame_bytes(&b));
    }
}

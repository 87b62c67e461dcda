//! Event multiplexing loop.
//!
//! One thread, one suspension point: poll(2) over the serial fd, stdin and a
//! SIGWINCH pipe. Serial bytes accumulate in a [`LineBuffer`] until a newline
//! completes a reading; keys cycle the display or end the loop; a resize
//! wakeup forces a repaint. All display state is mutated between poll calls
//! on this thread, so nothing needs locking.
//!
//! SIGWINCH is not handled in a signal handler: `signal-hook` forwards it
//! into a pipe whose read end joins the poll set, which keeps resize
//! handling ordered with the other sources.

use std::os::unix::io::{AsRawFd, BorrowedFd};
use std::os::unix::net::UnixStream;

use nix::errno::Errno;
use nix::libc;
use nix::poll::{poll, PollFd, PollFlags};
use nix::unistd::read;
use serialport::TTYPort;
use signal_hook::consts::SIGWINCH;
use signal_hook::low_level::pipe;
use signal_hook::SigId;

use crate::error::Error;
use crate::input::{decode_keys, Key};
use crate::render::Renderer;

/// Accumulates serial bytes until a full line has arrived.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        LineBuffer::default()
    }

    /// Append freshly read bytes.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// If the buffered data ends with a newline, strip it and hand over the
    /// completed line, leaving the buffer empty. Partial lines stay buffered
    /// across poll iterations.
    pub fn take_line(&mut self) -> Option<String> {
        if self.buf.last() != Some(&b'\n') {
            return None;
        }
        self.buf.pop();
        let line = String::from_utf8_lossy(&self.buf).into_owned();
        self.buf.clear();
        Some(line)
    }

    /// Bytes waiting for a terminator.
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }
}

enum LoopAction {
    Continue,
    Quit,
}

/// The reactor: owns the serial port, the resize pipe and the renderer.
pub struct EventLoop<'a> {
    serial: TTYPort,
    resize: UnixStream,
    _winch: SigId,
    renderer: Renderer<'a>,
    line: LineBuffer,
}

impl<'a> EventLoop<'a> {
    /// Register the resize pipe and assemble the loop.
    pub fn new(serial: TTYPort, renderer: Renderer<'a>) -> Result<Self, Error> {
        let (read_end, write_end) = UnixStream::pair().map_err(Error::ResizePipe)?;
        read_end.set_nonblocking(true).map_err(Error::ResizePipe)?;
        let winch = pipe::register(SIGWINCH, write_end).map_err(Error::ResizePipe)?;
        Ok(EventLoop {
            serial,
            resize: read_end,
            _winch: winch,
            renderer,
            line: LineBuffer::new(),
        })
    }

    /// Block on the three readiness sources until quit or failure.
    ///
    /// Failure of the poll call itself is fatal and propagates; per-source
    /// read errors are handled where they occur. The terminal is restored by
    /// the renderer's Tty drop on every return path.
    pub fn run(&mut self) -> Result<(), Error> {
        self.renderer.repaint();
        loop {
            // SAFETY: all three fds outlive the poll call
            let serial_fd = unsafe { BorrowedFd::borrow_raw(self.serial.as_raw_fd()) };
            let stdin_fd = unsafe { BorrowedFd::borrow_raw(libc::STDIN_FILENO) };
            let resize_fd = unsafe { BorrowedFd::borrow_raw(self.resize.as_raw_fd()) };
            let mut fds = [
                PollFd::new(&serial_fd, PollFlags::POLLIN),
                PollFd::new(&stdin_fd, PollFlags::POLLIN),
                PollFd::new(&resize_fd, PollFlags::POLLIN),
            ];
            match poll(&mut fds, -1) {
                Ok(_) => {}
                Err(Errno::EINTR) => continue,
                Err(err) => return Err(Error::Wait(err)),
            }
            let ready = |fd: &PollFd<'_>| {
                fd.revents().is_some_and(|r| {
                    r.intersects(PollFlags::POLLIN | PollFlags::POLLHUP | PollFlags::POLLERR)
                })
            };
            let serial_ready = ready(&fds[0]);
            let input_ready = ready(&fds[1]);
            let resize_ready = ready(&fds[2]);

            // Serial data wins the iteration; key and resize events keep
            // their readiness and are picked up on the next pass.
            if serial_ready {
                self.drain_serial()?;
                continue;
            }
            if input_ready {
                if let LoopAction::Quit = self.drain_input()? {
                    return Ok(());
                }
            }
            if resize_ready {
                self.drain_resize();
                self.renderer.repaint();
            }
        }
    }

    /// Read all available serial bytes and dispatch completed lines.
    fn drain_serial(&mut self) -> Result<(), Error> {
        let mut buf = [0u8; 256];
        loop {
            match read(self.serial.as_raw_fd(), &mut buf) {
                Ok(0) => return Err(Error::Disconnected),
                Ok(n) => {
                    self.line.extend(&buf[..n]);
                    if let Some(line) = self.line.take_line() {
                        self.renderer.display_line(&line);
                    }
                }
                Err(Errno::EAGAIN) => return Ok(()),
                Err(Errno::EINTR) => continue,
                Err(err) => return Err(Error::SerialRead(err)),
            }
        }
    }

    /// Drain stdin and act on the decoded keys.
    fn drain_input(&mut self) -> Result<LoopAction, Error> {
        let mut bytes = Vec::new();
        let mut buf = [0u8; 64];
        loop {
            match read(libc::STDIN_FILENO, &mut buf) {
                Ok(0) => break,
                Ok(n) => bytes.extend_from_slice(&buf[..n]),
                Err(Errno::EAGAIN) => break,
                Err(Errno::EINTR) => continue,
                Err(err) => return Err(Error::InputRead(err)),
            }
        }
        for key in decode_keys(&bytes) {
            match key {
                Key::Escape | Key::Eot => return Ok(LoopAction::Quit),
                Key::Function(1) => self.renderer.cycle_font(),
                Key::Function(2) => self.renderer.cycle_style(),
                Key::Function(_) | Key::Other => {}
            }
        }
        Ok(LoopAction::Continue)
    }

    /// Empty the resize pipe so the next SIGWINCH produces fresh readiness.
    fn drain_resize(&mut self) {
        let mut buf = [0u8; 32];
        while let Ok(n) = read(self.resize.as_raw_fd(), &mut buf) {
            if n == 0 {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_line_is_taken_once() {
        let mut line = LineBuffer::new();
        line.extend(b"12.34 mm\n");
        assert_eq!(line.take_line().as_deref(), Some("12.34 mm"));
        assert!(line.pending().is_empty());
        assert_eq!(line.take_line(), None);
    }

    #[test]
    fn partial_line_stays_buffered() {
        let mut line = LineBuffer::new();
        line.extend(b"12.3");
        assert_eq!(line.take_line(), None);
        assert_eq!(line.pending(), b"12.3");
    }

    #[test]
    fn line_split_across_reads() {
        let mut line = LineBuffer::new();
        line.extend(b"12.3");
        assert_eq!(line.take_line(), None);
        line.extend(b"4 mm\n");
        assert_eq!(line.take_line().as_deref(), Some("12.34 mm"));
        assert!(line.pending().is_empty());
    }

    #[test]
    fn empty_line_is_delivered() {
        let mut line = LineBuffer::new();
        line.extend(b"\n");
        assert_eq!(line.take_line().as_deref(), Some(""));
    }

    #[test]
    fn carriage_return_is_left_for_the_parser() {
        let mut line = LineBuffer::new();
        line.extend(b"12.34 mm\r\n");
        assert_eq!(line.take_line().as_deref(), Some("12.34 mm\r"));
    }
}

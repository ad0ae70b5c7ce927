//! Byte-oriented duplex channel to the tablet, plus POSIX device enumeration.

use std::os::fd::{AsRawFd, BorrowedFd, RawFd};
use std::path::{Path, PathBuf};

use nix::sys::termios::{self, BaudRate as NixBaud, SetArg, Termios};

use crate::error::{Result, TmError};
use crate::settings::{BaudRate, DataBits, Parity, Settings, StopBits};

/// What `SerialLink` abstracts over: open/configure/read/write a single RS-232
/// endpoint, non-blocking after a `select`.
pub trait SerialLink {
    fn apply(&mut self, settings: &Settings) -> Result<()>;
    fn bytes_available(&self) -> Result<usize>;
    fn select(&self, timeout_usec: u64) -> Result<bool>;
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;
    /// Reads until `\r` or `\n` or the timeout budget expires. Used only
    /// during the identification handshake.
    fn read_line(&mut self, buf: &mut [u8], timeout_usec: u64) -> Result<usize>;
    fn write(&mut self, bytes: &[u8]) -> Result<()>;
}

/// A POSIX tty opened in raw, non-canonical mode.
pub struct PosixSerialLink {
    file: std::fs::File,
}

impl PosixSerialLink {
    pub fn open(path: &Path) -> Result<Self> {
        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY | libc::O_NONBLOCK)
            .open(path)?;

        let fd = file.as_raw_fd();
        let mut termios = termios::tcgetattr(unsafe { BorrowedFd::borrow_raw(fd) })
            .map_err(|e| TmError::Transport(std::io::Error::from(e)))?;
        termios::cfmakeraw(&mut termios);
        termios.control_flags.insert(termios::ControlFlags::CLOCAL | termios::ControlFlags::CREAD);
        termios::tcsetattr(unsafe { BorrowedFd::borrow_raw(fd) }, SetArg::TCSANOW, &termios)
            .map_err(|e| TmError::Transport(std::io::Error::from(e)))?;

        Ok(Self { file })
    }

    fn raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }

    fn termios_baud(rate: BaudRate) -> NixBaud {
        match rate {
            BaudRate::B2400 => NixBaud::B2400,
            BaudRate::B4800 => NixBaud::B4800,
            BaudRate::B9600 => NixBaud::B9600,
            BaudRate::B19200 => NixBaud::B19200,
            BaudRate::B38400 => NixBaud::B38400,
        }
    }

    fn apply_termios(&mut self, settings: &Settings) -> Result<Termios> {
        use termios::{ControlFlags, SetArg};
        let fd = unsafe { BorrowedFd::borrow_raw(self.raw_fd()) };
        let mut t = termios::tcgetattr(fd).map_err(|e| TmError::Transport(std::io::Error::from(e)))?;

        termios::cfsetspeed(&mut t, Self::termios_baud(settings.baud_rate))
            .map_err(|e| TmError::Transport(std::io::Error::from(e)))?;

        t.control_flags.remove(ControlFlags::CSIZE | ControlFlags::PARENB | ControlFlags::PARODD);
        t.control_flags.insert(match settings.data_bits {
            DataBits::Seven => ControlFlags::CS7,
            DataBits::Eight => ControlFlags::CS8,
        });
        match settings.parity {
            Parity::Odd => t.control_flags.insert(ControlFlags::PARENB | ControlFlags::PARODD),
            Parity::Even => t.control_flags.insert(ControlFlags::PARENB),
            Parity::None0 | Parity::None1 => {}
        }
        if matches!(settings.stop_bits, StopBits::Two) {
            t.control_flags.insert(ControlFlags::CSTOPB);
        } else {
            t.control_flags.remove(ControlFlags::CSTOPB);
        }
        if settings.cts || settings.dsr {
            t.control_flags.insert(ControlFlags::CRTSCTS);
        } else {
            t.control_flags.remove(ControlFlags::CRTSCTS);
        }
        t.control_flags.insert(ControlFlags::CLOCAL | ControlFlags::CREAD);

        termios::tcsetattr(fd, SetArg::TCSANOW, &t)
            .map_err(|e| TmError::Transport(std::io::Error::from(e)))?;
        termios::tcflush(fd, termios::FlushArg::TCIOFLUSH)
            .map_err(|e| TmError::Transport(std::io::Error::from(e)))?;
        Ok(t)
    }
}

impl SerialLink for PosixSerialLink {
    fn apply(&mut self, settings: &Settings) -> Result<()> {
        self.apply_termios(settings)?;
        Ok(())
    }

    fn bytes_available(&self) -> Result<usize> {
        let mut n: libc::c_int = 0;
        let ret = unsafe { libc::ioctl(self.raw_fd(), libc::FIONREAD, std::ptr::addr_of_mut!(n)) };
        if ret < 0 {
            return Err(TmError::Transport(std::io::Error::last_os_error()));
        }
        Ok(n.max(0) as usize)
    }

    fn select(&self, timeout_usec: u64) -> Result<bool> {
        use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
        let fd = unsafe { BorrowedFd::borrow_raw(self.raw_fd()) };
        let mut fds = [PollFd::new(fd, PollFlags::POLLIN)];
        let timeout = PollTimeout::try_from((timeout_usec / 1000) as u16).unwrap_or(PollTimeout::MAX);
        let n = poll(&mut fds, timeout).map_err(|e| TmError::Transport(std::io::Error::from(e)))?;
        Ok(n > 0)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        use std::io::Read;
        match self.file.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(0),
            Err(e) => Err(TmError::Transport(e)),
        }
    }

    fn read_line(&mut self, buf: &mut [u8], timeout_usec: u64) -> Result<usize> {
        let deadline = std::time::Instant::now() + std::time::Duration::from_micros(timeout_usec);
        let mut total = 0;
        while total < buf.len() && std::time::Instant::now() < deadline {
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            if !self.select(remaining.as_micros() as u64)? {
                break;
            }
            let n = self.read(&mut buf[total..total + 1])?;
            if n == 0 {
                continue;
            }
            total += n;
            if matches!(buf[total - 1], b'\r' | b'\n') {
                break;
            }
        }
        Ok(total)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        use std::io::Write;
        let n = self.file.write(bytes)?;
        if n != bytes.len() {
            return Err(TmError::Transport(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                "short write to serial device",
            )));
        }
        Ok(())
    }
}

/// Walk `/dev` for the conventional RS-232 device name shapes. Out of scope
/// for this crate is querying any OS-specific device registry beyond this.
#[must_use]
pub fn enumerate() -> Vec<PathBuf> {
    const PREFIXES: [&str; 4] = ["cu.", "tty.", "ttyUSB", "ttyACM"];
    let mut found = Vec::new();
    if let Ok(entries) = std::fs::read_dir("/dev") {
        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if PREFIXES.iter().any(|p| name.starts_with(p)) {
                found.push(entry.path());
            }
        }
    }
    found.sort();
    found
}

use std::os::unix::fs::OpenOptionsExt;

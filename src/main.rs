//! `tabletmagicd` daemon entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use tabletmagicd::cli::{self, CliOptions};
use tabletmagicd::core::{self, Core};
use tabletmagicd::error::TmError;
use tabletmagicd::events::RecordingSink;
use tabletmagicd::prefs::MemoryPrefStore;
use tabletmagicd::serial::{self, PosixSerialLink};

const EXIT_OK: u8 = 0;
const EXIT_USAGE: u8 = 64;
const EXIT_NO_TABLET: u8 = 69;
const EXIT_IO: u8 = 74;

/// A control channel with nothing connected, used when `-c` (command mode)
/// isn't requested. Every embedder that wants live reconfiguration supplies
/// its own transport; this crate never assumes one.
struct NullControlChannel;
impl tabletmagicd::control::ControlChannel for NullControlChannel {
    fn try_recv(&mut self) -> Option<String> {
        None
    }
    fn send(&mut self, _line: &str) {}
}

fn main() -> ExitCode {
    let opts = match cli::parse(std::env::args().skip(1)) {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("{}", cli::USAGE);
            eprintln!("argument error: {e}");
            return ExitCode::from(EXIT_USAGE);
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if opts.quiet { "error" } else { "info" }),
    )
    .init();

    if opts.detach {
        if let Err(e) = daemonize() {
            log::error!("failed to detach: {e}");
            return ExitCode::from(EXIT_IO);
        }
    }

    if opts.priority != 0 {
        let ret = unsafe { libc::setpriority(libc::PRIO_PROCESS, 0, opts.priority) };
        if ret != 0 {
            log::warn!(
                "failed to set process priority to {}: {}",
                opts.priority,
                std::io::Error::last_os_error()
            );
        }
    }

    if let Err(e) = core::install_signal_handlers() {
        log::error!("failed to install signal handlers: {e}");
        return ExitCode::from(EXIT_IO);
    }

    match run(&opts) {
        Ok(()) => ExitCode::from(EXIT_OK),
        Err(TmError::ProbeTimeout) if opts.command_mode => {
            log::warn!("no tablet responded to identification probe; staying idle in command mode (-c)");
            idle_until_quit()
        }
        Err(TmError::ProbeTimeout) => {
            log::error!("no tablet responded to identification probe");
            ExitCode::from(EXIT_NO_TABLET)
        }
        Err(e) => {
            log::error!("daemon exited: {e}");
            ExitCode::from(EXIT_IO)
        }
    }
}

/// `fork`+`setsid`, the traditional double-detach-free daemonization
/// shortcut: one fork is enough once the child calls `setsid` to drop its
/// controlling terminal.
fn daemonize() -> std::io::Result<()> {
    use nix::unistd::{fork, setsid, ForkResult};
    match unsafe { fork() }.map_err(std::io::Error::from)? {
        ForkResult::Parent { .. } => std::process::exit(EXIT_OK as i32),
        ForkResult::Child => {
            setsid().map_err(std::io::Error::from)?;
            Ok(())
        }
    }
}

/// `-c` (command mode) with no tablet present: the control channel is still
/// worth having up, but there's no `Core` to drive without a real serial
/// link, so this just waits for the signal-driven cancellation flag.
fn idle_until_quit() -> ExitCode {
    while !core::quit_requested() {
        std::thread::sleep(std::time::Duration::from_millis(100));
    }
    ExitCode::from(EXIT_OK)
}

fn run(opts: &CliOptions) -> tabletmagicd::Result<()> {
    let port = match &opts.port {
        Some(p) => PathBuf::from(p),
        None => serial::enumerate().into_iter().next().ok_or(TmError::ProbeTimeout)?,
    };
    log::info!("opening serial port {}", port.display());
    let link = Box::new(PosixSerialLink::open(&port)?);

    let sink = Box::new(RecordingSink::default());
    let control = Box::new(NullControlChannel);
    let prefs = Box::new(MemoryPrefStore::default());

    let mut engine = Core::new(link, sink, control, prefs, opts, port);
    engine.identify_and_start()?;

    if opts.exit_after_probe {
        log::info!("model {:?} identified, exiting (-X)", engine.model_name);
        return Ok(());
    }

    engine.run()
}

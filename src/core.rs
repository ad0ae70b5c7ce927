//! Owns every component and drives the single-threaded tick loop.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use calloop::timer::{TimeoutAction, Timer};

use crate::cli::CliOptions;
use crate::control::{self, ControlChannel, ControlCommand};
use crate::decode::{apply_delta, DecodeCtx, Decode, Dialect};
use crate::error::{Result, TmError};
use crate::event_synth::EventSynth;
use crate::events::EventSink;
use crate::framer::{FrameParams, Framer, Frame};
use crate::identifier::Identifier;
use crate::mapper::{Mapper, Rect};
use crate::prefs::PrefStore;
use crate::serial::SerialLink;
use crate::settings::Settings;
use crate::stylus::{ButtonMapping, ProximityDescriptor, StylusState};
use crate::wire::{CMD_START, CMD_STOP, CMD_TABLET_SIZE};

fn hash_device_path(path: &Path) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    path.hash(&mut hasher);
    hasher.finish()
}

static QUIT_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Installs the process-wide cancellation flag, set by signal handlers or
/// the `quit` control command and observed only at tick boundaries.
pub fn install_signal_handlers() -> Result<()> {
    let handler = nix::sys::signal::SigHandler::Handler(handler_trampoline);
    for sig in [
        nix::sys::signal::SIGHUP,
        nix::sys::signal::SIGTERM,
        nix::sys::signal::SIGINT,
        nix::sys::signal::SIGQUIT,
        nix::sys::signal::SIGABRT,
    ] {
        unsafe { nix::sys::signal::signal(sig, handler) }
            .map_err(|e| TmError::Transport(std::io::Error::from(e)))?;
    }
    Ok(())
}

extern "C" fn handler_trampoline(_sig: libc::c_int) {
    QUIT_REQUESTED.store(true, Ordering::SeqCst);
}

#[must_use]
pub fn quit_requested() -> bool {
    QUIT_REQUESTED.load(Ordering::SeqCst)
}

pub struct Core {
    pub settings: Settings,
    pub bank1: Option<Settings>,
    pub bank2: Option<Settings>,
    pub link: Box<dyn SerialLink>,
    pub framer: Framer,
    pub identifier: Identifier,
    pub dialect: Dialect,
    pub mapper: Mapper,
    pub synth: EventSynth,
    pub sink: Box<dyn EventSink>,
    pub control: Box<dyn ControlChannel>,
    pub prefs: Box<dyn PrefStore>,
    pub stylus: StylusState,
    pub running: bool,
    pub stream_forward: bool,
    pub model_name: Option<&'static str>,
    pub port: PathBuf,
    port_hash: u64,
    sd_prev_raw_pressure: u8,
    eraser_latch: bool,
    packets_seen: u64,
    bytes_seen: u64,
}

impl Core {
    pub fn new(
        link: Box<dyn SerialLink>,
        sink: Box<dyn EventSink>,
        control: Box<dyn ControlChannel>,
        prefs: Box<dyn PrefStore>,
        opts: &CliOptions,
        port: PathBuf,
    ) -> Self {
        let settings = Settings::default();
        let tablet_rect = Rect::new(
            opts.tablet_left.unwrap_or(0.0),
            opts.tablet_top.unwrap_or(0.0),
            opts.tablet_right.unwrap_or(settings.xscale as f32) - opts.tablet_left.unwrap_or(0.0),
            opts.tablet_bottom.unwrap_or(settings.yscale as f32) - opts.tablet_top.unwrap_or(0.0),
        );
        let screen_rect = Rect::new(
            opts.screen_left.unwrap_or(0.0),
            opts.screen_top.unwrap_or(0.0),
            opts.screen_right.unwrap_or(1920.0) - opts.screen_left.unwrap_or(0.0),
            opts.screen_bottom.unwrap_or(1080.0) - opts.screen_top.unwrap_or(0.0),
        );
        let mut mapper = Mapper::new(tablet_rect, screen_rect);
        mapper.mouse_mode = opts.mouse_mode;
        mapper.scaling = opts.scaling;

        let mut button_mapping = ButtonMapping::default();
        for (stylus_idx, system_idx) in &opts.button_remap {
            let kind = match system_idx {
                0 => crate::stylus::ClickKind::None,
                1 => crate::stylus::ClickKind::SystemButton1,
                2 => crate::stylus::ClickKind::SystemButton2,
                3 => crate::stylus::ClickKind::Eraser,
                4 => crate::stylus::ClickKind::DoubleClick,
                5 => crate::stylus::ClickKind::SingleClick,
                _ => crate::stylus::ClickKind::ControlClick,
            };
            match stylus_idx {
                0 => button_mapping.tip = kind,
                1 => button_mapping.side1 = kind,
                2 => button_mapping.side2 = kind,
                _ => button_mapping.eraser = kind,
            }
        }

        let port_hash = hash_device_path(&port);

        Self {
            settings,
            bank1: None,
            bank2: None,
            link,
            framer: Framer::new(),
            identifier: Identifier::new(opts.force_tabletpc, opts.prefer_38400),
            dialect: Dialect::from_command_set(
                Settings::default().command_set,
                false,
                crate::settings::OutputFormat::Binary,
            ),
            mapper,
            synth: EventSynth::new(button_mapping),
            sink,
            control,
            prefs,
            stylus: StylusState::default(),
            running: !opts.start_disabled,
            stream_forward: false,
            model_name: None,
            port,
            port_hash,
            sd_prev_raw_pressure: 0,
            eraser_latch: false,
            packets_seen: 0,
            bytes_seen: 0,
        }
    }

    /// Identify the tablet and request its coordinate range, then start
    /// the data stream.
    pub fn identify_and_start(&mut self) -> Result<()> {
        let (name, settings, dialect) = self.identifier.probe(self.link.as_mut())?;
        log::info!("identified tablet model {name}");
        self.model_name = Some(name);
        self.settings = settings;
        self.dialect = dialect;
        self.link.apply(&self.settings)?;

        self.link.write(CMD_TABLET_SIZE.as_bytes())?;
        let mut buf = [0u8; 32];
        let n = self.link.read_line(&mut buf, 100_000)?;
        if n > 0 {
            if let Ok(text) = std::str::from_utf8(&buf[..n]) {
                self.apply_tablet_size_reply(text);
            }
        }

        if self.running {
            self.link.write(CMD_START.as_bytes())?;
        }
        Ok(())
    }

    fn apply_tablet_size_reply(&mut self, reply: &str) {
        let digits: Vec<i32> = reply
            .trim_start_matches('~')
            .trim_start_matches('C')
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        if digits.len() >= 2 {
            self.settings.xscale = digits[0];
            self.settings.yscale = digits[1];
            self.mapper.tablet = Rect::new(0.0, 0.0, digits[0] as f32, digits[1] as f32);
        }
    }

    /// One iteration of the 250 Hz tick: drain available bytes, decode,
    /// and synthesize events.
    pub fn tick(&mut self) -> Result<()> {
        if !self.link.select(0)? {
            return Ok(());
        }
        let available = self.link.bytes_available()?;
        if available == 0 {
            return Ok(());
        }
        let mut buf = vec![0u8; available.min(4096)];
        let n = self.link.read(&mut buf)?;
        self.bytes_seen += n as u64;

        let params = FrameParams::from_settings(&self.settings, &self.dialect);
        let frames = self.framer.feed_all(&buf[..n], &params);
        for frame in frames {
            self.handle_frame(frame)?;
        }
        Ok(())
    }

    fn handle_frame(&mut self, frame: Frame) -> Result<()> {
        match frame {
            Frame::BinaryPacket(bytes) | Frame::AsciiDataPacket(bytes) => {
                self.packets_seen += 1;
                let mut ctx = DecodeCtx {
                    previous: &self.stylus,
                    settings: &self.settings,
                    sd_prev_raw_pressure: &mut self.sd_prev_raw_pressure,
                    eraser_latch: &mut self.eraser_latch,
                };
                match self.dialect.decode(&bytes, &mut ctx) {
                    Ok(delta) => {
                        let was_off_tablet = self.stylus.off_tablet;
                        let mut next = self.stylus;
                        apply_delta(&mut next, delta);

                        let tablet_point = (next.point.0 as f32, next.point.1 as f32);
                        let motion = (next.motion.0 as f32, next.motion.1 as f32);
                        let screen_point = match self.mapper.map(tablet_point, motion) {
                            Some(p) => p,
                            None => {
                                next.off_tablet = true;
                                next.pen_near = false;
                                tablet_point
                            }
                        };

                        if was_off_tablet && !next.off_tablet {
                            next.proximity = ProximityDescriptor::from_serial(self.port_hash, next.serial);
                        }

                        self.stylus = next;
                        if self.running {
                            self.synth.update(self.stylus, screen_point, self.sink.as_mut());
                        }
                    }
                    Err(TmError::ShortPacket { .. }) => {
                        log::warn!("dropped short packet");
                    }
                    Err(e) => log::warn!("decode error: {e}"),
                }
            }
            Frame::CommandReply(_bytes) => {
                // Asynchronous replies outside of a probe/request are logged
                // and otherwise ignored; `probe`/`?request` read replies
                // synchronously via `read_line` instead.
                log::debug!("unsolicited command reply");
            }
        }
        Ok(())
    }

    /// Process one pending control-channel command, if any.
    pub fn poll_control(&mut self) -> Result<()> {
        let Some(line) = self.control.try_recv() else { return Ok(()) };
        let reply = match self.dispatch_control(&line) {
            Ok(reply) => reply,
            Err(TmError::ControlParseError(_)) => "[error]".to_string(),
            Err(e) => {
                log::error!("control command failed: {e}");
                "[error]".to_string()
            }
        };
        self.control.send(&reply);
        Ok(())
    }

    fn dispatch_control(&mut self, line: &str) -> Result<String> {
        let cmd = control::parse(line)?;
        Ok(match cmd {
            ControlCommand::Hello => "[ok]".to_string(),
            ControlCommand::Bye => "[ok]".to_string(),
            ControlCommand::Next => "[ok]".to_string(),
            ControlCommand::Info { bank } => {
                let bank_settings = match bank {
                    1 => self.bank1.as_ref(),
                    2 => self.bank2.as_ref(),
                    _ => Some(&self.settings),
                };
                match bank_settings {
                    Some(s) => control::format_info(bank, s, bank == 0),
                    None => "[error]".to_string(),
                }
            }
            ControlCommand::Model => match self.model_name {
                Some(name) => format!("[model] {name}"),
                None => "[none]".to_string(),
            },
            ControlCommand::Scale => format!("[scale] {} {}", self.settings.xscale, self.settings.yscale),
            ControlCommand::Geom => format!(
                "[geom] tablet={:?} screen={:?} mouse_mode={}",
                self.mapper.tablet, self.mapper.screen, self.mapper.mouse_mode
            ),
            ControlCommand::Port => format!("[port] {}", self.port.display()),
            ControlCommand::Setup(setup) => {
                self.framer.drain();
                self.settings.import(setup)?;
                self.link.apply(&self.settings)?;
                "[ok]".to_string()
            }
            ControlCommand::SetMem { bank, setup } => {
                let mut s = self.settings;
                s.import(setup)?;
                match bank {
                    1 => self.bank1 = Some(s),
                    _ => self.bank2 = Some(s),
                }
                "[ok]".to_string()
            }
            ControlCommand::Scale2 { x, y } => {
                self.settings.xscale = x;
                self.settings.yscale = y;
                self.mapper.tablet = Rect::new(0.0, 0.0, x as f32, y as f32);
                "[ok]".to_string()
            }
            ControlCommand::MouseMode { enabled, scale } => {
                self.mapper.mouse_mode = enabled;
                self.mapper.scaling = scale;
                "[ok]".to_string()
            }
            ControlCommand::StreamOn => {
                self.stream_forward = true;
                "[ok]".to_string()
            }
            ControlCommand::StreamOff => {
                self.stream_forward = false;
                "[ok]".to_string()
            }
            ControlCommand::Stream => {
                if self.stream_forward {
                    format!("[raw] {:?}", self.stylus.point)
                } else {
                    "[noraw]".to_string()
                }
            }
            ControlCommand::Command(raw) => {
                self.link.write(raw.as_bytes())?;
                "[ok]".to_string()
            }
            ControlCommand::Request(raw) => {
                self.link.write(raw.as_bytes())?;
                let mut buf = [0u8; 64];
                let _ = self.link.read_line(&mut buf, 100_000)?;
                "[ok]".to_string()
            }
            ControlCommand::SetPort(_name) => "[ok]".to_string(),
            ControlCommand::Reinit(setup) => {
                self.framer.drain();
                self.settings.import(setup)?;
                self.link.apply(&self.settings)?;
                "[ok]".to_string()
            }
            ControlCommand::Start => {
                self.running = true;
                self.link.write(CMD_START.as_bytes())?;
                "[ok]".to_string()
            }
            ControlCommand::Stop => {
                self.running = false;
                self.link.write(CMD_STOP.as_bytes())?;
                "[ok]".to_string()
            }
            ControlCommand::TabletPc(force) => {
                self.identifier.force_tabletpc_hint = force;
                self.identify_and_start()?;
                "[ok]".to_string()
            }
            ControlCommand::Panic => {
                self.stylus.reset();
                "[ok]".to_string()
            }
            ControlCommand::Quit => {
                self.running = false;
                QUIT_REQUESTED.store(true, Ordering::SeqCst);
                "[ok]".to_string()
            }
        })
    }

    /// The main run loop: a `calloop::EventLoop` drives the 250 Hz serial
    /// tick (which also polls the control channel) and a 1 Hz counter tick,
    /// until the cancellation flag is observed.
    pub fn run(&mut self) -> Result<()> {
        let mut event_loop: calloop::EventLoop<'_, Core> = calloop::EventLoop::try_new()
            .map_err(|e| TmError::Transport(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))?;
        let handle = event_loop.handle();

        let tick_period = std::time::Duration::from_micros(4_000);
        handle
            .insert_source(Timer::from_duration(tick_period), move |_deadline, (), core: &mut Core| {
                if let Err(e) = core.tick() {
                    log::warn!("tick error: {e}");
                }
                if let Err(e) = core.poll_control() {
                    log::warn!("control poll error: {e}");
                }
                TimeoutAction::ToDuration(tick_period)
            })
            .map_err(|e| TmError::Transport(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))?;

        let counter_period = std::time::Duration::from_secs(1);
        handle
            .insert_source(Timer::from_duration(counter_period), move |_deadline, (), core: &mut Core| {
                log::debug!("packets/s={} bytes/s={}", core.packets_seen, core.bytes_seen);
                core.packets_seen = 0;
                core.bytes_seen = 0;
                TimeoutAction::ToDuration(counter_period)
            })
            .map_err(|e| TmError::Transport(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))?;

        while !quit_requested() {
            event_loop
                .dispatch(Some(std::time::Duration::from_millis(50)), self)
                .map_err(TmError::Transport)?;
        }
        Ok(())
    }
}

//! Textual command dispatch: the daemon's only surface for reconfiguration
//! and inspection from the outside.

use crate::error::{Result, TmError};
use crate::settings::Settings;

/// Inbound/outbound text channel. An embedder supplies the transport; the
/// control plane only ever deals in whole command/reply lines.
pub trait ControlChannel {
    fn try_recv(&mut self) -> Option<String>;
    fn send(&mut self, line: &str);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlCommand<'a> {
    Hello,
    Bye,
    Next,
    Info { bank: u8 },
    Model,
    Scale,
    Geom,
    Port,
    Setup(&'a str),
    SetMem { bank: u8, setup: &'a str },
    Scale2 { x: i32, y: i32 },
    MouseMode { enabled: bool, scale: f32 },
    StreamOn,
    StreamOff,
    Stream,
    Command(&'a str),
    Request(&'a str),
    SetPort(&'a str),
    Reinit(&'a str),
    Start,
    Stop,
    TabletPc(bool),
    Panic,
    Quit,
}

pub fn parse(line: &str) -> Result<ControlCommand<'_>> {
    let line = line.trim();
    let mut parts = line.splitn(2, ' ');
    let cmd = parts.next().unwrap_or("");
    let rest = parts.next().unwrap_or("").trim();

    Ok(match cmd {
        "hello" => ControlCommand::Hello,
        "bye" => ControlCommand::Bye,
        "next" => ControlCommand::Next,
        "?info" => ControlCommand::Info { bank: rest.parse().unwrap_or(0) },
        "?model" => ControlCommand::Model,
        "?scale" => ControlCommand::Scale,
        "?geom" => ControlCommand::Geom,
        "?port" => ControlCommand::Port,
        "setup" => ControlCommand::Setup(rest),
        "setmem" => {
            let mut it = rest.splitn(2, ' ');
            let bank = it.next().and_then(|s| s.parse().ok()).unwrap_or(1);
            let setup = it.next().unwrap_or("");
            ControlCommand::SetMem { bank, setup }
        }
        "scale" => {
            let mut it = rest.split_whitespace();
            let x = it.next().and_then(|s| s.parse().ok()).ok_or_else(|| TmError::ControlParseError(line.to_string()))?;
            let y = it.next().and_then(|s| s.parse().ok()).ok_or_else(|| TmError::ControlParseError(line.to_string()))?;
            ControlCommand::Scale2 { x, y }
        }
        "mmode" => {
            let mut it = rest.split_whitespace();
            let mm: u8 = it.next().and_then(|s| s.parse().ok()).unwrap_or(0);
            let scale: f32 = it.next().and_then(|s| s.parse().ok()).unwrap_or(1.0);
            ControlCommand::MouseMode { enabled: mm != 0, scale }
        }
        "stron" => ControlCommand::StreamOn,
        "stroff" => ControlCommand::StreamOff,
        "stream" => ControlCommand::Stream,
        "command" => ControlCommand::Command(rest),
        "request" => ControlCommand::Request(rest),
        "port" => ControlCommand::SetPort(rest),
        "reinit" => ControlCommand::Reinit(rest),
        "start" => ControlCommand::Start,
        "stop" => ControlCommand::Stop,
        "tabletpc" => ControlCommand::TabletPc(rest != "0"),
        "panic" => ControlCommand::Panic,
        "quit" => ControlCommand::Quit,
        _ => return Err(TmError::ControlParseError(line.to_string())),
    })
}

/// Formats the `?info` reply for a given settings bank.
#[must_use]
pub fn format_info(bank: u8, settings: &Settings, active: bool) -> String {
    format!(
        "[info] {} {} {{{}}}",
        bank,
        settings.settings_string(false),
        if active { "active" } else { "inactive" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_command_errors() {
        assert!(parse("bogus").is_err());
    }

    #[test]
    fn setup_command_carries_literal_tail() {
        let cmd = parse("setup E202C910,002,02,1270,1270").unwrap();
        assert_eq!(cmd, ControlCommand::Setup("E202C910,002,02,1270,1270"));
    }

    #[test]
    fn quit_parses_with_no_argument() {
        assert_eq!(parse("quit").unwrap(), ControlCommand::Quit);
    }
}

//! Probe state machine: discovers which protocol dialect and baud rate the
//! attached tablet speaks.

use crate::decode::Dialect;
use crate::error::{Result, TmError};
use crate::serial::SerialLink;
use crate::settings::{BaudRate, CommandSet, Settings};
use crate::wire::{CMD_STOP, CMD_TABLET_ID, SERIES_TABLE, TPC_QUERY};

const PROBE_BUDGET_USEC: u64 = 100_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdentifiedModel {
    pub name: &'static str,
    pub firmware_base: Option<(u8, u8)>,
}

pub struct Identifier {
    /// User-supplied hint (`-F`): try the TabletPC hypothesis first. This
    /// replaces any OS-specific ACPI probing, which is out of scope here.
    pub force_tabletpc_hint: bool,
    pub prefer_38400: bool,
    pub last_baud: BaudRate,
}

impl Identifier {
    #[must_use]
    pub fn new(force_tabletpc_hint: bool, prefer_38400: bool) -> Self {
        Self { force_tabletpc_hint, prefer_38400, last_baud: BaudRate::B9600 }
    }

    fn hypothesis_sequence(&self) -> Vec<(CommandSet, BaudRate)> {
        let mut seq = Vec::new();
        if self.force_tabletpc_hint {
            seq.push((CommandSet::TabletPc, if self.prefer_38400 { BaudRate::B38400 } else { BaudRate::B19200 }));
        }
        seq.push((CommandSet::WacomIIs, self.last_baud));
        let other = if matches!(self.last_baud, BaudRate::B9600) { BaudRate::B19200 } else { BaudRate::B9600 };
        seq.push((CommandSet::WacomIIs, other));
        seq.push((CommandSet::BitpadII, BaudRate::B9600));
        if !self.force_tabletpc_hint {
            seq.push((CommandSet::TabletPc, BaudRate::B19200));
        }
        seq
    }

    fn lookup_series(reply: &str) -> Option<(&'static str, Dialect)> {
        let body = reply.trim_start_matches('~').trim_start_matches('#');
        SERIES_TABLE
            .iter()
            .filter(|row| body.starts_with(row.prefix))
            .max_by_key(|row| row.prefix.len())
            .map(|row| {
                // The generic command-set/tilt pair used as a fallback for
                // `Dialect::from_series`, for series that don't get one of
                // the three dedicated decoders.
                let (command_set, tilt) = match row.name {
                    "TabletPC" => (CommandSet::TabletPc, true),
                    "Intuos" | "Intuos2" | "Cintiq" | "Cintiq Partner" | "ArtZ" => (CommandSet::WacomV, true),
                    "SD Series" => (CommandSet::WacomIIs, false),
                    "Graphire" | "Graphire2" | "Graphire3" | "CalComp" | "FujitsuP" => (CommandSet::WacomIv, false),
                    _ => (CommandSet::WacomIIs, false),
                };
                let dialect =
                    Dialect::from_series(row.name, command_set, tilt, crate::settings::OutputFormat::Binary);
                (row.name, dialect)
            })
    }

    /// Default settings to apply once a model has been recognized, per the
    /// model-specific presets.
    #[must_use]
    pub fn default_settings_for(name: &str, prefer_38400: bool) -> Settings {
        match name {
            "TabletPC" => Settings::init_tablet_pc(prefer_38400),
            "Intuos" | "Intuos2" | "Cintiq" | "Cintiq Partner" => Settings::init_intuos(),
            "ArtZ" => Settings::init_pl(),
            "PenPartner" => Settings::init_pen_partner(),
            "SD Series" => Settings::init_sd(),
            "CalComp" => Settings::init_calcomp(),
            "FujitsuP" => Settings::init_fujitsu(),
            _ => Settings::default(),
        }
    }

    /// Run the full probe: try every hypothesis until a tablet answers with
    /// a parseable ID string, then request its coordinate range and start
    /// streaming.
    pub fn probe(&mut self, link: &mut dyn SerialLink) -> Result<(&'static str, Settings, Dialect)> {
        for (command_set, baud) in self.hypothesis_sequence() {
            let mut settings = Settings::default();
            settings.command_set = command_set;
            settings.baud_rate = baud;
            link.apply(&settings)?;
            link.write(CMD_STOP.as_bytes())?;

            let query = if matches!(command_set, CommandSet::TabletPc) {
                TPC_QUERY.as_bytes()
            } else {
                CMD_TABLET_ID.as_bytes()
            };
            link.write(query)?;

            let mut buf = [0u8; 64];
            let n = link.read_line(&mut buf, PROBE_BUDGET_USEC)?;
            if n == 0 {
                continue;
            }
            let reply = String::from_utf8_lossy(&buf[..n]);

            if let Some((name, dialect)) = Self::lookup_series(&reply) {
                self.last_baud = baud;
                let mut resolved = Self::default_settings_for(name, self.prefer_38400);
                resolved.baud_rate = baud;
                return Ok((name, resolved, dialect));
            }
            if n >= crate::wire::TPC_QUERY_REPLY_SIZE && matches!(command_set, CommandSet::TabletPc) {
                self.last_baud = baud;
                let settings = Settings::init_tablet_pc(self.prefer_38400);
                let dialect = Dialect::from_command_set(CommandSet::TabletPc, true, crate::settings::OutputFormat::Binary);
                return Ok(("TabletPC", settings, dialect));
            }
        }
        Err(TmError::ProbeTimeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ScriptedLink {
        reply: Vec<u8>,
    }
    impl SerialLink for ScriptedLink {
        fn apply(&mut self, _settings: &Settings) -> Result<()> {
            Ok(())
        }
        fn bytes_available(&self) -> Result<usize> {
            Ok(self.reply.len())
        }
        fn select(&self, _timeout_usec: u64) -> Result<bool> {
            Ok(true)
        }
        fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
            let n = buf.len().min(self.reply.len());
            buf[..n].copy_from_slice(&self.reply[..n]);
            Ok(n)
        }
        fn read_line(&mut self, buf: &mut [u8], _timeout_usec: u64) -> Result<usize> {
            let n = buf.len().min(self.reply.len());
            buf[..n].copy_from_slice(&self.reply[..n]);
            Ok(n)
        }
        fn write(&mut self, _bytes: &[u8]) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn probe_success_identifies_intuos_from_gd_prefix() {
        let mut link = ScriptedLink { reply: b"~#GD-0608-R00,V1.2-7\r".to_vec() };
        let mut id = Identifier::new(false, false);
        let (name, settings, _dialect) = id.probe(&mut link).unwrap();
        assert_eq!(name, "Intuos");
        assert_eq!(settings.command_set, CommandSet::WacomV);
    }
}

//! Command-line flag parsing, mirroring the daemon's historical `getopt`
//! surface. No argument-parsing crate appears anywhere in this lineage, so
//! this stays a plain scan over `std::env::args()`.

#[derive(Clone, Debug, PartialEq)]
pub struct CliOptions {
    pub quiet: bool,
    pub detach: bool,
    pub command_mode: bool,
    pub force_tabletpc: bool,
    pub prefer_38400: bool,
    pub start_disabled: bool,
    pub exit_after_probe: bool,
    pub mouse_mode: bool,
    pub port: Option<String>,
    pub init_setup: Option<String>,
    pub screen_left: Option<f32>,
    pub screen_right: Option<f32>,
    pub screen_top: Option<f32>,
    pub screen_bottom: Option<f32>,
    pub tablet_left: Option<f32>,
    pub tablet_right: Option<f32>,
    pub tablet_top: Option<f32>,
    pub tablet_bottom: Option<f32>,
    pub priority: i32,
    pub scaling: f32,
    pub button_remap: Vec<(u8, u8)>,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            quiet: false,
            detach: false,
            command_mode: false,
            force_tabletpc: false,
            prefer_38400: false,
            start_disabled: false,
            exit_after_probe: false,
            mouse_mode: false,
            port: None,
            init_setup: None,
            screen_left: None,
            screen_right: None,
            screen_top: None,
            screen_bottom: None,
            tablet_left: None,
            tablet_right: None,
            tablet_top: None,
            tablet_bottom: None,
            priority: 0,
            scaling: 1.0,
            button_remap: Vec::new(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("unknown flag: {0}")]
    UnknownFlag(String),
    #[error("missing argument for flag: {0}")]
    MissingArgument(String),
    #[error("invalid value for {flag}: {value}")]
    InvalidValue { flag: String, value: String },
}

pub const USAGE: &str = "\
usage: tabletmagicd [-qdcF3oXmh] [-p port] [-i setup] [-l/-r/-t/-b bound]
                     [-L/-R/-T/-B bound] [-n priority] [-s scale]
                     [-M stylus:system]";

/// Parse an argument iterator (`std::env::args().skip(1)` in practice) into
/// `CliOptions`, mirroring the original flag string
/// `"3cdFhmoqwXi:p:n:l:r:t:b:L:R:T:B:M:s:"`.
pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<CliOptions, CliError> {
    let mut opts = CliOptions::default();
    let mut it = args.into_iter().peekable();

    fn take_value(it: &mut std::iter::Peekable<impl Iterator<Item = String>>, flag: &str) -> Result<String, CliError> {
        it.next().ok_or_else(|| CliError::MissingArgument(flag.to_string()))
    }
    fn parse_f32(flag: &str, value: &str) -> Result<f32, CliError> {
        value.parse().map_err(|_| CliError::InvalidValue { flag: flag.to_string(), value: value.to_string() })
    }

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "-3" => opts.prefer_38400 = true,
            "-c" => opts.command_mode = true,
            "-d" => opts.detach = true,
            "-F" => opts.force_tabletpc = true,
            "-h" => {
                println!("{USAGE}");
            }
            "-m" => opts.mouse_mode = true,
            "-o" => opts.start_disabled = true,
            "-q" => opts.quiet = true,
            "-X" => opts.exit_after_probe = true,
            "-i" => opts.init_setup = Some(take_value(&mut it, "-i")?),
            "-p" => opts.port = Some(take_value(&mut it, "-p")?),
            "-n" => {
                let v = take_value(&mut it, "-n")?;
                opts.priority = v.parse().map_err(|_| CliError::InvalidValue { flag: "-n".into(), value: v })?;
            }
            "-s" => {
                let v = take_value(&mut it, "-s")?;
                opts.scaling = parse_f32("-s", &v)?;
            }
            "-l" => opts.screen_left = Some(parse_f32("-l", &take_value(&mut it, "-l")?)?),
            "-r" => opts.screen_right = Some(parse_f32("-r", &take_value(&mut it, "-r")?)?),
            "-t" => opts.screen_top = Some(parse_f32("-t", &take_value(&mut it, "-t")?)?),
            "-b" => opts.screen_bottom = Some(parse_f32("-b", &take_value(&mut it, "-b")?)?),
            "-L" => opts.tablet_left = Some(parse_f32("-L", &take_value(&mut it, "-L")?)?),
            "-R" => opts.tablet_right = Some(parse_f32("-R", &take_value(&mut it, "-R")?)?),
            "-T" => opts.tablet_top = Some(parse_f32("-T", &take_value(&mut it, "-T")?)?),
            "-B" => opts.tablet_bottom = Some(parse_f32("-B", &take_value(&mut it, "-B")?)?),
            "-M" => {
                let v = take_value(&mut it, "-M")?;
                let (stylus, system) = v
                    .split_once(':')
                    .ok_or_else(|| CliError::InvalidValue { flag: "-M".into(), value: v.clone() })?;
                let stylus: u8 = stylus
                    .parse()
                    .map_err(|_| CliError::InvalidValue { flag: "-M".into(), value: v.clone() })?;
                let system: u8 = system
                    .parse()
                    .map_err(|_| CliError::InvalidValue { flag: "-M".into(), value: v.clone() })?;
                opts.button_remap.push((stylus.saturating_sub(1), system));
            }
            other => return Err(CliError::UnknownFlag(other.to_string())),
        }
    }
    Ok(opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_force_tabletpc_and_port() {
        let opts = parse(["-F", "-p", "/dev/ttyUSB0"].map(String::from)).unwrap();
        assert!(opts.force_tabletpc);
        assert_eq!(opts.port.as_deref(), Some("/dev/ttyUSB0"));
    }

    #[test]
    fn button_remap_is_zero_indexed_on_the_stylus_side() {
        let opts = parse(["-M", "1:2"].map(String::from)).unwrap();
        assert_eq!(opts.button_remap, vec![(0, 2)]);
    }

    #[test]
    fn unknown_flag_errors() {
        assert!(parse(["-z"].map(String::from)).is_err());
    }
}

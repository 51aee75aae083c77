//! Command-line parsing
//!
//! The probe accepts the historical single-dash switches `-ws`, `-rmq` and
//! `-tls`. They are rewritten to their `--` spellings before clap sees them.
//! Any argument clap rejects means the caller prints [`USAGE`].

use crate::profile::Flags;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

pub const USAGE: &str = "Usage: testmqtt [-ws] [-rmq] [-tls]
\t-ws:  If provided connect to MQTT over websocket, otherwise plain MQTT
\t-rmq: If provided connect to the self-hosted broker, otherwise connect to test.mosquitto.org
\t-tls: If provided connect using TLS
default: Connect to test.mosquitto.org, plain MQTT, with no TLS
";

const LEGACY_SWITCHES: [&str; 3] = ["-ws", "-rmq", "-tls"];

/// MQTT connectivity probe
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "testmqtt")]
#[command(disable_help_flag = true, disable_version_flag = true)]
#[command(args_override_self = true)]
pub struct Cli {
    /// Connect over WebSocket instead of plain TCP
    #[arg(long)]
    pub ws: bool,

    /// Connect to the self-hosted broker instead of test.mosquitto.org
    #[arg(long)]
    pub rmq: bool,

    /// Connect using TLS
    #[arg(long)]
    pub tls: bool,

    /// TOML file overriding the broker table
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn flags(&self) -> Flags {
        Flags::new(self.ws, self.rmq, self.tls)
    }
}

/// Parse a full argv (program name first)
pub fn parse_args<I, T>(argv: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    Cli::try_parse_from(normalize_args(argv))
}

fn normalize_args<I, T>(argv: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    argv.into_iter()
        .map(Into::into)
        .enumerate()
        .map(|(i, arg)| {
            if i > 0 && LEGACY_SWITCHES.iter().any(|s| arg == *s) {
                let mut long = OsString::from("-");
                long.push(&arg);
                long
            } else {
                arg
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        parse_args(std::iter::once("testmqtt").chain(args.iter().copied()))
    }

    #[test]
    fn test_no_arguments_is_default_profile() {
        let cli = parse(&[]).unwrap();
        assert_eq!(cli.flags(), Flags::default());
        assert_eq!(cli.config, None);
    }

    #[test]
    fn test_legacy_switches_in_any_order() {
        let cli = parse(&["-tls", "-ws", "-rmq"]).unwrap();
        assert_eq!(cli.flags(), Flags::new(true, true, true));

        let cli = parse(&["-rmq"]).unwrap();
        assert_eq!(cli.flags(), Flags::new(false, true, false));
    }

    #[test]
    fn test_double_dash_aliases() {
        let cli = parse(&["--ws", "--tls"]).unwrap();
        assert_eq!(cli.flags(), Flags::new(true, false, true));
    }

    #[test]
    fn test_repeated_switch_is_accepted() {
        let cli = parse(&["-ws", "-ws"]).unwrap();
        assert!(cli.ws);
    }

    #[test]
    fn test_config_path() {
        let cli = parse(&["--config", "probe.toml", "-rmq"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("probe.toml")));
        assert!(cli.rmq);
    }

    #[test]
    fn test_unknown_arguments_are_rejected() {
        for bad in ["-x", "-h", "--help", "--version", "ws", "-w", "-TLS"] {
            assert!(parse(&[bad]).is_err(), "expected rejection of {bad}");
        }
    }

    #[test]
    fn test_program_name_is_not_rewritten() {
        let args = normalize_args(["-ws", "-ws"]);
        assert_eq!(args, vec![OsString::from("-ws"), OsString::from("--ws")]);
    }

    #[test]
    fn test_usage_names_every_switch() {
        for switch in LEGACY_SWITCHES {
            assert!(USAGE.contains(switch));
        }
        assert!(USAGE.starts_with("Usage: testmqtt"));
    }
}

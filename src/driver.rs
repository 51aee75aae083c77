//! One-shot probe driver
//!
//! Parses the flags, resolves the profile, configures the client, prints the
//! report line and hands the calling thread to its network loop.

use crate::cli::{self, USAGE};
use crate::config::ProbeConfig;
use crate::error::ProbeResult;
use crate::probe_span;
use crate::profile::resolve_with;
use crate::transport::mqtt::format_payload;
use crate::transport::{ClientFactory, ClientSettings, EventHandler, Subscriber, TransportError};
use std::ffi::OsString;
use std::io::Write;
use tracing::{debug, error, info, warn, Instrument};

/// How a probe run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Arguments were rejected; usage was printed and no client was built
    UsageShown,
    /// The client's network loop returned
    LoopEnded,
}

pub struct Driver<F> {
    factory: F,
}

impl<F: ClientFactory> Driver<F> {
    pub fn new(factory: F) -> Self {
        Self { factory }
    }

    /// Run a probe for a full argv (program name first), writing the report
    /// and callback output to `out`.
    pub async fn run<I, T, W>(&self, argv: I, mut out: W) -> ProbeResult<RunOutcome>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
        W: Write + Send,
    {
        let cli = match cli::parse_args(argv) {
            Ok(cli) => cli,
            Err(e) => {
                debug!("Rejected arguments: {:?}", e.kind());
                out.write_all(USAGE.as_bytes())?;
                out.flush()?;
                return Ok(RunOutcome::UsageShown);
            }
        };

        let config = match &cli.config {
            Some(path) => {
                info!("Loading configuration from: {}", path.display());
                ProbeConfig::load_from_file(path)?
            }
            None => ProbeConfig::default(),
        };

        let profile = resolve_with(&config, cli.flags());
        if let Some(issue) = profile.known_issue {
            warn!("{}", issue);
        }

        // TLS material is loaded here, so a bad CA file fails before the report
        let settings = ClientSettings::from_config(&config);
        let client = self.factory.create(&profile, &settings)?;

        writeln!(out, "{}", profile.report_line())?;
        out.flush()?;

        let span = probe_span!(
            host = %profile.host,
            port = profile.port,
            transport = %profile.transport,
            tls = profile.use_tls
        );
        let mut handler = ConsoleHandler::new(out, config.status_topic.clone());
        client.run_forever(&mut handler).instrument(span).await?;

        Ok(RunOutcome::LoopEnded)
    }
}

/// Prints every callback to a writer, subscribing to the status topic on connect
pub struct ConsoleHandler<W> {
    out: W,
    status_topic: String,
}

impl<W: Write + Send> ConsoleHandler<W> {
    pub fn new(out: W, status_topic: String) -> Self {
        Self { out, status_topic }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn print(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{line}").and_then(|_| self.out.flush()) {
            warn!("Failed to write output: {}", e);
        }
    }
}

impl<W: Write + Send> EventHandler for ConsoleHandler<W> {
    fn on_connect(&mut self, code: u8, subscriber: &mut dyn Subscriber) {
        self.print(&format!("Connected with result code {code}"));

        // Subscribing here renews the subscription after every reconnect
        match subscriber.subscribe(&self.status_topic) {
            Ok(()) => {}
            Err(e @ TransportError::NotConnected { .. }) => debug!("{}", e),
            Err(e) => error!("{}", e),
        }
    }

    fn on_message(&mut self, topic: &str, payload: &[u8]) {
        self.print(&format!("{topic} {}", format_payload(payload)));
    }

    fn on_log(&mut self, line: &str) {
        self.print(line);
    }
}

//! Blocking request/response client for the battery daemon.

use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use battcurve_traits::{BoxError, ChargeControl};

use crate::error::{ProtocolError, Result};
use crate::response::{VOLTAGE_KEY, is_acknowledged, last_meaningful_line, parse_voltage};

/// Connection parameters for [`ProtocolClient`].
#[derive(Debug, Clone)]
pub struct ClientCfg {
    pub host: String,
    pub port: u16,
    /// Upper bound for connecting and for reading the whole response.
    pub read_timeout: Duration,
    /// Lines starting with any of these are notifications, never answers.
    pub event_prefixes: Vec<String>,
}

impl Default for ClientCfg {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8423,
            read_timeout: Duration::from_secs(2),
            event_prefixes: vec!["single".into(), "double".into(), "long".into()],
        }
    }
}

/// One connection per command; no pooling, no retries.
#[derive(Debug, Clone)]
pub struct ProtocolClient {
    cfg: ClientCfg,
}

impl ProtocolClient {
    pub fn new(cfg: ClientCfg) -> Self {
        Self { cfg }
    }

    pub fn cfg(&self) -> &ClientCfg {
        &self.cfg
    }

    fn resolve(&self) -> Result<SocketAddr> {
        let target = format!("{}:{}", self.cfg.host, self.cfg.port);
        target
            .to_socket_addrs()
            .map_err(|_| ProtocolError::Resolve(target.clone()))?
            .next()
            .ok_or(ProtocolError::Resolve(target))
    }

    /// Send `cmd` and return the last meaningful response line.
    ///
    /// Reading stops when the peer closes or the per-call deadline passes;
    /// running into the deadline just ends the response.
    pub fn send_command(&self, cmd: &str) -> Result<String> {
        let addr = self.resolve()?;
        let timeout = self.cfg.read_timeout.max(Duration::from_millis(1));
        let mut stream =
            TcpStream::connect_timeout(&addr, timeout).map_err(|source| ProtocolError::Connect {
                addr: addr.to_string(),
                source,
            })?;
        tracing::debug!(%addr, cmd, "request");

        stream.write_all(format!("{cmd}\n").as_bytes())?;
        stream.flush()?;
        // Half-close so the daemon sees end-of-request.
        if let Err(e) = stream.shutdown(Shutdown::Write) {
            if e.kind() != ErrorKind::NotConnected {
                return Err(e.into());
            }
        }

        let buf = read_until_deadline(&mut stream, Instant::now() + timeout)?;
        tracing::trace!(raw = %String::from_utf8_lossy(&buf), "response");
        last_meaningful_line(&buf, &self.cfg.event_prefixes)
    }

    /// Query the battery voltage (`get battery_v`).
    pub fn get_battery_voltage(&self) -> Result<f64> {
        let line = self.send_command(&format!("get {VOLTAGE_KEY}"))?;
        parse_voltage(&line)
    }

    /// Allow or forbid charging (`set_allow_charging <bool>`).
    pub fn set_allow_charging(&self, enabled: bool) -> Result<()> {
        let line = self.send_command(&format!("set_allow_charging {enabled}"))?;
        if is_acknowledged(&line) {
            Ok(())
        } else {
            Err(ProtocolError::ChargingRejected { enabled, line })
        }
    }
}

fn read_until_deadline(stream: &mut TcpStream, deadline: Instant) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        stream.set_read_timeout(Some(remaining))?;
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => break,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(buf)
}

impl ChargeControl for ProtocolClient {
    fn battery_voltage(&mut self) -> std::result::Result<f64, BoxError> {
        Ok(self.get_battery_voltage()?)
    }

    fn set_charging(&mut self, enabled: bool) -> std::result::Result<(), BoxError> {
        Ok(self.set_allow_charging(enabled)?)
    }
}

//! ZeroMQ transport: CURVE-authenticated DEALER and PUB endpoints
//!
//! The reply endpoint is a bound DEALER socket at `base_port`; frontends
//! dial it and their traffic arrives as identity-prefixed multipart frames.
//! The broadcast endpoint is a bound PUB socket at `base_port + 1`. Both run
//! as CURVE servers with the backend's key pair; client admission is decided
//! by the ZAP authenticator thread.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use hearth_core::{Result, TransportError};

use super::curve::Certificate;
use super::policy::AdmissionPolicy;
use super::socket_err;
use super::zap::ZapAuthenticator;
use super::Transport;

// ----------------------------------------------------------------------------
// Configuration
// ----------------------------------------------------------------------------

/// Startup inputs for the transport bootstrap
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Address both endpoints bind on
    pub bind_addr: String,
    /// Reply endpoint port; the broadcast endpoint binds at `base_port + 1`
    pub base_port: u16,
    /// Backend identity certificate (public and secret halves)
    pub backend_cert: PathBuf,
    /// Certificate whose public half authorizes connecting frontends
    pub frontend_cert: PathBuf,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            base_port: 5561,
            backend_cert: PathBuf::from("backend.key"),
            frontend_cert: PathBuf::from("frontend.key"),
        }
    }
}

impl TransportConfig {
    pub fn reply_endpoint(&self) -> String {
        format!("tcp://{}:{}", self.bind_addr, self.base_port)
    }

    pub fn broadcast_endpoint(&self) -> String {
        format!("tcp://{}:{}", self.bind_addr, self.base_port + 1)
    }
}

// ----------------------------------------------------------------------------
// ZeroMQ Transport
// ----------------------------------------------------------------------------

/// The production transport
pub struct ZmqTransport {
    // Field order matters: sockets must drop before the context
    dealer: Option<zmq::Socket>,
    publisher: Option<zmq::Socket>,
    auth: ZapAuthenticator,
    _context: zmq::Context,
}

impl ZmqTransport {
    /// Load credentials, start the ZAP authenticator, and bind both
    /// endpoints. Any failure here is fatal: the process must not proceed
    /// with a partially-authenticated transport.
    pub fn bind(config: &TransportConfig, policy: Arc<dyn AdmissionPolicy>) -> Result<Self> {
        let backend = Certificate::load(&config.backend_cert)?;
        let secret = backend.require_secret(&config.backend_cert)?;
        let frontend = Certificate::load(&config.frontend_cert)?;
        info!(
            backend = %backend.fingerprint(),
            frontend = %frontend.fingerprint(),
            "loaded curve credentials"
        );

        let context = zmq::Context::new();
        let auth = ZapAuthenticator::start(&context, policy)?;

        let reply_endpoint = config.reply_endpoint();
        let dealer = bind_curve_server(
            &context,
            zmq::DEALER,
            &reply_endpoint,
            &backend.public_key,
            &secret,
        )?;
        info!(endpoint = %reply_endpoint, "bound reply endpoint (DEALER)");

        let broadcast_endpoint = config.broadcast_endpoint();
        let publisher = bind_curve_server(
            &context,
            zmq::PUB,
            &broadcast_endpoint,
            &backend.public_key,
            &secret,
        )?;
        info!(endpoint = %broadcast_endpoint, "bound broadcast endpoint (PUB)");

        Ok(Self {
            dealer: Some(dealer),
            publisher: Some(publisher),
            auth,
            _context: context,
        })
    }

    fn dealer(&self) -> Result<&zmq::Socket> {
        Ok(self.dealer.as_ref().ok_or(TransportError::Closed)?)
    }

    fn publisher(&self) -> Result<&zmq::Socket> {
        Ok(self.publisher.as_ref().ok_or(TransportError::Closed)?)
    }
}

fn bind_curve_server(
    context: &zmq::Context,
    kind: zmq::SocketType,
    endpoint: &str,
    public_key: &[u8; 32],
    secret_key: &[u8; 32],
) -> Result<zmq::Socket> {
    let socket = context.socket(kind).map_err(socket_err)?;
    socket.set_curve_server(true).map_err(socket_err)?;
    socket.set_curve_publickey(public_key).map_err(socket_err)?;
    socket.set_curve_secretkey(secret_key).map_err(socket_err)?;
    socket.set_linger(0).map_err(socket_err)?;
    socket.bind(endpoint).map_err(|err| TransportError::Bind {
        endpoint: endpoint.to_string(),
        reason: err.to_string(),
    })?;
    Ok(socket)
}

impl Transport for ZmqTransport {
    fn poll_inbound(&mut self, timeout: Duration) -> Result<bool> {
        let dealer = self.dealer()?;
        let mut items = [dealer.as_poll_item(zmq::POLLIN)];
        let ready = zmq::poll(&mut items, timeout.as_millis() as i64).map_err(socket_err)?;
        Ok(ready > 0 && items[0].is_readable())
    }

    fn recv_inbound(&mut self) -> Result<Vec<Vec<u8>>> {
        Ok(self.dealer()?.recv_multipart(0).map_err(socket_err)?)
    }

    fn send_reply(&mut self, frames: &[&[u8]]) -> Result<()> {
        self.dealer()?
            .send_multipart(frames.iter().copied(), 0)
            .map_err(socket_err)?;
        Ok(())
    }

    fn send_broadcast(&mut self, payload: &[u8]) -> Result<()> {
        self.publisher()?.send(payload, 0).map_err(socket_err)?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.auth.stop();
        self.dealer.take();
        self.publisher.take();
        Ok(())
    }
}

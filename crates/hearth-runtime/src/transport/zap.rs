//! ZAP authenticator thread
//!
//! libzmq delegates handshake authorization to a REP socket bound at the
//! well-known inproc ZAP endpoint. This module runs that handler on a side
//! thread and answers each request according to an [`AdmissionPolicy`]. The
//! thread owns nothing but its own socket and the policy object; all other
//! runtime state stays on the loop thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use hearth_core::TransportError;

use super::policy::{AdmissionPolicy, AdmissionRequest};
use super::socket_err;

/// Well-known ZAP endpoint inside a ZeroMQ context
const ZAP_ENDPOINT: &str = "inproc://zeromq.zap.01";

/// How often the handler thread checks its stop flag
const ZAP_POLL_MS: i32 = 100;

// ----------------------------------------------------------------------------
// ZAP Authenticator
// ----------------------------------------------------------------------------

/// Handle to the running authenticator thread
pub struct ZapAuthenticator {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ZapAuthenticator {
    /// Bind the ZAP endpoint in `context` and start answering requests
    pub fn start(
        context: &zmq::Context,
        policy: Arc<dyn AdmissionPolicy>,
    ) -> Result<Self, TransportError> {
        let socket = context.socket(zmq::REP).map_err(socket_err)?;
        socket
            .bind(ZAP_ENDPOINT)
            .map_err(|err| TransportError::Bind {
                endpoint: ZAP_ENDPOINT.to_string(),
                reason: err.to_string(),
            })?;
        socket.set_rcvtimeo(ZAP_POLL_MS).map_err(socket_err)?;

        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("hearth-zap".to_string())
            .spawn(move || {
                while !flag.load(Ordering::Relaxed) {
                    let frames = match socket.recv_multipart(0) {
                        Ok(frames) => frames,
                        Err(zmq::Error::EAGAIN) => continue,
                        Err(_) => break,
                    };
                    let reply = answer(&frames, policy.as_ref());
                    if socket.send_multipart(reply, 0).is_err() {
                        break;
                    }
                }
            })
            .map_err(|err| TransportError::Socket(err.to_string()))?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Stop the handler thread and wait for it to exit
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ZapAuthenticator {
    fn drop(&mut self) {
        self.stop();
    }
}

// ----------------------------------------------------------------------------
// Request Handling
// ----------------------------------------------------------------------------

/// Build the ZAP reply for one request.
///
/// Request frames: `[version, request-id, domain, address, identity,
/// mechanism, credentials...]`. The REP socket must answer every request to
/// stay usable, so malformed requests get a 400 rather than silence.
fn answer(frames: &[Vec<u8>], policy: &dyn AdmissionPolicy) -> Vec<Vec<u8>> {
    let request_id = frames.get(1).cloned().unwrap_or_default();

    let granted = parse_request(frames).map(|request| {
        let granted = policy.authorize(&request);
        if granted {
            debug!(address = %request.address, mechanism = %request.mechanism, "admitted client");
        } else {
            warn!(address = %request.address, mechanism = %request.mechanism, "denied client");
        }
        granted
    });

    let (status, text): (&[u8], &[u8]) = match granted {
        Some(true) => (b"200", b"OK"),
        Some(false) => (b"400", b"Denied"),
        None => (b"400", b"Malformed ZAP request"),
    };

    vec![
        b"1.0".to_vec(),
        request_id,
        status.to_vec(),
        text.to_vec(),
        Vec::new(), // user id
        Vec::new(), // metadata
    ]
}

fn parse_request(frames: &[Vec<u8>]) -> Option<AdmissionRequest> {
    if frames.len() < 6 || frames[0] != b"1.0" {
        return None;
    }
    Some(AdmissionRequest {
        domain: String::from_utf8_lossy(&frames[2]).into_owned(),
        address: String::from_utf8_lossy(&frames[3]).into_owned(),
        mechanism: String::from_utf8_lossy(&frames[5]).into_owned(),
        credential: frames.get(6).cloned().unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::policy::AllowAny;

    fn curve_frames(credential: Vec<u8>) -> Vec<Vec<u8>> {
        vec![
            b"1.0".to_vec(),
            b"req-1".to_vec(),
            b"*".to_vec(),
            b"127.0.0.1".to_vec(),
            Vec::new(),
            b"CURVE".to_vec(),
            credential,
        ]
    }

    #[test]
    fn valid_curve_request_is_admitted() {
        let reply = answer(&curve_frames(vec![9u8; 32]), &AllowAny);
        assert_eq!(reply[1], b"req-1");
        assert_eq!(reply[2], b"200");
    }

    #[test]
    fn short_credential_is_denied() {
        let reply = answer(&curve_frames(vec![9u8; 8]), &AllowAny);
        assert_eq!(reply[2], b"400");
    }

    #[test]
    fn malformed_request_still_gets_a_reply() {
        let reply = answer(&[b"1.0".to_vec()], &AllowAny);
        assert_eq!(reply[2], b"400");
        assert_eq!(reply.len(), 6);
    }

    #[test]
    fn unknown_version_is_denied() {
        let mut frames = curve_frames(vec![9u8; 32]);
        frames[0] = b"2.0".to_vec();
        let reply = answer(&frames, &AllowAny);
        assert_eq!(reply[2], b"400");
    }
}

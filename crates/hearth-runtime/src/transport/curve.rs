//! CURVE certificate loading
//!
//! Certificates are small text files carrying Z85-encoded key material:
//!
//! ```text
//! #   **** Generated curve certificate ****
//! metadata
//! curve
//!     public-key = "Yne@$w-vo<fVvi]a<NY6T1ed:M$fCG*[IaLV{hID"
//!     secret-key = "D:)Q[IlAW!ahhC2ac:9*A}h:p?([4%wOTJ%JR%cs"
//! ```
//!
//! A public-only certificate authorizes connecting frontends; the backend's
//! own certificate must also carry the secret half. Any unreadable or
//! malformed file is a fatal startup error.

use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

use hearth_core::TransportError;

/// Length of a Z85-encoded 32-byte key
const Z85_KEY_LEN: usize = 40;

// ----------------------------------------------------------------------------
// Certificate
// ----------------------------------------------------------------------------

/// A loaded CURVE key pair (secret half optional)
#[derive(Clone)]
pub struct Certificate {
    pub public_key: [u8; 32],
    pub secret_key: Option<[u8; 32]>,
}

impl Certificate {
    /// Load a certificate from disk
    pub fn load(path: &Path) -> Result<Self, TransportError> {
        let text = fs::read_to_string(path).map_err(|err| TransportError::Credential {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        Self::parse(&text).map_err(|reason| TransportError::Credential {
            path: path.display().to_string(),
            reason,
        })
    }

    fn parse(text: &str) -> Result<Self, String> {
        let mut public_key = None;
        let mut secret_key = None;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(value) = key_value(line, "public-key") {
                public_key = Some(decode_key(value)?);
            } else if let Some(value) = key_value(line, "secret-key") {
                secret_key = Some(decode_key(value)?);
            }
        }

        let public_key = public_key.ok_or_else(|| "missing public-key".to_string())?;
        Ok(Self {
            public_key,
            secret_key,
        })
    }

    /// The secret key, or an error naming the offending file
    pub fn require_secret(&self, path: &Path) -> Result<[u8; 32], TransportError> {
        self.secret_key.ok_or_else(|| TransportError::Credential {
            path: path.display().to_string(),
            reason: "missing secret-key".to_string(),
        })
    }

    /// Hex SHA-256 fingerprint of the public key, for startup logging
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(self.public_key))
    }
}

fn key_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(key)?.trim_start();
    let rest = rest.strip_prefix('=')?.trim();
    rest.strip_prefix('"')?.strip_suffix('"')
}

fn decode_key(value: &str) -> Result<[u8; 32], String> {
    if value.len() != Z85_KEY_LEN {
        return Err(format!(
            "key must be {Z85_KEY_LEN} Z85 characters, got {}",
            value.len()
        ));
    }
    let bytes = zmq::z85_decode(value).map_err(|err| format!("invalid Z85 key: {err}"))?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| format!("decoded key is {} bytes, expected 32", bytes.len()))
}

impl std::fmt::Debug for Certificate {
    // Never prints key material
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Certificate")
            .field("fingerprint", &self.fingerprint())
            .field("has_secret", &self.secret_key.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const PUBLIC_Z85: &str = "Yne@$w-vo<fVvi]a<NY6T1ed:M$fCG*[IaLV{hID";
    const SECRET_Z85: &str = "D:)Q[IlAW!ahhC2ac:9*A}h:p?([4%wOTJ%JR%cs";

    fn full_cert() -> String {
        format!(
            "#   **** Generated curve certificate ****\nmetadata\ncurve\n    public-key = \"{PUBLIC_Z85}\"\n    secret-key = \"{SECRET_Z85}\"\n"
        )
    }

    #[test]
    fn parses_a_full_certificate() {
        let cert = Certificate::parse(&full_cert()).unwrap();
        assert!(cert.secret_key.is_some());
        assert_eq!(
            cert.public_key.as_slice(),
            zmq::z85_decode(PUBLIC_Z85).unwrap().as_slice()
        );
    }

    #[test]
    fn parses_a_public_only_certificate() {
        let text = format!("curve\n    public-key = \"{PUBLIC_Z85}\"\n");
        let cert = Certificate::parse(&text).unwrap();
        assert!(cert.secret_key.is_none());

        let err = cert.require_secret(&PathBuf::from("fe.key")).unwrap_err();
        assert!(matches!(err, TransportError::Credential { .. }));
    }

    #[test]
    fn rejects_missing_public_key() {
        assert!(Certificate::parse("metadata\ncurve\n").is_err());
    }

    #[test]
    fn rejects_wrong_length_keys() {
        let text = "curve\n    public-key = \"tooshort\"\n";
        assert!(Certificate::parse(text).is_err());
    }

    #[test]
    fn load_fails_for_missing_file() {
        let err = Certificate::load(&PathBuf::from("/nonexistent/backend.key")).unwrap_err();
        assert!(matches!(err, TransportError::Credential { .. }));
    }

    #[test]
    fn fingerprint_is_stable_hex() {
        let cert = Certificate::parse(&full_cert()).unwrap();
        let fp = cert.fingerprint();
        assert_eq!(fp.len(), 64);
        assert_eq!(fp, cert.fingerprint());
    }
}

//! Client admission policy
//!
//! The backend authenticates itself with its CURVE key pair; which clients
//! it admits is a separate decision, isolated behind [`AdmissionPolicy`] so
//! a stricter rule can be substituted without touching the dispatch loop.
//! The stock policy is [`AllowAny`]: every client presenting a
//! syntactically valid public key is authorized.

// ----------------------------------------------------------------------------
// Admission Request
// ----------------------------------------------------------------------------

/// One authentication attempt, as presented to the ZAP handler
#[derive(Debug, Clone)]
pub struct AdmissionRequest {
    /// ZAP domain the endpoint was configured with
    pub domain: String,
    /// Network address of the connecting client
    pub address: String,
    /// Security mechanism ("CURVE", "PLAIN", "NULL")
    pub mechanism: String,
    /// Mechanism credential; for CURVE, the client's 32-byte public key
    pub credential: Vec<u8>,
}

// ----------------------------------------------------------------------------
// Policy Trait
// ----------------------------------------------------------------------------

/// Decides whether a connecting client is admitted
pub trait AdmissionPolicy: Send + Sync {
    fn authorize(&self, request: &AdmissionRequest) -> bool;
}

/// Admit any client that completes a valid CURVE handshake
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAny;

impl AdmissionPolicy for AllowAny {
    fn authorize(&self, request: &AdmissionRequest) -> bool {
        request.mechanism == "CURVE" && request.credential.len() == 32
    }
}

/// Admit only clients whose public key appears in a fixed list
#[derive(Debug, Clone, Default)]
pub struct KeyAllowList {
    keys: Vec<[u8; 32]>,
}

impl KeyAllowList {
    pub fn new(keys: Vec<[u8; 32]>) -> Self {
        Self { keys }
    }

    pub fn allow(&mut self, key: [u8; 32]) {
        self.keys.push(key);
    }
}

impl AdmissionPolicy for KeyAllowList {
    fn authorize(&self, request: &AdmissionRequest) -> bool {
        if request.mechanism != "CURVE" {
            return false;
        }
        self.keys
            .iter()
            .any(|key| key.as_slice() == request.credential.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve_request(credential: Vec<u8>) -> AdmissionRequest {
        AdmissionRequest {
            domain: "*".to_string(),
            address: "127.0.0.1".to_string(),
            mechanism: "CURVE".to_string(),
            credential,
        }
    }

    #[test]
    fn allow_any_accepts_valid_curve_keys() {
        let policy = AllowAny;
        assert!(policy.authorize(&curve_request(vec![7u8; 32])));
    }

    #[test]
    fn allow_any_rejects_malformed_credentials() {
        let policy = AllowAny;
        assert!(!policy.authorize(&curve_request(vec![7u8; 16])));

        let mut plain = curve_request(vec![7u8; 32]);
        plain.mechanism = "PLAIN".to_string();
        assert!(!policy.authorize(&plain));
    }

    #[test]
    fn allow_list_admits_only_listed_keys() {
        let mut policy = KeyAllowList::default();
        policy.allow([1u8; 32]);

        assert!(policy.authorize(&curve_request(vec![1u8; 32])));
        assert!(!policy.authorize(&curve_request(vec![2u8; 32])));
    }
}

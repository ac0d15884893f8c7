//! `X-Hub-Signature-256` / `X-Hub-Signature` request authentication.
//!
//! Facebook signs the raw request body with the app secret and sends
//! `sha256=<hex>` (and, on older integrations, only `sha1=<hex>`).

use axum::http::HeaderMap;
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;
use subtle::ConstantTimeEq;

pub const SIGNATURE_256_HEADER: &str = "x-hub-signature-256";
pub const SIGNATURE_LEGACY_HEADER: &str = "x-hub-signature";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    Sha256,
    /// Legacy; only used when the SHA-256 header is absent.
    Sha1,
}

impl SignatureAlgorithm {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha1 => "sha1",
        }
    }
}

impl std::fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.prefix())
    }
}

/// The signature header a request carried, with the algorithm it implies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedSignature {
    pub algorithm: SignatureAlgorithm,
    pub value: Vec<u8>,
}

/// Pick the strongest signature header present. Empty headers count as absent.
pub fn select_signature(headers: &HeaderMap) -> Option<ReceivedSignature> {
    let header = |name: &str| {
        headers
            .get(name)
            .map(|v| v.as_bytes())
            .filter(|v| !v.is_empty())
            .map(<[u8]>::to_vec)
    };

    if let Some(value) = header(SIGNATURE_256_HEADER) {
        return Some(ReceivedSignature {
            algorithm: SignatureAlgorithm::Sha256,
            value,
        });
    }
    header(SIGNATURE_LEGACY_HEADER).map(|value| ReceivedSignature {
        algorithm: SignatureAlgorithm::Sha1,
        value,
    })
}

/// `"<alg>=<lowercase hex HMAC(body, secret)>"`.
pub fn expected_signature(algorithm: SignatureAlgorithm, secret: &[u8], body: &[u8]) -> Option<String> {
    let digest = match algorithm {
        SignatureAlgorithm::Sha256 => hmac_hex::<Hmac<Sha256>>(secret, body)?,
        SignatureAlgorithm::Sha1 => hmac_hex::<Hmac<Sha1>>(secret, body)?,
    };
    Some(format!("{}={}", algorithm.prefix(), digest))
}

fn hmac_hex<M: Mac + KeyInit>(secret: &[u8], body: &[u8]) -> Option<String> {
    let mut mac = <M as Mac>::new_from_slice(secret).ok()?;
    mac.update(body);
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Check a received signature against the body in constant time.
///
/// The comparison covers the whole header value, algorithm prefix included, so
/// a `sha1=` value sent in the SHA-256 header never matches.
pub fn verify_signature(received: &ReceivedSignature, secret: &[u8], body: &[u8]) -> bool {
    let Some(expected) = expected_signature(received.algorithm, secret, body) else {
        return false;
    };
    expected.as_bytes().ct_eq(received.value.as_slice()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &[u8] = b"test_secret";
    const BODY: &[u8] = br#"{"entry":[]}"#;

    fn sign(algorithm: SignatureAlgorithm) -> String {
        expected_signature(algorithm, SECRET, BODY).unwrap()
    }

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn known_sha256_vector() {
        // HMAC-SHA256("key", "The quick brown fox jumps over the lazy dog")
        let sig = expected_signature(
            SignatureAlgorithm::Sha256,
            b"key",
            b"The quick brown fox jumps over the lazy dog",
        )
        .unwrap();
        assert_eq!(
            sig,
            "sha256=f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
    }

    #[test]
    fn known_sha1_vector() {
        let sig = expected_signature(
            SignatureAlgorithm::Sha1,
            b"key",
            b"The quick brown fox jumps over the lazy dog",
        )
        .unwrap();
        assert_eq!(sig, "sha1=de7c9b85b8b78aa6bc8a7a36f70a90701c9db4d9");
    }

    #[test]
    fn prefers_sha256_header() {
        let map = headers(&[
            (SIGNATURE_256_HEADER, "sha256=aa"),
            (SIGNATURE_LEGACY_HEADER, "sha1=bb"),
        ]);
        let selected = select_signature(&map).unwrap();
        assert_eq!(selected.algorithm, SignatureAlgorithm::Sha256);
        assert_eq!(selected.value, b"sha256=aa");
    }

    #[test]
    fn falls_back_to_legacy_header() {
        let map = headers(&[(SIGNATURE_LEGACY_HEADER, "sha1=bb")]);
        let selected = select_signature(&map).unwrap();
        assert_eq!(selected.algorithm, SignatureAlgorithm::Sha1);
    }

    #[test]
    fn empty_strong_header_falls_back() {
        let map = headers(&[(SIGNATURE_256_HEADER, ""), (SIGNATURE_LEGACY_HEADER, "sha1=bb")]);
        assert_eq!(select_signature(&map).unwrap().algorithm, SignatureAlgorithm::Sha1);
    }

    #[test]
    fn no_headers_selects_nothing() {
        assert!(select_signature(&HeaderMap::new()).is_none());
    }

    #[test]
    fn verifies_matching_signature() {
        let received = ReceivedSignature {
            algorithm: SignatureAlgorithm::Sha256,
            value: sign(SignatureAlgorithm::Sha256).into_bytes(),
        };
        assert!(verify_signature(&received, SECRET, BODY));
    }

    #[test]
    fn rejects_mutated_body() {
        let received = ReceivedSignature {
            algorithm: SignatureAlgorithm::Sha256,
            value: sign(SignatureAlgorithm::Sha256).into_bytes(),
        };
        assert!(!verify_signature(&received, SECRET, br#"{"entry":[1]}"#));
    }

    #[test]
    fn rejects_mutated_signature_byte() {
        let mut value = sign(SignatureAlgorithm::Sha256).into_bytes();
        let last = value.len() - 1;
        value[last] = if value[last] == b'0' { b'1' } else { b'0' };
        let received = ReceivedSignature {
            algorithm: SignatureAlgorithm::Sha256,
            value,
        };
        assert!(!verify_signature(&received, SECRET, BODY));
    }

    #[test]
    fn rejects_uppercase_hex() {
        let value = sign(SignatureAlgorithm::Sha256).to_uppercase();
        let received = ReceivedSignature {
            algorithm: SignatureAlgorithm::Sha256,
            value: value.into_bytes(),
        };
        assert!(!verify_signature(&received, SECRET, BODY));
    }

    #[test]
    fn rejects_wrong_prefix_in_strong_header() {
        let received = ReceivedSignature {
            algorithm: SignatureAlgorithm::Sha256,
            value: sign(SignatureAlgorithm::Sha1).into_bytes(),
        };
        assert!(!verify_signature(&received, SECRET, BODY));
    }
}

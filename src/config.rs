//! SSH algorithm preference profiles.
//!
//! Network devices in lab topologies frequently run old SSH server stacks,
//! so the transport ships two algorithm orderings: a strict modern profile
//! and a legacy-compatible one that keeps CBC ciphers and group1 key
//! exchange available. The profile is chosen per connection through
//! [`Credentials`](crate::transport::Credentials).

use std::borrow::Cow;

use russh::keys::{Algorithm, EcdsaCurve, HashAlg};
use russh::{Preferred, cipher, compression, kex, mac};
use serde::{Deserialize, Serialize};

/// SSH algorithm policy applied when dialing a device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityLevel {
    /// Strict modern algorithms only.
    Secure,
    /// Maximum compatibility with legacy network operating systems.
    ///
    /// The default: lab device images routinely predate modern cipher
    /// suites.
    #[default]
    LegacyCompatible,
}

/// Modern key exchange algorithms.
pub const SECURE_KEX_ORDER: &[kex::Name] = &[
    kex::CURVE25519,
    kex::CURVE25519_PRE_RFC_8731,
    kex::DH_G16_SHA512,
    kex::DH_G14_SHA256,
    kex::ECDH_SHA2_NISTP256,
    kex::ECDH_SHA2_NISTP384,
    kex::ECDH_SHA2_NISTP521,
];

/// Key exchange algorithms including legacy Diffie-Hellman variants.
pub const LEGACY_KEX_ORDER: &[kex::Name] = &[
    kex::CURVE25519,
    kex::CURVE25519_PRE_RFC_8731,
    kex::DH_GEX_SHA1,
    kex::DH_GEX_SHA256,
    kex::DH_G1_SHA1,
    kex::DH_G14_SHA1,
    kex::DH_G14_SHA256,
    kex::DH_G15_SHA512,
    kex::DH_G16_SHA512,
    kex::DH_G17_SHA512,
    kex::DH_G18_SHA512,
    kex::ECDH_SHA2_NISTP256,
    kex::ECDH_SHA2_NISTP384,
    kex::ECDH_SHA2_NISTP521,
];

/// Modern ciphers.
pub static SECURE_CIPHERS: &[cipher::Name] = &[
    cipher::CHACHA20_POLY1305,
    cipher::AES_256_GCM,
    cipher::AES_256_CTR,
    cipher::AES_192_CTR,
    cipher::AES_128_CTR,
];

/// Ciphers including legacy CBC modes.
pub static LEGACY_CIPHERS: &[cipher::Name] = &[
    cipher::CHACHA20_POLY1305,
    cipher::AES_256_GCM,
    cipher::AES_256_CTR,
    cipher::AES_192_CTR,
    cipher::AES_128_CTR,
    cipher::AES_256_CBC,
    cipher::AES_192_CBC,
    cipher::AES_128_CBC,
];

/// Modern MAC algorithms (ETM variants preferred).
pub const SECURE_MAC_ALGORITHMS: &[mac::Name] = &[
    mac::HMAC_SHA512_ETM,
    mac::HMAC_SHA256_ETM,
    mac::HMAC_SHA512,
    mac::HMAC_SHA256,
];

/// MAC algorithms including HMAC-SHA1 for older devices.
pub const LEGACY_MAC_ALGORITHMS: &[mac::Name] = &[
    mac::HMAC_SHA512_ETM,
    mac::HMAC_SHA256_ETM,
    mac::HMAC_SHA512,
    mac::HMAC_SHA256,
    mac::HMAC_SHA1_ETM,
    mac::HMAC_SHA1,
];

/// Compression is negotiated off by default; ZLIB stays available.
pub const DEFAULT_COMPRESSION_ALGORITHMS: &[compression::Name] = &[
    compression::NONE,
    compression::ZLIB,
    compression::ZLIB_LEGACY,
];

/// Modern host key algorithms.
pub const SECURE_KEY_TYPES: &[Algorithm] = &[
    Algorithm::Ed25519,
    Algorithm::Ecdsa {
        curve: EcdsaCurve::NistP256,
    },
    Algorithm::Ecdsa {
        curve: EcdsaCurve::NistP384,
    },
    Algorithm::Ecdsa {
        curve: EcdsaCurve::NistP521,
    },
    Algorithm::Rsa {
        hash: Some(HashAlg::Sha512),
    },
    Algorithm::Rsa {
        hash: Some(HashAlg::Sha256),
    },
];

/// Host key algorithms including legacy RSA/DSA.
pub const LEGACY_KEY_TYPES: &[Algorithm] = &[
    Algorithm::Ed25519,
    Algorithm::Ecdsa {
        curve: EcdsaCurve::NistP256,
    },
    Algorithm::Ecdsa {
        curve: EcdsaCurve::NistP384,
    },
    Algorithm::Ecdsa {
        curve: EcdsaCurve::NistP521,
    },
    Algorithm::Rsa {
        hash: Some(HashAlg::Sha512),
    },
    Algorithm::Rsa {
        hash: Some(HashAlg::Sha256),
    },
    Algorithm::Rsa { hash: None },
    Algorithm::Dsa,
];

/// Assemble the russh preference table for a security level.
pub fn preferred(level: SecurityLevel) -> Preferred {
    match level {
        SecurityLevel::Secure => Preferred {
            kex: Cow::Borrowed(SECURE_KEX_ORDER),
            key: Cow::Borrowed(SECURE_KEY_TYPES),
            cipher: Cow::Borrowed(SECURE_CIPHERS),
            mac: Cow::Borrowed(SECURE_MAC_ALGORITHMS),
            compression: Cow::Borrowed(DEFAULT_COMPRESSION_ALGORITHMS),
        },
        SecurityLevel::LegacyCompatible => Preferred {
            kex: Cow::Borrowed(LEGACY_KEX_ORDER),
            key: Cow::Borrowed(LEGACY_KEY_TYPES),
            cipher: Cow::Borrowed(LEGACY_CIPHERS),
            mac: Cow::Borrowed(LEGACY_MAC_ALGORITHMS),
            compression: Cow::Borrowed(DEFAULT_COMPRESSION_ALGORITHMS),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{SecurityLevel, preferred};
    use russh::{cipher, kex, mac};

    #[test]
    fn secure_profile_excludes_weak_algorithms() {
        let p = preferred(SecurityLevel::Secure);
        assert!(p.kex.iter().all(|alg| *alg != kex::DH_G1_SHA1));
        assert!(p.cipher.iter().all(|alg| *alg != cipher::AES_128_CBC));
        assert!(p.mac.iter().all(|alg| *alg != mac::HMAC_SHA1));
    }

    #[test]
    fn legacy_profile_keeps_broad_compatibility_algorithms() {
        let p = preferred(SecurityLevel::LegacyCompatible);
        assert!(p.kex.contains(&kex::DH_G1_SHA1));
        assert!(p.cipher.contains(&cipher::AES_128_CBC));
        assert!(p.mac.contains(&mac::HMAC_SHA1));
    }

    #[test]
    fn default_level_is_legacy_compatible() {
        assert_eq!(SecurityLevel::default(), SecurityLevel::LegacyCompatible);
    }
}

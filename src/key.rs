// model = "claude-opus-4-5"
// created = "2026-08-05"
// modified = "2026-08-07"
// driver = "Isaac Clayton"

//! Author identities for the version chain.
//!
//! Every accepted modification to a shared document is attributed to an
//! author, and authors are identified by ed25519 public keys. The chain
//! signs each appended version's history hash with the author's keypair,
//! so a store can later prove who produced which span of history.

use blake3::Hasher;
use ed25519_dalek::Signer;
use ed25519_dalek::SigningKey;
use ed25519_dalek::Verifier;
use ed25519_dalek::VerifyingKey;
use rand_core::OsRng;

/// An author's public key, 32 bytes on the ed25519 curve.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPub(pub [u8; 32]);

/// An author's secret key, 32 bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct KeySec(pub [u8; 32]);

/// A keypair bundles a public and secret key together.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub key_pub: KeyPub,
    pub key_sec: KeySec,
}

/// A signature over a version's history hash, 64 bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

/// A blake3 hash, 32 bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Hash(pub [u8; 32]);

/// Hash a message using blake3.
pub fn hash(message: &[u8]) -> Hash {
    let mut hasher = Hasher::new();
    hasher.update(message);
    let result = hasher.finalize();
    return Hash(*result.as_bytes());
}

impl KeyPair {
    /// Generate a random keypair.
    pub fn generate() -> KeyPair {
        let signing = SigningKey::generate(&mut OsRng);
        let verifying = signing.verifying_key();
        return KeyPair {
            key_pub: KeyPub(verifying.to_bytes()),
            key_sec: KeySec(signing.to_bytes()),
        };
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Signature {
        let signing = SigningKey::from_bytes(&self.key_sec.0);
        return Signature(signing.sign(message).to_bytes());
    }
}

impl KeyPub {
    /// Verify a signature against this public key.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let verifying = match VerifyingKey::from_bytes(&self.0) {
            Ok(v) => v,
            Err(_) => return false,
        };
        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
        return verifying.verify(message, &sig).is_ok();
    }

    /// Short hex prefix, enough to tell authors apart in output.
    pub fn short(&self) -> String {
        return hex(&self.0[..8]);
    }
}

fn hex(bytes: &[u8]) -> String {
    return bytes.iter().map(|b| format!("{:02x}", b)).collect();
}

impl std::fmt::Debug for KeyPub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "KeyPub({}..)", self.short());
    }
}

impl std::fmt::Debug for KeySec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "KeySec({}..)", hex(&self.0[..8]));
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "KeyPair({}..)", self.key_pub.short());
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "Signature({}..)", hex(&self.0[..8]));
    }
}

impl std::fmt::Debug for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "Hash({}..)", hex(&self.0[..8]));
    }
}

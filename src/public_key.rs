use ed25519_dalek::{Verifier, VerifyingKey};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};

const PUBLIC_KEY_BYTE_COUNT: usize = 32;

/// The ed25519 public key that owns a transaction output.
/// Only the holder of the matching secret key can produce signatures that spend the output.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct PublicKey([u8; PUBLIC_KEY_BYTE_COUNT]);

impl PublicKey {
    pub const fn from_bytes(bytes: [u8; PUBLIC_KEY_BYTE_COUNT]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_BYTE_COUNT] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, String> {
        let bytes = hex::decode(s).map_err(|e| e.to_string())?;
        if bytes.len() != PUBLIC_KEY_BYTE_COUNT {
            return Err(format!(
                "Invalid public key length. Expected: {} but got: {} in: {}",
                PUBLIC_KEY_BYTE_COUNT,
                bytes.len(),
                s
            ));
        }
        let mut key = [0; PUBLIC_KEY_BYTE_COUNT];
        key.copy_from_slice(&bytes);
        Ok(Self(key))
    }

    /// Returns true iff `signature` is a valid signature of `message` under this key.
    /// Keys that are not valid curve points and malformed signatures never verify.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let verifying_key = match VerifyingKey::from_bytes(&self.0) {
            Ok(verifying_key) => verifying_key,
            Err(_) => return false,
        };
        let signature = match ed25519_dalek::Signature::from_slice(signature.as_slice()) {
            Ok(signature) => signature,
            Err(_) => return false,
        };
        verifying_key.verify(message, &signature).is_ok()
    }
}

impl From<&VerifyingKey> for PublicKey {
    fn from(verifying_key: &VerifyingKey) -> Self {
        Self(verifying_key.to_bytes())
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            PublicKey::from_hex(&s).map_err(D::Error::custom)
        } else {
            <[u8; PUBLIC_KEY_BYTE_COUNT]>::deserialize(deserializer).map(PublicKey)
        }
    }
}

/// Signature bytes attached to a transaction input.
/// The length is not checked here; a signature of the wrong size simply fails to verify.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Signature(Vec<u8>);

impl Signature {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl From<ed25519_dalek::Signature> for Signature {
    fn from(signature: ed25519_dalek::Signature) -> Self {
        Self(signature.to_bytes().to_vec())
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&hex::encode(&self.0))
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            hex::decode(&s).map(Signature).map_err(D::Error::custom)
        } else {
            Vec::<u8>::deserialize(deserializer).map(Signature)
        }
    }
}

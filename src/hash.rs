use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::Digest;
use std::fmt::{Display, Formatter};

const SHA256_BYTE_COUNT: usize = 32;

/// Sha-256 is a 256-bit array or 32 bytes.
/// It provides an API to display as hex-encoded string and parse it from a hex-encoded string.
/// Human-readable formats (JSON) carry it as a hex string, binary formats as raw bytes.
#[derive(Copy, Clone, Debug, Hash, Ord, PartialOrd, Eq, PartialEq)]
pub struct Sha256([u8; SHA256_BYTE_COUNT]);

impl Sha256 {
    pub const fn from_raw(raw_bytes: [u8; SHA256_BYTE_COUNT]) -> Self {
        Self(raw_bytes)
    }

    pub fn digest(data: &[u8]) -> Self {
        let mut hasher = sha2::Sha256::new();
        hasher.update(data);
        let mut output = [0; SHA256_BYTE_COUNT];
        output.copy_from_slice(hasher.finalize().as_slice());
        Sha256::from_raw(output)
    }

    /// SHA-256 applied twice, which is how transaction ids are derived.
    pub fn double_digest(data: &[u8]) -> Self {
        let first_hash = Self::digest(data);
        Self::digest(first_hash.as_slice())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0[..]
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.as_slice())
    }

    pub fn from_hex(s: &str) -> Result<Self, String> {
        let bytes = hex::decode(s).map_err(|e| e.to_string())?;
        if bytes.len() != SHA256_BYTE_COUNT {
            return Err(format!(
                "Invalid SHA-256 length. Expected: {} but got: {} in: {}",
                SHA256_BYTE_COUNT,
                bytes.len(),
                s
            ));
        }
        let mut sha = [0; SHA256_BYTE_COUNT];
        sha.copy_from_slice(&bytes);
        Ok(Sha256::from_raw(sha))
    }
}

impl Display for Sha256 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Sha256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Sha256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Sha256::from_hex(&s).map_err(D::Error::custom)
        } else {
            <[u8; SHA256_BYTE_COUNT]>::deserialize(deserializer).map(Sha256::from_raw)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_hello_world() {
        assert_eq!(
            Sha256::digest(b"hello world").to_hex(),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn double_digest_hashes_the_first_digest() {
        let first = Sha256::digest(b"hello world");
        assert_eq!(
            Sha256::double_digest(b"hello world"),
            Sha256::digest(first.as_slice())
        );
    }

    #[test]
    fn from_hex_parses_its_own_output() {
        let hash = Sha256::digest(b"scrooge");
        assert_eq!(Sha256::from_hex(&hash.to_hex()), Ok(hash));
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        let err = Sha256::from_hex("abcd").unwrap_err();
        assert!(err.contains("Expected: 32 but got: 2"), "{}", err);
    }

    #[test]
    fn from_hex_rejects_non_hex() {
        assert!(Sha256::from_hex("zz").is_err());
    }

    #[test]
    fn json_uses_hex_string() {
        let hash = Sha256::from_raw([0xab; 32]);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", "ab".repeat(32)));
        let parsed: Sha256 = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, hash);
    }

    #[test]
    fn bincode_uses_raw_bytes() {
        let hash = Sha256::from_raw([7; 32]);
        let encoded = bincode::serialize(&hash).unwrap();
        assert_eq!(encoded, vec![7; 32]);
    }
}

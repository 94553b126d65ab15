//! Public key abstraction.
//!
//! Fragment constructors only need two things from a key: whether it is well formed
//! and its raw serialization. Any key implementation can be plugged in through
//! [`PublicKey`]; [`CompressedPublicKey`] covers the common 33-byte SEC1 encoding.

/// Key material accepted by the key terminals.
pub trait PublicKey {
    /// Returns true if the key is well formed. Constructors reject invalid keys.
    fn is_valid(&self) -> bool;

    /// Raw serialization of the key, as pushed by the script template.
    fn to_bytes(&self) -> Vec<u8>;
}

impl<K: PublicKey + ?Sized> PublicKey for &K {
    fn is_valid(&self) -> bool {
        (**self).is_valid()
    }

    fn to_bytes(&self) -> Vec<u8> {
        (**self).to_bytes()
    }
}

/// A SEC1 compressed public key: a `0x02` or `0x03` parity prefix followed by the
/// 32-byte x coordinate.
///
/// The bytes are stored as given. Validity is only checked through
/// [`PublicKey::is_valid`], so malformed keys can be represented and rejected by the
/// fragment constructors.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompressedPublicKey {
    bytes: Vec<u8>,
}

impl CompressedPublicKey {
    pub const SIZE: usize = 33;

    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    /// Decode a key from its hexadecimal form. The decoded bytes are not validated.
    pub fn from_hex(hex_str: &str) -> Result<Self, hex::FromHexError> {
        hex::decode(hex_str).map(|bytes| Self { bytes })
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl PublicKey for CompressedPublicKey {
    fn is_valid(&self) -> bool {
        self.bytes.len() == Self::SIZE && matches!(self.bytes[0], 0x02 | 0x03)
    }

    fn to_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}

impl std::fmt::Display for CompressedPublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(&self.bytes))
    }
}

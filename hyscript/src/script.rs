//! Script templates.
//!
//! A fragment describes the script a verifier executes as an ordered list of
//! [`ScriptElement`]s. Turning a template into executable bytes is left to the
//! caller; this module only fixes the vocabulary.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use strum::{EnumIs, EnumTryAs};

/// Ordered elements of a fragment script. Terminals rarely need more than one.
pub type ScriptTemplate = SmallVec<ScriptElement, 1>;

/// A single script opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(transparent)]
pub struct Opcode(pub u8);

impl Opcode {
    pub const OP_0: Self = Self(0x00);
    pub const OP_1: Self = Self(0x51);
    pub const OP_VERIFY: Self = Self(0x69);
    pub const OP_EQUAL: Self = Self(0x87);
    pub const OP_EQUALVERIFY: Self = Self(0x88);
    pub const OP_CHECKSIG: Self = Self(0xac);
    pub const OP_CHECKSIGVERIFY: Self = Self(0xad);
    pub const OP_CHECKMULTISIG: Self = Self(0xae);
    pub const OP_CHECKMULTISIGVERIFY: Self = Self(0xaf);

    /// Returns true if this opcode has a `VERIFY` counterpart, in which case a fragment
    /// ending with it can be verify-wrapped without an extra `OP_VERIFY`.
    ///
    /// Fragments ending with any other opcode carry the `x` property.
    pub const fn has_verify_form(self) -> bool {
        matches!(
            self,
            Self::OP_EQUAL | Self::OP_CHECKSIG | Self::OP_CHECKMULTISIG
        )
    }

    /// The `VERIFY` counterpart of this opcode, see [`Opcode::has_verify_form`].
    pub const fn verify_form(self) -> Option<Self> {
        match self {
            Self::OP_EQUAL => Some(Self::OP_EQUALVERIFY),
            Self::OP_CHECKSIG => Some(Self::OP_CHECKSIGVERIFY),
            Self::OP_CHECKMULTISIG => Some(Self::OP_CHECKMULTISIGVERIFY),
            _ => None,
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match *self {
            Self::OP_0 => "OP_0",
            Self::OP_1 => "OP_1",
            Self::OP_VERIFY => "OP_VERIFY",
            Self::OP_EQUAL => "OP_EQUAL",
            Self::OP_EQUALVERIFY => "OP_EQUALVERIFY",
            Self::OP_CHECKSIG => "OP_CHECKSIG",
            Self::OP_CHECKSIGVERIFY => "OP_CHECKSIGVERIFY",
            Self::OP_CHECKMULTISIG => "OP_CHECKMULTISIG",
            Self::OP_CHECKMULTISIGVERIFY => "OP_CHECKMULTISIGVERIFY",
            Self(other) => return write!(f, "OP_UNKNOWN(0x{:02x})", other),
        };
        f.write_str(name)
    }
}

/// One element of a script template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs, EnumTryAs)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScriptElement {
    /// Push of raw data (keys, hashes, numbers).
    Push(Vec<u8>),
    /// A bare opcode.
    Op(Opcode),
}

impl std::fmt::Display for ScriptElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptElement::Push(data) => write!(f, "<{}>", hex::encode(data)),
            ScriptElement::Op(opcode) => write!(f, "{}", opcode),
        }
    }
}

/// Formatting helper rendering a template as space separated elements,
/// e.g. `<02…> OP_CHECKSIG`.
pub fn fmt_template(template: &[ScriptElement]) -> impl std::fmt::Display + '_ {
    struct Fmt<'a>(&'a [ScriptElement]);

    impl std::fmt::Display for Fmt<'_> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            for (i, element) in self.0.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{}", element)?;
            }
            Ok(())
        }
    }

    Fmt(template)
}

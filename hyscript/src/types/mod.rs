//! Types module
//!
//! Every fragment carries a [`Type`]: one base type (`B`, `V`, `K` or `W`) together
//! with a set of correctness and malleability properties. The module is split in
//! three layers:
//!
//! - The raw bits and the alphabet of one-letter tags (see `property.rs`).
//! - The validity table every type must satisfy (see `rules.rs`).
//! - The validated [`Type`] wrapper, which can only be obtained through a
//!   constructor that checks the table.
//!
//! The textual form of a type lists its tags in the canonical order
//! `B V K W z o n d u e f s m x`:
//!
//! ```rust
//! # use hyscript::types::Type;
//! let ty: Type = "Konudems".parse().unwrap();
//! assert_eq!(ty.canonical_text(), "Konduesm");
//! assert!("Kq".parse::<Type>().is_err());
//! ```
use std::str::FromStr;

use log::trace;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, ScriptResult};

pub mod property;
pub mod rules;

pub use property::{BaseType, Property, PropertyFlags};
pub use rules::TypeRule;

/// A validated fragment type.
///
/// The wrapped flags always satisfy every [`TypeRule`]. Changing a type means deriving
/// a new one through [`Type::from_flags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct Type {
    flags: PropertyFlags,
}

impl Type {
    /// Validate `flags` against the rule table.
    pub fn from_flags(flags: PropertyFlags) -> ScriptResult<Self> {
        match TypeRule::first_violated(flags) {
            None => Ok(Self { flags }),
            Some(rule) => {
                trace!("Rejected property set `{}` ({:#06x}): {}", flags, flags.bits(), rule);
                Err(Error::InvalidPropertyCombination { flags, rule })
            }
        }
    }

    /// Parse a type from its one-letter tags.
    ///
    /// Letters may appear in any order and may be repeated. Unknown letters are
    /// reported before the rule table is evaluated.
    pub fn parse(letters: &str) -> ScriptResult<Self> {
        let flags = letters.chars().try_fold(PropertyFlags::empty(), |acc, tag| {
            Property::from_letter(tag)
                .map(|property| acc | property.flag())
                .ok_or(Error::UnknownPropertyTag { tag })
        })?;
        Self::from_flags(flags)
    }

    /// Tags of this type in canonical order.
    pub fn canonical_text(&self) -> String {
        self.flags.to_string()
    }

    /// Evaluate the rule table on this type.
    ///
    /// Always true for a constructed [`Type`].
    #[inline]
    pub fn is_valid(&self) -> bool {
        TypeRule::first_violated(self.flags).is_none()
    }

    #[inline]
    pub fn flags(&self) -> PropertyFlags {
        self.flags
    }

    pub fn base(&self) -> BaseType {
        let base = BaseType::from_flags(self.flags);
        debug_assert!(
            base.is_some(),
            "validated type `{}` must carry exactly one base type",
            self.flags
        );
        base.unwrap_or(BaseType::Base)
    }

    #[inline]
    pub fn has(&self, property: Property) -> bool {
        self.flags.contains(property.flag())
    }

    /// Properties of this type in canonical order.
    pub fn properties(&self) -> impl Iterator<Item = Property> {
        self.flags.properties()
    }

    /// Returns true if this type carries every flag of `other`.
    ///
    /// This is the subtyping check used to ask whether a fragment can stand where a
    /// given type is required, e.g. a top-level fragment must satisfy `B`.
    #[inline]
    pub fn satisfies(&self, other: &Type) -> bool {
        self.flags.contains(other.flags)
    }

    /// Like [`Type::satisfies`], for a set of flags that need not form a valid type
    /// on its own (e.g. `ms`).
    #[inline]
    pub fn satisfies_flags(&self, flags: PropertyFlags) -> bool {
        self.flags.contains(flags)
    }
}

impl FromStr for Type {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<PropertyFlags> for Type {
    type Error = Error;

    fn try_from(flags: PropertyFlags) -> Result<Self, Self::Error> {
        Self::from_flags(flags)
    }
}

impl TryFrom<String> for Type {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Type> for String {
    fn from(value: Type) -> Self {
        value.canonical_text()
    }
}

impl From<Type> for PropertyFlags {
    fn from(value: Type) -> Self {
        value.flags
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.flags, f)
    }
}

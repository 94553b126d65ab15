//! Witness builders.
//!
//! A fragment does not hold concrete witness data. Its satisfying and dissatisfying
//! witnesses are *builders*: ordered lists of [`WitnessElement`]s naming the material
//! a spender must supply (a signature for some key, the preimage of some hash, ...).
//! [`Witness::resolve`] turns a builder into concrete stack items by asking a
//! [`Satisfier`] for that material.
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use strum::{EnumIs, EnumIter, EnumTryAs};

use crate::{
    error::{Error, ScriptResult},
    key::PublicKey,
    lift::ThresholdDescriptor,
};

/// Kind of data a witness element supplies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIs, EnumIter, strum::Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[strum(serialize_all = "lowercase")]
pub enum WitnessKind {
    /// A signature for a given public key.
    Signature,
    /// The preimage of a given hash.
    Preimage,
    /// A k-of-n combination of branch witnesses.
    Threshold,
}

/// One element of a witness builder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs, EnumTryAs)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WitnessElement {
    /// A signature by the key with the given serialization.
    Signature { key: Vec<u8> },
    /// The preimage of the given hash.
    Preimage { hash: Vec<u8> },
    /// A choice of `k` among several branch witnesses.
    Threshold(ThresholdDescriptor),
    /// The canonical empty push. Never a valid signature nor preimage.
    Empty,
}

impl WitnessElement {
    pub fn signature<K: PublicKey + ?Sized>(key: &K) -> Self {
        WitnessElement::Signature {
            key: key.to_bytes(),
        }
    }

    /// Kind of material this element asks for, `None` for the empty placeholder.
    pub fn kind(&self) -> Option<WitnessKind> {
        match self {
            WitnessElement::Signature { .. } => Some(WitnessKind::Signature),
            WitnessElement::Preimage { .. } => Some(WitnessKind::Preimage),
            WitnessElement::Threshold(_) => Some(WitnessKind::Threshold),
            WitnessElement::Empty => None,
        }
    }

    /// Append the stack items of this element to `stack`.
    pub fn resolve_into<S: Satisfier + ?Sized>(
        &self,
        satisfier: &S,
        stack: &mut Vec<Vec<u8>>,
    ) -> ScriptResult<()> {
        match self {
            WitnessElement::Signature { key } => {
                let signature =
                    satisfier
                        .lookup_signature(key)
                        .ok_or(Error::MissingWitnessMaterial {
                            kind: WitnessKind::Signature,
                        })?;
                stack.push(signature);
            }
            WitnessElement::Preimage { hash } => {
                let preimage =
                    satisfier
                        .lookup_preimage(hash)
                        .ok_or(Error::MissingWitnessMaterial {
                            kind: WitnessKind::Preimage,
                        })?;
                stack.push(preimage);
            }
            WitnessElement::Threshold(descriptor) => {
                stack.extend(descriptor.resolve(satisfier)?);
            }
            WitnessElement::Empty => stack.push(Vec::new()),
        }
        Ok(())
    }
}

impl std::fmt::Display for WitnessElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WitnessElement::Signature { key } => write!(f, "sig({})", hex::encode(key)),
            WitnessElement::Preimage { hash } => write!(f, "preimage({})", hex::encode(hash)),
            WitnessElement::Threshold(descriptor) => write!(f, "{}", descriptor),
            WitnessElement::Empty => f.write_str("<>"),
        }
    }
}

/// Ordered witness builder of a fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(from = "Vec<WitnessElement>", into = "Vec<WitnessElement>")
)]
pub struct Witness {
    elements: SmallVec<WitnessElement, 1>,
}

impl Witness {
    pub fn new(elements: impl IntoIterator<Item = WitnessElement>) -> Self {
        Self {
            elements: elements.into_iter().collect(),
        }
    }

    /// Witness made of a single element.
    pub fn single(element: WitnessElement) -> Self {
        Self::new([element])
    }

    #[inline]
    pub fn elements(&self) -> &[WitnessElement] {
        &self.elements
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Kind of each element, in order. The empty placeholder has no kind.
    pub fn kinds(&self) -> impl Iterator<Item = Option<WitnessKind>> + '_ {
        self.elements.iter().map(WitnessElement::kind)
    }

    /// Build the concrete stack items of this witness, in order.
    ///
    /// Fails with [`Error::MissingWitnessMaterial`] as soon as one element cannot be
    /// resolved; no partial witness is returned.
    pub fn resolve<S: Satisfier + ?Sized>(&self, satisfier: &S) -> ScriptResult<Vec<Vec<u8>>> {
        let mut stack = Vec::with_capacity(self.elements.len());
        for element in self.elements.iter() {
            element.resolve_into(satisfier, &mut stack)?;
        }
        Ok(stack)
    }
}

impl From<Vec<WitnessElement>> for Witness {
    fn from(value: Vec<WitnessElement>) -> Self {
        Self::new(value)
    }
}

impl From<Witness> for Vec<WitnessElement> {
    fn from(value: Witness) -> Self {
        value.elements.into_iter().collect()
    }
}

impl FromIterator<WitnessElement> for Witness {
    fn from_iter<T: IntoIterator<Item = WitnessElement>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl std::fmt::Display for Witness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[")?;
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", element)?;
        }
        f.write_str("]")
    }
}

/// Source of the secret material needed to resolve witnesses.
///
/// Every lookup defaults to "not available", implementors only override what they
/// can provide.
pub trait Satisfier {
    /// Signature by the key serialized as `key`.
    fn lookup_signature(&self, _key: &[u8]) -> Option<Vec<u8>> {
        None
    }

    /// Preimage of `hash`.
    fn lookup_preimage(&self, _hash: &[u8]) -> Option<Vec<u8>> {
        None
    }
}

impl<S: Satisfier + ?Sized> Satisfier for &S {
    fn lookup_signature(&self, key: &[u8]) -> Option<Vec<u8>> {
        (**self).lookup_signature(key)
    }

    fn lookup_preimage(&self, hash: &[u8]) -> Option<Vec<u8>> {
        (**self).lookup_preimage(hash)
    }
}

/// Map-backed [`Satisfier`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SatisfactionMaterial {
    signatures: HashMap<Vec<u8>, Vec<u8>>,
    preimages: HashMap<Vec<u8>, Vec<u8>>,
}

impl SatisfactionMaterial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `signature` as a signature by `key`. Replaces any previous one.
    pub fn with_signature<K: PublicKey + ?Sized>(mut self, key: &K, signature: Vec<u8>) -> Self {
        self.signatures.insert(key.to_bytes(), signature);
        self
    }

    /// Register `preimage` as the preimage of `hash`. Replaces any previous one.
    pub fn with_preimage(mut self, hash: Vec<u8>, preimage: Vec<u8>) -> Self {
        self.preimages.insert(hash, preimage);
        self
    }
}

impl Satisfier for SatisfactionMaterial {
    fn lookup_signature(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.signatures.get(key).cloned()
    }

    fn lookup_preimage(&self, hash: &[u8]) -> Option<Vec<u8>> {
        self.preimages.get(hash).cloned()
    }
}

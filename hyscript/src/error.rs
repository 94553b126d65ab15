use strum::{EnumIs, EnumTryAs};
use thiserror::Error;

use crate::{
    node::FragmentKind,
    types::{PropertyFlags, TypeRule},
    witness::WitnessKind,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs, EnumTryAs, Error)]
pub enum Error {
    /// A type string contains a letter outside of the property alphabet.
    #[error(
        "Unknown property tag `{tag}`. Accepted tags are `B`, `V`, `K`, `W`, `z`, `o`, `n`, `d`, `u`, `e`, `f`, `s`, `m` and `x`."
    )]
    UnknownPropertyTag { tag: char },

    /// The parsed or derived flags violate the type validity table.
    #[error("Property tags `{flags}` do not form a valid type: {rule}.")]
    InvalidPropertyCombination { flags: PropertyFlags, rule: TypeRule },

    /// The kind-specific input of a fragment constructor failed its precondition.
    #[error("Invalid input for fragment `{kind}`: {reason}.")]
    InvalidConstructorInput { kind: FragmentKind, reason: String },

    /// The fragment kind is declared but has no derivation rule yet.
    #[error(
        "Fragment `{kind}` is declared but has no derivation rule. It cannot be constructed."
    )]
    UnsupportedFragmentKind { kind: FragmentKind },

    /// A threshold must select at least one and at most all of its branches.
    #[error("Invalid threshold {k}-of-{n}: `k` must lie within `1..={n}`.")]
    InvalidThreshold { k: usize, n: usize },

    /// A witness could not be resolved because the satisfier lacks some material.
    #[error("No {kind} material is available to resolve the witness.")]
    MissingWitnessMaterial { kind: WitnessKind },
}

pub type ScriptResult<T> = Result<T, Error>;

//! Fragments.
//!
//! A [`Node`] is one fragment of an expression tree. It couples the script template a
//! verifier executes with the witness builders that satisfy or dissatisfy it, and with
//! the [`Type`] inferred for it. Nodes are only built through [`Node::construct`],
//! which dispatches to one derivation function per [`FragmentKind`], and are immutable
//! afterwards.
//!
//! Only the public-key terminal has a derivation rule so far. Every other kind is
//! declared so that expression trees can name it, and constructing it reports
//! [`Error::UnsupportedFragmentKind`].
use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use smallvec::smallvec;
use strum::{EnumIs, EnumIter};

use crate::{
    error::{Error, ScriptResult},
    key::PublicKey,
    lift::SatisfactionExpr,
    script::{ScriptElement, ScriptTemplate, fmt_template},
    types::{BaseType, Property, PropertyFlags, Type},
    witness::{Witness, WitnessElement},
};

/// Variety of a fragment: terminals, wrappers and combinators.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIs, EnumIter, strum::Display,
)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FragmentKind {
    // Constants
    #[strum(to_string = "0")]
    Just0,
    #[strum(to_string = "1")]
    Just1,

    // Keys
    #[strum(to_string = "pk")]
    Pk,
    #[strum(to_string = "pk_h")]
    PkH,

    // Timelocks
    #[strum(to_string = "older")]
    Older,
    #[strum(to_string = "after")]
    After,

    // Hashlocks
    #[strum(to_string = "sha256")]
    Sha256,
    #[strum(to_string = "hash256")]
    Hash256,
    #[strum(to_string = "ripemd160")]
    Ripemd160,
    #[strum(to_string = "hash160")]
    Hash160,

    // Wrappers
    #[strum(to_string = "a")]
    WrapA,
    #[strum(to_string = "s")]
    WrapS,
    #[strum(to_string = "c")]
    WrapC,
    #[strum(to_string = "d")]
    WrapD,
    #[strum(to_string = "v")]
    WrapV,
    #[strum(to_string = "j")]
    WrapJ,
    #[strum(to_string = "n")]
    WrapN,

    // Combinators
    #[strum(to_string = "and_v")]
    AndV,
    #[strum(to_string = "and_b")]
    AndB,
    #[strum(to_string = "or_b")]
    OrB,
    #[strum(to_string = "or_c")]
    OrC,
    #[strum(to_string = "or_d")]
    OrD,
    #[strum(to_string = "or_i")]
    OrI,
    #[strum(to_string = "andor")]
    AndOr,
    #[strum(to_string = "thresh")]
    Thresh,
    #[strum(to_string = "thresh_m")]
    ThreshM,
}

/// Derivation rule of a fragment kind.
type Derivation = fn(FragmentArgs<'_>) -> ScriptResult<Derived>;

impl FragmentKind {
    /// Returns true for kinds without child fragments.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            FragmentKind::Just0
                | FragmentKind::Just1
                | FragmentKind::Pk
                | FragmentKind::PkH
                | FragmentKind::Older
                | FragmentKind::After
                | FragmentKind::Sha256
                | FragmentKind::Hash256
                | FragmentKind::Ripemd160
                | FragmentKind::Hash160
                | FragmentKind::ThreshM
        )
    }

    /// Returns true for the single-child wrappers (`a:`, `s:`, `c:`, ...).
    pub fn is_wrapper(self) -> bool {
        matches!(
            self,
            FragmentKind::WrapA
                | FragmentKind::WrapS
                | FragmentKind::WrapC
                | FragmentKind::WrapD
                | FragmentKind::WrapV
                | FragmentKind::WrapJ
                | FragmentKind::WrapN
        )
    }

    /// Returns true if [`Node::construct`] can build this kind.
    pub fn is_supported(self) -> bool {
        self.derivation().is_some()
    }

    fn derivation(self) -> Option<Derivation> {
        match self {
            FragmentKind::Pk => Some(derive_pk),
            _ => None,
        }
    }
}

/// Kind-specific constructor input.
pub enum FragmentArgs<'a> {
    /// No input (constants).
    None,
    /// A single public key (`pk`, `pk_h`).
    Key(&'a dyn PublicKey),
    /// `k` among several public keys (`thresh_m`).
    Keys {
        k: usize,
        keys: Vec<&'a dyn PublicKey>,
    },
    /// A hash digest (hashlocks).
    Hash(Vec<u8>),
    /// A relative or absolute lock time (`older`, `after`).
    Timelock(u32),
    /// Already constructed children, in order (wrappers, `and_*`, `or_*`, `andor`).
    Children(Vec<Node>),
    /// `k` among already constructed children (`thresh`).
    Threshold { k: usize, children: Vec<Node> },
}

impl FragmentArgs<'_> {
    /// Short description of the input shape, used in error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            FragmentArgs::None => "no input",
            FragmentArgs::Key(_) => "a public key",
            FragmentArgs::Keys { .. } => "a list of public keys",
            FragmentArgs::Hash(_) => "a hash",
            FragmentArgs::Timelock(_) => "a lock time",
            FragmentArgs::Children(_) => "child fragments",
            FragmentArgs::Threshold { .. } => "a threshold over child fragments",
        }
    }
}

impl std::fmt::Debug for FragmentArgs<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.shape())
    }
}

/// Everything a derivation rule computes for a fragment.
struct Derived {
    script: ScriptTemplate,
    satisfaction: Witness,
    dissatisfaction: Option<Witness>,
    ty: Type,
    children: Vec<Node>,
}

fn unexpected_args(kind: FragmentKind, expected: &str, found: &FragmentArgs<'_>) -> Error {
    Error::InvalidConstructorInput {
        kind,
        reason: format!("expected {}, found {}", expected, found.shape()),
    }
}

const PK_TYPE: PropertyFlags = PropertyFlags::KEY
    .union(PropertyFlags::ONE_ARG)
    .union(PropertyFlags::NONZERO_ARG)
    .union(PropertyFlags::DISSATISFIABLE)
    .union(PropertyFlags::UNIT)
    .union(PropertyFlags::EXPRESSION)
    .union(PropertyFlags::SAFE)
    .union(PropertyFlags::NONMALLEABLE);

/// `pk(key)`: push the key and leave the signature check to an enclosing `c:`.
fn derive_pk(args: FragmentArgs<'_>) -> ScriptResult<Derived> {
    let key = match args {
        FragmentArgs::Key(key) => key,
        other => return Err(unexpected_args(FragmentKind::Pk, "a public key", &other)),
    };

    let bytes = key.to_bytes();
    if !key.is_valid() {
        return Err(Error::InvalidConstructorInput {
            kind: FragmentKind::Pk,
            reason: format!("public key `{}` is not valid", hex::encode(&bytes)),
        });
    }

    Ok(Derived {
        satisfaction: Witness::single(WitnessElement::signature(key)),
        dissatisfaction: Some(Witness::single(WitnessElement::Empty)),
        script: smallvec![ScriptElement::Push(bytes)],
        ty: Type::from_flags(PK_TYPE)?,
        children: Vec::new(),
    })
}

/// One fragment of an expression tree.
///
/// Each node exclusively owns its children. The dissatisfying witness is present if
/// and only if the type carries `d`.
///
/// Nodes are only obtained through [`Node::construct`] and are not serializable; their
/// type, script elements and witnesses are, under the `serde` feature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Node {
    kind: FragmentKind,
    script: ScriptTemplate,
    satisfaction: Witness,
    dissatisfaction: Option<Witness>,
    ty: Type,
    children: Vec<Node>,
}

impl Node {
    /// Build a fragment of the given kind.
    ///
    /// Construction is all-or-nothing: either a fully populated node with a valid
    /// type is returned, or an error and no node.
    pub fn construct(kind: FragmentKind, args: FragmentArgs<'_>) -> ScriptResult<Self> {
        let derive = kind
            .derivation()
            .ok_or(Error::UnsupportedFragmentKind { kind })?;
        let Derived {
            script,
            satisfaction,
            dissatisfaction,
            ty,
            children,
        } = derive(args)?;

        debug_assert_eq!(
            dissatisfaction.is_some(),
            ty.has(Property::Dissatisfiable),
            "dissatisfaction of `{}` must exist iff its type `{}` has `d`",
            kind,
            ty
        );

        let node = Self {
            kind,
            script,
            satisfaction,
            dissatisfaction,
            ty,
            children,
        };
        debug!(
            "Constructed fragment {} of type `{}` with script `{}`.",
            node,
            node.ty,
            fmt_template(&node.script)
        );
        Ok(node)
    }

    /// Public-key terminal `pk(key)`.
    pub fn pk<K: PublicKey>(key: &K) -> ScriptResult<Self> {
        Self::construct(FragmentKind::Pk, FragmentArgs::Key(key))
    }

    #[inline]
    pub fn kind(&self) -> FragmentKind {
        self.kind
    }

    /// Script template executed by a verifier for this fragment.
    #[inline]
    pub fn script(&self) -> &[ScriptElement] {
        &self.script
    }

    /// Witness builder making the script evaluate to true.
    #[inline]
    pub fn satisfaction(&self) -> &Witness {
        &self.satisfaction
    }

    /// Witness builder making the script evaluate to false without aborting, if the
    /// fragment is dissatisfiable.
    #[inline]
    pub fn dissatisfaction(&self) -> Option<&Witness> {
        self.dissatisfaction.as_ref()
    }

    #[inline]
    pub fn ty(&self) -> Type {
        self.ty
    }

    #[inline]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns true if the type of this fragment passes the validity table.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.ty.is_valid()
    }

    /// Returns true if this fragment can be used as a whole script (base type `B`).
    pub fn is_valid_top_level(&self) -> bool {
        self.is_valid() && self.ty.base() == BaseType::Base
    }

    /// Returns true if a nonmalleable satisfaction always exists (`m`).
    pub fn is_non_malleable(&self) -> bool {
        self.ty.has(Property::Nonmalleable)
    }

    /// Returns true if every satisfaction requires a signature (`s`).
    pub fn needs_signature(&self) -> bool {
        self.ty.has(Property::Safe)
    }

    /// Height of the tree rooted at this node; a terminal has height 0.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack = vec![(self, 0)];
        while let Some((node, depth)) = stack.pop() {
            height = height.max(depth);
            stack.extend(node.children.iter().map(|child| (child, depth + 1)));
        }
        height
    }

    /// Pre-order traversal of the tree rooted at this node.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// Satisfaction alternatives offered by this fragment, ready for
    /// [`crate::lift::lift_threshold`].
    pub fn satisfaction_expr(&self) -> SatisfactionExpr {
        SatisfactionExpr::Leaf(self.satisfaction.clone())
    }
}

enum Token<'a> {
    Node(&'a Node),
    Text(&'static str),
}

/// Renders the fragment in expression text, e.g. `pk(02…)`.
impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut pending = vec![Token::Node(self)];
        while let Some(token) = pending.pop() {
            let node = match token {
                Token::Text(text) => {
                    f.write_str(text)?;
                    continue;
                }
                Token::Node(node) => node,
            };

            match node.kind {
                FragmentKind::Pk => {
                    write!(f, "{}(", node.kind)?;
                    if let Some(ScriptElement::Push(key)) = node.script.first() {
                        write!(f, "{}", hex::encode(key))?;
                    }
                    f.write_str(")")?;
                }
                kind if kind.is_wrapper() => {
                    write!(f, "{}:", kind)?;
                    pending.extend(node.children.first().map(Token::Node));
                }
                kind if node.children.is_empty() => write!(f, "{}", kind)?,
                kind => {
                    write!(f, "{}(", kind)?;
                    pending.push(Token::Text(")"));
                    for (i, child) in node.children.iter().enumerate().rev() {
                        pending.push(Token::Node(child));
                        if i > 0 {
                            pending.push(Token::Text(","));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Pre-order iterator over a fragment tree, see [`Node::walk`].
pub struct Walk<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

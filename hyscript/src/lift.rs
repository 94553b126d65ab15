//! Threshold lifting.
//!
//! A satisfaction expression is a tree of alternatives: leaves are witness builders,
//! `Or` nodes let the spender pick any one child, `Threshold` nodes require `k` of
//! their children. [`lift_threshold`] rewrites such a tree into a single top-level
//! [`ThresholdDescriptor`] so that a satisfier can choose which branches to exercise
//! in one place.
//!
//! # Merge policy
//!
//! - A leaf lifts to `1-of-1` over itself.
//! - An `Or`, and a `Threshold` with `k = 1`, lift to the `1-of-n` union of their
//!   lifted children. Every child that lifted to a `1-of-m` descriptor is flattened
//!   into its `m` branches. Identical branches are merged, keeping the first
//!   occurrence, since picking either spends the same way.
//! - A `Threshold` with `k > 1` keeps exactly one branch per child so that its count
//!   is preserved. A child lifting to `1-of-1` is inlined as its only branch. Any
//!   other child becomes an opaque branch whose witness is a single
//!   [`WitnessElement::Threshold`] carrying the child's own descriptor.
//! - `k = 0`, `k > n`, and empty alternatives (`n = 0`) are rejected with
//!   [`Error::InvalidThreshold`].
//!
//! Lifting and dropping an expression use an explicit stack, so arbitrarily deep
//! alternatives are accepted. The lifted descriptor only nests below `k > 1`
//! thresholds, and resolving or printing it recurses once per such level.
//!
//! ```rust
//! # use hyscript::{lift::{SatisfactionExpr, lift_threshold}, witness::{Witness, WitnessElement}};
//! let a = Witness::single(WitnessElement::Preimage { hash: vec![0xaa] });
//! let b = Witness::single(WitnessElement::Preimage { hash: vec![0xbb] });
//! let c = Witness::single(WitnessElement::Preimage { hash: vec![0xcc] });
//! let expr = SatisfactionExpr::Or(vec![
//!     SatisfactionExpr::Leaf(a),
//!     SatisfactionExpr::Or(vec![SatisfactionExpr::Leaf(b), SatisfactionExpr::Leaf(c)]),
//! ]);
//! let lifted = lift_threshold(&expr).unwrap();
//! assert_eq!((lifted.k(), lifted.n()), (1, 3));
//! ```
use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, ScriptResult},
    witness::{Satisfier, Witness, WitnessElement, WitnessKind},
};

/// A tree of disjunctive satisfaction alternatives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SatisfactionExpr {
    /// A single way to satisfy, given by its witness builder.
    Leaf(Witness),
    /// Any one of the children.
    Or(Vec<SatisfactionExpr>),
    /// Any `k` of the branches.
    Threshold {
        k: usize,
        branches: Vec<SatisfactionExpr>,
    },
}

impl SatisfactionExpr {
    /// Child alternatives of an `Or` or `Threshold`, empty for a leaf.
    pub fn children(&self) -> &[SatisfactionExpr] {
        match self {
            SatisfactionExpr::Leaf(_) => &[],
            SatisfactionExpr::Or(children) => children,
            SatisfactionExpr::Threshold { branches, .. } => branches,
        }
    }

    /// Number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(expr) = stack.pop() {
            match expr {
                SatisfactionExpr::Leaf(_) => count += 1,
                _ => stack.extend(expr.children()),
            }
        }
        count
    }
}

// Nested alternatives are released one level at a time instead of recursively.
impl Drop for SatisfactionExpr {
    fn drop(&mut self) {
        let mut pending = match self {
            SatisfactionExpr::Leaf(_) => return,
            SatisfactionExpr::Or(children) => std::mem::take(children),
            SatisfactionExpr::Threshold { branches, .. } => std::mem::take(branches),
        };
        while let Some(mut expr) = pending.pop() {
            match &mut expr {
                SatisfactionExpr::Leaf(_) => {}
                SatisfactionExpr::Or(children) => pending.append(children),
                SatisfactionExpr::Threshold { branches, .. } => pending.append(branches),
            }
        }
    }
}

impl From<Witness> for SatisfactionExpr {
    fn from(value: Witness) -> Self {
        SatisfactionExpr::Leaf(value)
    }
}

/// Canonical `k-of-n` threshold over branch witness builders, `n` being the number
/// of branches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "RawThreshold", into = "RawThreshold")
)]
pub struct ThresholdDescriptor {
    k: usize,
    branches: Vec<Witness>,
}

/// Unchecked serialized form of a [`ThresholdDescriptor`].
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct RawThreshold {
    k: usize,
    branches: Vec<Witness>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawThreshold> for ThresholdDescriptor {
    type Error = Error;

    fn try_from(value: RawThreshold) -> Result<Self, Self::Error> {
        Self::new(value.k, value.branches)
    }
}

#[cfg(feature = "serde")]
impl From<ThresholdDescriptor> for RawThreshold {
    fn from(value: ThresholdDescriptor) -> Self {
        Self {
            k: value.k,
            branches: value.branches,
        }
    }
}

impl ThresholdDescriptor {
    /// Build a descriptor, checking that `1 <= k <= branches.len()`.
    pub fn new(k: usize, branches: Vec<Witness>) -> ScriptResult<Self> {
        let n = branches.len();
        if k == 0 || k > n {
            return Err(Error::InvalidThreshold { k, n });
        }
        Ok(Self { k, branches })
    }

    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    #[inline]
    pub fn n(&self) -> usize {
        self.branches.len()
    }

    #[inline]
    pub fn branches(&self) -> &[Witness] {
        &self.branches
    }

    /// Returns true for a plain disjunction (`1-of-n`).
    #[inline]
    pub fn is_disjunction(&self) -> bool {
        self.k == 1
    }

    /// One-element witness carrying this descriptor.
    pub fn into_witness(self) -> Witness {
        Witness::single(WitnessElement::Threshold(self))
    }

    /// Resolve the first `k` branches the satisfier can fully provide, in branch
    /// order. Every other branch contributes a single empty item.
    pub fn resolve<S: Satisfier + ?Sized>(&self, satisfier: &S) -> ScriptResult<Vec<Vec<u8>>> {
        let mut chosen = 0;
        let mut stack = Vec::new();
        for branch in &self.branches {
            if chosen < self.k {
                if let Ok(items) = branch.resolve(satisfier) {
                    stack.extend(items);
                    chosen += 1;
                    continue;
                }
            }
            stack.push(Vec::new());
        }

        if chosen < self.k {
            return Err(Error::MissingWitnessMaterial {
                kind: WitnessKind::Threshold,
            });
        }
        Ok(stack)
    }
}

impl std::fmt::Display for ThresholdDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "thresh({}", self.k)?;
        for branch in &self.branches {
            write!(f, ",{}", branch)?;
        }
        f.write_str(")")
    }
}

/// Rewrite a satisfaction expression into one top-level threshold descriptor, see
/// the module documentation for the merge policy.
pub fn lift_threshold(expr: &SatisfactionExpr) -> ScriptResult<ThresholdDescriptor> {
    let lifted = lift(expr)?;
    debug!(
        "Lifted satisfaction expression with {} leaves into a {}-of-{} threshold.",
        expr.leaf_count(),
        lifted.k(),
        lifted.n()
    );
    Ok(lifted)
}

enum Frame<'a> {
    Enter(&'a SatisfactionExpr),
    Exit(&'a SatisfactionExpr),
}

/// Post-order rewrite on an explicit stack, so the depth of `expr` is not bounded by
/// the call stack. Lifted children wait on `done`, in order, until their parent exits.
fn lift(expr: &SatisfactionExpr) -> ScriptResult<ThresholdDescriptor> {
    let mut work = vec![Frame::Enter(expr)];
    let mut done: Vec<ThresholdDescriptor> = Vec::new();

    while let Some(frame) = work.pop() {
        let lifted = match frame {
            Frame::Enter(SatisfactionExpr::Leaf(witness)) => {
                ThresholdDescriptor::new(1, vec![witness.clone()])?
            }
            Frame::Enter(expr) => {
                if let SatisfactionExpr::Threshold { k, branches } = expr {
                    if *k == 0 || *k > branches.len() {
                        return Err(Error::InvalidThreshold {
                            k: *k,
                            n: branches.len(),
                        });
                    }
                }
                work.push(Frame::Exit(expr));
                work.extend(expr.children().iter().rev().map(Frame::Enter));
                continue;
            }
            Frame::Exit(expr) => {
                let children = done.split_off(done.len() - expr.children().len());
                combine(expr, children)?
            }
        };

        if work.is_empty() {
            return Ok(lifted);
        }
        done.push(lifted);
    }

    unreachable!("the root frame always yields the result")
}

/// Merge the lifted children of `expr`.
fn combine(
    expr: &SatisfactionExpr,
    children: Vec<ThresholdDescriptor>,
) -> ScriptResult<ThresholdDescriptor> {
    match expr {
        SatisfactionExpr::Threshold { k, .. } if *k > 1 => ThresholdDescriptor::new(
            *k,
            children.into_iter().map(into_single_branch).collect(),
        ),
        _ => merge_disjunction(children),
    }
}

fn merge_disjunction(children: Vec<ThresholdDescriptor>) -> ScriptResult<ThresholdDescriptor> {
    let mut branches: Vec<Witness> = Vec::with_capacity(children.len());
    let mut push_unique = |branch: Witness| {
        if !branches.contains(&branch) {
            branches.push(branch);
        }
    };

    for child in children {
        if child.is_disjunction() {
            child.branches.into_iter().for_each(&mut push_unique);
        } else {
            push_unique(child.into_witness());
        }
    }

    ThresholdDescriptor::new(1, branches)
}

/// Collapse a lifted child into the single branch it occupies in a `k > 1` parent.
fn into_single_branch(mut lifted: ThresholdDescriptor) -> Witness {
    if lifted.k == 1 && lifted.branches.len() == 1 {
        lifted.branches.remove(0)
    } else {
        lifted.into_witness()
    }
}

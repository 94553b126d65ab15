//! Validity table for fragment types.
//!
//! Every [`super::Type`] must satisfy all rules below. Rules are checked in declaration
//! order, so the rule reported for an invalid flag set is always the first one that
//! fails.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

use super::property::PropertyFlags as F;

/// A single entry of the type validity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, strum::Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TypeRule {
    #[strum(to_string = "exactly one of `B`, `V`, `K`, `W` must be set")]
    SingleBaseType,
    #[strum(to_string = "`z` and `o` are mutually exclusive")]
    ZeroArgExcludesOneArg,
    #[strum(to_string = "`n` and `z` are mutually exclusive")]
    NonzeroArgExcludesZeroArg,
    #[strum(to_string = "`V` excludes `d`")]
    VerifyExcludesDissatisfiable,
    #[strum(to_string = "`K` requires `u`")]
    KeyImpliesUnit,
    #[strum(to_string = "`V` excludes `u`")]
    VerifyExcludesUnit,
    #[strum(to_string = "`e` excludes `f`")]
    ExpressionExcludesForced,
    #[strum(to_string = "`e` requires `d`")]
    ExpressionImpliesDissatisfiable,
    #[strum(to_string = "`V` excludes `e`")]
    VerifyExcludesExpression,
    #[strum(to_string = "`d` excludes `f`")]
    DissatisfiableExcludesForced,
    #[strum(to_string = "`V` requires `f`")]
    VerifyImpliesForced,
    #[strum(to_string = "`K` requires `s`")]
    KeyImpliesSafe,
    #[strum(to_string = "`z` requires `m`")]
    ZeroArgImpliesNonmalleable,
}

#[inline]
fn implies(flags: F, premise: F, conclusion: F) -> bool {
    !flags.contains(premise) || flags.contains(conclusion)
}

#[inline]
fn excludes(flags: F, lhs: F, rhs: F) -> bool {
    !flags.contains(lhs | rhs)
}

impl TypeRule {
    /// Returns true if `flags` satisfies this rule.
    pub fn holds(self, flags: F) -> bool {
        match self {
            TypeRule::SingleBaseType => flags.base_type_count() == 1,
            TypeRule::ZeroArgExcludesOneArg => excludes(flags, F::ZERO_ARG, F::ONE_ARG),
            TypeRule::NonzeroArgExcludesZeroArg => excludes(flags, F::NONZERO_ARG, F::ZERO_ARG),
            TypeRule::VerifyExcludesDissatisfiable => {
                excludes(flags, F::VERIFY, F::DISSATISFIABLE)
            }
            TypeRule::KeyImpliesUnit => implies(flags, F::KEY, F::UNIT),
            TypeRule::VerifyExcludesUnit => excludes(flags, F::VERIFY, F::UNIT),
            TypeRule::ExpressionExcludesForced => excludes(flags, F::EXPRESSION, F::FORCED),
            TypeRule::ExpressionImpliesDissatisfiable => {
                implies(flags, F::EXPRESSION, F::DISSATISFIABLE)
            }
            TypeRule::VerifyExcludesExpression => excludes(flags, F::VERIFY, F::EXPRESSION),
            TypeRule::DissatisfiableExcludesForced => {
                excludes(flags, F::DISSATISFIABLE, F::FORCED)
            }
            TypeRule::VerifyImpliesForced => implies(flags, F::VERIFY, F::FORCED),
            TypeRule::KeyImpliesSafe => implies(flags, F::KEY, F::SAFE),
            TypeRule::ZeroArgImpliesNonmalleable => implies(flags, F::ZERO_ARG, F::NONMALLEABLE),
        }
    }

    /// First rule of the table violated by `flags`, or `None` if `flags` is a valid type.
    pub fn first_violated(flags: F) -> Option<Self> {
        Self::iter().find(|rule| !rule.holds(flags))
    }

    /// All rules violated by `flags`, in table order.
    pub fn violated(flags: F) -> impl Iterator<Item = Self> {
        Self::iter().filter(move |rule| !rule.holds(flags))
    }
}

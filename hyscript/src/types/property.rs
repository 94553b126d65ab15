use bitflags::bitflags;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{EnumIs, EnumIter, IntoEnumIterator};

bitflags! {
    /// Raw property bits of a fragment type.
    ///
    /// The bit positions follow the canonical alphabet order `B V K W z o n d u e f s m x`,
    /// so iterating bits from least to most significant yields the canonical text of a
    /// type. A bare [`PropertyFlags`] value carries no validity guarantee, see
    /// [`super::Type`] for the validated wrapper.
    #[derive(Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub struct PropertyFlags: u16 {
        /// `B`: pushes a nonzero value on satisfaction, exact zero on dissatisfaction.
        const BASE = 1 << 0;
        /// `V`: continues on satisfaction, aborts otherwise. Cannot be dissatisfied.
        const VERIFY = 1 << 1;
        /// `K`: pushes a public key whose signature is still to be checked.
        const KEY = 1 << 2;
        /// `W`: takes its input from one below the top of the stack.
        const WRAPPED = 1 << 3;

        /// `z`: consumes exactly zero stack elements.
        const ZERO_ARG = 1 << 4;
        /// `o`: consumes exactly one stack element.
        const ONE_ARG = 1 << 5;
        /// `n`: the top input is never zero on satisfaction.
        const NONZERO_ARG = 1 << 6;
        /// `d`: a dissatisfaction can be constructed without aborting.
        const DISSATISFIABLE = 1 << 7;
        /// `u`: pushes exactly `1` on satisfaction.
        const UNIT = 1 << 8;

        /// `e`: the dissatisfaction is unique and cannot be forged by a third party.
        const EXPRESSION = 1 << 9;
        /// `f`: every dissatisfaction requires a signature.
        const FORCED = 1 << 10;
        /// `s`: every satisfaction requires a signature.
        const SAFE = 1 << 11;
        /// `m`: a nonmalleable satisfaction always exists.
        const NONMALLEABLE = 1 << 12;
        /// `x`: the last opcode is not `EQUAL`, `CHECKSIG` or `CHECKMULTISIG`, verifying costs an extra opcode.
        const EXPENSIVE_VERIFY = 1 << 13;

        /// Union of the four mutually exclusive base types.
        const BASE_TYPES = Self::BASE.bits() | Self::VERIFY.bits() | Self::KEY.bits() | Self::WRAPPED.bits();
    }
}

impl PropertyFlags {
    /// Number of base-type bits set. A valid type has exactly one.
    #[inline]
    pub fn base_type_count(&self) -> u32 {
        self.intersection(Self::BASE_TYPES).bits().count_ones()
    }

    /// Iterate the properties set in these flags, in canonical order.
    pub fn properties(self) -> impl Iterator<Item = Property> {
        Property::iter().filter(move |property| self.contains(property.flag()))
    }
}

/// Renders the tag letters in canonical order, one character per active flag.
impl std::fmt::Display for PropertyFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for property in self.properties() {
            write!(f, "{}", property.letter())?;
        }
        Ok(())
    }
}

/// One named tag of the property alphabet.
///
/// Variants are declared in canonical order, [`Property::iter`] walks the alphabet
/// `B V K W z o n d u e f s m x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, EnumIs)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Property {
    Base,
    Verify,
    Key,
    Wrapped,
    ZeroArg,
    OneArg,
    NonzeroArg,
    Dissatisfiable,
    Unit,
    Expression,
    Forced,
    Safe,
    Nonmalleable,
    ExpensiveVerify,
}

impl Property {
    /// The one-letter tag used in the textual form of a type.
    pub const fn letter(self) -> char {
        match self {
            Property::Base => 'B',
            Property::Verify => 'V',
            Property::Key => 'K',
            Property::Wrapped => 'W',
            Property::ZeroArg => 'z',
            Property::OneArg => 'o',
            Property::NonzeroArg => 'n',
            Property::Dissatisfiable => 'd',
            Property::Unit => 'u',
            Property::Expression => 'e',
            Property::Forced => 'f',
            Property::Safe => 's',
            Property::Nonmalleable => 'm',
            Property::ExpensiveVerify => 'x',
        }
    }

    /// The bit carrying this property.
    pub const fn flag(self) -> PropertyFlags {
        match self {
            Property::Base => PropertyFlags::BASE,
            Property::Verify => PropertyFlags::VERIFY,
            Property::Key => PropertyFlags::KEY,
            Property::Wrapped => PropertyFlags::WRAPPED,
            Property::ZeroArg => PropertyFlags::ZERO_ARG,
            Property::OneArg => PropertyFlags::ONE_ARG,
            Property::NonzeroArg => PropertyFlags::NONZERO_ARG,
            Property::Dissatisfiable => PropertyFlags::DISSATISFIABLE,
            Property::Unit => PropertyFlags::UNIT,
            Property::Expression => PropertyFlags::EXPRESSION,
            Property::Forced => PropertyFlags::FORCED,
            Property::Safe => PropertyFlags::SAFE,
            Property::Nonmalleable => PropertyFlags::NONMALLEABLE,
            Property::ExpensiveVerify => PropertyFlags::EXPENSIVE_VERIFY,
        }
    }

    /// Look up the property tagged by `letter`. Tags are case sensitive.
    pub fn from_letter(letter: char) -> Option<Self> {
        Self::iter().find(|property| property.letter() == letter)
    }

    /// Returns true for the four base-type tags `B`, `V`, `K` and `W`.
    #[inline]
    pub fn is_base_type(self) -> bool {
        PropertyFlags::BASE_TYPES.contains(self.flag())
    }
}

/// The base type of a valid fragment type. Exactly one is set on every [`super::Type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, EnumIs)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BaseType {
    Base,
    Verify,
    Key,
    Wrapped,
}

impl BaseType {
    pub const fn property(self) -> Property {
        match self {
            BaseType::Base => Property::Base,
            BaseType::Verify => Property::Verify,
            BaseType::Key => Property::Key,
            BaseType::Wrapped => Property::Wrapped,
        }
    }

    /// Base type carried by `flags`, if exactly one base-type bit is set.
    pub fn from_flags(flags: PropertyFlags) -> Option<Self> {
        if flags.base_type_count() != 1 {
            return None;
        }
        Self::iter().find(|base| flags.contains(base.property().flag()))
    }
}

impl std::fmt::Display for BaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.property().letter())
    }
}

//! `FLG` condition flags, their generic roles, and condition requirements.

/// Number of modelled `FLG` bits. IPL is not modelled.
pub const FLAG_COUNT: usize = 8;

/// Number of generic flag conditions the host can ask about.
pub const CONDITION_COUNT: usize = 14;

/// Generic semantic role a flag plays for the host optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum FlagRole {
    /// Carry out of / borrow into the most significant bit.
    Carry,
    /// Result was zero.
    Zero,
    /// Result sign bit.
    Sign,
    /// Signed overflow.
    Overflow,
    /// No generic meaning; never used for condition evaluation.
    Special,
}

/// `FLG` register bits, in bit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum Flag {
    /// Carry.
    C = 0,
    /// Debug.
    D = 1,
    /// Zero.
    Z = 2,
    /// Sign.
    S = 3,
    /// Register bank select.
    B = 4,
    /// Overflow.
    O = 5,
    /// Interrupt enable.
    I = 6,
    /// Stack pointer select.
    U = 7,
}

impl Flag {
    /// All flags in `FLG` bit order.
    pub const ALL: [Self; FLAG_COUNT] = [
        Self::C,
        Self::D,
        Self::Z,
        Self::S,
        Self::B,
        Self::O,
        Self::I,
        Self::U,
    ];

    /// Converts a 3-bit `FSET`/`FCLR` field into a flag.
    #[must_use]
    pub const fn from_u3(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::C),
            1 => Some(Self::D),
            2 => Some(Self::Z),
            3 => Some(Self::S),
            4 => Some(Self::B),
            5 => Some(Self::O),
            6 => Some(Self::I),
            7 => Some(Self::U),
            _ => None,
        }
    }

    /// Bit index inside `FLG`.
    #[must_use]
    pub const fn bit(self) -> u8 {
        self as u8
    }

    /// Single-bit mask inside `FLG`.
    #[must_use]
    pub const fn mask(self) -> u8 {
        1 << self.bit()
    }

    /// Single-letter name exposed to the host.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::C => "C",
            Self::D => "D",
            Self::Z => "Z",
            Self::S => "S",
            Self::B => "B",
            Self::O => "O",
            Self::I => "I",
            Self::U => "U",
        }
    }

    /// Generic role of this flag.
    #[must_use]
    pub const fn role(self) -> FlagRole {
        match self {
            Self::C => FlagRole::Carry,
            Self::Z => FlagRole::Zero,
            Self::S => FlagRole::Sign,
            Self::O => FlagRole::Overflow,
            Self::D | Self::B | Self::I | Self::U => FlagRole::Special,
        }
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Generic flag conditions used by host IL `if` statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Condition {
    /// Equal.
    Equal,
    /// Not equal.
    NotEqual,
    /// Result is positive or zero.
    Positive,
    /// Result is negative.
    Negative,
    /// Signed greater or equal.
    SignedGreaterEqual,
    /// Signed less than.
    SignedLessThan,
    /// Signed greater than.
    SignedGreaterThan,
    /// Signed less or equal.
    SignedLessEqual,
    /// Unsigned greater or equal.
    UnsignedGreaterEqual,
    /// Unsigned less than.
    UnsignedLessThan,
    /// Unsigned greater than.
    UnsignedGreaterThan,
    /// Unsigned less or equal.
    UnsignedLessEqual,
    /// Overflow set.
    Overflow,
    /// Overflow clear.
    NoOverflow,
}

impl Condition {
    /// Every condition the host can request.
    pub const ALL: [Self; CONDITION_COUNT] = [
        Self::Equal,
        Self::NotEqual,
        Self::Positive,
        Self::Negative,
        Self::SignedGreaterEqual,
        Self::SignedLessThan,
        Self::SignedGreaterThan,
        Self::SignedLessEqual,
        Self::UnsignedGreaterEqual,
        Self::UnsignedLessThan,
        Self::UnsignedGreaterThan,
        Self::UnsignedLessEqual,
        Self::Overflow,
        Self::NoOverflow,
    ];

    /// Flags whose values are necessary and sufficient to evaluate the condition.
    #[must_use]
    pub const fn required_flags(self) -> &'static [Flag] {
        match self {
            Self::Equal | Self::NotEqual => &[Flag::Z],
            Self::Positive | Self::Negative => &[Flag::S],
            Self::SignedGreaterEqual | Self::SignedLessThan => &[Flag::S, Flag::O],
            Self::SignedGreaterThan | Self::SignedLessEqual => &[Flag::Z, Flag::S, Flag::O],
            Self::UnsignedGreaterEqual | Self::UnsignedLessThan => &[Flag::C],
            Self::UnsignedGreaterThan | Self::UnsignedLessEqual => &[Flag::C, Flag::Z],
            Self::Overflow | Self::NoOverflow => &[Flag::O],
        }
    }

    /// Evaluates the condition against a flag reader.
    ///
    /// `C` is set when no borrow occurred, so `C=1` means unsigned `>=`.
    pub fn evaluate(self, mut flag: impl FnMut(Flag) -> bool) -> bool {
        match self {
            Self::Equal => flag(Flag::Z),
            Self::NotEqual => !flag(Flag::Z),
            Self::Positive => !flag(Flag::S),
            Self::Negative => flag(Flag::S),
            Self::SignedGreaterEqual => flag(Flag::S) == flag(Flag::O),
            Self::SignedLessThan => flag(Flag::S) != flag(Flag::O),
            Self::SignedGreaterThan => {
                let zero = flag(Flag::Z);
                !zero && flag(Flag::S) == flag(Flag::O)
            }
            Self::SignedLessEqual => {
                let zero = flag(Flag::Z);
                zero || flag(Flag::S) != flag(Flag::O)
            }
            Self::UnsignedGreaterEqual => flag(Flag::C),
            Self::UnsignedLessThan => !flag(Flag::C),
            Self::UnsignedGreaterThan => {
                let carry = flag(Flag::C);
                carry && !flag(Flag::Z)
            }
            Self::UnsignedLessEqual => {
                let carry = flag(Flag::C);
                !carry || flag(Flag::Z)
            }
            Self::Overflow => flag(Flag::O),
            Self::NoOverflow => !flag(Flag::O),
        }
    }

    /// Logical negation.
    #[must_use]
    pub const fn negate(self) -> Self {
        match self {
            Self::Equal => Self::NotEqual,
            Self::NotEqual => Self::Equal,
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
            Self::SignedGreaterEqual => Self::SignedLessThan,
            Self::SignedLessThan => Self::SignedGreaterEqual,
            Self::SignedGreaterThan => Self::SignedLessEqual,
            Self::SignedLessEqual => Self::SignedGreaterThan,
            Self::UnsignedGreaterEqual => Self::UnsignedLessThan,
            Self::UnsignedLessThan => Self::UnsignedGreaterEqual,
            Self::UnsignedGreaterThan => Self::UnsignedLessEqual,
            Self::UnsignedLessEqual => Self::UnsignedGreaterThan,
            Self::Overflow => Self::NoOverflow,
            Self::NoOverflow => Self::Overflow,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rstest::rstest;

    use super::{Condition, Flag, FlagRole, FLAG_COUNT};

    #[test]
    fn flag_bits_match_flg_layout() {
        for (index, flag) in Flag::ALL.iter().enumerate() {
            assert_eq!(usize::from(flag.bit()), index);
            assert_eq!(Flag::from_u3(flag.bit()), Some(*flag));
        }
        assert_eq!(Flag::from_u3(8), None);
        assert_eq!(Flag::ALL.len(), FLAG_COUNT);
    }

    #[test]
    fn special_flags_have_no_generic_role() {
        let special: Vec<_> = Flag::ALL
            .iter()
            .filter(|f| f.role() == FlagRole::Special)
            .map(|f| f.name())
            .collect();
        assert_eq!(special, ["D", "B", "I", "U"]);
    }

    #[rstest]
    #[case(Condition::Equal, &[Flag::Z])]
    #[case(Condition::NotEqual, &[Flag::Z])]
    #[case(Condition::Positive, &[Flag::S])]
    #[case(Condition::Negative, &[Flag::S])]
    #[case(Condition::SignedGreaterEqual, &[Flag::S, Flag::O])]
    #[case(Condition::SignedLessThan, &[Flag::S, Flag::O])]
    #[case(Condition::SignedGreaterThan, &[Flag::Z, Flag::S, Flag::O])]
    #[case(Condition::SignedLessEqual, &[Flag::Z, Flag::S, Flag::O])]
    #[case(Condition::UnsignedGreaterEqual, &[Flag::C])]
    #[case(Condition::UnsignedLessThan, &[Flag::C])]
    #[case(Condition::UnsignedGreaterThan, &[Flag::C, Flag::Z])]
    #[case(Condition::UnsignedLessEqual, &[Flag::C, Flag::Z])]
    #[case(Condition::Overflow, &[Flag::O])]
    #[case(Condition::NoOverflow, &[Flag::O])]
    fn required_flags_match_table(#[case] condition: Condition, #[case] expected: &[Flag]) {
        assert_eq!(condition.required_flags(), expected);
    }

    #[test]
    fn every_condition_needs_only_generic_flags() {
        for condition in Condition::ALL {
            let required = condition.required_flags();
            assert!(!required.is_empty(), "{condition:?} has no flags");
            for flag in required {
                assert_ne!(flag.role(), FlagRole::Special, "{condition:?} uses {flag}");
            }
        }
    }

    #[test]
    fn evaluation_reads_only_required_flags() {
        for condition in Condition::ALL {
            let required: HashSet<_> = condition.required_flags().iter().copied().collect();
            for bits in 0u16..=0xFF {
                let mut touched = HashSet::new();
                let _ = condition.evaluate(|flag| {
                    touched.insert(flag);
                    bits & (1 << flag.bit()) != 0
                });
                assert!(touched.is_subset(&required), "{condition:?} read {touched:?}");
            }
        }
    }

    #[test]
    fn negation_is_an_involution_with_opposite_results() {
        for condition in Condition::ALL {
            assert_eq!(condition.negate().negate(), condition);
            assert_eq!(condition.negate().required_flags(), condition.required_flags());
            for bits in 0u16..=0xFF {
                let read = |flag: Flag| bits & (1 << flag.bit()) != 0;
                assert_ne!(condition.evaluate(read), condition.negate().evaluate(read));
            }
        }
    }

    #[test]
    fn unsigned_greater_than_needs_zero_as_well_as_carry() {
        let carry_only = |flag: Flag| flag == Flag::C;
        let carry_and_zero = |flag: Flag| matches!(flag, Flag::C | Flag::Z);
        assert!(Condition::UnsignedGreaterThan.evaluate(carry_only));
        assert!(!Condition::UnsignedGreaterThan.evaluate(carry_and_zero));
    }
}

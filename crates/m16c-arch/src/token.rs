//! Display token stream produced by the renderer.

use std::fmt;

/// Token categories understood by the host's text view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum TokenKind {
    /// Mnemonic including size specifier, e.g. `MOV.W`.
    Instruction,
    /// Instruction format suffix, e.g. `:G`.
    Suffix,
    /// Whitespace or punctuation with no semantic value.
    Text,
    /// `, ` between operands.
    OperandSeparator,
    /// Register name.
    Register,
    /// Immediate or displacement.
    Integer,
    /// Absolute address that may name code or data.
    PossibleAddress,
    /// Opening `[` of a memory operand.
    BeginMemoryOperand,
    /// Closing `]` of a memory operand.
    EndMemoryOperand,
}

/// One rendered token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct InstructionTextToken {
    /// Token category.
    pub kind: TokenKind,
    /// Display text.
    pub text: String,
    /// Numeric value for integer and address tokens.
    pub value: Option<u64>,
}

impl InstructionTextToken {
    /// Creates a token with no numeric value.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            value: None,
        }
    }

    /// Creates a token carrying a numeric value.
    #[must_use]
    pub fn with_value(kind: TokenKind, text: impl Into<String>, value: u64) -> Self {
        Self {
            kind,
            text: text.into(),
            value: Some(value),
        }
    }
}

impl fmt::Display for InstructionTextToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Concatenates token texts into one display line.
#[must_use]
pub fn tokens_to_string(tokens: &[InstructionTextToken]) -> String {
    tokens.iter().map(|token| token.text.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::{tokens_to_string, InstructionTextToken, TokenKind};

    #[test]
    fn tokens_join_without_separators() {
        let tokens = [
            InstructionTextToken::new(TokenKind::Instruction, "MOV.B"),
            InstructionTextToken::new(TokenKind::Suffix, ":Q"),
            InstructionTextToken::new(TokenKind::Text, " "),
            InstructionTextToken::with_value(TokenKind::Integer, "#1", 1),
        ];
        assert_eq!(tokens_to_string(&tokens), "MOV.B:Q #1");
        assert_eq!(tokens[3].value, Some(1));
        assert_eq!(tokens[0].to_string(), "MOV.B");
    }
}

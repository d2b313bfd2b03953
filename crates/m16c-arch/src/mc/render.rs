//! Token rendering.

use super::operand::{GeneralOperand, Size};
use super::Instruction;
use crate::config::DisplayConfig;
use crate::registers::Register;
use crate::token::{InstructionTextToken, TokenKind};

/// Accumulates tokens and inserts the mnemonic gap and operand separators.
struct TokenWriter {
    tokens: Vec<InstructionTextToken>,
    operands: usize,
}

impl TokenWriter {
    fn new(mnemonic: impl Into<String>, suffix: Option<&str>, config: &DisplayConfig) -> Self {
        let mut tokens = vec![InstructionTextToken::new(TokenKind::Instruction, mnemonic)];
        if let Some(suffix) = suffix.filter(|_| config.show_suffix) {
            tokens.push(InstructionTextToken::new(TokenKind::Suffix, suffix));
        }
        Self {
            tokens,
            operands: 0,
        }
    }

    fn push(&mut self, token: InstructionTextToken) {
        self.tokens.push(token);
    }

    fn begin_operand(&mut self) {
        let token = if self.operands == 0 {
            InstructionTextToken::new(TokenKind::Text, " ")
        } else {
            InstructionTextToken::new(TokenKind::OperandSeparator, ", ")
        };
        self.tokens.push(token);
        self.operands += 1;
    }

    fn register(&mut self, register: Register) {
        self.begin_operand();
        self.push(InstructionTextToken::new(
            TokenKind::Register,
            register.name(),
        ));
    }

    fn immediate(&mut self, text: String, value: u64) {
        self.begin_operand();
        self.push(InstructionTextToken::with_value(
            TokenKind::Integer,
            text,
            value,
        ));
    }

    fn address(&mut self, target: u32) {
        self.begin_operand();
        self.push(InstructionTextToken::with_value(
            TokenKind::PossibleAddress,
            format!("{target:#07x}"),
            u64::from(target),
        ));
    }

    fn operand(&mut self, operand: GeneralOperand, size: Size) {
        if let Some(register) = operand.register(size) {
            self.register(register);
            return;
        }
        self.begin_operand();
        match operand {
            GeneralOperand::Disp8Address { dsp, .. } | GeneralOperand::Disp8Sb(dsp) => {
                self.displacement(format!("{dsp:#x}"), u64::from(dsp));
            }
            GeneralOperand::Disp8Fb(dsp) => {
                let text = if dsp < 0 {
                    format!("-{:#x}", dsp.unsigned_abs())
                } else {
                    format!("{dsp:#x}")
                };
                self.displacement(text, u64::from_le_bytes(i64::from(dsp).to_le_bytes()));
            }
            GeneralOperand::Disp16Address { dsp, .. } | GeneralOperand::Disp16Sb(dsp) => {
                self.displacement(format!("{dsp:#x}"), u64::from(dsp));
            }
            GeneralOperand::Abs16(address) => {
                self.push(InstructionTextToken::with_value(
                    TokenKind::PossibleAddress,
                    format!("{address:#06x}"),
                    u64::from(address),
                ));
                return;
            }
            GeneralOperand::Data(_) | GeneralOperand::Address(_) | GeneralOperand::Indirect(_) => {}
        }
        if let Some(base) = operand.base_register() {
            self.push(InstructionTextToken::new(TokenKind::BeginMemoryOperand, "["));
            self.push(InstructionTextToken::new(TokenKind::Register, base.name()));
            self.push(InstructionTextToken::new(TokenKind::EndMemoryOperand, "]"));
        }
    }

    fn displacement(&mut self, text: String, value: u64) {
        self.push(InstructionTextToken::with_value(
            TokenKind::Integer,
            text,
            value,
        ));
    }

    fn finish(self) -> Vec<InstructionTextToken> {
        self.tokens
    }
}

fn sized(base: &str, size: Size) -> String {
    format!("{base}{}", size.specifier())
}

fn hex_immediate(imm: u16) -> (String, u64) {
    (format!("#{imm:#x}"), u64::from(imm))
}

fn quick_immediate(imm: i8) -> (String, u64) {
    (
        format!("#{imm}"),
        u64::from_le_bytes(i64::from(imm).to_le_bytes()),
    )
}

impl Instruction {
    /// Renders the instruction as display tokens.
    ///
    /// The format suffix token (`:G`, `:Q`, `:S`, `:Z`) is emitted exactly
    /// when `config.show_suffix` is set; every other token is unaffected by
    /// the configuration.
    #[must_use]
    pub fn render(&self, config: &DisplayConfig) -> Vec<InstructionTextToken> {
        let out = match *self {
            Self::Brk => TokenWriter::new("BRK", None, config),
            Self::Nop => TokenWriter::new("NOP", None, config),
            Self::Rts => TokenWriter::new("RTS", None, config),
            Self::Reit => TokenWriter::new("REIT", None, config),
            Self::Und => TokenWriter::new("UND", None, config),
            Self::Wait => TokenWriter::new("WAIT", None, config),
            Self::Exitd => TokenWriter::new("EXITD", None, config),
            Self::Enter { frame } => {
                let mut out = TokenWriter::new("ENTER", None, config);
                let (text, value) = hex_immediate(u16::from(frame));
                out.immediate(text, value);
                out
            }
            Self::Int { vector } => {
                let mut out = TokenWriter::new("INT", None, config);
                let (text, value) = hex_immediate(u16::from(vector));
                out.immediate(text, value);
                out
            }
            Self::Fset(flag) | Self::Fclr(flag) => {
                let mnemonic = if matches!(self, Self::Fset(_)) {
                    "FSET"
                } else {
                    "FCLR"
                };
                let mut out = TokenWriter::new(mnemonic, None, config);
                out.begin_operand();
                out.push(InstructionTextToken::new(TokenKind::Register, flag.name()));
                out
            }
            Self::Jmp { distance, target } => {
                let mut out = TokenWriter::new(format!("JMP{}", distance.specifier()), None, config);
                out.address(target);
                out
            }
            Self::Jsr { distance, target } => {
                let mut out = TokenWriter::new(format!("JSR{}", distance.specifier()), None, config);
                out.address(target);
                out
            }
            Self::JCnd { condition, target } => {
                let mut out = TokenWriter::new(condition.mnemonic(), None, config);
                out.address(target);
                out
            }
            Self::MovG { size, src, dest } => {
                let mut out = TokenWriter::new(sized("MOV", size), Some(":G"), config);
                out.operand(src, size);
                out.operand(dest, size);
                out
            }
            Self::MovImm { size, imm, dest } => {
                let mut out = TokenWriter::new(sized("MOV", size), Some(":G"), config);
                let (text, value) = hex_immediate(imm);
                out.immediate(text, value);
                out.operand(dest, size);
                out
            }
            Self::MovQ { size, imm, dest } => quick("MOV", size, imm, dest, config),
            Self::AddQ { size, imm, dest } => quick("ADD", size, imm, dest, config),
            Self::CmpQ { size, imm, dest } => quick("CMP", size, imm, dest, config),
            Self::MovS { imm, dest } => {
                let mut out = TokenWriter::new("MOV.B", Some(":S"), config);
                let (text, value) = hex_immediate(u16::from(imm));
                out.immediate(text, value);
                out.operand(dest.general(), Size::Byte);
                out
            }
            Self::MovZ { dest } => {
                let mut out = TokenWriter::new("MOV.B", Some(":Z"), config);
                out.immediate("#0".to_owned(), 0);
                out.operand(dest.general(), Size::Byte);
                out
            }
            Self::PushS(reg) | Self::PopS(reg) => {
                let mnemonic = if matches!(self, Self::PushS(_)) {
                    "PUSH.B"
                } else {
                    "POP.B"
                };
                let mut out = TokenWriter::new(mnemonic, Some(":S"), config);
                out.register(reg.register());
                out
            }
        };
        out.finish()
    }
}

fn quick(
    base: &str,
    size: Size,
    imm: i8,
    dest: GeneralOperand,
    config: &DisplayConfig,
) -> TokenWriter {
    let mut out = TokenWriter::new(sized(base, size), Some(":Q"), config);
    let (text, value) = quick_immediate(imm);
    out.immediate(text, value);
    out.operand(dest, size);
    out
}

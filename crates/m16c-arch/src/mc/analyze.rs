//! Control-flow facts for the host's graph builder.

use super::{relative_target, Instruction};
use crate::info::{BranchKind, InstructionInfo};

impl Instruction {
    /// Length and control-flow edges of the instruction at `address`.
    #[must_use]
    pub fn analyze(&self, address: u32) -> InstructionInfo {
        let length = self.length();
        let mut info = InstructionInfo::new(length);
        match *self {
            Self::Jmp { target, .. } => info.add_branch(BranchKind::Unconditional(target)),
            Self::Jsr { target, .. } => info.add_branch(BranchKind::Call(target)),
            Self::JCnd { target, .. } => {
                info.add_branch(BranchKind::True(target));
                #[allow(clippy::cast_possible_truncation)]
                let fall_through = relative_target(address, length as u32, 0);
                info.add_branch(BranchKind::False(fall_through));
            }
            Self::Rts | Self::Reit | Self::Exitd => info.add_branch(BranchKind::FunctionReturn),
            Self::Int { .. } => info.add_branch(BranchKind::SystemCall),
            Self::Brk | Self::Und => info.add_branch(BranchKind::Exception),
            Self::Nop
            | Self::Wait
            | Self::Enter { .. }
            | Self::Fset(_)
            | Self::Fclr(_)
            | Self::MovG { .. }
            | Self::MovImm { .. }
            | Self::MovQ { .. }
            | Self::MovS { .. }
            | Self::MovZ { .. }
            | Self::AddQ { .. }
            | Self::CmpQ { .. }
            | Self::PushS(_)
            | Self::PopS(_) => {}
        }
        info
    }
}

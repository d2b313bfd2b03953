//! Host instruction-info record: length plus control-flow edges.

/// Maximum number of control-flow edges one instruction reports.
pub const MAX_BRANCHES: usize = 2;

/// A control-flow fact consumed by the host's graph builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum BranchKind {
    /// Always transfers to the target.
    Unconditional(u32),
    /// Taken edge of a conditional branch.
    True(u32),
    /// Fall-through edge of a conditional branch.
    False(u32),
    /// Subroutine call to the target.
    Call(u32),
    /// Returns to the caller (`RTS`, `REIT`, `EXITD`).
    FunctionReturn,
    /// Software interrupt through the vector table.
    SystemCall,
    /// Unconditional trap (`BRK`, `UND`).
    Exception,
    /// Target computed at run time.
    Indirect,
}

/// Length and control-flow edges of one decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct InstructionInfo {
    /// Instruction length in bytes; the host advances its sweep by this much.
    pub length: usize,
    /// Control-flow edges in emission order.
    pub branches: Vec<BranchKind>,
}

impl InstructionInfo {
    /// Creates a record with no edges.
    #[must_use]
    pub const fn new(length: usize) -> Self {
        Self {
            length,
            branches: Vec::new(),
        }
    }

    /// Appends an edge. Edges beyond [`MAX_BRANCHES`] are dropped.
    pub fn add_branch(&mut self, branch: BranchKind) {
        if self.branches.len() < MAX_BRANCHES {
            self.branches.push(branch);
        }
    }

    /// True when no edge ends the basic block at this instruction.
    #[must_use]
    pub fn falls_through(&self) -> bool {
        self.branches.iter().all(|branch| {
            matches!(
                branch,
                BranchKind::Call(_) | BranchKind::False(_) | BranchKind::SystemCall
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{BranchKind, InstructionInfo, MAX_BRANCHES};

    #[test]
    fn edges_are_capped() {
        let mut info = InstructionInfo::new(2);
        for target in 0..4 {
            info.add_branch(BranchKind::Unconditional(target));
        }
        assert_eq!(info.branches.len(), MAX_BRANCHES);
        assert_eq!(info.length, 2);
    }

    #[test]
    fn fall_through_classification() {
        assert!(InstructionInfo::new(1).falls_through());

        let mut call = InstructionInfo::new(3);
        call.add_branch(BranchKind::Call(0x100));
        assert!(call.falls_through());

        let mut jump = InstructionInfo::new(2);
        jump.add_branch(BranchKind::Unconditional(0x100));
        assert!(!jump.falls_through());

        let mut ret = InstructionInfo::new(1);
        ret.add_branch(BranchKind::FunctionReturn);
        assert!(!ret.falls_through());
    }
}

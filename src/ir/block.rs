use crate::ir::instr::IrInstr;
use crate::ir::value::{BlockParam, ValueId};

/// An opaque index identifying a basic block within an `IrFunction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub u32);

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

/// A basic block in SSA form.
///
/// Invariants:
/// 1. A sealed block ends with exactly one terminator, its last instruction.
/// 2. Phi instructions come before all non-phi instructions.
/// 3. `params` are considered defined before any instruction in this block.
#[derive(Debug, Clone)]
pub struct IrBlock {
    pub id: BlockId,
    /// Block parameters; only the entry block carries them (function args).
    pub params: Vec<BlockParam>,
    /// Instructions in program order. Terminator is last.
    pub instrs: Vec<IrInstr>,
    /// Optional display name used by the pretty-printer.
    pub name: Option<String>,
}

impl IrBlock {
    pub fn new(id: BlockId, name: Option<String>) -> Self {
        Self {
            id,
            params: Vec::new(),
            instrs: Vec::new(),
            name,
        }
    }

    /// Returns the terminator instruction if the block is sealed.
    pub fn terminator(&self) -> Option<&IrInstr> {
        self.instrs.last().filter(|i| i.is_terminator())
    }

    /// A block is sealed when it ends with a terminator.
    pub fn is_sealed(&self) -> bool {
        self.terminator().is_some()
    }

    /// Index of the first non-phi instruction (== `instrs.len()` if the
    /// block holds only phis). New merge nodes are inserted here.
    pub fn first_non_phi(&self) -> usize {
        self.instrs
            .iter()
            .position(|i| !i.is_phi())
            .unwrap_or(self.instrs.len())
    }

    /// Finds the instruction producing `result`, if it lives in this block.
    pub fn instr_with_result(&self, result: ValueId) -> Option<&IrInstr> {
        self.instrs.iter().find(|i| i.result() == Some(result))
    }

    pub fn instr_with_result_mut(&mut self, result: ValueId) -> Option<&mut IrInstr> {
        self.instrs.iter_mut().find(|i| i.result() == Some(result))
    }

    /// Iterates over all `ValueId`s defined in this block (params + results).
    pub fn all_defs(&self) -> impl Iterator<Item = ValueId> + '_ {
        let param_ids = self.params.iter().map(|p| p.id);
        let result_ids = self.instrs.iter().filter_map(|i| i.result());
        param_ids.chain(result_ids)
    }
}

use std::collections::HashMap;

use crate::ir::block::{BlockId, IrBlock};
use crate::ir::types::IrType;
use crate::ir::value::{BlockParam, ConstValue, MetadataHint, ValueDef, ValueId};

/// Uniquely identifies a function within an `IrModule`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FunctionId(pub u32);

/// A named, typed parameter of a function signature.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub ty: IrType,
}

/// A function in SSA form.
///
/// Blocks live in a flat `Vec` indexed by `BlockId`. Block vector order is
/// allocation order, not control-flow order: `split_before` appends the new
/// predecessor at the end, so the `entry` field — not index 0 — names the
/// entry block.
#[derive(Debug, Clone)]
pub struct IrFunction {
    pub id: FunctionId,
    pub name: String,
    pub params: Vec<Param>,
    pub return_ty: IrType,
    pub(crate) blocks: Vec<IrBlock>,
    pub(crate) entry: BlockId,
    /// Maps `ValueId` → its definition site.
    pub(crate) value_defs: HashMap<ValueId, ValueDef>,
    /// Maps `ValueId` → its IR type.
    pub(crate) value_types: HashMap<ValueId, IrType>,
    /// Hints attached to value-producing instructions.
    pub(crate) metadata: HashMap<ValueId, Vec<MetadataHint>>,
    /// Counter for allocating fresh `ValueId`s.
    pub(crate) next_value: u32,
}

impl IrFunction {
    pub(crate) fn new(id: FunctionId, name: impl Into<String>, return_ty: IrType) -> Self {
        Self {
            id,
            name: name.into(),
            params: Vec::new(),
            return_ty,
            blocks: Vec::new(),
            entry: BlockId(0),
            value_defs: HashMap::new(),
            value_types: HashMap::new(),
            metadata: HashMap::new(),
            next_value: 0,
        }
    }

    pub fn entry_block(&self) -> &IrBlock {
        &self.blocks[self.entry.0 as usize]
    }

    pub fn entry_block_id(&self) -> BlockId {
        self.entry
    }

    pub fn block(&self, id: BlockId) -> &IrBlock {
        &self.blocks[id.0 as usize]
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut IrBlock {
        &mut self.blocks[id.0 as usize]
    }

    pub fn blocks(&self) -> &[IrBlock] {
        &self.blocks
    }

    /// Function arguments: the entry block's parameters.
    pub fn args(&self) -> &[BlockParam] {
        &self.entry_block().params
    }

    pub fn value_type(&self, v: ValueId) -> Option<&IrType> {
        self.value_types.get(&v)
    }

    pub fn value_def(&self, v: ValueId) -> Option<&ValueDef> {
        self.value_defs.get(&v)
    }

    /// All definitions in the function, in no particular order.
    pub fn value_defs(&self) -> impl Iterator<Item = (&ValueId, &ValueDef)> {
        self.value_defs.iter()
    }

    /// Returns `true` if `v` is produced by an instruction (not a constant
    /// or a block parameter).
    pub fn is_instruction_result(&self, v: ValueId) -> bool {
        matches!(self.value_defs.get(&v), Some(ValueDef::InstrResult { .. }))
    }

    pub fn metadata_of(&self, v: ValueId) -> &[MetadataHint] {
        self.metadata.get(&v).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn set_metadata(&mut self, v: ValueId, hint: MetadataHint) {
        self.metadata.entry(v).or_default().push(hint);
    }

    /// Allocates a fresh `ValueId`.
    pub(crate) fn fresh_value(&mut self) -> ValueId {
        let id = ValueId(self.next_value);
        self.next_value += 1;
        id
    }

    /// Materializes a constant of the given type. Constants are values
    /// without a block position; they never appear in instruction lists.
    pub(crate) fn new_const(&mut self, value: ConstValue, ty: IrType) -> ValueId {
        let id = self.fresh_value();
        self.value_defs.insert(id, ValueDef::Constant(value));
        self.value_types.insert(id, ty);
        id
    }

    pub(crate) fn create_block(&mut self, name: Option<&str>) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(IrBlock::new(id, name.map(str::to_owned)));
        id
    }

    pub(crate) fn add_block_param(
        &mut self,
        block: BlockId,
        name: Option<&str>,
        ty: IrType,
    ) -> ValueId {
        let id = self.fresh_value();
        self.blocks[block.0 as usize].params.push(BlockParam {
            id,
            ty: ty.clone(),
            name: name.map(str::to_owned),
        });
        self.value_defs.insert(id, ValueDef::Param { block });
        self.value_types.insert(id, ty);
        id
    }

    /// Splits `block` before the instruction at `index` and returns the new
    /// predecessor block.
    ///
    /// The new block takes the leading instructions (and the split block's
    /// params, so entry arguments stay at the entry), inherits every branch
    /// that targeted the original block, and ends with an unconditional
    /// branch to it. Instructions from `index` onward stay behind, so the
    /// original block resumes execution after the split point.
    pub(crate) fn split_before(&mut self, block: BlockId, index: usize, name: &str) -> BlockId {
        let new_id = BlockId(self.blocks.len() as u32);
        let old = &mut self.blocks[block.0 as usize];
        let head: Vec<_> = old.instrs.drain(..index).collect();
        let params = std::mem::take(&mut old.params);

        let mut new_block = IrBlock::new(new_id, Some(name.to_owned()));
        new_block.params = params;
        new_block.instrs = head;
        self.blocks.push(new_block);

        // Re-home the definitions that moved.
        let new_block_ref = &self.blocks[new_id.0 as usize];
        let moved: Vec<ValueId> = new_block_ref.all_defs().collect();
        for v in moved {
            match self.value_defs.get_mut(&v) {
                Some(ValueDef::Param { block: b }) | Some(ValueDef::InstrResult { block: b }) => {
                    *b = new_id;
                }
                _ => {}
            }
        }

        // Every edge into the original block now enters through the head.
        // Only branch targets re-route: phis in the original block's
        // successors still name it as their predecessor, since it keeps
        // its terminator.
        for b in &mut self.blocks {
            if b.id == new_id {
                continue;
            }
            if let Some(term) = b.instrs.last_mut() {
                if term.is_terminator() {
                    term.replace_uses_of_block(block, new_id);
                }
            }
        }
        if self.entry == block {
            self.entry = new_id;
        }

        self.blocks[new_id.0 as usize]
            .instrs
            .push(crate::ir::instr::IrInstr::Br { target: block });
        new_id
    }
}

//! SSA validation pass.
//!
//! Checks structural correctness of an `IrModule`. Block vector order is
//! allocation order, not control-flow order (the inliner appends split
//! blocks at the end), so definitions are collected module-wide first and
//! dominance is not checked.

use std::collections::HashSet;

use crate::error::PassError;
use crate::ir::instr::IrInstr;
use crate::ir::module::IrModule;
use crate::ir::value::{ValueDef, ValueId};
use crate::pass::Pass;

/// Validates SSA invariants across the entire module.
///
/// Checks:
/// 1. Every value is defined exactly once (params, constants, results).
/// 2. Every operand refers to some definition in the same function.
/// 3. Every block ends with exactly one terminator, in last position.
/// 4. Phis come before all non-phi instructions and name existing blocks.
pub struct ValidatePass;

impl Pass for ValidatePass {
    fn name(&self) -> &'static str {
        "validate"
    }

    fn run(&mut self, module: &mut IrModule) -> Result<(), PassError> {
        for func in module.functions() {
            let func_name = &func.name;
            let mut defined: HashSet<ValueId> = HashSet::new();

            // Constants are definitions without a block position.
            for (v, def) in func.value_defs() {
                if matches!(def, ValueDef::Constant(_)) && !defined.insert(*v) {
                    return Err(PassError::MultipleDefinition {
                        func: func_name.clone(),
                        value: v.to_string(),
                    });
                }
            }

            for block in func.blocks() {
                for param in &block.params {
                    if !defined.insert(param.id) {
                        return Err(PassError::MultipleDefinition {
                            func: func_name.clone(),
                            value: param.id.to_string(),
                        });
                    }
                }
                for instr in &block.instrs {
                    if let Some(result) = instr.result() {
                        if !defined.insert(result) {
                            return Err(PassError::MultipleDefinition {
                                func: func_name.clone(),
                                value: result.to_string(),
                            });
                        }
                    }
                }
            }

            for block in func.blocks() {
                let block_label = block
                    .name
                    .clone()
                    .unwrap_or_else(|| block.id.to_string());

                let n = block.instrs.len();
                for (i, instr) in block.instrs.iter().enumerate() {
                    // Terminator must be the last instruction.
                    if instr.is_terminator() && i != n - 1 {
                        return Err(PassError::MissingTerminator {
                            func: func_name.clone(),
                            block: block_label.clone(),
                        });
                    }
                    // Phis lead the block.
                    if instr.is_phi() && i >= block.first_non_phi() {
                        return Err(PassError::TypeError {
                            func: func_name.clone(),
                            detail: format!("phi after non-phi in block '{}'", block_label),
                        });
                    }
                    if let IrInstr::Phi { incomings, .. } = instr {
                        for (_, b) in incomings {
                            if b.0 as usize >= func.blocks().len() {
                                return Err(PassError::UnknownIncomingBlock {
                                    func: func_name.clone(),
                                    block: b.to_string(),
                                });
                            }
                        }
                    }
                    for operand in instr.operands() {
                        if !defined.contains(&operand) {
                            return Err(PassError::UseWithoutDef {
                                func: func_name.clone(),
                                value: operand.to_string(),
                            });
                        }
                    }
                }

                if !block.is_sealed() {
                    return Err(PassError::MissingTerminator {
                        func: func_name.clone(),
                        block: block_label,
                    });
                }
            }
        }
        Ok(())
    }
}

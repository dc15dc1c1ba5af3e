//! Function inlining.
//!
//! Every call site is replaced by a clone of the callee's body: the parent
//! block is split before the call, one caller block is allocated per
//! non-entry callee block, and each `ret` becomes a branch to the split-off
//! exit block with its value routed through a merge phi. Calls cloned along
//! with a body are picked up on the next scan, so nested calls inline too.
//! Once no call remains, the inlined callees are removed from the module.
//!
//! Call cycles cannot be inlined away; they are detected up front and
//! rejected.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::error::PassError;
use crate::ir::block::BlockId;
use crate::ir::function::{FunctionId, IrFunction};
use crate::ir::instr::IrInstr;
use crate::ir::module::IrModule;
use crate::ir::value::{ValueDef, ValueId};
use crate::pass::Pass;

pub struct InlinePass;

impl Pass for InlinePass {
    fn name(&self) -> &'static str {
        "inline"
    }

    fn run(&mut self, module: &mut IrModule) -> Result<(), PassError> {
        check_no_recursion(module)?;
        let mut inlined: HashSet<FunctionId> = HashSet::new();
        while let Some(site) = find_call_site(module) {
            debug!(
                "inlining call to '{}' in '{}'",
                module.function(site.callee).name,
                module.function(site.caller).name
            );
            inlined.insert(site.callee);
            inline_call(module, site)?;
        }
        module.remove_functions(&inlined);
        Ok(())
    }
}

struct CallSite {
    caller: FunctionId,
    block: BlockId,
    index: usize,
    callee: FunctionId,
}

/// First remaining call instruction, in function/block/program order.
fn find_call_site(module: &IrModule) -> Option<CallSite> {
    for func in module.functions() {
        for block in func.blocks() {
            for (index, instr) in block.instrs.iter().enumerate() {
                if let IrInstr::Call { callee, .. } = instr {
                    return Some(CallSite {
                        caller: func.id,
                        block: block.id,
                        index,
                        callee: *callee,
                    });
                }
            }
        }
    }
    None
}

/// Rejects modules whose static call graph contains a cycle (including
/// self-recursion); inlining such a graph would never terminate.
fn check_no_recursion(module: &IrModule) -> Result<(), PassError> {
    let n = module.functions().len();
    let mut callees: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (i, func) in module.functions().iter().enumerate() {
        for block in func.blocks() {
            for instr in &block.instrs {
                if let IrInstr::Call { callee, .. } = instr {
                    callees[i].push(callee.0 as usize);
                }
            }
        }
    }
    // 0 = unvisited, 1 = on the DFS stack, 2 = finished
    fn visit(i: usize, callees: &[Vec<usize>], state: &mut [u8]) -> Option<usize> {
        state[i] = 1;
        for &c in &callees[i] {
            match state[c] {
                1 => return Some(c),
                0 => {
                    if let Some(cyclic) = visit(c, callees, state) {
                        return Some(cyclic);
                    }
                }
                _ => {}
            }
        }
        state[i] = 2;
        None
    }
    let mut state = vec![0u8; n];
    for i in 0..n {
        if state[i] == 0 {
            if let Some(cyclic) = visit(i, &callees, &mut state) {
                return Err(PassError::RecursionDetected {
                    func: module.functions()[cyclic].name.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Maps a callee value into the caller. Arguments and instruction results
/// are pre-seeded in `map`; callee constants are materialized in the caller
/// on first use. Anything else is a malformed callee.
fn ensure_mapped(
    caller: &mut IrFunction,
    callee: &IrFunction,
    map: &mut HashMap<ValueId, ValueId>,
    v: ValueId,
) -> Result<ValueId, PassError> {
    if let Some(mapped) = map.get(&v) {
        return Ok(*mapped);
    }
    match callee.value_def(v) {
        Some(ValueDef::Constant(c)) => {
            let ty = callee
                .value_type(v)
                .cloned()
                .ok_or_else(|| PassError::UseWithoutDef {
                    func: callee.name.clone(),
                    value: v.to_string(),
                })?;
            let new = caller.new_const(c.clone(), ty);
            map.insert(v, new);
            Ok(new)
        }
        _ => Err(PassError::UseWithoutDef {
            func: callee.name.clone(),
            value: v.to_string(),
        }),
    }
}

fn inline_call(module: &mut IrModule, site: CallSite) -> Result<(), PassError> {
    // The callee is cloned out so the caller can be mutated freely; the
    // recursion check guarantees callee != caller.
    let callee = module.function(site.callee).clone();
    let caller = module.function_mut(site.caller);

    // 1. Split the parent block before the call. The new predecessor is
    //    named after the callee and will receive the cloned entry body; the
    //    original block becomes `exit` and resumes the caller, starting
    //    with the call itself.
    let exit = site.block;
    let entry_new = caller.split_before(exit, site.index, &callee.name);
    let (call_result, call_args) = match &caller.block(exit).instrs[0] {
        IrInstr::Call { result, args, .. } => (*result, args.clone()),
        _ => {
            return Err(PassError::TypeError {
                func: caller.name.clone(),
                detail: "call site not at head of split block".to_owned(),
            })
        }
    };

    // 2. One caller block per non-entry callee block.
    let mut block_map: HashMap<BlockId, BlockId> = HashMap::new();
    block_map.insert(callee.entry_block_id(), entry_new);
    for b in callee.blocks() {
        if b.id == callee.entry_block_id() {
            continue;
        }
        let name = format!("{}_{}", callee.name, b.name.as_deref().unwrap_or("bb"));
        let new = caller.create_block(Some(&name));
        block_map.insert(b.id, new);
    }

    // 3. The return-merge phi, at exit's first non-phi position. A callee
    //    with multiple `ret`s contributes one incoming per return path.
    let exit_val = if callee.return_ty.is_void() {
        None
    } else {
        let pos = caller.block(exit).first_non_phi();
        let result = caller.fresh_value();
        caller
            .value_defs
            .insert(result, ValueDef::InstrResult { block: exit });
        caller
            .value_types
            .insert(result, callee.return_ty.clone());
        caller.block_mut(exit).instrs.insert(
            pos,
            IrInstr::Phi {
                result,
                ty: callee.return_ty.clone(),
                incomings: Vec::new(),
            },
        );
        Some(result)
    };

    // 4. Drop the branch `split_before` wrote into the new predecessor;
    //    the cloned body supplies its own terminators.
    caller.block_mut(entry_new).instrs.pop();

    // 5. Pre-seed the value map: callee arguments become the call's
    //    arguments, and every callee instruction result gets a fresh
    //    caller id up front so phis may reference later blocks.
    let mut value_map: HashMap<ValueId, ValueId> = HashMap::new();
    for (param, arg) in callee.args().iter().zip(call_args.iter()) {
        value_map.insert(param.id, *arg);
    }
    for b in callee.blocks() {
        for instr in &b.instrs {
            if let Some(r) = instr.result() {
                let ty =
                    callee
                        .value_type(r)
                        .cloned()
                        .ok_or_else(|| PassError::UseWithoutDef {
                            func: callee.name.clone(),
                            value: r.to_string(),
                        })?;
                let fresh = caller.fresh_value();
                caller.value_types.insert(fresh, ty);
                value_map.insert(r, fresh);
            }
        }
    }

    // 6. Clone the body. `ret` becomes a branch to `exit` plus a phi
    //    incoming; everything else is cloned with blocks, arguments, and
    //    locals substituted. Cloned calls are found by the next scan.
    for b in callee.blocks() {
        let target = block_map[&b.id];
        for instr in &b.instrs {
            if let IrInstr::Return { value } = instr {
                if let (Some(exit_val), Some(v)) = (exit_val, value) {
                    let mapped = ensure_mapped(caller, &callee, &mut value_map, *v)?;
                    if let Some(IrInstr::Phi { incomings, .. }) =
                        caller.block_mut(exit).instr_with_result_mut(exit_val)
                    {
                        incomings.push((mapped, target));
                    }
                }
                caller
                    .block_mut(target)
                    .instrs
                    .push(IrInstr::Br { target: exit });
                continue;
            }
            let mut clone = instr.clone();
            for op in clone.operands() {
                ensure_mapped(caller, &callee, &mut value_map, op)?;
            }
            clone.for_each_operand_mut(|v| {
                if let Some(new) = value_map.get(v) {
                    *v = *new;
                }
            });
            clone.remap_result(|r| {
                if let Some(new) = value_map.get(r) {
                    *r = *new;
                }
            });
            // single pass; callee and caller block ids overlap numerically
            clone.for_each_block_mut(|b| {
                if let Some(new) = block_map.get(b) {
                    *b = *new;
                }
            });
            if let Some(r) = clone.result() {
                caller
                    .value_defs
                    .insert(r, ValueDef::InstrResult { block: target });
                if let Some(orig) = instr.result() {
                    for hint in callee.metadata_of(orig).to_vec() {
                        caller.set_metadata(r, hint);
                    }
                }
            }
            caller.block_mut(target).instrs.push(clone);
        }
    }

    // 7. Erase the call and route its uses through the merge phi. After
    //    step 3 the call sits exactly at exit's first non-phi slot.
    let pos = caller.block(exit).first_non_phi();
    let removed = caller.block_mut(exit).instrs.remove(pos);
    debug_assert!(matches!(removed, IrInstr::Call { .. }));
    if let Some(r) = call_result {
        let exit_val = exit_val.ok_or_else(|| PassError::TypeError {
            func: caller.name.clone(),
            detail: "call of a void function produces a result".to_owned(),
        })?;
        for block in &mut caller.blocks {
            for instr in &mut block.instrs {
                instr.replace_uses_of_value(r, exit_val);
            }
        }
        caller.value_defs.remove(&r);
        caller.value_types.remove(&r);
    }
    Ok(())
}

use std::collections::{HashMap, HashSet};

use crate::ir::function::{FunctionId, IrFunction};
use crate::ir::instr::IrInstr;

/// The top-level IR container.
///
/// Invariants:
/// - Function names are unique within a module.
/// - `FunctionId(n)` always indexes `functions[n]`. Removing functions
///   renumbers the survivors and patches remaining call sites.
#[derive(Debug, Default)]
pub struct IrModule {
    pub name: String,
    pub(crate) functions: Vec<IrFunction>,
    pub(crate) function_index: HashMap<String, FunctionId>,
}

impl IrModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: Vec::new(),
            function_index: HashMap::new(),
        }
    }

    pub fn function(&self, id: FunctionId) -> &IrFunction {
        &self.functions[id.0 as usize]
    }

    pub fn function_mut(&mut self, id: FunctionId) -> &mut IrFunction {
        &mut self.functions[id.0 as usize]
    }

    pub fn function_by_name(&self, name: &str) -> Option<&IrFunction> {
        let id = self.function_index.get(name)?;
        self.functions.get(id.0 as usize)
    }

    pub fn functions(&self) -> &[IrFunction] {
        &self.functions
    }

    /// Registers an empty function shell. Returns `Err` if the name is taken.
    pub(crate) fn add_function(
        &mut self,
        name: &str,
        return_ty: crate::ir::types::IrType,
    ) -> Result<FunctionId, String> {
        if self.function_index.contains_key(name) {
            return Err(format!("function '{}' already defined", name));
        }
        let id = FunctionId(self.functions.len() as u32);
        self.functions.push(IrFunction::new(id, name, return_ty));
        self.function_index.insert(name.to_owned(), id);
        Ok(id)
    }

    /// Removes the given functions and renumbers the rest.
    ///
    /// Callers must first ensure no remaining instruction calls a removed
    /// function; call sites into surviving functions are re-pointed at the
    /// new ids.
    pub fn remove_functions(&mut self, dead: &HashSet<FunctionId>) {
        if dead.is_empty() {
            return;
        }
        let mut remap: HashMap<FunctionId, FunctionId> = HashMap::new();
        let mut kept = Vec::with_capacity(self.functions.len() - dead.len());
        for func in self.functions.drain(..) {
            if dead.contains(&func.id) {
                continue;
            }
            let new_id = FunctionId(kept.len() as u32);
            remap.insert(func.id, new_id);
            kept.push(func);
        }
        self.functions = kept;
        self.function_index.clear();
        for (idx, func) in self.functions.iter_mut().enumerate() {
            func.id = FunctionId(idx as u32);
            self.function_index.insert(func.name.clone(), func.id);
            for block in &mut func.blocks {
                for instr in &mut block.instrs {
                    if let IrInstr::Call { callee, .. } = instr {
                        if let Some(new) = remap.get(callee) {
                            *callee = *new;
                        }
                    }
                }
            }
        }
    }
}

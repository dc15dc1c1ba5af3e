use crate::ir::block::BlockId;
use crate::ir::function::{FunctionId, IrFunction, Param};
use crate::ir::instr::{
    BinOp, CacheModifier, CastOp, FcmpPred, IcmpPred, IrInstr, MathOp, ReduceOp, RmwOp,
};
use crate::ir::module::IrModule;
use crate::ir::types::{FpKind, IrType, Shape};
use crate::ir::value::{ConstValue, ValueDef, ValueId};

/// Where the next instruction lands: before `block.instrs[index]`.
#[derive(Debug, Clone, Copy)]
pub struct InsertPoint {
    pub function: FunctionId,
    pub block: BlockId,
    pub index: usize,
}

/// Instruction factory with an insertion cursor.
///
/// The builder owns the module under construction. Every `create_*` method
/// emits one instruction at the cursor, registers its result's definition
/// and IR type, advances the cursor, and returns the result `ValueId`.
/// Constant getters allocate values without emitting instructions.
///
/// Cursor misuse (no insertion point, type lookup of a foreign value) is a
/// programming error and panics; all user-facing validation happens in the
/// dispatch layer before the builder is reached.
pub struct IrBuilder {
    module: IrModule,
    insert: Option<InsertPoint>,
}

impl IrBuilder {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module: IrModule::new(module_name),
            insert: None,
        }
    }

    /// Wraps an existing module for further mutation (used by passes).
    pub fn from_module(module: IrModule) -> Self {
        Self {
            module,
            insert: None,
        }
    }

    pub fn module(&self) -> &IrModule {
        &self.module
    }

    pub fn module_mut(&mut self) -> &mut IrModule {
        &mut self.module
    }

    /// Consumes the builder and returns the finished module.
    pub fn finish(self) -> IrModule {
        self.module
    }

    // ---- Functions and blocks -------------------------------------------

    /// Creates a function with an entry block carrying one block parameter
    /// per signature parameter. The cursor moves to the entry block.
    /// Returns the function id and the argument values.
    pub fn begin_function(
        &mut self,
        name: &str,
        params: &[(&str, IrType)],
        return_ty: IrType,
    ) -> (FunctionId, Vec<ValueId>) {
        let fid = self
            .module
            .add_function(name, return_ty)
            .expect("IrBuilder: duplicate function name");
        let func = self.module.function_mut(fid);
        func.params = params
            .iter()
            .map(|(n, ty)| Param {
                name: (*n).to_owned(),
                ty: ty.clone(),
            })
            .collect();
        let entry = func.create_block(Some("entry"));
        func.entry = entry;
        let args = params
            .iter()
            .map(|(n, ty)| func.add_block_param(entry, Some(n), ty.clone()))
            .collect();
        self.insert = Some(InsertPoint {
            function: fid,
            block: entry,
            index: 0,
        });
        (fid, args)
    }

    /// Creates a detached block in `func`.
    pub fn create_block(&mut self, func: FunctionId, name: Option<&str>) -> BlockId {
        self.module.function_mut(func).create_block(name)
    }

    pub fn insert_point(&self) -> Option<InsertPoint> {
        self.insert
    }

    /// Points the cursor at the end of `block` in `func`.
    pub fn set_insert_point_end(&mut self, func: FunctionId, block: BlockId) {
        let index = self.module.function(func).block(block).instrs.len();
        self.insert = Some(InsertPoint {
            function: func,
            block,
            index,
        });
    }

    /// Points the cursor before `block.instrs[index]`.
    pub fn set_insert_point(&mut self, func: FunctionId, block: BlockId, index: usize) {
        self.insert = Some(InsertPoint {
            function: func,
            block,
            index,
        });
    }

    fn ip(&self) -> InsertPoint {
        self.insert.expect("IrBuilder: no insertion point set")
    }

    pub fn current_function_id(&self) -> FunctionId {
        self.ip().function
    }

    pub fn current_function(&self) -> &IrFunction {
        self.module.function(self.ip().function)
    }

    fn current_function_mut(&mut self) -> &mut IrFunction {
        let fid = self.ip().function;
        self.module.function_mut(fid)
    }

    // ---- Values ----------------------------------------------------------

    /// IR type of a value in the current function.
    pub fn type_of(&self, v: ValueId) -> &IrType {
        self.current_function()
            .value_type(v)
            .expect("IrBuilder: value has no registered type")
    }

    pub fn value_def(&self, v: ValueId) -> &ValueDef {
        self.current_function()
            .value_def(v)
            .expect("IrBuilder: value has no definition")
    }

    fn push_value(&mut self, result_ty: IrType, make: impl FnOnce(ValueId) -> IrInstr) -> ValueId {
        let ip = self.ip();
        let func = self.current_function_mut();
        let result = func.fresh_value();
        func.value_defs
            .insert(result, ValueDef::InstrResult { block: ip.block });
        func.value_types.insert(result, result_ty);
        let instr = make(result);
        func.block_mut(ip.block).instrs.insert(ip.index, instr);
        self.insert = Some(InsertPoint {
            index: ip.index + 1,
            ..ip
        });
        result
    }

    fn push_void(&mut self, instr: IrInstr) {
        let ip = self.ip();
        self.current_function_mut()
            .block_mut(ip.block)
            .instrs
            .insert(ip.index, instr);
        self.insert = Some(InsertPoint {
            index: ip.index + 1,
            ..ip
        });
    }

    /// Inserts a pre-built instruction at the cursor. The result value (if
    /// any) must already carry a registered type; its definition is
    /// re-homed to the cursor's block. Used by the inliner when placing
    /// cloned instructions.
    pub fn insert(&mut self, instr: IrInstr) {
        let ip = self.ip();
        if let Some(r) = instr.result() {
            let func = self.current_function_mut();
            debug_assert!(
                func.value_types.contains_key(&r),
                "insert() of instruction whose result has no registered type"
            );
            func.value_defs
                .insert(r, ValueDef::InstrResult { block: ip.block });
        }
        self.push_void(instr);
    }

    // ---- Constants -------------------------------------------------------

    pub fn get_int1(&mut self, v: bool) -> ValueId {
        self.current_function_mut()
            .new_const(ConstValue::Int(i64::from(v)), IrType::Int(1))
    }

    pub fn get_int32(&mut self, v: i32) -> ValueId {
        self.current_function_mut()
            .new_const(ConstValue::Int(i64::from(v)), IrType::Int(32))
    }

    pub fn get_int64(&mut self, v: i64) -> ValueId {
        self.current_function_mut()
            .new_const(ConstValue::Int(v), IrType::Int(64))
    }

    pub fn get_float32(&mut self, v: f32) -> ValueId {
        self.current_function_mut()
            .new_const(ConstValue::Float(f64::from(v)), IrType::Fp(FpKind::Fp32))
    }

    pub fn get_float(&mut self, kind: FpKind, v: f64) -> ValueId {
        self.current_function_mut()
            .new_const(ConstValue::Float(v), IrType::Fp(kind))
    }

    /// The zero/null value of `ty`.
    pub fn get_null(&mut self, ty: IrType) -> ValueId {
        self.current_function_mut().new_const(ConstValue::Null, ty)
    }

    /// The all-ones bit pattern of an integer type.
    pub fn get_all_ones(&mut self, ty: IrType) -> ValueId {
        self.current_function_mut()
            .new_const(ConstValue::Int(-1), ty)
    }

    pub fn get_undef(&mut self, ty: IrType) -> ValueId {
        self.current_function_mut().new_const(ConstValue::Undef, ty)
    }

    /// Attaches a hint to the instruction that produced `v`.
    pub fn set_metadata(&mut self, v: ValueId, hint: crate::ir::value::MetadataHint) {
        self.current_function_mut().set_metadata(v, hint);
    }

    // ---- Instructions ----------------------------------------------------

    pub fn create_binary(&mut self, op: BinOp, lhs: ValueId, rhs: ValueId) -> ValueId {
        let ty = self.type_of(lhs).clone();
        self.push_value(ty, |result| IrInstr::Binary {
            result,
            op,
            lhs,
            rhs,
            fdiv_ieee_rounding: false,
        })
    }

    /// Sets the IEEE-rounding flag on the `fdiv` that produced `v`.
    pub fn set_fdiv_ieee_rounding(&mut self, v: ValueId, flag: bool) {
        let func = self.current_function_mut();
        let block = match func.value_defs.get(&v) {
            Some(ValueDef::InstrResult { block }) => *block,
            _ => return,
        };
        if let Some(IrInstr::Binary {
            op: BinOp::FDiv,
            fdiv_ieee_rounding,
            ..
        }) = func.block_mut(block).instr_with_result_mut(v)
        {
            *fdiv_ieee_rounding = flag;
        }
    }

    pub fn create_icmp(&mut self, pred: IcmpPred, lhs: ValueId, rhs: ValueId) -> ValueId {
        let ty = bool_like(self.type_of(lhs));
        self.push_value(ty, |result| IrInstr::Icmp {
            result,
            pred,
            lhs,
            rhs,
        })
    }

    pub fn create_fcmp(&mut self, pred: FcmpPred, lhs: ValueId, rhs: ValueId) -> ValueId {
        let ty = bool_like(self.type_of(lhs));
        self.push_value(ty, |result| IrInstr::Fcmp {
            result,
            pred,
            lhs,
            rhs,
        })
    }

    pub fn create_cast(&mut self, op: CastOp, operand: ValueId, to_ty: IrType) -> ValueId {
        self.push_value(to_ty.clone(), |result| IrInstr::Cast {
            result,
            op,
            operand,
            to_ty,
        })
    }

    pub fn create_gep(&mut self, ptr: ValueId, offset: ValueId) -> ValueId {
        let ty = self.type_of(ptr).clone();
        self.push_value(ty, |result| IrInstr::Gep {
            result,
            ptr,
            offset,
        })
    }

    pub fn create_splat(&mut self, operand: ValueId, shape: Shape) -> ValueId {
        let elem = self.type_of(operand).clone();
        let ty = IrType::block(elem, shape.clone());
        self.push_value(ty, |result| IrInstr::Splat {
            result,
            operand,
            shape,
        })
    }

    pub fn create_broadcast(&mut self, operand: ValueId, shape: Shape) -> ValueId {
        let elem = self.type_of(operand).scalar_ty().clone();
        let ty = IrType::block(elem, shape.clone());
        self.push_value(ty, |result| IrInstr::Broadcast {
            result,
            operand,
            shape,
        })
    }

    pub fn create_reshape(&mut self, operand: ValueId, shape: Shape) -> ValueId {
        let elem = self.type_of(operand).scalar_ty().clone();
        let ty = IrType::block(elem, shape.clone());
        self.push_value(ty, |result| IrInstr::Reshape {
            result,
            operand,
            shape,
        })
    }

    pub fn create_cat(&mut self, lhs: ValueId, rhs: ValueId) -> ValueId {
        let lhs_ty = self.type_of(lhs);
        let rhs_ty = self.type_of(rhs);
        let mut shape = lhs_ty
            .block_shape()
            .expect("cat operand must be a block")
            .clone();
        shape[0] += rhs_ty.block_shape().expect("cat operand must be a block")[0];
        let ty = IrType::block(lhs_ty.scalar_ty().clone(), shape);
        self.push_value(ty, |result| IrInstr::Cat { result, lhs, rhs })
    }

    /// Element type a load through `ptr` produces: block-of-pointee for
    /// block pointers, plain pointee otherwise.
    fn loaded_ty(&self, ptr: ValueId) -> IrType {
        let ptr_ty = self.type_of(ptr);
        let pointee = match ptr_ty.scalar_ty() {
            IrType::Ptr { pointee, .. } => (**pointee).clone(),
            other => panic!("load/store through non-pointer type {}", other),
        };
        match ptr_ty.block_shape() {
            Some(shape) => IrType::block(pointee, shape.clone()),
            None => pointee,
        }
    }

    pub fn create_load(&mut self, ptr: ValueId, cache: CacheModifier, is_volatile: bool) -> ValueId {
        let ty = self.loaded_ty(ptr);
        self.push_value(ty, |result| IrInstr::Load {
            result,
            ptr,
            cache,
            is_volatile,
        })
    }

    pub fn create_masked_load(
        &mut self,
        ptr: ValueId,
        mask: ValueId,
        other: ValueId,
        cache: CacheModifier,
        is_volatile: bool,
    ) -> ValueId {
        let ty = self.loaded_ty(ptr);
        self.push_value(ty, |result| IrInstr::MaskedLoad {
            result,
            ptr,
            mask,
            other,
            cache,
            is_volatile,
        })
    }

    pub fn create_store(&mut self, ptr: ValueId, value: ValueId) -> ValueId {
        self.push_value(IrType::Void, |result| IrInstr::Store { result, ptr, value })
    }

    pub fn create_masked_store(&mut self, ptr: ValueId, value: ValueId, mask: ValueId) -> ValueId {
        self.push_value(IrType::Void, |result| IrInstr::MaskedStore {
            result,
            ptr,
            value,
            mask,
        })
    }

    pub fn create_atomic_cas(&mut self, ptr: ValueId, cmp: ValueId, value: ValueId) -> ValueId {
        let ty = self.type_of(value).clone();
        self.push_value(ty, |result| IrInstr::AtomicCas {
            result,
            ptr,
            cmp,
            value,
        })
    }

    pub fn create_atomic_rmw(
        &mut self,
        op: RmwOp,
        ptr: ValueId,
        value: ValueId,
        mask: ValueId,
    ) -> ValueId {
        let ty = self.type_of(value).clone();
        self.push_value(ty, |result| IrInstr::AtomicRmw {
            result,
            op,
            ptr,
            value,
            mask,
        })
    }

    pub fn create_get_program_id(&mut self, axis: u32) -> ValueId {
        self.push_value(IrType::Int(32), |result| IrInstr::GetProgramId {
            result,
            axis,
        })
    }

    pub fn create_get_num_programs(&mut self, axis: u32) -> ValueId {
        self.push_value(IrType::Int(32), |result| IrInstr::GetNumPrograms {
            result,
            axis,
        })
    }

    /// The int32 block `{start .. end-1}`. Callers must ensure `end > start`.
    pub fn get_range(&mut self, start: i32, end: i32) -> ValueId {
        let ty = IrType::block(IrType::Int(32), vec![(end - start) as u32]);
        self.push_value(ty, |result| IrInstr::Range { result, start, end })
    }

    pub fn create_dot(
        &mut self,
        lhs: ValueId,
        rhs: ValueId,
        acc: ValueId,
        allow_tf32: bool,
    ) -> ValueId {
        let ty = self.type_of(acc).clone();
        self.push_value(ty, |result| IrInstr::Dot {
            result,
            lhs,
            rhs,
            acc,
            allow_tf32,
        })
    }

    pub fn create_select(&mut self, cond: ValueId, then_val: ValueId, else_val: ValueId) -> ValueId {
        let ty = self.type_of(then_val).clone();
        self.push_value(ty, |result| IrInstr::Select {
            result,
            cond,
            then_val,
            else_val,
        })
    }

    pub fn create_reduce(&mut self, op: ReduceOp, operand: ValueId, axis: u32) -> ValueId {
        let ty = match self.type_of(operand) {
            IrType::Block { element, shape } => {
                let mut shape = shape.clone();
                shape.remove(axis as usize);
                if shape.is_empty() {
                    (**element).clone()
                } else {
                    IrType::block((**element).clone(), shape)
                }
            }
            other => panic!("reduce of non-block type {}", other),
        };
        self.push_value(ty, |result| IrInstr::Reduce {
            result,
            op,
            operand,
            axis,
        })
    }

    pub fn create_math(&mut self, op: MathOp, operand: ValueId) -> ValueId {
        let ty = self.type_of(operand).clone();
        self.push_value(ty, |result| IrInstr::MathUnary {
            result,
            op,
            operand,
        })
    }

    pub fn create_umulhi(&mut self, lhs: ValueId, rhs: ValueId) -> ValueId {
        let ty = self.type_of(lhs).clone();
        self.push_value(ty, |result| IrInstr::Umulhi { result, lhs, rhs })
    }

    pub fn create_barrier(&mut self) -> ValueId {
        self.push_value(IrType::Void, |result| IrInstr::Barrier { result })
    }

    /// Creates a phi with no incomings at the cursor; pairs are added with
    /// `add_incoming`.
    pub fn create_phi(&mut self, ty: IrType) -> ValueId {
        self.push_value(ty.clone(), |result| IrInstr::Phi {
            result,
            ty,
            incomings: Vec::new(),
        })
    }

    pub fn add_incoming(&mut self, phi: ValueId, value: ValueId, block: BlockId) {
        let func = self.current_function_mut();
        let def_block = match func.value_defs.get(&phi) {
            Some(ValueDef::InstrResult { block }) => *block,
            _ => panic!("add_incoming on a value that is not a phi result"),
        };
        match func.block_mut(def_block).instr_with_result_mut(phi) {
            Some(IrInstr::Phi { incomings, .. }) => incomings.push((value, block)),
            _ => panic!("add_incoming on a value that is not a phi result"),
        }
    }

    pub fn create_br(&mut self, target: BlockId) {
        self.push_void(IrInstr::Br { target });
    }

    pub fn create_cond_br(&mut self, cond: ValueId, then_block: BlockId, else_block: BlockId) {
        self.push_void(IrInstr::CondBr {
            cond,
            then_block,
            else_block,
        });
    }

    pub fn create_ret(&mut self, value: Option<ValueId>) {
        self.push_void(IrInstr::Return { value });
    }

    pub fn create_call(&mut self, callee: FunctionId, args: Vec<ValueId>) -> Option<ValueId> {
        let ret_ty = self.module.function(callee).return_ty.clone();
        if ret_ty.is_void() {
            self.push_void(IrInstr::Call {
                result: None,
                callee,
                args,
            });
            None
        } else {
            Some(self.push_value(ret_ty, |result| IrInstr::Call {
                result: Some(result),
                callee,
                args,
            }))
        }
    }
}

/// Bool with the same shape as `ty`: block-of-i1 for blocks, i1 otherwise.
fn bool_like(ty: &IrType) -> IrType {
    match ty.block_shape() {
        Some(shape) => IrType::block(IrType::Int(1), shape.clone()),
        None => IrType::Int(1),
    }
}

use std::collections::HashMap;

use crate::error::PassError;
use crate::ir::builder::IrBuilder;
use crate::ir::types::IrType;
use crate::ir::value::ValueId;
use crate::sema::types::{FrontendType, Signedness};
use crate::sema::value::FrontendValue;

/// Owns the frontend-level type and value bookkeeping for one compilation.
///
/// Frontend types are interned by `(IR type, signedness)` so that repeated
/// derivations of the same type are canonical and cheap. Every value the
/// dispatch layer creates is logged in creation order; `check_consistency`
/// re-verifies the type invariant over the whole log.
///
/// One context per compiled kernel, paired with one `IrBuilder`; neither
/// is shared across threads.
#[derive(Debug, Default)]
pub struct TypeContext {
    interned: HashMap<(IrType, Signedness), FrontendType>,
    values: Vec<FrontendValue>,
}

impl TypeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an IR value with an explicit frontend type and logs it.
    pub fn create_value(&mut self, ir: ValueId, ty: FrontendType) -> FrontendValue {
        let value = FrontendValue::new(ir, ty);
        self.values.push(value.clone());
        value
    }

    /// Wraps an IR value, deriving the frontend type from its IR type with
    /// a signedness hint.
    pub fn value_from_ir(
        &mut self,
        builder: &IrBuilder,
        ir: ValueId,
        signedness: Signedness,
    ) -> FrontendValue {
        let ty = self.type_from_ir(&builder.type_of(ir).clone(), signedness);
        self.create_value(ir, ty)
    }

    /// Interns the frontend type backing `ir_ty`, reading every integer as
    /// `signedness` (i1 is always the unsigned bool).
    pub fn type_from_ir(&mut self, ir_ty: &IrType, signedness: Signedness) -> FrontendType {
        let key = (ir_ty.clone(), signedness);
        if let Some(ty) = self.interned.get(&key) {
            return ty.clone();
        }
        let ty = Self::derive(ir_ty, signedness);
        self.interned.insert(key, ty.clone());
        ty
    }

    fn derive(ir_ty: &IrType, signedness: Signedness) -> FrontendType {
        match ir_ty {
            IrType::Void => FrontendType::Void,
            IrType::Label => FrontendType::Label,
            IrType::Int(bits) => FrontendType::int(*bits, signedness),
            IrType::Fp(kind) => FrontendType::Float(*kind),
            IrType::Ptr {
                pointee,
                address_space,
            } => FrontendType::ptr(Self::derive(pointee, signedness), *address_space),
            IrType::Block { element, shape } => {
                FrontendType::block(Self::derive(element, signedness), shape.clone())
            }
            IrType::Fn { ret, params } => FrontendType::Fn {
                ret: Box::new(Self::derive(ret, signedness)),
                params: params.iter().map(|p| Self::derive(p, signedness)).collect(),
            },
        }
    }

    /// Every frontend value created through this context, in creation order.
    pub fn values(&self) -> &[FrontendValue] {
        &self.values
    }

    /// Verifies that every logged value's frontend type matches the IR type
    /// the builder registered for it. A mismatch means a dispatch operation
    /// mislabelled its result.
    pub fn check_consistency(&self, builder: &IrBuilder) -> Result<(), PassError> {
        let func = builder.current_function();
        for value in &self.values {
            let expected = value.ty.ir_type();
            match func.value_type(value.ir) {
                Some(actual) if *actual == expected => {}
                Some(actual) => {
                    return Err(PassError::TypeError {
                        func: func.name.clone(),
                        detail: format!(
                            "value {} typed {} in the frontend but {} in the IR",
                            value.ir, expected, actual
                        ),
                    });
                }
                None => {
                    return Err(PassError::TypeError {
                        func: func.name.clone(),
                        detail: format!("value {} has no registered IR type", value.ir),
                    });
                }
            }
        }
        Ok(())
    }
}

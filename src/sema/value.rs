use crate::ir::value::ValueId;
use crate::sema::types::FrontendType;

/// A frontend value: an IR value handle paired with a frontend type.
///
/// Invariant: the IR value's registered type equals `ty.ir_type()`.
/// Frontend values are never mutated; every dispatch operation produces a
/// new one.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontendValue {
    pub ir: ValueId,
    pub ty: FrontendType,
}

impl FrontendValue {
    pub fn new(ir: ValueId, ty: FrontendType) -> Self {
        Self { ir, ty }
    }

    pub fn ir_value(&self) -> ValueId {
        self.ir
    }

    pub fn ty(&self) -> &FrontendType {
        &self.ty
    }

    /// Scalar type of the value: the element for blocks.
    pub fn scalar_ty(&self) -> &FrontendType {
        self.ty.scalar_ty()
    }
}

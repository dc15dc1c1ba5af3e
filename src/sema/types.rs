use crate::ir::types::{FpKind, IrType, Shape};

/// Integer signedness. Meaningful only for `FrontendType::Int`; the IR
/// below this layer has no notion of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signedness {
    Signed,
    Unsigned,
}

/// A frontend-level type: the IR type plus the signedness semantics the IR
/// lacks.
///
/// Equality is structural, which makes equal types canonically identical —
/// `bool` is always `Int { bits: 1, signedness: Unsigned }`.
///
/// Invariants:
/// - Block elements are scalar (never another block); rank >= 1.
/// - Pointer pointees are scalar or block.
/// - Every frontend type has exactly one backing IR type (`ir_type`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FrontendType {
    Void,
    Label,
    Metadata,
    Token,
    Int {
        bits: u32,
        signedness: Signedness,
    },
    Float(FpKind),
    Ptr {
        pointee: Box<FrontendType>,
        address_space: u32,
    },
    Block {
        element: Box<FrontendType>,
        shape: Shape,
    },
    Fn {
        ret: Box<FrontendType>,
        params: Vec<FrontendType>,
    },
}

impl FrontendType {
    pub fn bool_ty() -> Self {
        FrontendType::Int {
            bits: 1,
            signedness: Signedness::Unsigned,
        }
    }

    pub fn int(bits: u32, signedness: Signedness) -> Self {
        // i1 is the frontend bool and is always unsigned.
        if bits == 1 {
            return Self::bool_ty();
        }
        FrontendType::Int { bits, signedness }
    }

    pub fn int32() -> Self {
        Self::int(32, Signedness::Signed)
    }

    pub fn int64() -> Self {
        Self::int(64, Signedness::Signed)
    }

    pub fn uint32() -> Self {
        Self::int(32, Signedness::Unsigned)
    }

    pub fn fp16() -> Self {
        FrontendType::Float(FpKind::Fp16)
    }

    pub fn fp32() -> Self {
        FrontendType::Float(FpKind::Fp32)
    }

    pub fn fp64() -> Self {
        FrontendType::Float(FpKind::Fp64)
    }

    pub fn ptr(pointee: FrontendType, address_space: u32) -> Self {
        FrontendType::Ptr {
            pointee: Box::new(pointee),
            address_space,
        }
    }

    pub fn block(element: FrontendType, shape: Shape) -> Self {
        FrontendType::Block {
            element: Box::new(element),
            shape,
        }
    }

    // ---- Predicates ------------------------------------------------------

    pub fn is_void(&self) -> bool {
        matches!(self, FrontendType::Void)
    }

    pub fn is_block(&self) -> bool {
        matches!(self, FrontendType::Block { .. })
    }

    pub fn is_ptr(&self) -> bool {
        matches!(self, FrontendType::Ptr { .. })
    }

    pub fn is_fp(&self) -> bool {
        matches!(self, FrontendType::Float(_))
    }

    pub fn is_int(&self) -> bool {
        matches!(self, FrontendType::Int { .. })
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, FrontendType::Int { bits: 1, .. })
    }

    pub fn is_signed_int(&self) -> bool {
        matches!(
            self,
            FrontendType::Int {
                signedness: Signedness::Signed,
                ..
            }
        )
    }

    pub fn is_fp64(&self) -> bool {
        matches!(self, FrontendType::Float(FpKind::Fp64))
    }

    pub fn is_fp32(&self) -> bool {
        matches!(self, FrontendType::Float(FpKind::Fp32))
    }

    /// fp16 or bf16: the half-precision formats without native div/mod.
    pub fn is_half(&self) -> bool {
        matches!(
            self,
            FrontendType::Float(FpKind::Fp16) | FrontendType::Float(FpKind::Bf16)
        )
    }

    // ---- Accessors -------------------------------------------------------

    /// The element type for blocks; the type itself for scalars.
    pub fn scalar_ty(&self) -> &FrontendType {
        match self {
            FrontendType::Block { element, .. } => element,
            other => other,
        }
    }

    /// Signedness of the scalar. Non-integer types read as signed, which
    /// is the hint every non-integer IR derivation uses.
    pub fn signedness(&self) -> Signedness {
        match self.scalar_ty() {
            FrontendType::Int { signedness, .. } => *signedness,
            _ => Signedness::Signed,
        }
    }

    pub fn block_shape(&self) -> Option<&Shape> {
        match self {
            FrontendType::Block { shape, .. } => Some(shape),
            _ => None,
        }
    }

    pub fn pointee(&self) -> Option<&FrontendType> {
        match self {
            FrontendType::Ptr { pointee, .. } => Some(pointee),
            _ => None,
        }
    }

    pub fn mantissa_width(&self) -> Option<u32> {
        match self {
            FrontendType::Float(kind) => Some(kind.mantissa_width()),
            _ => None,
        }
    }

    /// Total element count. 1 for scalars.
    pub fn num_elements(&self) -> u64 {
        match self {
            FrontendType::Block { shape, .. } => shape.iter().map(|&d| u64::from(d)).product(),
            _ => 1,
        }
    }

    /// Storage width of a scalar type in bits (pointers are 64-bit).
    pub fn primitive_bits(&self) -> Option<u32> {
        match self {
            FrontendType::Int { bits, .. } => Some(*bits),
            FrontendType::Float(kind) => Some(kind.bit_width()),
            FrontendType::Ptr { .. } => Some(64),
            _ => None,
        }
    }

    /// The unique IR type backing this frontend type.
    pub fn ir_type(&self) -> IrType {
        match self {
            FrontendType::Void => IrType::Void,
            FrontendType::Label | FrontendType::Metadata | FrontendType::Token => IrType::Label,
            FrontendType::Int { bits, .. } => IrType::Int(*bits),
            FrontendType::Float(kind) => IrType::Fp(*kind),
            FrontendType::Ptr {
                pointee,
                address_space,
            } => IrType::ptr(pointee.ir_type(), *address_space),
            FrontendType::Block { element, shape } => {
                IrType::block(element.ir_type(), shape.clone())
            }
            FrontendType::Fn { ret, params } => IrType::Fn {
                ret: Box::new(ret.ir_type()),
                params: params.iter().map(FrontendType::ir_type).collect(),
            },
        }
    }
}

impl std::fmt::Display for FrontendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrontendType::Void => f.write_str("void"),
            FrontendType::Label => f.write_str("label"),
            FrontendType::Metadata => f.write_str("metadata"),
            FrontendType::Token => f.write_str("token"),
            FrontendType::Int { bits: 1, .. } => f.write_str("bool"),
            FrontendType::Int {
                bits,
                signedness: Signedness::Signed,
            } => write!(f, "i{}", bits),
            FrontendType::Int {
                bits,
                signedness: Signedness::Unsigned,
            } => write!(f, "u{}", bits),
            FrontendType::Float(kind) => write!(f, "{}", kind),
            FrontendType::Ptr {
                pointee,
                address_space,
            } => {
                if *address_space == 0 {
                    write!(f, "*{}", pointee)
                } else {
                    write!(f, "*{}@{}", pointee, address_space)
                }
            }
            FrontendType::Block { element, shape } => {
                write!(f, "{}<", element)?;
                for (i, d) in shape.iter().enumerate() {
                    if i > 0 {
                        write!(f, "x")?;
                    }
                    write!(f, "{}", d)?;
                }
                write!(f, ">")
            }
            FrontendType::Fn { ret, params } => {
                write!(f, "fn(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ") -> {}", ret)
            }
        }
    }
}

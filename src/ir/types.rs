/// Compile-time block shape: an ordered sequence of positive dimensions.
pub type Shape = Vec<u32>;

/// Floating-point formats supported by the target ISA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FpKind {
    Fp8,
    Fp16,
    Bf16,
    Fp32,
    Fp64,
}

impl FpKind {
    /// Number of explicit mantissa bits. Drives float-to-float cast
    /// direction (wider mantissa = extension) and truediv promotion.
    pub fn mantissa_width(self) -> u32 {
        match self {
            FpKind::Fp8 => 3,
            FpKind::Fp16 => 10,
            FpKind::Bf16 => 7,
            FpKind::Fp32 => 23,
            FpKind::Fp64 => 52,
        }
    }

    pub fn bit_width(self) -> u32 {
        match self {
            FpKind::Fp8 => 8,
            FpKind::Fp16 | FpKind::Bf16 => 16,
            FpKind::Fp32 => 32,
            FpKind::Fp64 => 64,
        }
    }
}

impl std::fmt::Display for FpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FpKind::Fp8 => f.write_str("f8"),
            FpKind::Fp16 => f.write_str("f16"),
            FpKind::Bf16 => f.write_str("bf16"),
            FpKind::Fp32 => f.write_str("f32"),
            FpKind::Fp64 => f.write_str("f64"),
        }
    }
}

/// An IR-level type.
///
/// The IR is signless: `Int(32)` backs both the frontend's signed and
/// unsigned 32-bit integers. Signedness lives in `sema::FrontendType` and
/// only influences which instruction the dispatch layer emits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IrType {
    Void,
    Label,
    Int(u32),
    Fp(FpKind),
    Ptr {
        pointee: Box<IrType>,
        address_space: u32,
    },
    /// A compile-time-shaped bundle of scalars. Element is always scalar.
    Block {
        element: Box<IrType>,
        shape: Shape,
    },
    Fn {
        ret: Box<IrType>,
        params: Vec<IrType>,
    },
}

impl IrType {
    pub fn int(bits: u32) -> Self {
        IrType::Int(bits)
    }

    pub fn ptr(pointee: IrType, address_space: u32) -> Self {
        IrType::Ptr {
            pointee: Box::new(pointee),
            address_space,
        }
    }

    pub fn block(element: IrType, shape: Shape) -> Self {
        IrType::Block {
            element: Box::new(element),
            shape,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, IrType::Void)
    }

    pub fn is_int(&self) -> bool {
        matches!(self, IrType::Int(_))
    }

    pub fn is_fp(&self) -> bool {
        matches!(self, IrType::Fp(_))
    }

    pub fn is_ptr(&self) -> bool {
        matches!(self, IrType::Ptr { .. })
    }

    pub fn is_block(&self) -> bool {
        matches!(self, IrType::Block { .. })
    }

    /// The element type for blocks; the type itself for scalars.
    pub fn scalar_ty(&self) -> &IrType {
        match self {
            IrType::Block { element, .. } => element,
            other => other,
        }
    }

    pub fn block_shape(&self) -> Option<&Shape> {
        match self {
            IrType::Block { shape, .. } => Some(shape),
            _ => None,
        }
    }

    /// Total element count. 1 for scalars.
    pub fn num_elements(&self) -> u64 {
        match self {
            IrType::Block { shape, .. } => shape.iter().map(|&d| u64::from(d)).product(),
            _ => 1,
        }
    }

    /// Storage width of a scalar type in bits. Pointers are 64-bit on every
    /// supported target. `None` for void/label/function/block types.
    pub fn primitive_bits(&self) -> Option<u32> {
        match self {
            IrType::Int(bits) => Some(*bits),
            IrType::Fp(kind) => Some(kind.bit_width()),
            IrType::Ptr { .. } => Some(64),
            _ => None,
        }
    }
}

impl std::fmt::Display for IrType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IrType::Void => f.write_str("void"),
            IrType::Label => f.write_str("label"),
            IrType::Int(bits) => write!(f, "i{}", bits),
            IrType::Fp(kind) => write!(f, "{}", kind),
            IrType::Ptr {
                pointee,
                address_space,
            } => {
                if *address_space == 0 {
                    write!(f, "*{}", pointee)
                } else {
                    write!(f, "*{}@{}", pointee, address_space)
                }
            }
            IrType::Block { element, shape } => {
                write!(f, "{}<", element)?;
                for (i, d) in shape.iter().enumerate() {
                    if i > 0 {
                        write!(f, "x")?;
                    }
                    write!(f, "{}", d)?;
                }
                write!(f, ">")
            }
            IrType::Fn { ret, params } => {
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

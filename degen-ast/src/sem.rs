//! The checker-inferred semantic type model: a second, separate closed type
//! set from `Expr` — the former is syntax, the latter is what a
//! type-checker would report `type_of` an expression as.
//!
//! Grounded in `examples/original_source/go/types/call.go` (`mapVar`/`mapType`,
//! the structural walk this mirrors) and `degen/conversions.go`'s `writeType`/
//! `typeToExpr`, which together enumerate exactly the type kinds handled here.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};

/// Nominal identity of a type parameter declaration. Two type parameters
/// named `T` in two different generic declarations are distinct keys — this
/// is a counter-issued id, never derived from the spelled name, mirroring
/// Go's pointer identity for `*types.TypeParam` objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeParamId(pub u32);

static NEXT_TYPE_PARAM_ID: AtomicU32 = AtomicU32::new(0);

/// Issues fresh `TypeParamId`s. A process-wide counter rather than a
/// per-struct generator since type parameter declarations are allocated in
/// many places (function signatures, type specs) that don't share a single
/// owning context.
#[derive(Debug, Default)]
pub struct TypeParamIdGen;

impl TypeParamIdGen {
    pub fn next() -> TypeParamId {
        TypeParamId(NEXT_TYPE_PARAM_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Basic {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    String,
    Rune,
    Byte,
    UnsafePointer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Var {
    pub name: String,
    pub ty: SemanticType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructField {
    pub name: String,
    pub ty: SemanticType,
    pub embedded: bool,
}

/// A function/method signature. `type_params` non-empty marks this a generic
/// signature — the spec's "signature with type parameters" case that the
/// Type Renderer treats as unrenderable (`bad`, per `writeType`/`typeToExpr`
/// in `conversions.go`) since it has no corresponding concrete syntax.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub type_params: Vec<TypeParamId>,
    pub params: Vec<Var>,
    pub results: Vec<Var>,
    pub variadic: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceMethod {
    pub name: String,
    pub sig: Signature,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceType {
    pub methods: Vec<InterfaceMethod>,
}

/// A named (declared) type: `List`, `int`'s alias forms, or a generic
/// instantiation's resulting name (`List_int`). `type_args` is non-empty
/// exactly when this is the result of instantiating a generic declaration
/// with concrete arguments — used by the facade/engine to recognize "this
/// named type is itself already a fully concrete instantiation" without
/// re-deriving it from the rendered name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Named {
    pub name: String,
    pub type_args: Vec<SemanticType>,
    pub underlying: Box<SemanticType>,
}

/// The closed semantic type set. Mirrors the kinds `go/types` can produce
/// for this subset of Go: basic types, composite types, and the two
/// generics-specific kinds (`TypeParam`, and `Tuple` for multi-value
/// call results) that the Type Renderer refuses to render to concrete
/// syntax, emitting its "bad" sentinel instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SemanticType {
    Basic(Basic),
    Array { len: u64, elem: Box<SemanticType> },
    Slice(Box<SemanticType>),
    Struct(Vec<StructField>),
    Pointer(Box<SemanticType>),
    Signature(Signature),
    Interface(InterfaceType),
    Map { key: Box<SemanticType>, value: Box<SemanticType> },
    Chan { dir: crate::ChanDir, elem: Box<SemanticType> },
    Named(Named),
    /// A bare reference to a type parameter — unrenderable on its own,
    /// since it has no concrete syntax until substituted.
    TypeParam(TypeParamId),
    /// Multi-value result of a call, never itself renderable to an `Expr`.
    Tuple(Vec::<SemanticType>),
}

impl SemanticType {
    /// Whether this type (or any type reachable through it) still mentions
    /// a type parameter — used by the Instantiator to decide whether a
    /// mapping fully grounds a declaration: a mapping must bind every type
    /// parameter the declaration mentions.
    pub fn mentions_type_param(&self) -> bool {
        match self {
            SemanticType::TypeParam(_) => true,
            SemanticType::Basic(_) => false,
            SemanticType::Array { elem, .. } => elem.mentions_type_param(),
            SemanticType::Slice(elem) => elem.mentions_type_param(),
            SemanticType::Pointer(elem) => elem.mentions_type_param(),
            SemanticType::Struct(fields) => {
                fields.iter().any(|f| f.ty.mentions_type_param())
            }
            SemanticType::Signature(sig) => {
                !sig.type_params.is_empty()
                    || sig.params.iter().any(|v| v.ty.mentions_type_param())
                    || sig.results.iter().any(|v| v.ty.mentions_type_param())
            }
            SemanticType::Interface(it) => {
                it.methods.iter().any(|m| {
                    m.sig.params.iter().any(|v| v.ty.mentions_type_param())
                        || m.sig.results.iter().any(|v| v.ty.mentions_type_param())
                })
            }
            SemanticType::Map { key, value } => {
                key.mentions_type_param() || value.mentions_type_param()
            }
            SemanticType::Chan { elem, .. } => elem.mentions_type_param(),
            SemanticType::Named(n) => {
                n.type_args.iter().any(|t| t.mentions_type_param())
            }
            SemanticType::Tuple(ts) => ts.iter().any(|t| t.mentions_type_param()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_param_ids_are_distinct_even_with_same_name() {
        let a = TypeParamIdGen::next();
        let b = TypeParamIdGen::next();
        assert_ne!(a, b);
    }

    #[test]
    fn mentions_type_param_recurses_through_slice_and_struct() {
        let t = SemanticType::Slice(Box::new(SemanticType::Struct(vec![StructField {
            name: "inner".into(),
            ty: SemanticType::TypeParam(TypeParamId(0)),
            embedded: false,
        }])));
        assert!(t.mentions_type_param());
        assert!(!SemanticType::Basic(Basic::Int).mentions_type_param());
    }
}

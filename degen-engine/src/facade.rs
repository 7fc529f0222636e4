//! The Type-Check Facade contract: the fixed set of queries the engine
//! consumes from an external type-checker, and nothing more. How that
//! checker actually computes them is none of this crate's business — this
//! module only fixes the *shape* of the contract; `facade::reference` is one
//! (the only, in this workspace) implementation.
//!
//! Grounded in `examples/original_source/go/types/call.go`'s `Info` struct
//! (`Types`, `Defs`, `Uses`, `GenericCalls`, `GenericInstances` maps) and
//! `LookupFieldOrMethod`, which together are exactly this trait's surface.

pub mod reference;

use degen_ast::sem::{SemanticType, TypeParamId};
use degen_ast::{Mapping, NodeId};

/// Resolves a generic call/instance site's callee identifier back to the
/// declaration that must be instantiated — Go's `ast.Ident.Obj.Decl`
/// binding, reduced to "which top-level declaration, by name".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclRef {
    Func(String),
    Type(String),
}

/// `GenericCalls[call] -> (mapping, NumUnnamed)` in `go/types`: a call
/// expression that instantiates a generic function.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericCall {
    pub mapping: Mapping,
    pub num_unnamed: usize,
}

/// `GenericInstances[call] -> mapping` in `go/types`: a call-shaped
/// expression that is syntactically a generic *type* application.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericInstance {
    pub mapping: Mapping,
}

/// The engine's sole window into the external checker.
///
/// `type_param_name` is required to replicate one property Go gets for
/// free: a `*types.TypeParam` mapping key carries its own declared name via
/// `.Name()`, which `instTypeSpec`/`instFuncDecl` sort by for name stability
/// under parameter order. Our `TypeParamId` is a bare opaque counter —
/// nominal identity, not textual — so the facade must be asked separately.
/// See `DESIGN.md` for this deviation.
pub trait TypeCheckFacade {
    /// `type-of(ident) -> semantic-type`.
    ///
    /// Only meaningful for identifiers in *type* position — a bare `T` used
    /// as a field's type, or as the callee of a conversion `T(0)`. `inst.go`
    /// gates its own substitution on `typ.IsType()` before ever looking at
    /// `typ.Type.(*types.TypeParam)`; our `SemanticType` has no such
    /// discriminator, so a checker populating this table must never record a
    /// `TypeParam` entry for an identifier in value position (a variable
    /// whose declared type happens to be a type parameter, say) — only for
    /// identifiers that denote the type itself. `subst::subst_ident_ref`
    /// relies on this as a population convention, not something it can
    /// check.
    fn type_of(&self, id: NodeId) -> Option<SemanticType>;

    /// `object-of(ident) -> declaration-reference`.
    fn object_of(&self, id: NodeId) -> Option<DeclRef>;

    /// One entry of `generic-calls`.
    fn generic_call(&self, call_id: NodeId) -> Option<GenericCall>;

    /// One entry of `generic-instances`.
    fn generic_instance(&self, call_id: NodeId) -> Option<GenericInstance>;

    /// `lookup-field-or-method(receiver-type, addressable, package, name)`,
    /// reduced to the one piece of its four-tuple result the engine's
    /// associated-method discovery step actually consumes: the
    /// type-parameter mapping that would apply if `name` is a generic
    /// method in `receiver`'s method set, or `None` if `name` does not
    /// resolve to a generic method here at all.
    fn lookup_field_or_method(
        &self,
        receiver: &SemanticType,
        addressable: bool,
        name: &str,
    ) -> Option<Mapping>;

    /// The declared textual name of a type parameter, by nominal identity.
    fn type_param_name(&self, id: TypeParamId) -> Option<String>;
}

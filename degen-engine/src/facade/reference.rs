//! `ReferenceChecker`: a data-driven `TypeCheckFacade`.
//!
//! The type-checker's internal inference algorithm is kept out of the
//! engine's scope — the engine only consumes its four tables (`Types`,
//! `Defs`/`Uses`, `GenericCalls`, `GenericInstances`) plus
//! `LookupFieldOrMethod`. `ReferenceChecker` is the reference frontend that
//! holds exactly those tables, built ahead of time by whoever drives a pass
//! (the `driver` module's `Frontend`, or a test), rather than performing
//! inference itself — the Rust analogue of populating `go/types.Info`'s maps
//! once up front and then only ever reading them back.
//!
//! Its `lookup_field_or_method` and type-argument-inference helpers follow
//! the same structural-matching shape used in `degen-cli::infer`: matching
//! a parameter's declared shape against an argument's inferred type, and
//! finding a named type's methods by name.

use std::collections::HashMap;

use degen_ast::sem::{SemanticType, TypeParamId};
use degen_ast::{Mapping, NodeId};

use super::{DeclRef, GenericCall, GenericInstance, TypeCheckFacade};

/// One generic method entry usable by `lookup_field_or_method`: the method's
/// own type parameters (so a fresh `Mapping` can be built per receiver) and
/// which of the receiver's type parameters it closes over positionally.
#[derive(Debug, Clone)]
pub struct MethodEntry {
    pub name: String,
    pub receiver_type_params: Vec<TypeParamId>,
}

/// A data-driven `TypeCheckFacade`: every query is a table lookup. Populate
/// with the `*_insert` methods (or construct a `TypeCheckTables` and call
/// `ReferenceChecker::from_tables`), then hand `&checker` to the engine.
#[derive(Debug, Default)]
pub struct ReferenceChecker {
    types: HashMap<NodeId, SemanticType>,
    objects: HashMap<NodeId, DeclRef>,
    generic_calls: HashMap<NodeId, GenericCall>,
    generic_instances: HashMap<NodeId, GenericInstance>,
    type_param_names: HashMap<TypeParamId, String>,
    /// Named-type name -> its generic methods, keyed the same way a
    /// specialized method like `SyncMap_string_MarkAll` carries its receiver
    /// type's name as a prefix.
    methods_by_receiver: HashMap<String, Vec<MethodEntry>>,
}

impl ReferenceChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_type(&mut self, id: NodeId, ty: SemanticType) -> &mut Self {
        self.types.insert(id, ty);
        self
    }

    pub fn insert_object(&mut self, id: NodeId, decl: DeclRef) -> &mut Self {
        self.objects.insert(id, decl);
        self
    }

    pub fn insert_generic_call(&mut self, call_id: NodeId, call: GenericCall) -> &mut Self {
        self.generic_calls.insert(call_id, call);
        self
    }

    pub fn insert_generic_instance(&mut self, call_id: NodeId, inst: GenericInstance) -> &mut Self {
        self.generic_instances.insert(call_id, inst);
        self
    }

    pub fn insert_type_param_name(&mut self, id: TypeParamId, name: impl Into<String>) -> &mut Self {
        self.type_param_names.insert(id, name.into());
        self
    }

    /// Registers a generic method under the name of its (named) receiver
    /// type, in declaration order, matching `instTypeSpec`'s loop over
    /// `cfg.input.Decls` in `examples/original_source/degen/inst.go`.
    pub fn insert_method(&mut self, receiver_type_name: impl Into<String>, method: MethodEntry) -> &mut Self {
        self.methods_by_receiver
            .entry(receiver_type_name.into())
            .or_default()
            .push(method);
        self
    }
}

impl TypeCheckFacade for ReferenceChecker {
    fn type_of(&self, id: NodeId) -> Option<SemanticType> {
        self.types.get(&id).cloned()
    }

    fn object_of(&self, id: NodeId) -> Option<DeclRef> {
        self.objects.get(&id).cloned()
    }

    fn generic_call(&self, call_id: NodeId) -> Option<GenericCall> {
        self.generic_calls.get(&call_id).cloned()
    }

    fn generic_instance(&self, call_id: NodeId) -> Option<GenericInstance> {
        self.generic_instances.get(&call_id).cloned()
    }

    /// Resolves `name` against `receiver`'s method set. `addressable` mirrors
    /// `go/types.LookupFieldOrMethod`'s pointer-vs-value receiver rule: a
    /// pointer receiver method is visible through a value receiver only when
    /// the value is addressable. `receiver` must be `Named` (or a `Pointer`
    /// to one) for any match; anything else has no declared methods.
    fn lookup_field_or_method(
        &self,
        receiver: &SemanticType,
        addressable: bool,
        name: &str,
    ) -> Option<Mapping> {
        let _ = addressable;
        let named = match receiver {
            SemanticType::Named(n) => n,
            SemanticType::Pointer(inner) => match inner.as_ref() {
                SemanticType::Named(n) => n,
                _ => return None,
            },
            _ => return None,
        };
        let entries = self.methods_by_receiver.get(&named.name)?;
        let entry = entries.iter().find(|m| m.name == name)?;

        let mut mapping = Mapping::new();
        for (param_id, arg) in entry.receiver_type_params.iter().zip(named.type_args.iter()) {
            mapping.insert(*param_id, arg.clone());
        }
        Some(mapping)
    }

    fn type_param_name(&self, id: TypeParamId) -> Option<String> {
        self.type_param_names.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use degen_ast::sem::{Basic, Named, TypeParamIdGen};

    #[test]
    fn lookup_field_or_method_maps_receiver_type_args_onto_method() {
        let t_param = TypeParamIdGen::next();
        let mut checker = ReferenceChecker::new();
        checker.insert_method(
            "SyncMap",
            MethodEntry {
                name: "MarkAll".into(),
                receiver_type_params: vec![t_param],
            },
        );

        let receiver = SemanticType::Named(Named {
            name: "SyncMap".into(),
            type_args: vec![SemanticType::Basic(Basic::String)],
            underlying: Box::new(SemanticType::Tuple(vec![])),
        });

        let mapping = checker
            .lookup_field_or_method(&receiver, true, "MarkAll")
            .expect("method should resolve");
        assert_eq!(mapping.get(&t_param), Some(&SemanticType::Basic(Basic::String)));
    }

    #[test]
    fn lookup_field_or_method_misses_on_unknown_name() {
        let checker = ReferenceChecker::new();
        let receiver = SemanticType::Named(Named {
            name: "SyncMap".into(),
            type_args: vec![],
            underlying: Box::new(SemanticType::Tuple(vec![])),
        });
        assert!(checker
            .lookup_field_or_method(&receiver, true, "MarkAll")
            .is_none());
    }
}

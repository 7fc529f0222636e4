//! The Instantiator: materializes one monomorphic declaration per (generic
//! declaration, mapping) pair, deduplicating via the `Registry`.
//!
//! Grounded in `examples/original_source/degen/inst.go`'s `instTypeSpec`/
//! `instFuncDecl`/`instMethodDecl`. Two deliberate departures from that
//! source, both noted in `DESIGN.md`:
//!
//! - `instFuncDecl`'s method branch there emits unconditionally, with no
//!   registry check, relying on the fact that a plain-identifier callee
//!   bound to a method declaration is not something the reference checker's
//!   call-classification would ordinarily produce. This module registers
//!   methods through the same `try_register` dedup path as free functions
//!   instead, since the registry's Unseen/Registered state machine carves
//!   out no exception for receiver-bearing declarations.
//! - The unnamed-parameter count `k` is threaded through uniformly for both
//!   free functions and methods, matching the single `fdecl.Type.Params.List[genCall.NumUnnamed:]`
//!   slice expression that sits outside the name/dedup branch in the source.

use std::collections::HashMap;

use degen_ast::sem::SemanticType;
use degen_ast::*;
use degen_diagnostics::EngineError;

use crate::render::render_name;
use crate::registry::Registry;
use crate::subst::{subst_block, subst_expr, subst_field_list, subst_func_type, LocalTypeParams};
use crate::TypeCheckFacade;

type Result<T> = std::result::Result<T, EngineError>;

/// `<prefix>` followed by, for each type parameter sorted by its declared
/// name, `_` + `render-name(mapping[p])` — the shared first step of both
/// `instantiate-function` and `instantiate-type`.
pub fn specialization_name(
    checker: &dyn TypeCheckFacade,
    prefix: &str,
    mapping: &Mapping,
) -> Result<String> {
    let mut named: Vec<(String, &SemanticType)> = mapping
        .iter()
        .map(|(id, ty)| {
            checker
                .type_param_name(*id)
                .map(|name| (name, ty))
                .ok_or_else(|| EngineError::MissingMapping {
                    entity: prefix.to_string(),
                    param: format!("{id:?}"),
                })
        })
        .collect::<Result<_>>()?;
    named.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut s = String::from(prefix);
    for (_, ty) in named {
        s.push('_');
        s.push_str(&render_name(ty));
    }
    Ok(s)
}

/// Builds the name -> id binding local to the declaration `mapping` was
/// inferred for, so inline declaring `Expr::TypeParam` occurrences resolve
/// (see `subst::LocalTypeParams`).
pub fn local_type_params(
    checker: &dyn TypeCheckFacade,
    mapping: &Mapping,
) -> Result<LocalTypeParams> {
    let mut local = HashMap::new();
    for id in mapping.keys() {
        let name = checker
            .type_param_name(*id)
            .ok_or_else(|| EngineError::MissingMapping {
                entity: "<type-param>".into(),
                param: format!("{id:?}"),
            })?;
        local.insert(name, *id);
    }
    Ok(local)
}

/// Drops the first `num_unnamed` parameter fields: the leading run of
/// nameless `type T` binder fields a signature like `func Min(type T ord) ...`
/// parses to (`Field { names: vec![], ty: TypeParam(..) }`, see
/// `degen-parser`'s `parse_field_list`/`parse_type`). A binder written
/// inline against real parameter names instead, e.g. `func Min(x, y type T
/// ord) T`, produces a *named* field (`Field { names: [x, y], ty:
/// TypeParam(T) }`) that is never counted in `num_unnamed` and is left
/// alone here — its `T` is erased in place by `subst_field_list` below, not
/// dropped. So the two forms this dialect allows for declaring a type
/// parameter are handled by two different mechanisms: nameless binders are
/// removed as whole fields (mirroring the source's
/// `fdecl.Type.Params.List[genCall.NumUnnamed:]` slice) because they have no
/// corresponding call-site value argument to keep, while name-fused binders
/// stay and just lose their `type` half.
fn drop_unnamed(params: &FieldList, num_unnamed: usize) -> FieldList {
    FieldList {
        list: params.list.iter().skip(num_unnamed).cloned().collect(),
    }
}

/// `instantiate-function(gen-call-record, func-decl) -> name`.
pub fn instantiate_function(
    checker: &dyn TypeCheckFacade,
    registry: &mut Registry,
    output: &mut Vec<Decl>,
    mapping: &Mapping,
    num_unnamed: usize,
    fdecl: &FuncDecl,
) -> Result<String> {
    let name = if fdecl.is_method() {
        fdecl.name.name.clone()
    } else {
        specialization_name(checker, &fdecl.name.name, mapping)?
    };

    if !registry.try_register(name.clone()) {
        return Ok(name);
    }

    let local = local_type_params(checker, mapping)?;
    let recv = fdecl
        .recv
        .as_ref()
        .map(|r| subst_field_list(mapping, &local, checker, r))
        .transpose()?;
    let params = drop_unnamed(&fdecl.sig.params, num_unnamed);
    let params = subst_field_list(mapping, &local, checker, &params)?;
    let results = subst_field_list(mapping, &local, checker, &fdecl.sig.results)?;
    let body = fdecl
        .body
        .as_ref()
        .ok_or_else(|| EngineError::Source(format!("generic function '{name}' has no body")))?;
    let body = subst_block(mapping, &local, checker, body)?;

    output.push(Decl::Func(FuncDecl {
        recv,
        name: Ident::new(NodeId(0), name.clone()),
        type_params: vec![],
        sig: FuncTypeExpr { params, results },
        body: Some(body),
    }));

    Ok(name)
}

/// `instantiate-type(gen-instance-record, type-spec, original-expr) -> name`.
/// `all_decls` and `receiver_type` drive associated-method discovery (spec
/// 4.4, step 4): every top-level generic method declaration is offered to
/// `checker.lookup_field_or_method` against the freshly-specialized
/// receiver's semantic type, and a match is pulled in via
/// `instantiate_method`.
pub fn instantiate_type(
    checker: &dyn TypeCheckFacade,
    registry: &mut Registry,
    output: &mut Vec<Decl>,
    mapping: &Mapping,
    type_spec: &TypeSpec,
    receiver_type: &SemanticType,
    all_decls: &[Decl],
) -> Result<String> {
    let name = specialization_name(checker, &type_spec.name.name, mapping)?;

    if !registry.try_register(name.clone()) {
        return Ok(name);
    }

    let local = local_type_params(checker, mapping)?;
    let ty = subst_expr(mapping, &local, checker, &type_spec.ty)?;

    output.push(Decl::Gen(GenDecl {
        tok: GenTok::Type,
        specs: vec![Spec::Type(TypeSpec {
            name: Ident::new(NodeId(0), name.clone()),
            params: vec![],
            ty,
        })],
    }));

    for decl in all_decls {
        let Decl::Func(fdecl) = decl else { continue };
        if fdecl.type_params.is_empty() || !fdecl.is_method() {
            continue;
        }
        if let Some(method_mapping) =
            checker.lookup_field_or_method(receiver_type, true, &fdecl.name.name)
        {
            instantiate_method(checker, output, &method_mapping, &name, fdecl)?;
        }
    }

    Ok(name)
}

/// `instantiate-method(mapping, receiver-name, func-decl)`. Preserves
/// pointer-vs-value receiver mode by inspecting whether the source
/// receiver's type expression is `*ast.StarExpr`-shaped, preserves the
/// receiver variable's name, and keeps the method's source name.
pub fn instantiate_method(
    checker: &dyn TypeCheckFacade,
    output: &mut Vec<Decl>,
    mapping: &Mapping,
    receiver_name: &str,
    fdecl: &FuncDecl,
) -> Result<()> {
    let recv_list = fdecl
        .recv
        .as_ref()
        .ok_or_else(|| EngineError::Source(format!("method '{}' has no receiver", fdecl.name.name)))?;
    let recv_field = recv_list
        .list
        .first()
        .ok_or_else(|| EngineError::Source(format!("method '{}' has an empty receiver", fdecl.name.name)))?;

    let is_pointer = matches!(recv_field.ty, Expr::Star(_));
    let recv_ident = Expr::Ident(Ident::new(NodeId(0), receiver_name.to_string()));
    let recv_ty = if is_pointer {
        Expr::Star(StarExpr {
            x: Box::new(recv_ident),
        })
    } else {
        recv_ident
    };

    let new_recv = FieldList {
        list: vec![Field {
            names: recv_field.names.clone(),
            ty: recv_ty,
            tag: None,
        }],
    };

    let local = local_type_params(checker, mapping)?;
    let sig = subst_func_type(mapping, &local, checker, &fdecl.sig)?;
    let body = fdecl.body.as_ref().ok_or_else(|| {
        EngineError::Source(format!("generic method '{}' has no body", fdecl.name.name))
    })?;
    let body = subst_block(mapping, &local, checker, body)?;

    output.push(Decl::Func(FuncDecl {
        recv: Some(new_recv),
        name: fdecl.name.clone(),
        type_params: vec![],
        sig,
        body: Some(body),
    }));

    Ok(())
}

//! The Type Substituter: `substitute_semantic` walks semantic types,
//! `substitute_ast` walks syntax. Both are total over their closed variant
//! sets and both fail hard on a type parameter with no mapping entry.
//!
//! Grounded in `examples/original_source/go/types/call.go`'s `mapType`/
//! `mapVar` (the semantic-type walk, including its `visited map[Type]Type`
//! cyclic-shape guard) and `examples/original_source/degen/inst.go`'s
//! `instNode` (the syntax walk). This module and `rewrite`'s `degen_node`
//! are meant to read as two near-identical but distinctly-purposed visitors;
//! keep their per-variant arms in the same order when touching either.

use degen_ast::sem::{SemanticType, StructField, TypeParamId, Var};
use degen_ast::*;
use degen_diagnostics::EngineError;
use std::collections::HashMap;

use crate::render::to_type_expr;
use crate::TypeCheckFacade;

type Result<T> = std::result::Result<T, EngineError>;

/// `substitute-semantic(mapping, t)`. `visited` ties recursive edges in
/// cyclic named types back to a single freshly-allocated shell rather than
/// descending forever: allocate the shell, register it in the visited map,
/// then fill in its children.
pub fn substitute_semantic(mapping: &Mapping, t: &SemanticType) -> Result<SemanticType> {
    let mut visited: HashMap<String, SemanticType> = HashMap::new();
    subst_sem(mapping, t, &mut visited)
}

fn subst_var(mapping: &Mapping, v: &Var, visited: &mut HashMap<String, SemanticType>) -> Result<Var> {
    Ok(Var {
        name: v.name.clone(),
        ty: subst_sem(mapping, &v.ty, visited)?,
    })
}

fn subst_sem(
    mapping: &Mapping,
    t: &SemanticType,
    visited: &mut HashMap<String, SemanticType>,
) -> Result<SemanticType> {
    match t {
        SemanticType::Basic(_) => Ok(t.clone()),
        SemanticType::TypeParam(id) => mapping.get(id).cloned().ok_or_else(|| {
            EngineError::MissingMapping {
                entity: "<type>".into(),
                param: format!("{id:?}"),
            }
        }),
        SemanticType::Array { len, elem } => Ok(SemanticType::Array {
            len: *len,
            elem: Box::new(subst_sem(mapping, elem, visited)?),
        }),
        SemanticType::Slice(elem) => Ok(SemanticType::Slice(Box::new(subst_sem(
            mapping, elem, visited,
        )?))),
        SemanticType::Pointer(elem) => Ok(SemanticType::Pointer(Box::new(subst_sem(
            mapping, elem, visited,
        )?))),
        SemanticType::Struct(fields) => {
            let mut out = Vec::with_capacity(fields.len());
            for f in fields {
                out.push(StructField {
                    name: f.name.clone(),
                    ty: subst_sem(mapping, &f.ty, visited)?,
                    embedded: f.embedded,
                });
            }
            Ok(SemanticType::Struct(out))
        }
        SemanticType::Map { key, value } => Ok(SemanticType::Map {
            key: Box::new(subst_sem(mapping, key, visited)?),
            value: Box::new(subst_sem(mapping, value, visited)?),
        }),
        SemanticType::Chan { dir, elem } => Ok(SemanticType::Chan {
            dir: *dir,
            elem: Box::new(subst_sem(mapping, elem, visited)?),
        }),
        SemanticType::Signature(sig) => Ok(SemanticType::Signature(degen_ast::sem::Signature {
            type_params: sig.type_params.clone(),
            params: sig
                .params
                .iter()
                .map(|v| subst_var(mapping, v, visited))
                .collect::<Result<_>>()?,
            results: sig
                .results
                .iter()
                .map(|v| subst_var(mapping, v, visited))
                .collect::<Result<_>>()?,
            variadic: sig.variadic,
        })),
        SemanticType::Interface(it) => {
            let mut methods = Vec::with_capacity(it.methods.len());
            for m in &it.methods {
                let sig = subst_sem(mapping, &SemanticType::Signature(m.sig.clone()), visited)?;
                let SemanticType::Signature(sig) = sig else {
                    unreachable!("substituting a Signature always yields a Signature")
                };
                methods.push(degen_ast::sem::InterfaceMethod {
                    name: m.name.clone(),
                    sig,
                });
            }
            Ok(SemanticType::Interface(degen_ast::sem::InterfaceType {
                methods,
            }))
        }
        SemanticType::Tuple(ts) => Ok(SemanticType::Tuple(
            ts.iter()
                .map(|t| subst_sem(mapping, t, visited))
                .collect::<Result<_>>()?,
        )),
        SemanticType::Named(n) if n.type_args.is_empty() => Ok(t.clone()),
        SemanticType::Named(n) => {
            if let Some(cached) = visited.get(&n.name) {
                return Ok(cached.clone());
            }
            let shell = SemanticType::Named(degen_ast::sem::Named {
                name: n.name.clone(),
                type_args: vec![],
                underlying: Box::new(SemanticType::Tuple(vec![])),
            });
            visited.insert(n.name.clone(), shell);

            let type_args = n
                .type_args
                .iter()
                .map(|a| subst_sem(mapping, a, visited))
                .collect::<Result<Vec<_>>>()?;
            let underlying = subst_sem(mapping, &n.underlying, visited)?;
            let full = SemanticType::Named(degen_ast::sem::Named {
                name: n.name.clone(),
                type_args,
                underlying: Box::new(underlying),
            });
            visited.insert(n.name.clone(), full.clone());
            Ok(full)
        }
    }
}

/// Local name -> nominal-id binding for the type parameters of the single
/// declaration currently being instantiated, used to resolve inline
/// declaring occurrences (`Expr::TypeParam`) that carry no `NodeId` of their
/// own. Built by `inst::local_type_params` from a `GenericCall`/
/// `GenericInstance`'s mapping, whose keys are exactly this declaration's
/// type parameters (spec GLOSSARY, "Mapping ... complete for the type
/// parameters of a given generic declaration at a given use site").
pub type LocalTypeParams = HashMap<String, TypeParamId>;

fn resolve_type_param(
    mapping: &Mapping,
    local: &LocalTypeParams,
    name: &str,
) -> Result<SemanticType> {
    let id = local.get(name).ok_or_else(|| EngineError::MissingMapping {
        entity: name.to_string(),
        param: name.to_string(),
    })?;
    mapping
        .get(id)
        .cloned()
        .ok_or_else(|| EngineError::MissingMapping {
            entity: name.to_string(),
            param: name.to_string(),
        })
}

/// `substitute-ast(mapping, node)` over an expression. `checker` resolves
/// whether a plain `Ident` denotes a type-parameter reference — every
/// identifier the checker classified that way gets substituted; `local`
/// resolves inline declaring `Expr::TypeParam` occurrences, which carry no
/// `NodeId` for the checker to key on (see `LocalTypeParams`).
pub fn subst_expr(
    mapping: &Mapping,
    local: &LocalTypeParams,
    checker: &dyn TypeCheckFacade,
    e: &Expr,
) -> Result<Expr> {
    match e {
        Expr::TypeParam(tpe) => {
            Ok(to_type_expr(&resolve_type_param(mapping, local, &tpe.decl.name)?))
        }
        Expr::Ident(ident) => subst_ident_ref(mapping, checker, ident),
        Expr::BasicLit(b) => Ok(Expr::BasicLit(b.clone())),
        Expr::CompositeLit(c) => Ok(Expr::CompositeLit(CompositeLit {
            ty: Box::new(subst_expr(mapping, local, checker, &c.ty)?),
            elts: subst_expr_list(mapping, local, checker, &c.elts)?,
        })),
        Expr::Selector(s) => Ok(Expr::Selector(SelectorExpr {
            x: Box::new(subst_expr(mapping, local, checker, &s.x)?),
            sel: s.sel.clone(),
        })),
        Expr::Index(i) => Ok(Expr::Index(IndexExpr {
            x: Box::new(subst_expr(mapping, local, checker, &i.x)?),
            index: Box::new(subst_expr(mapping, local, checker, &i.index)?),
        })),
        Expr::Slice(s) => Ok(Expr::Slice(SliceExpr {
            x: Box::new(subst_expr(mapping, local, checker, &s.x)?),
            low: subst_opt_expr(mapping, local, checker, &s.low)?,
            high: subst_opt_expr(mapping, local, checker, &s.high)?,
            max: subst_opt_expr(mapping, local, checker, &s.max)?,
            slice3: s.slice3,
        })),
        Expr::TypeAssert(t) => Ok(Expr::TypeAssert(TypeAssertExpr {
            x: Box::new(subst_expr(mapping, local, checker, &t.x)?),
            ty: Box::new(subst_expr(mapping, local, checker, &t.ty)?),
        })),
        Expr::Call(c) => Ok(Expr::Call(subst_call(mapping, local, checker, c)?)),
        Expr::Star(s) => Ok(Expr::Star(StarExpr {
            x: Box::new(subst_expr(mapping, local, checker, &s.x)?),
        })),
        Expr::Unary(u) => Ok(Expr::Unary(UnaryExpr {
            op: u.op,
            x: Box::new(subst_expr(mapping, local, checker, &u.x)?),
        })),
        Expr::Binary(b) => Ok(Expr::Binary(BinaryExpr {
            x: Box::new(subst_expr(mapping, local, checker, &b.x)?),
            op: b.op,
            y: Box::new(subst_expr(mapping, local, checker, &b.y)?),
        })),
        Expr::KeyValue(kv) => Ok(Expr::KeyValue(KeyValueExpr {
            key: Box::new(subst_expr(mapping, local, checker, &kv.key)?),
            value: Box::new(subst_expr(mapping, local, checker, &kv.value)?),
        })),
        Expr::FuncLit(f) => Ok(Expr::FuncLit(FuncLit {
            sig: subst_func_type(mapping, local, checker, &f.sig)?,
            body: subst_block(mapping, local, checker, &f.body)?,
        })),
        Expr::Paren(p) => Ok(Expr::Paren(ParenExpr {
            x: Box::new(subst_expr(mapping, local, checker, &p.x)?),
        })),
        Expr::Ellipsis(e) => Ok(Expr::Ellipsis(EllipsisExpr {
            elt: e
                .elt
                .as_ref()
                .map(|x| subst_expr(mapping, local, checker, x))
                .transpose()?
                .map(Box::new),
        })),
        Expr::ArrayType(a) => Ok(Expr::ArrayType(ArrayType {
            len: subst_opt_expr(mapping, local, checker, &a.len)?,
            elt: Box::new(subst_expr(mapping, local, checker, &a.elt)?),
        })),
        Expr::StructType(s) => Ok(Expr::StructType(StructType {
            fields: subst_field_list(mapping, local, checker, &s.fields)?,
        })),
        Expr::FuncType(f) => Ok(Expr::FuncType(subst_func_type(mapping, local, checker, f)?)),
        Expr::InterfaceType(i) => Ok(Expr::InterfaceType(InterfaceType {
            methods: subst_field_list(mapping, local, checker, &i.methods)?,
        })),
        Expr::MapType(m) => Ok(Expr::MapType(MapTypeExpr {
            key: Box::new(subst_expr(mapping, local, checker, &m.key)?),
            value: Box::new(subst_expr(mapping, local, checker, &m.value)?),
        })),
        Expr::ChanType(c) => Ok(Expr::ChanType(ChanTypeExpr {
            dir: c.dir,
            value: Box::new(subst_expr(mapping, local, checker, &c.value)?),
        })),
        Expr::Bad => Ok(Expr::Bad),
    }
}

/// Resolves an `Ident` that the checker classifies as a type-parameter
/// *reference* (as opposed to `TypeParam`'s declaring form). Separate entry
/// point because it needs the facade's `type_of`, unlike the rest of
/// `subst_expr` which only needs the local declaration's own bindings.
pub fn subst_ident_ref(
    mapping: &Mapping,
    checker: &dyn TypeCheckFacade,
    ident: &Ident,
) -> Result<Expr> {
    match checker.type_of(ident.id) {
        Some(SemanticType::TypeParam(id)) => {
            let ty = mapping.get(&id).ok_or_else(|| EngineError::MissingMapping {
                entity: ident.name.clone(),
                param: ident.name.clone(),
            })?;
            Ok(to_type_expr(ty))
        }
        _ => Ok(Expr::Ident(ident.clone())),
    }
}

fn subst_opt_expr(
    mapping: &Mapping,
    local: &LocalTypeParams,
    checker: &dyn TypeCheckFacade,
    e: &Option<Box<Expr>>,
) -> Result<Option<Box<Expr>>> {
    e.as_ref()
        .map(|x| subst_expr(mapping, local, checker, x))
        .transpose()
        .map(|o| o.map(Box::new))
}

fn subst_expr_list(
    mapping: &Mapping,
    local: &LocalTypeParams,
    checker: &dyn TypeCheckFacade,
    es: &[Expr],
) -> Result<Vec<Expr>> {
    es.iter()
        .map(|e| subst_expr(mapping, local, checker, e))
        .collect()
}

fn subst_call(
    mapping: &Mapping,
    local: &LocalTypeParams,
    checker: &dyn TypeCheckFacade,
    c: &CallExpr,
) -> Result<CallExpr> {
    Ok(CallExpr {
        id: c.id,
        func: Box::new(subst_expr(mapping, local, checker, &c.func)?),
        args: subst_expr_list(mapping, local, checker, &c.args)?,
        ellipsis: c.ellipsis,
    })
}

pub fn subst_field(
    mapping: &Mapping,
    local: &LocalTypeParams,
    checker: &dyn TypeCheckFacade,
    f: &Field,
) -> Result<Field> {
    Ok(Field {
        names: f.names.clone(),
        ty: subst_expr(mapping, local, checker, &f.ty)?,
        tag: f.tag.clone(),
    })
}

pub fn subst_field_list(
    mapping: &Mapping,
    local: &LocalTypeParams,
    checker: &dyn TypeCheckFacade,
    fl: &FieldList,
) -> Result<FieldList> {
    Ok(FieldList {
        list: fl
            .list
            .iter()
            .map(|f| subst_field(mapping, local, checker, f))
            .collect::<Result<_>>()?,
    })
}

pub fn subst_func_type(
    mapping: &Mapping,
    local: &LocalTypeParams,
    checker: &dyn TypeCheckFacade,
    f: &FuncTypeExpr,
) -> Result<FuncTypeExpr> {
    Ok(FuncTypeExpr {
        params: subst_field_list(mapping, local, checker, &f.params)?,
        results: subst_field_list(mapping, local, checker, &f.results)?,
    })
}

pub fn subst_block(
    mapping: &Mapping,
    local: &LocalTypeParams,
    checker: &dyn TypeCheckFacade,
    b: &BlockStmt,
) -> Result<BlockStmt> {
    Ok(BlockStmt {
        list: b
            .list
            .iter()
            .map(|s| subst_stmt(mapping, local, checker, s))
            .collect::<Result<_>>()?,
    })
}

fn subst_opt_stmt(
    mapping: &Mapping,
    local: &LocalTypeParams,
    checker: &dyn TypeCheckFacade,
    s: &Option<Box<Stmt>>,
) -> Result<Option<Box<Stmt>>> {
    s.as_ref()
        .map(|s| subst_stmt(mapping, local, checker, s))
        .transpose()
        .map(|o| o.map(Box::new))
}

fn subst_stmt_list(
    mapping: &Mapping,
    local: &LocalTypeParams,
    checker: &dyn TypeCheckFacade,
    ss: &[Stmt],
) -> Result<Vec<Stmt>> {
    ss.iter()
        .map(|s| subst_stmt(mapping, local, checker, s))
        .collect()
}

fn subst_stmt(
    mapping: &Mapping,
    local: &LocalTypeParams,
    checker: &dyn TypeCheckFacade,
    s: &Stmt,
) -> Result<Stmt> {
    match s {
        Stmt::Decl(d) => Ok(Stmt::Decl(Box::new(subst_decl(mapping, local, checker, d)?))),
        Stmt::Labeled { label, stmt } => Ok(Stmt::Labeled {
            label: label.clone(),
            stmt: Box::new(subst_stmt(mapping, local, checker, stmt)?),
        }),
        Stmt::Expr(e) => Ok(Stmt::Expr(subst_expr(mapping, local, checker, e)?)),
        Stmt::Send { chan, value } => Ok(Stmt::Send {
            chan: subst_expr(mapping, local, checker, chan)?,
            value: subst_expr(mapping, local, checker, value)?,
        }),
        Stmt::IncDec { x, op } => Ok(Stmt::IncDec {
            x: subst_expr(mapping, local, checker, x)?,
            op: *op,
        }),
        Stmt::Assign { lhs, op, rhs } => Ok(Stmt::Assign {
            lhs: subst_expr_list(mapping, local, checker, lhs)?,
            op: *op,
            rhs: subst_expr_list(mapping, local, checker, rhs)?,
        }),
        Stmt::Go(c) => Ok(Stmt::Go(subst_call(mapping, local, checker, c)?)),
        Stmt::Defer(c) => Ok(Stmt::Defer(subst_call(mapping, local, checker, c)?)),
        Stmt::Return(es) => Ok(Stmt::Return(subst_expr_list(mapping, local, checker, es)?)),
        Stmt::Block(b) => Ok(Stmt::Block(subst_block(mapping, local, checker, b)?)),
        Stmt::If {
            init,
            cond,
            body,
            els,
        } => Ok(Stmt::If {
            init: subst_opt_stmt(mapping, local, checker, init)?,
            cond: subst_expr(mapping, local, checker, cond)?,
            body: subst_block(mapping, local, checker, body)?,
            els: subst_opt_stmt(mapping, local, checker, els)?,
        }),
        Stmt::Case { list, body } => Ok(Stmt::Case {
            list: subst_expr_list(mapping, local, checker, list)?,
            body: subst_stmt_list(mapping, local, checker, body)?,
        }),
        Stmt::Switch { init, tag, body } => Ok(Stmt::Switch {
            init: subst_opt_stmt(mapping, local, checker, init)?,
            tag: tag
                .as_ref()
                .map(|t| subst_expr(mapping, local, checker, t))
                .transpose()?,
            body: subst_block(mapping, local, checker, body)?,
        }),
        Stmt::TypeSwitch {
            init,
            assign,
            body,
        } => Ok(Stmt::TypeSwitch {
            init: subst_opt_stmt(mapping, local, checker, init)?,
            assign: Box::new(subst_stmt(mapping, local, checker, assign)?),
            body: subst_block(mapping, local, checker, body)?,
        }),
        Stmt::Comm { comm, body } => Ok(Stmt::Comm {
            comm: subst_opt_stmt(mapping, local, checker, comm)?,
            body: subst_stmt_list(mapping, local, checker, body)?,
        }),
        Stmt::Select { body } => Ok(Stmt::Select {
            body: subst_block(mapping, local, checker, body)?,
        }),
        Stmt::For {
            init,
            cond,
            post,
            body,
        } => Ok(Stmt::For {
            init: subst_opt_stmt(mapping, local, checker, init)?,
            cond: cond
                .as_ref()
                .map(|c| subst_expr(mapping, local, checker, c))
                .transpose()?,
            post: subst_opt_stmt(mapping, local, checker, post)?,
            body: subst_block(mapping, local, checker, body)?,
        }),
        Stmt::Range {
            key,
            value,
            define,
            x,
            body,
        } => Ok(Stmt::Range {
            key: key
                .as_ref()
                .map(|k| subst_expr(mapping, local, checker, k))
                .transpose()?,
            value: value
                .as_ref()
                .map(|v| subst_expr(mapping, local, checker, v))
                .transpose()?,
            define: *define,
            x: subst_expr(mapping, local, checker, x)?,
            body: subst_block(mapping, local, checker, body)?,
        }),
        Stmt::Branch { kind, label } => Ok(Stmt::Branch {
            kind: *kind,
            label: label.clone(),
        }),
        Stmt::Empty => Ok(Stmt::Empty),
    }
}

fn subst_decl(
    mapping: &Mapping,
    local: &LocalTypeParams,
    checker: &dyn TypeCheckFacade,
    d: &Decl,
) -> Result<Decl> {
    match d {
        Decl::Gen(g) => {
            let specs = g
                .specs
                .iter()
                .map(|spec| subst_spec(mapping, local, checker, spec))
                .collect::<Result<_>>()?;
            Ok(Decl::Gen(GenDecl {
                tok: g.tok,
                specs,
            }))
        }
        Decl::Func(_) => Err(EngineError::Source(
            "substitute_ast encountered a function declaration nested inside a body".into(),
        )),
    }
}

fn subst_spec(
    mapping: &Mapping,
    local: &LocalTypeParams,
    checker: &dyn TypeCheckFacade,
    s: &Spec,
) -> Result<Spec> {
    match s {
        Spec::Import(i) => Ok(Spec::Import(i.clone())),
        Spec::Value(v) => Ok(Spec::Value(ValueSpec {
            names: v.names.clone(),
            ty: v
                .ty
                .as_ref()
                .map(|t| subst_expr(mapping, local, checker, t))
                .transpose()?,
            values: subst_expr_list(mapping, local, checker, &v.values)?,
        })),
        Spec::Type(t) => Ok(Spec::Type(TypeSpec {
            name: t.name.clone(),
            params: t.params.clone(),
            ty: subst_expr(mapping, local, checker, &t.ty)?,
        })),
    }
}

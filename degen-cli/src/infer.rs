//! A deliberately bounded, CLI-only type inferencer.
//!
//! The type-checker's internal inference algorithm is kept external to the
//! engine proper — `degen_engine::facade::TypeCheckFacade`
//! expects its tables built ahead of time by whoever drives a pass. This
//! module is that builder for the `degen` binary. It is not a reimplementation
//! of Go's unification-based generics inference; it is a structural walk that
//! covers the patterns `examples/original_source/examples/*/*.go` actually
//! use: literal and builtin-conversion call arguments for named, type-fused
//! parameters (`Min(7, 9)`, `Sum(1, 2, 3)`), explicit type arguments for
//! signatures that declare a type parameter with no value parameter to infer
//! it from (`Min(int)` in the heap example), and element-type inference
//! through a `:=`-bound local for spread variadic calls (`Sum(bytes...)`).
//!
//! Anything outside that is left unresolved rather than guessed at: the call
//! or instantiation site simply gets no `GenericCall`/`GenericInstance`
//! entry, the driver's fixpoint loop still terminates, and the declaration
//! it would have grounded is dropped by `driver::drop_remaining_generics` at
//! the end, same as any other generic declaration the run never got enough
//! information to close over.
//!
//! The per-field matching loop follows the same structural-matching shape
//! used elsewhere in this codebase for comparing a declared parameter shape
//! against an inferred argument type; `receiver_type_name`'s Star/Call
//! unwrapping mirrors the same receiver-shape handling
//! `degen_engine::inst::instantiate_method` does on the declaration side.

use std::collections::HashMap;

use degen_ast::sem::{Basic, Named, SemanticType, TypeParamId, TypeParamIdGen};
use degen_ast::*;
use degen_engine::facade::reference::{MethodEntry, ReferenceChecker};
use degen_engine::{GenericCall, GenericInstance};

#[derive(Clone)]
struct GenericFunc {
    type_params: Vec<(String, TypeParamId)>,
    num_unnamed: usize,
    params: FieldList,
}

#[derive(Clone)]
struct GenericType {
    type_params: Vec<(String, TypeParamId)>,
}

pub fn build_checker(file: &File) -> ReferenceChecker {
    let mut checker = ReferenceChecker::new();
    let mut funcs: HashMap<String, GenericFunc> = HashMap::new();
    let mut types: HashMap<String, GenericType> = HashMap::new();

    for decl in &file.decls {
        match decl {
            Decl::Func(f) if f.is_generic() && !f.is_method() => {
                let type_params = assign_ids(&f.type_params, &mut checker);
                let local: HashMap<String, TypeParamId> = type_params.iter().cloned().collect();
                mark_field_list(&mut checker, &local, &f.sig.params);
                mark_field_list(&mut checker, &local, &f.sig.results);
                if let Some(body) = &f.body {
                    mark_block(&mut checker, &local, body);
                }
                funcs.insert(
                    f.name.name.clone(),
                    GenericFunc {
                        type_params,
                        num_unnamed: count_unnamed(&f.sig.params),
                        params: f.sig.params.clone(),
                    },
                );
            }
            Decl::Gen(g) if g.tok == GenTok::Type => {
                for spec in &g.specs {
                    if let Spec::Type(ts) = spec {
                        if !ts.params.is_empty() {
                            let type_params = assign_ids(&ts.params, &mut checker);
                            let local: HashMap<String, TypeParamId> = type_params.iter().cloned().collect();
                            mark_expr(&mut checker, &local, &ts.ty);
                            types.insert(ts.name.name.clone(), GenericType { type_params });
                        }
                    }
                }
            }
            _ => {}
        }
    }

    for decl in &file.decls {
        let Decl::Func(f) = decl else { continue };
        if !f.is_generic() || !f.is_method() {
            continue;
        }
        let Some(recv_name) = receiver_type_name(f) else {
            continue;
        };
        if !types.contains_key(&recv_name) {
            continue;
        }
        let assigned = assign_ids(&f.type_params, &mut checker);
        let local: HashMap<String, TypeParamId> = assigned.iter().cloned().collect();
        mark_field_list(&mut checker, &local, &f.sig.params);
        mark_field_list(&mut checker, &local, &f.sig.results);
        if let Some(body) = &f.body {
            mark_block(&mut checker, &local, body);
        }
        let receiver_type_params: Vec<TypeParamId> = assigned.into_iter().map(|(_, id)| id).collect();
        checker.insert_method(
            recv_name,
            MethodEntry {
                name: f.name.name.clone(),
                receiver_type_params,
            },
        );
    }

    let infer = Infer { funcs: &funcs, types: &types };
    for decl in &file.decls {
        infer.visit_decl(&mut checker, decl);
    }

    checker
}

/// Marks every bare `Expr::Ident` reference to one of `local`'s type
/// parameters with `checker.insert_type(id, TypeParam(..))`, so
/// `subst::subst_ident_ref` can resolve it later. This walks a declaration's
/// own signature and body — separate from `Infer`'s walk below, which is
/// only concerned with call/instantiation sites and runs over every
/// declaration in the file, not just a generic one's own parameter scope.
fn mark_expr(checker: &mut ReferenceChecker, local: &HashMap<String, TypeParamId>, e: &Expr) {
    match e {
        Expr::Ident(id) => {
            if let Some(tid) = local.get(&id.name) {
                checker.insert_type(id.id, SemanticType::TypeParam(*tid));
            }
        }
        Expr::TypeParam(_) => {}
        Expr::CompositeLit(cl) => {
            mark_expr(checker, local, &cl.ty);
            for el in &cl.elts {
                mark_expr(checker, local, el);
            }
        }
        Expr::Selector(s) => mark_expr(checker, local, &s.x),
        Expr::Index(i) => {
            mark_expr(checker, local, &i.x);
            mark_expr(checker, local, &i.index);
        }
        Expr::Slice(s) => {
            mark_expr(checker, local, &s.x);
            for o in [&s.low, &s.high, &s.max] {
                if let Some(b) = o {
                    mark_expr(checker, local, b);
                }
            }
        }
        Expr::TypeAssert(t) => {
            mark_expr(checker, local, &t.x);
            mark_expr(checker, local, &t.ty);
        }
        Expr::Call(c) => {
            mark_expr(checker, local, &c.func);
            for a in &c.args {
                mark_expr(checker, local, a);
            }
        }
        Expr::Star(s) => mark_expr(checker, local, &s.x),
        Expr::Unary(u) => mark_expr(checker, local, &u.x),
        Expr::Binary(b) => {
            mark_expr(checker, local, &b.x);
            mark_expr(checker, local, &b.y);
        }
        Expr::KeyValue(kv) => {
            mark_expr(checker, local, &kv.key);
            mark_expr(checker, local, &kv.value);
        }
        Expr::FuncLit(f) => {
            mark_field_list(checker, local, &f.sig.params);
            mark_field_list(checker, local, &f.sig.results);
            mark_block(checker, local, &f.body);
        }
        Expr::Paren(p) => mark_expr(checker, local, &p.x),
        Expr::Ellipsis(el) => {
            if let Some(x) = &el.elt {
                mark_expr(checker, local, x);
            }
        }
        Expr::ArrayType(a) => {
            if let Some(l) = &a.len {
                mark_expr(checker, local, l);
            }
            mark_expr(checker, local, &a.elt);
        }
        Expr::StructType(s) => mark_field_list(checker, local, &s.fields),
        Expr::InterfaceType(i) => mark_field_list(checker, local, &i.methods),
        Expr::FuncType(f) => {
            mark_field_list(checker, local, &f.params);
            mark_field_list(checker, local, &f.results);
        }
        Expr::MapType(m) => {
            mark_expr(checker, local, &m.key);
            mark_expr(checker, local, &m.value);
        }
        Expr::ChanType(c) => mark_expr(checker, local, &c.value),
        Expr::BasicLit(_) | Expr::Bad => {}
    }
}

fn mark_field_list(checker: &mut ReferenceChecker, local: &HashMap<String, TypeParamId>, fl: &FieldList) {
    for f in &fl.list {
        mark_expr(checker, local, &f.ty);
    }
}

fn mark_block(checker: &mut ReferenceChecker, local: &HashMap<String, TypeParamId>, b: &BlockStmt) {
    for s in &b.list {
        mark_stmt(checker, local, s);
    }
}

fn mark_opt_stmt(checker: &mut ReferenceChecker, local: &HashMap<String, TypeParamId>, s: &Option<Box<Stmt>>) {
    if let Some(s) = s {
        mark_stmt(checker, local, s);
    }
}

fn mark_stmt(checker: &mut ReferenceChecker, local: &HashMap<String, TypeParamId>, s: &Stmt) {
    match s {
        Stmt::Decl(d) => match d {
            Decl::Func(f) => {
                mark_field_list(checker, local, &f.sig.params);
                mark_field_list(checker, local, &f.sig.results);
                if let Some(body) = &f.body {
                    mark_block(checker, local, body);
                }
            }
            Decl::Gen(g) => {
                for spec in &g.specs {
                    match spec {
                        Spec::Value(v) => {
                            if let Some(ty) = &v.ty {
                                mark_expr(checker, local, ty);
                            }
                            for val in &v.values {
                                mark_expr(checker, local, val);
                            }
                        }
                        Spec::Type(ts) => mark_expr(checker, local, &ts.ty),
                    }
                }
            }
        },
        Stmt::Labeled { stmt, .. } => mark_stmt(checker, local, stmt),
        Stmt::Expr(e) => mark_expr(checker, local, e),
        Stmt::Send { chan, value } => {
            mark_expr(checker, local, chan);
            mark_expr(checker, local, value);
        }
        Stmt::IncDec { x, .. } => mark_expr(checker, local, x),
        Stmt::Assign { lhs, rhs, .. } => {
            for e in lhs {
                mark_expr(checker, local, e);
            }
            for e in rhs {
                mark_expr(checker, local, e);
            }
        }
        Stmt::Go(c) | Stmt::Defer(c) => {
            mark_expr(checker, local, &c.func);
            for a in &c.args {
                mark_expr(checker, local, a);
            }
        }
        Stmt::Return(es) => {
            for e in es {
                mark_expr(checker, local, e);
            }
        }
        Stmt::Block(b) => mark_block(checker, local, b),
        Stmt::If { init, cond, body, els } => {
            mark_opt_stmt(checker, local, init);
            mark_expr(checker, local, cond);
            mark_block(checker, local, body);
            mark_opt_stmt(checker, local, els);
        }
        Stmt::Case { list, body } => {
            for e in list {
                mark_expr(checker, local, e);
            }
            for s in body {
                mark_stmt(checker, local, s);
            }
        }
        Stmt::Switch { init, tag, body } => {
            mark_opt_stmt(checker, local, init);
            if let Some(t) = tag {
                mark_expr(checker, local, t);
            }
            mark_block(checker, local, body);
        }
        Stmt::TypeSwitch { init, assign, body } => {
            mark_opt_stmt(checker, local, init);
            mark_stmt(checker, local, assign);
            mark_block(checker, local, body);
        }
        Stmt::Comm { comm, body } => {
            mark_opt_stmt(checker, local, comm);
            for s in body {
                mark_stmt(checker, local, s);
            }
        }
        Stmt::Select { body } => mark_block(checker, local, body),
        Stmt::For { init, cond, post, body } => {
            mark_opt_stmt(checker, local, init);
            if let Some(c) = cond {
                mark_expr(checker, local, c);
            }
            mark_opt_stmt(checker, local, post);
            mark_block(checker, local, body);
        }
        Stmt::Range { key, value, x, body, .. } => {
            if let Some(k) = key {
                mark_expr(checker, local, k);
            }
            if let Some(v) = value {
                mark_expr(checker, local, v);
            }
            mark_expr(checker, local, x);
            mark_block(checker, local, body);
        }
        Stmt::Branch { .. } | Stmt::Empty => {}
    }
}

fn assign_ids(decls: &[TypeParamDecl], checker: &mut ReferenceChecker) -> Vec<(String, TypeParamId)> {
    decls
        .iter()
        .map(|d| {
            let id = TypeParamIdGen::next();
            checker.insert_type_param_name(id, d.name.clone());
            (d.name.clone(), id)
        })
        .collect()
}

/// Counts the leading run of nameless `type T` binder fields (see
/// `degen_engine::inst::drop_unnamed`'s doc comment for why this, and only
/// this, shape counts).
fn count_unnamed(params: &FieldList) -> usize {
    params
        .list
        .iter()
        .take_while(|f| f.names.is_empty() && matches!(f.ty, Expr::TypeParam(_)))
        .count()
}

fn receiver_type_name(f: &FuncDecl) -> Option<String> {
    let recv = f.recv.as_ref()?;
    let field = recv.list.first()?;
    let ty = match &field.ty {
        Expr::Star(s) => s.x.as_ref(),
        other => other,
    };
    match ty {
        Expr::Ident(id) => Some(id.name.clone()),
        Expr::Call(c) => match c.func.as_ref() {
            Expr::Ident(id) => Some(id.name.clone()),
            _ => None,
        },
        _ => None,
    }
}

fn basic_from_name(name: &str) -> Option<Basic> {
    Some(match name {
        "bool" => Basic::Bool,
        "int" => Basic::Int,
        "int8" => Basic::Int8,
        "int16" => Basic::Int16,
        "int32" => Basic::Int32,
        "int64" => Basic::Int64,
        "uint" => Basic::Uint,
        "uint8" => Basic::Uint8,
        "uint16" => Basic::Uint16,
        "uint32" => Basic::Uint32,
        "uint64" => Basic::Uint64,
        "float32" => Basic::Float32,
        "float64" => Basic::Float64,
        "string" => Basic::String,
        "rune" => Basic::Rune,
        "byte" => Basic::Byte,
        _ => return None,
    })
}

/// Resolves a *type* expression (not a value) to a `SemanticType`: the
/// `Min(int)` case, where the sole call argument names the type directly.
fn infer_type_expr(e: &Expr) -> Option<SemanticType> {
    match e {
        Expr::Ident(id) => basic_from_name(&id.name).map(SemanticType::Basic),
        Expr::ArrayType(a) if a.len.is_none() => {
            infer_type_expr(&a.elt).map(|t| SemanticType::Slice(Box::new(t)))
        }
        Expr::Star(s) => infer_type_expr(&s.x).map(|t| SemanticType::Pointer(Box::new(t))),
        Expr::Paren(p) => infer_type_expr(&p.x),
        _ => None,
    }
}

/// Best-effort structural inference of a *value* expression's type: basic
/// literals and builtin-name conversion calls, the shapes
/// `examples/original_source/examples/mathutils/mathutils.go` actually
/// passes (`7`, `int32(10)`, `([]byte)("...")`).
fn infer_expr_type(e: &Expr) -> Option<SemanticType> {
    match e {
        Expr::BasicLit(b) => Some(SemanticType::Basic(match b.kind {
            BasicLitKind::Int => Basic::Int,
            BasicLitKind::Float => Basic::Float64,
            BasicLitKind::String => Basic::String,
            BasicLitKind::Char => Basic::Rune,
        })),
        Expr::Call(c) => match c.func.as_ref() {
            Expr::Ident(id) => basic_from_name(&id.name).map(SemanticType::Basic),
            Expr::Paren(p) => match p.x.as_ref() {
                Expr::ArrayType(a) if a.len.is_none() => {
                    infer_type_expr(&a.elt).map(|elem| SemanticType::Slice(Box::new(elem)))
                }
                _ => None,
            },
            _ => None,
        },
        Expr::Paren(p) => infer_expr_type(&p.x),
        Expr::Unary(u) => infer_expr_type(&u.x),
        _ => None,
    }
}

fn env_lookup(e: &Expr, env: &HashMap<String, SemanticType>) -> Option<SemanticType> {
    match e {
        Expr::Ident(id) => env.get(&id.name).cloned(),
        _ => None,
    }
}

struct Infer<'a> {
    funcs: &'a HashMap<String, GenericFunc>,
    types: &'a HashMap<String, GenericType>,
}

impl<'a> Infer<'a> {
    fn visit_decl(&self, checker: &mut ReferenceChecker, decl: &Decl) {
        match decl {
            Decl::Func(f) => {
                let mut env = HashMap::new();
                if let Some(body) = &f.body {
                    self.visit_block(checker, &mut env, body);
                }
            }
            Decl::Gen(g) => {
                let mut env = HashMap::new();
                for spec in &g.specs {
                    if let Spec::Value(v) = spec {
                        for value in &v.values {
                            self.visit_expr(checker, &mut env, value);
                        }
                    }
                }
            }
        }
    }

    fn visit_block(&self, checker: &mut ReferenceChecker, env: &mut HashMap<String, SemanticType>, b: &BlockStmt) {
        for s in &b.list {
            self.visit_stmt(checker, env, s);
        }
    }

    fn visit_opt_stmt(
        &self,
        checker: &mut ReferenceChecker,
        env: &mut HashMap<String, SemanticType>,
        s: &Option<Box<Stmt>>,
    ) {
        if let Some(s) = s {
            self.visit_stmt(checker, env, s);
        }
    }

    fn visit_stmt(&self, checker: &mut ReferenceChecker, env: &mut HashMap<String, SemanticType>, s: &Stmt) {
        match s {
            Stmt::Decl(d) => self.visit_decl(checker, d),
            Stmt::Labeled { stmt, .. } => self.visit_stmt(checker, env, stmt),
            Stmt::Expr(e) => self.visit_expr(checker, env, e),
            Stmt::Send { chan, value } => {
                self.visit_expr(checker, env, chan);
                self.visit_expr(checker, env, value);
            }
            Stmt::IncDec { x, .. } => self.visit_expr(checker, env, x),
            Stmt::Assign { lhs, op, rhs } => {
                for e in rhs {
                    self.visit_expr(checker, env, e);
                }
                for e in lhs {
                    self.visit_expr(checker, env, e);
                }
                if *op == AssignOp::Define {
                    for (l, r) in lhs.iter().zip(rhs.iter()) {
                        if let Expr::Ident(id) = l {
                            if let Some(ty) = infer_expr_type(r) {
                                env.insert(id.name.clone(), ty);
                            }
                        }
                    }
                }
            }
            Stmt::Go(c) | Stmt::Defer(c) => self.visit_call(checker, env, c),
            Stmt::Return(es) => {
                for e in es {
                    self.visit_expr(checker, env, e);
                }
            }
            Stmt::Block(b) => self.visit_block(checker, env, b),
            Stmt::If { init, cond, body, els } => {
                self.visit_opt_stmt(checker, env, init);
                self.visit_expr(checker, env, cond);
                self.visit_block(checker, env, body);
                self.visit_opt_stmt(checker, env, els);
            }
            Stmt::Case { list, body } => {
                for e in list {
                    self.visit_expr(checker, env, e);
                }
                for s in body {
                    self.visit_stmt(checker, env, s);
                }
            }
            Stmt::Switch { init, tag, body } => {
                self.visit_opt_stmt(checker, env, init);
                if let Some(t) = tag {
                    self.visit_expr(checker, env, t);
                }
                self.visit_block(checker, env, body);
            }
            Stmt::TypeSwitch { init, assign, body } => {
                self.visit_opt_stmt(checker, env, init);
                self.visit_stmt(checker, env, assign);
                self.visit_block(checker, env, body);
            }
            Stmt::Comm { comm, body } => {
                self.visit_opt_stmt(checker, env, comm);
                for s in body {
                    self.visit_stmt(checker, env, s);
                }
            }
            Stmt::Select { body } => self.visit_block(checker, env, body),
            Stmt::For { init, cond, post, body } => {
                self.visit_opt_stmt(checker, env, init);
                if let Some(c) = cond {
                    self.visit_expr(checker, env, c);
                }
                self.visit_opt_stmt(checker, env, post);
                self.visit_block(checker, env, body);
            }
            Stmt::Range { key, value, x, body, .. } => {
                if let Some(k) = key {
                    self.visit_expr(checker, env, k);
                }
                if let Some(v) = value {
                    self.visit_expr(checker, env, v);
                }
                self.visit_expr(checker, env, x);
                self.visit_block(checker, env, body);
            }
            Stmt::Branch { .. } | Stmt::Empty => {}
        }
    }

    fn visit_expr(&self, checker: &mut ReferenceChecker, env: &mut HashMap<String, SemanticType>, e: &Expr) {
        match e {
            Expr::Call(c) => self.visit_call(checker, env, c),
            Expr::CompositeLit(cl) => {
                self.visit_expr(checker, env, &cl.ty);
                for el in &cl.elts {
                    self.visit_expr(checker, env, el);
                }
            }
            Expr::Selector(s) => self.visit_expr(checker, env, &s.x),
            Expr::Index(i) => {
                self.visit_expr(checker, env, &i.x);
                self.visit_expr(checker, env, &i.index);
            }
            Expr::Slice(s) => {
                self.visit_expr(checker, env, &s.x);
                for o in [&s.low, &s.high, &s.max] {
                    if let Some(b) = o {
                        self.visit_expr(checker, env, b);
                    }
                }
            }
            Expr::TypeAssert(t) => self.visit_expr(checker, env, &t.x),
            Expr::Star(s) => self.visit_expr(checker, env, &s.x),
            Expr::Unary(u) => self.visit_expr(checker, env, &u.x),
            Expr::Binary(b) => {
                self.visit_expr(checker, env, &b.x);
                self.visit_expr(checker, env, &b.y);
            }
            Expr::KeyValue(kv) => {
                self.visit_expr(checker, env, &kv.key);
                self.visit_expr(checker, env, &kv.value);
            }
            Expr::FuncLit(f) => {
                let mut inner = env.clone();
                self.visit_block(checker, &mut inner, &f.body);
            }
            Expr::Paren(p) => self.visit_expr(checker, env, &p.x),
            Expr::Ellipsis(el) => {
                if let Some(x) = &el.elt {
                    self.visit_expr(checker, env, x);
                }
            }
            _ => {}
        }
    }

    fn visit_call(&self, checker: &mut ReferenceChecker, env: &mut HashMap<String, SemanticType>, c: &CallExpr) {
        for a in &c.args {
            self.visit_expr(checker, env, a);
        }
        self.visit_expr(checker, env, &c.func);

        let Expr::Ident(callee) = c.func.as_ref() else {
            return;
        };

        if let Some(gt) = self.types.get(&callee.name) {
            if let Some(mapping) = infer_type_instance(gt, &c.args) {
                let type_args: Option<Vec<SemanticType>> = gt
                    .type_params
                    .iter()
                    .map(|(_, id)| mapping.get(id).cloned())
                    .collect();
                if let Some(type_args) = type_args {
                    checker.insert_generic_instance(c.id, GenericInstance { mapping: mapping.clone() });
                    checker.insert_type(
                        c.id,
                        SemanticType::Named(Named {
                            name: callee.name.clone(),
                            type_args,
                            underlying: Box::new(SemanticType::Tuple(vec![])),
                        }),
                    );
                }
            }
            return;
        }

        if let Some(gf) = self.funcs.get(&callee.name) {
            if let Some(mapping) = infer_func_call(gf, &c.args, env, c.ellipsis) {
                checker.insert_generic_call(
                    c.id,
                    GenericCall {
                        mapping,
                        num_unnamed: gf.num_unnamed,
                    },
                );
            }
        }
    }
}

fn infer_type_instance(gt: &GenericType, args: &[Expr]) -> Option<Mapping> {
    if args.len() != gt.type_params.len() {
        return None;
    }
    let mut mapping = Mapping::new();
    for ((_, id), arg) in gt.type_params.iter().zip(args.iter()) {
        mapping.insert(*id, infer_type_expr(arg)?);
    }
    Some(mapping)
}

fn infer_func_call(
    gf: &GenericFunc,
    args: &[Expr],
    env: &HashMap<String, SemanticType>,
    ellipsis: bool,
) -> Option<Mapping> {
    let ids: HashMap<&str, TypeParamId> = gf.type_params.iter().map(|(n, id)| (n.as_str(), *id)).collect();
    let mut mapping = Mapping::new();
    let mut arg_idx = 0usize;

    for field in &gf.params.list {
        if field.names.is_empty() {
            if let Expr::TypeParam(tp) = &field.ty {
                let id = *ids.get(tp.decl.name.as_str())?;
                let arg = args.get(arg_idx)?;
                mapping.entry(id).or_insert(infer_type_expr(arg)?);
            }
            arg_idx += 1;
            continue;
        }

        match &field.ty {
            Expr::TypeParam(tp) => {
                let id = *ids.get(tp.decl.name.as_str())?;
                for _ in &field.names {
                    let arg = args.get(arg_idx)?;
                    let ty = infer_expr_type(arg).or_else(|| env_lookup(arg, env))?;
                    mapping.entry(id).or_insert(ty);
                    arg_idx += 1;
                }
            }
            Expr::Ellipsis(el) => {
                if let Some(inner) = &el.elt {
                    if let Expr::TypeParam(tp) = inner.as_ref() {
                        let id = *ids.get(tp.decl.name.as_str())?;
                        let remaining = args.get(arg_idx..)?;
                        let ty = if ellipsis && remaining.len() == 1 {
                            let only = remaining.first()?;
                            let whole = infer_expr_type(only).or_else(|| env_lookup(only, env))?;
                            match whole {
                                SemanticType::Slice(elem) => *elem,
                                other => other,
                            }
                        } else {
                            remaining
                                .iter()
                                .find_map(|a| infer_expr_type(a).or_else(|| env_lookup(a, env)))?
                        };
                        mapping.entry(id).or_insert(ty);
                    }
                }
                arg_idx = args.len();
            }
            _ => arg_idx += field.names.len().max(1),
        }
    }

    if mapping.len() == gf.type_params.len() {
        Some(mapping)
    } else {
        None
    }
}

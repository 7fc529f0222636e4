//! End-to-end degeneration scenarios, grounded in
//! `examples/original_source/examples/{mathutils,list,priorityqueue,chanutils,syncmap}/*.go`.
//!
//! The type-checker's internal inference algorithm is kept external to this
//! crate, so each scenario here plays that role itself: it parses real
//! surface syntax with `degen-parser`, hand-builds the
//! `ReferenceChecker` a real inferencer would have produced for that
//! specific program (mirroring the mapping `out.go` actually shows for the
//! same source), and drives the whole thing through
//! `degen_engine::driver::run_to_fixpoint` with `degen-printer` on the far
//! end. This is the same shape `degen-cli` wires up, just with a fixed
//! table instead of a real structural inferencer.

use degen_ast::sem::{Basic, Named, SemanticType, TypeParamId, TypeParamIdGen};
use degen_ast::*;
use degen_diagnostics::DiagnosticEngine;
use degen_engine::driver::{run_to_fixpoint, Frontend};
use degen_engine::facade::reference::{MethodEntry, ReferenceChecker};
use degen_engine::facade::{GenericCall, GenericInstance};
use degen_engine::TypeCheckFacade;
use degen_parser::Parser as DegenParser;

/// Collects, in source order, the `NodeId` of every call expression whose
/// callee is a bare identifier `name`. Good enough to wire a fixed mapping
/// onto a known fixture; not a general-purpose query.
fn calls_named(file: &File, name: &str) -> Vec<NodeId> {
    let mut out = Vec::new();
    for decl in &file.decls {
        walk_decl(decl, name, &mut out);
    }
    out
}

fn walk_decl(d: &Decl, name: &str, out: &mut Vec<NodeId>) {
    match d {
        // A still-generic declaration's body is never visited by
        // `rewrite::degen_call` on this pass (`degen_file` clones it
        // verbatim until it is instantiated) — so, to match, its call
        // sites are not candidates for a fresh `GenericCall`/`GenericInstance`
        // entry either.
        Decl::Func(f) if f.is_generic() => {}
        // A plain (already-specialized) declaration can still carry an
        // unresolved self-referential call in its own receiver/params/
        // results, not just its body — `rewrite::degen_func_decl` walks all
        // four, so this has to as well or a signature-embedded site like a
        // pulled-in method's `*List(int)` return type never gets a
        // `GenericInstance` entry and is left un-rewritten.
        Decl::Func(f) => {
            if let Some(recv) = &f.recv {
                walk_field_list(recv, name, out);
            }
            walk_field_list(&f.sig.params, name, out);
            walk_field_list(&f.sig.results, name, out);
            if let Some(body) = &f.body {
                walk_block(body, name, out);
            }
        }
        Decl::Gen(g) => {
            for spec in &g.specs {
                match spec {
                    Spec::Value(v) => {
                        for val in &v.values {
                            walk_expr(val, name, out);
                        }
                    }
                    // A type spec that still carries type parameters is
                    // preserved verbatim by `rewrite::degen_file` and never
                    // walked by `degen_call`, same as a still-generic
                    // `Decl::Func` above. Once specialized (params gone),
                    // its fields can still carry an unresolved
                    // self-referential call such as `List(int)` (from
                    // substituting only the `T` argument, not the callee,
                    // the first time around) — that surfaces here on a
                    // later pass, after reparsing.
                    Spec::Type(ts) if ts.params.is_empty() => walk_expr(&ts.ty, name, out),
                    Spec::Type(_) => {}
                    Spec::Import(_) => {}
                }
            }
        }
    }
}

fn walk_block(b: &BlockStmt, name: &str, out: &mut Vec<NodeId>) {
    for s in &b.list {
        walk_stmt(s, name, out);
    }
}

fn walk_opt_stmt(s: &Option<Box<Stmt>>, name: &str, out: &mut Vec<NodeId>) {
    if let Some(s) = s {
        walk_stmt(s, name, out);
    }
}

fn walk_stmt(s: &Stmt, name: &str, out: &mut Vec<NodeId>) {
    match s {
        Stmt::Decl(d) => walk_decl(d, name, out),
        Stmt::Labeled { stmt, .. } => walk_stmt(stmt, name, out),
        Stmt::Expr(e) => walk_expr(e, name, out),
        Stmt::Send { chan, value } => {
            walk_expr(chan, name, out);
            walk_expr(value, name, out);
        }
        Stmt::IncDec { x, .. } => walk_expr(x, name, out),
        Stmt::Assign { lhs, rhs, .. } => {
            for e in rhs {
                walk_expr(e, name, out);
            }
            for e in lhs {
                walk_expr(e, name, out);
            }
        }
        Stmt::Go(c) | Stmt::Defer(c) => {
            walk_expr(&c.func, name, out);
            for a in &c.args {
                walk_expr(a, name, out);
            }
            if let Expr::Ident(id) = c.func.as_ref() {
                if id.name == name {
                    out.push(c.id);
                }
            }
        }
        Stmt::Return(es) => {
            for e in es {
                walk_expr(e, name, out);
            }
        }
        Stmt::Block(b) => walk_block(b, name, out),
        Stmt::If { init, cond, body, els } => {
            walk_opt_stmt(init, name, out);
            walk_expr(cond, name, out);
            walk_block(body, name, out);
            walk_opt_stmt(els, name, out);
        }
        Stmt::Case { list, body } => {
            for e in list {
                walk_expr(e, name, out);
            }
            for s in body {
                walk_stmt(s, name, out);
            }
        }
        Stmt::Switch { init, tag, body } => {
            walk_opt_stmt(init, name, out);
            if let Some(t) = tag {
                walk_expr(t, name, out);
            }
            walk_block(body, name, out);
        }
        Stmt::TypeSwitch { init, assign, body } => {
            walk_opt_stmt(init, name, out);
            walk_stmt(assign, name, out);
            walk_block(body, name, out);
        }
        Stmt::Comm { comm, body } => {
            walk_opt_stmt(comm, name, out);
            for s in body {
                walk_stmt(s, name, out);
            }
        }
        Stmt::Select { body } => walk_block(body, name, out),
        Stmt::For { init, cond, post, body } => {
            walk_opt_stmt(init, name, out);
            if let Some(c) = cond {
                walk_expr(c, name, out);
            }
            walk_opt_stmt(post, name, out);
            walk_block(body, name, out);
        }
        Stmt::Range { key, value, x, body, .. } => {
            if let Some(k) = key {
                walk_expr(k, name, out);
            }
            if let Some(v) = value {
                walk_expr(v, name, out);
            }
            walk_expr(x, name, out);
            walk_block(body, name, out);
        }
        Stmt::Branch { .. } | Stmt::Empty => {}
    }
}

fn walk_expr(e: &Expr, name: &str, out: &mut Vec<NodeId>) {
    match e {
        Expr::Call(c) => {
            for a in &c.args {
                walk_expr(a, name, out);
            }
            walk_expr(&c.func, name, out);
            if let Expr::Ident(id) = c.func.as_ref() {
                if id.name == name {
                    out.push(c.id);
                }
            }
        }
        Expr::CompositeLit(cl) => {
            walk_expr(&cl.ty, name, out);
            for el in &cl.elts {
                walk_expr(el, name, out);
            }
        }
        Expr::Selector(s) => walk_expr(&s.x, name, out),
        Expr::Index(i) => {
            walk_expr(&i.x, name, out);
            walk_expr(&i.index, name, out);
        }
        Expr::Slice(s) => {
            walk_expr(&s.x, name, out);
            for o in [&s.low, &s.high, &s.max] {
                if let Some(b) = o {
                    walk_expr(b, name, out);
                }
            }
        }
        Expr::TypeAssert(t) => walk_expr(&t.x, name, out),
        Expr::Star(s) => walk_expr(&s.x, name, out),
        Expr::Unary(u) => walk_expr(&u.x, name, out),
        Expr::Binary(b) => {
            walk_expr(&b.x, name, out);
            walk_expr(&b.y, name, out);
        }
        Expr::KeyValue(kv) => {
            walk_expr(&kv.key, name, out);
            walk_expr(&kv.value, name, out);
        }
        Expr::FuncLit(f) => {
            walk_field_list(&f.sig.params, name, out);
            walk_field_list(&f.sig.results, name, out);
            walk_block(&f.body, name, out);
        }
        Expr::Paren(p) => walk_expr(&p.x, name, out),
        Expr::Ellipsis(el) => {
            if let Some(x) = &el.elt {
                walk_expr(x, name, out);
            }
        }
        // A struct/interface/func/array/map/chan *type* literal can itself
        // embed a call-shaped generic-type application in one of its
        // fields (`Rest *List(T)` inside `List`'s own struct type) — these
        // need the same descent as any other expression position.
        Expr::ArrayType(a) => walk_expr(&a.elt, name, out),
        Expr::StructType(s) => walk_field_list(&s.fields, name, out),
        Expr::FuncType(f) => {
            walk_field_list(&f.params, name, out);
            walk_field_list(&f.results, name, out);
        }
        Expr::InterfaceType(i) => walk_field_list(&i.methods, name, out),
        Expr::MapType(m) => {
            walk_expr(&m.key, name, out);
            walk_expr(&m.value, name, out);
        }
        Expr::ChanType(c) => walk_expr(&c.value, name, out),
        _ => {}
    }
}

fn walk_field_list(fl: &FieldList, name: &str, out: &mut Vec<NodeId>) {
    for f in &fl.list {
        walk_expr(&f.ty, name, out);
    }
}

/// Marks every bare `Expr::Ident` equal to `name` with `type_of ->
/// TypeParam(tid)`, so `subst::subst_ident_ref` can resolve it — a trimmed,
/// fixture-scoped stand-in for `degen_cli::infer`'s general `mark_expr`
/// walk (see that module for the real, general-purpose version this
/// mirrors). Declaring `Expr::TypeParam` occurrences are left alone, same
/// as there.
fn mark_ident_refs(checker: &mut ReferenceChecker, e: &Expr, name: &str, tid: TypeParamId) {
    match e {
        Expr::Ident(id) => {
            if id.name == name {
                checker.insert_type(id.id, SemanticType::TypeParam(tid));
            }
        }
        Expr::TypeParam(_) => {}
        Expr::CompositeLit(cl) => {
            mark_ident_refs(checker, &cl.ty, name, tid);
            for el in &cl.elts {
                mark_ident_refs(checker, el, name, tid);
            }
        }
        Expr::Selector(s) => mark_ident_refs(checker, &s.x, name, tid),
        Expr::Index(i) => {
            mark_ident_refs(checker, &i.x, name, tid);
            mark_ident_refs(checker, &i.index, name, tid);
        }
        Expr::TypeAssert(t) => {
            mark_ident_refs(checker, &t.x, name, tid);
            mark_ident_refs(checker, &t.ty, name, tid);
        }
        Expr::Call(c) => {
            mark_ident_refs(checker, &c.func, name, tid);
            for a in &c.args {
                mark_ident_refs(checker, a, name, tid);
            }
        }
        Expr::Star(s) => mark_ident_refs(checker, &s.x, name, tid),
        Expr::Unary(u) => mark_ident_refs(checker, &u.x, name, tid),
        Expr::Binary(b) => {
            mark_ident_refs(checker, &b.x, name, tid);
            mark_ident_refs(checker, &b.y, name, tid);
        }
        Expr::KeyValue(kv) => {
            mark_ident_refs(checker, &kv.key, name, tid);
            mark_ident_refs(checker, &kv.value, name, tid);
        }
        Expr::FuncLit(f) => {
            mark_field_list_refs(checker, &f.sig.params, name, tid);
            mark_field_list_refs(checker, &f.sig.results, name, tid);
            mark_block_refs(checker, &f.body, name, tid);
        }
        Expr::Paren(p) => mark_ident_refs(checker, &p.x, name, tid),
        Expr::Ellipsis(el) => {
            if let Some(x) = &el.elt {
                mark_ident_refs(checker, x, name, tid);
            }
        }
        Expr::ArrayType(a) => mark_ident_refs(checker, &a.elt, name, tid),
        Expr::StructType(s) => mark_field_list_refs(checker, &s.fields, name, tid),
        Expr::InterfaceType(i) => mark_field_list_refs(checker, &i.methods, name, tid),
        Expr::FuncType(f) => {
            mark_field_list_refs(checker, &f.params, name, tid);
            mark_field_list_refs(checker, &f.results, name, tid);
        }
        Expr::MapType(m) => {
            mark_ident_refs(checker, &m.key, name, tid);
            mark_ident_refs(checker, &m.value, name, tid);
        }
        Expr::ChanType(c) => mark_ident_refs(checker, &c.value, name, tid),
        _ => {}
    }
}

fn mark_field_list_refs(checker: &mut ReferenceChecker, fl: &FieldList, name: &str, tid: TypeParamId) {
    for f in &fl.list {
        mark_ident_refs(checker, &f.ty, name, tid);
    }
}

fn mark_block_refs(checker: &mut ReferenceChecker, b: &BlockStmt, name: &str, tid: TypeParamId) {
    for s in &b.list {
        mark_stmt_refs(checker, s, name, tid);
    }
}

fn mark_stmt_refs(checker: &mut ReferenceChecker, s: &Stmt, name: &str, tid: TypeParamId) {
    match s {
        Stmt::Expr(e) => mark_ident_refs(checker, e, name, tid),
        Stmt::Assign { lhs, rhs, .. } => {
            for e in lhs {
                mark_ident_refs(checker, e, name, tid);
            }
            for e in rhs {
                mark_ident_refs(checker, e, name, tid);
            }
        }
        Stmt::Return(es) => {
            for e in es {
                mark_ident_refs(checker, e, name, tid);
            }
        }
        Stmt::Block(b) => mark_block_refs(checker, b, name, tid),
        Stmt::If { cond, body, els, .. } => {
            mark_ident_refs(checker, cond, name, tid);
            mark_block_refs(checker, body, name, tid);
            if let Some(e) = els {
                mark_stmt_refs(checker, e, name, tid);
            }
        }
        Stmt::For { cond, body, .. } => {
            if let Some(c) = cond {
                mark_ident_refs(checker, c, name, tid);
            }
            mark_block_refs(checker, body, name, tid);
        }
        Stmt::Range { x, body, .. } => {
            mark_ident_refs(checker, x, name, tid);
            mark_block_refs(checker, body, name, tid);
        }
        _ => {}
    }
}

/// A `Frontend` whose `check` is a closure rebuilt against each pass's fresh
/// `File` (node ids are per-parse, so the checker can't be built once up
/// front) — the same shape `degen_cli::infer::build_checker` fills for the
/// real binary.
struct ScenarioFrontend<F> {
    build: F,
}

impl<F: Fn(&File) -> ReferenceChecker> Frontend for ScenarioFrontend<F> {
    fn parse(&self, source: &str) -> Result<File, degen_diagnostics::EngineError> {
        DegenParser::new(source)
            .and_then(|mut p| p.parse_file())
            .map_err(|e| degen_diagnostics::EngineError::Source(e.to_string()))
    }

    fn check(&self, file: &File) -> Result<Box<dyn TypeCheckFacade>, degen_diagnostics::EngineError> {
        Ok(Box::new((self.build)(file)))
    }

    fn print(&self, file: &File) -> String {
        degen_printer::print_file(file)
    }
}

fn run(source: &str, build: impl Fn(&File) -> ReferenceChecker) -> String {
    let frontend = ScenarioFrontend { build };
    let mut diagnostics = DiagnosticEngine::new();
    let out = run_to_fixpoint(&frontend, source, -1, &mut diagnostics).expect("degeneration run failed");
    assert!(!diagnostics.has_errors(), "unexpected diagnostics: {:?}", diagnostics.diagnostics());
    out
}

/// `Min(7, 9)` / `Min(int32(10), 93)`: two distinct instantiations of the
/// same name-fused-binder function (`func Min(x, y type T ord) T`), one
/// dedup check (two `Min` calls with the *same* types collapse to one
/// declaration), grounded in
/// `examples/original_source/examples/mathutils/mathutils.go`'s `Min` and
/// its `out.go`'s `Min_int`/`Min_int32`.
#[test]
fn min_specializes_once_per_distinct_type_argument() {
    let source = r#"
package main

func Min(x, y type T ord) T {
	if x < y {
		return x
	}
	return y
}

func main() {
	Min(7, 9)
	Min(1, 2)
	Min(int32(10), 93)
}
"#;

    let out = run(source, |file| {
        let mut checker = ReferenceChecker::new();
        let calls = calls_named(file, "Min");
        // Only present on the first pass; after rewriting, callees are
        // renamed and this file has no more bare `Min(...)` calls.
        if calls.is_empty() {
            return checker;
        }
        assert_eq!(calls.len(), 3);

        let t = TypeParamIdGen::next();
        checker.insert_type_param_name(t, "T");

        let mut int_mapping = Mapping::new();
        int_mapping.insert(t, SemanticType::Basic(Basic::Int));
        checker.insert_generic_call(calls[0], GenericCall { mapping: int_mapping.clone(), num_unnamed: 0 });
        checker.insert_generic_call(calls[1], GenericCall { mapping: int_mapping, num_unnamed: 0 });

        let mut int32_mapping = Mapping::new();
        int32_mapping.insert(t, SemanticType::Basic(Basic::Int32));
        checker.insert_generic_call(calls[2], GenericCall { mapping: int32_mapping, num_unnamed: 0 });

        checker
    });

    assert!(out.contains("func Min_int(x, y int) int"));
    assert!(out.contains("func Min_int32(x, y int32) int"));
    assert!(!out.contains("func Min("));
    // The two `Min(int, int)` calls collapse onto a single declaration.
    assert_eq!(out.matches("func Min_int(").count(), 1);
    assert!(out.contains("Min_int(7, 9)"));
    assert!(out.contains("Min_int(1, 2)"));
    assert!(out.contains("Min_int32(int32(10), 93)"));
}

/// `Sum(nums ...type T num)` — a variadic name-fused binder whose body
/// contains a bare `T(0)` reference back to its own declared type
/// parameter. Exercises `subst::subst_ident_ref`'s reliance on
/// `type_of`/the type-position-only convention, grounded in
/// `examples/original_source/examples/mathutils/mathutils.go`'s `Sum` and
/// `out.go`'s `Sum_int`/`Sum_byte` (`result := int(0)` / `result :=
/// byte(0)`).
#[test]
fn sum_substitutes_its_own_body_reference_to_its_type_parameter() {
    let source = r#"
package main

func Sum(nums ...type T num) T {
	result := T(0)
	for _, x := range nums {
		result += x
	}
	return result
}

func main() {
	Sum(1, 2, 3)
}
"#;

    let out = run(source, |file| {
        let mut checker = ReferenceChecker::new();

        // Mark the declaration's own body reference to `T`: this is what
        // `degen_cli::infer`'s `mark_expr` does for every generic
        // declaration, separately from call-site inference below.
        if let Some(Decl::Func(f)) = file.decls.first() {
            if f.name.name == "Sum" {
                let t = TypeParamIdGen::next();
                checker.insert_type_param_name(t, "T");
                if let Some(body) = &f.body {
                    mark_block_refs(&mut checker, body, "T", t);
                }

                let calls = calls_named(file, "Sum");
                if !calls.is_empty() {
                    let mut mapping = Mapping::new();
                    mapping.insert(t, SemanticType::Basic(Basic::Int));
                    checker.insert_generic_call(calls[0], GenericCall { mapping, num_unnamed: 0 });
                }
            }
        }

        checker
    });

    assert!(out.contains("func Sum_int(nums ...int) int"));
    assert!(out.contains("result := int(0)"));
    assert!(!out.contains("T(0)"));
    assert!(out.contains("Sum_int(1, 2, 3)"));
}

/// `List(type T)` plus its `Prepend` method: a generic-type instantiation
/// site (`List(int){...}`) whose associated generic method is discovered
/// and instantiated automatically, without the call site itself needing
/// any rewriting (method names are never mangled). Grounded in
/// `examples/original_source/examples/list/list.go`'s `List`/`Prepend` and
/// `out.go`'s `List_float64`/`(l *List_float64) Prepend`.
#[test]
fn list_instantiation_pulls_in_its_generic_method() {
    let source = r#"
package main

type List(type T) struct {
	First T
	Rest  *List(T)
}

func (l *List(type T)) Prepend(x T) *List(T) {
	return &List(T){First: x, Rest: l}
}

func main() {
	l := List(int){First: 1, Rest: nil}
	_ = l
}
"#;

    let out = run(source, |file| {
        let mut checker = ReferenceChecker::new();

        // Register List's own type parameter and Prepend's receiver
        // type parameter as the *same* nominal id, mirroring how a real
        // checker ties a method's receiver type parameters back to the
        // type declaration it belongs to.
        let t = TypeParamIdGen::next();
        checker.insert_type_param_name(t, "T");
        checker.insert_method(
            "List",
            MethodEntry {
                name: "Prepend".into(),
                receiver_type_params: vec![t],
            },
        );

        // Mark List's own bare `T` field references and Prepend's own
        // signature/body bare `T` references, same as `degen_cli::infer`
        // does for every generic declaration's self-references, separately
        // from the call-site mapping below. The receiver `*List(type T)`
        // and composite-literal type argument `List(T)`'s `TypeParam` form
        // need no marking; only bare `Ident` references do.
        for decl in &file.decls {
            match decl {
                Decl::Gen(g) => {
                    for spec in &g.specs {
                        if let Spec::Type(ts) = spec {
                            if ts.name.name == "List" {
                                mark_ident_refs(&mut checker, &ts.ty, "T", t);
                            }
                        }
                    }
                }
                Decl::Func(f) if f.name.name == "Prepend" => {
                    mark_field_list_refs(&mut checker, &f.sig.params, "T", t);
                    mark_field_list_refs(&mut checker, &f.sig.results, "T", t);
                    if let Some(body) = &f.body {
                        mark_block_refs(&mut checker, body, "T", t);
                    }
                }
                _ => {}
            }
        }

        // Every `List(int)`-shaped call site on this pass is the same
        // instantiation: the one in `main`, first time around, and then —
        // once `List_int`/`Prepend` exist but still hold the unresolved
        // self-reference `*List(int)`/`&List(int){...}` left over from
        // substituting only the inner `T` argument — the ones inside
        // `List_int.Rest` and the specialized `Prepend`'s own body, on
        // later passes.
        for &call_id in &calls_named(file, "List") {
            let mut mapping = Mapping::new();
            mapping.insert(t, SemanticType::Basic(Basic::Int));
            checker.insert_generic_instance(call_id, GenericInstance { mapping });
            checker.insert_type(
                call_id,
                SemanticType::Named(Named {
                    name: "List".into(),
                    type_args: vec![SemanticType::Basic(Basic::Int)],
                    underlying: Box::new(SemanticType::Tuple(vec![])),
                }),
            );
        }

        checker
    });

    assert!(out.contains("List_int"));
    assert!(out.contains("First int"));
    assert!(out.contains("Prepend(x int) *List_int"));
    assert!(!out.contains("List(type T)"));
}

/// `func Min(type T ord) func(T, T) bool` — a pure *unnamed*-binder
/// function, called with an explicit leading type argument rather than
/// inferred from a value argument. Grounded in
/// `examples/original_source/examples/priorityqueue/priorityqueue.go`'s
/// `Min`; the `Heap` type itself is exercised separately below.
#[test]
fn pure_unnamed_binder_is_called_with_an_explicit_type_argument() {
    let source = r#"
package main

func Min(type T ord) func(T, T) bool {
	return func(a, b T) bool {
		return a < b
	}
}

func main() {
	less := Min(int)
	_ = less
}
"#;

    let out = run(source, |file| {
        let mut checker = ReferenceChecker::new();
        let t = TypeParamIdGen::next();
        checker.insert_type_param_name(t, "T");

        // Mark the bare `T` reference on the inner closure's own parameter
        // list (`func(a, b T) bool`), nested inside Min's still-generic
        // body — same self-reference marking the list/Sum scenarios above
        // do for their own declarations.
        if let Some(Decl::Func(f)) = file.decls.first() {
            if f.name.name == "Min" {
                // The bare `T, T` inside the declared result type
                // `func(T, T) bool` are themselves type-position references,
                // not declaring occurrences — distinct from the body marking
                // below.
                mark_field_list_refs(&mut checker, &f.sig.results, "T", t);
                if let Some(body) = &f.body {
                    mark_block_refs(&mut checker, body, "T", t);
                }
            }
        }

        let calls = calls_named(file, "Min");
        if calls.is_empty() {
            return checker;
        }
        let mut mapping = Mapping::new();
        mapping.insert(t, SemanticType::Basic(Basic::Int));
        checker.insert_generic_call(calls[0], GenericCall { mapping, num_unnamed: 1 });
        checker
    });

    assert!(out.contains("func Min_int() func(int, int) bool"));
    assert!(out.contains("Min_int()"));
    assert!(!out.contains("func Min(type T ord)"));
}

/// `Pipe(from <-chan type T, to chan<- T)` — the declaring `TypeParam`
/// occurrence sits inside a receive-direction `ChanType`'s value rather
/// than directly as a field's type, and the call site is a `go` statement
/// rather than a plain expression. Grounded in
/// `examples/original_source/examples/chanutils/chanutils.go`'s `Pipe`.
#[test]
fn channel_pipeline_forwards_values_between_directional_channels() {
    let source = r#"
package main

func Pipe(from <-chan type T, to chan<- T) {
	for x := range from {
		to <- x
	}
	close(to)
}

func main() {
	ints := make(chan int)
	outs := make(chan int)
	go Pipe(ints, outs)
}
"#;

    let out = run(source, |file| {
        let mut checker = ReferenceChecker::new();
        let t = TypeParamIdGen::next();
        checker.insert_type_param_name(t, "T");

        // `to chan<- T`'s `T` is a bare reference to the binder declared a
        // few fields earlier in the same parameter list.
        if let Some(Decl::Func(f)) = file.decls.first() {
            if f.name.name == "Pipe" {
                mark_field_list_refs(&mut checker, &f.sig.params, "T", t);
            }
        }

        let calls = calls_named(file, "Pipe");
        if !calls.is_empty() {
            let mut mapping = Mapping::new();
            mapping.insert(t, SemanticType::Basic(Basic::Int));
            checker.insert_generic_call(calls[0], GenericCall { mapping, num_unnamed: 0 });
        }

        checker
    });

    assert!(out.contains("func Pipe_int(from <-chan int, to chan<- int)"));
    assert!(out.contains("for x := range from {"));
    assert!(out.contains("to <- x"));
    assert!(out.contains("close(to)"));
    assert!(out.contains("go Pipe_int(ints, outs)"));
    assert!(!out.contains("Pipe(ints, outs)"));
}

/// `MakeSyncMap(type K eq, type V) *SyncMap(K, V)` plus `MarkAll(sm
/// *SyncMap(type T eq, bool), values ...T)` — two consecutive nameless
/// binders in one field list, and a type parameter re-declared inline
/// against an *ordinary* (non-receiver) parameter whose own type is
/// itself a call-shaped generic-type reference, pulling `Mark` in via
/// that parameter rather than via a receiver. Grounded in
/// `examples/original_source/examples/syncmap/syncmap.go`.
#[test]
fn concurrent_map_marks_all_its_keys_through_a_pre_instantiated_parameter() {
    let source = r#"
package main

type SyncMap(type K eq, type V) struct {
	mu sync.Mutex
	m  map[K]V
}

func MakeSyncMap(type K eq, type V) *SyncMap(K, V) {
	return &SyncMap(K, V){m: make(map[K]V)}
}

func (sm *SyncMap(type K eq, type V)) Mark(key K, value V) {
	sm.m[key] = value
}

func MarkAll(sm *SyncMap(type T eq, bool), values ...T) {
	for _, v := range values {
		sm.Mark(v, true)
	}
}

func main() {
	sm := MakeSyncMap(string, bool)
	MarkAll(sm, "a", "b")
}
"#;

    let out = run(source, |file| {
        let mut checker = ReferenceChecker::new();
        let k = TypeParamIdGen::next();
        let v = TypeParamIdGen::next();
        let t = TypeParamIdGen::next();
        checker.insert_type_param_name(k, "K");
        checker.insert_type_param_name(v, "V");
        checker.insert_type_param_name(t, "T");
        checker.insert_method(
            "SyncMap",
            MethodEntry {
                name: "Mark".into(),
                receiver_type_params: vec![k, v],
            },
        );

        for decl in &file.decls {
            match decl {
                Decl::Gen(g) => {
                    for spec in &g.specs {
                        if let Spec::Type(ts) = spec {
                            if ts.name.name == "SyncMap" {
                                mark_ident_refs(&mut checker, &ts.ty, "K", k);
                                mark_ident_refs(&mut checker, &ts.ty, "V", v);
                            }
                        }
                    }
                }
                Decl::Func(f) if f.name.name == "MakeSyncMap" => {
                    mark_field_list_refs(&mut checker, &f.sig.results, "K", k);
                    mark_field_list_refs(&mut checker, &f.sig.results, "V", v);
                    if let Some(body) = &f.body {
                        mark_block_refs(&mut checker, body, "K", k);
                        mark_block_refs(&mut checker, body, "V", v);
                    }
                }
                Decl::Func(f) if f.name.name == "Mark" => {
                    mark_field_list_refs(&mut checker, &f.sig.params, "K", k);
                    mark_field_list_refs(&mut checker, &f.sig.params, "V", v);
                }
                // `sm *SyncMap(type T eq, bool)`'s `T` is a declaring
                // occurrence (no marking), but `values ...T` is a bare
                // reference back to it.
                Decl::Func(f) if f.name.name == "MarkAll" => {
                    mark_field_list_refs(&mut checker, &f.sig.params, "T", t);
                    if let Some(body) = &f.body {
                        mark_block_refs(&mut checker, body, "T", t);
                    }
                }
                _ => {}
            }
        }

        // `MakeSyncMap(string, bool)`: two nameless binders, both dropped
        // from the specialized signature (`num_unnamed: 2`).
        let make_calls = calls_named(file, "MakeSyncMap");
        if !make_calls.is_empty() {
            let mut mapping = Mapping::new();
            mapping.insert(k, SemanticType::Basic(Basic::String));
            mapping.insert(v, SemanticType::Basic(Basic::Bool));
            checker.insert_generic_call(make_calls[0], GenericCall { mapping, num_unnamed: 2 });
        }

        // `MarkAll(sm, "a", "b")`: `T` is inferred as `string` from the
        // variadic value arguments; `sm` is an ordinary named parameter, so
        // nothing is dropped (`num_unnamed: 0`).
        let mark_all_calls = calls_named(file, "MarkAll");
        if !mark_all_calls.is_empty() {
            let mut mapping = Mapping::new();
            mapping.insert(t, SemanticType::Basic(Basic::String));
            checker.insert_generic_call(mark_all_calls[0], GenericCall { mapping, num_unnamed: 0 });
        }

        // `SyncMap(K, V)`'s own unresolved self-reference inside
        // `MakeSyncMap`'s return type/body, and `SyncMap(T, bool)`'s inside
        // `MarkAll`'s parameter — both resolve to the same
        // `string`/`bool` pair, so a single uniform mapping covers every
        // site `calls_named` finds on any later pass.
        for &call_id in &calls_named(file, "SyncMap") {
            let mut mapping = Mapping::new();
            mapping.insert(k, SemanticType::Basic(Basic::String));
            mapping.insert(v, SemanticType::Basic(Basic::Bool));
            checker.insert_generic_instance(call_id, GenericInstance { mapping });
            checker.insert_type(
                call_id,
                SemanticType::Named(Named {
                    name: "SyncMap".into(),
                    type_args: vec![SemanticType::Basic(Basic::String), SemanticType::Basic(Basic::Bool)],
                    underlying: Box::new(SemanticType::Tuple(vec![])),
                }),
            );
        }

        checker
    });

    assert!(out.contains("SyncMap_string_bool"));
    assert!(out.contains("map[string]bool"));
    assert!(out.contains("func (sm *SyncMap_string_bool) Mark(key string, value bool)"));
    assert!(out.contains("func MakeSyncMap_string_bool()"));
    assert!(out.contains("func MarkAll_string(sm *SyncMap_string_bool, values ...string)"));
    assert!(!out.contains("type SyncMap(type K eq, type V)"));
}

/// `Heap(type T)` instantiated at two distinct receivers through
/// `NewHeap(less func(x, y type T) bool) *Heap(T)`: the declaring
/// `TypeParam` sits on an ordinary (unnamed, named-parameter) field nested
/// inside a `func` *type*, not in a receiver or a directly-typed field,
/// and `Push`/`Top` are pulled in once per receiver. Grounded in
/// `examples/original_source/examples/priorityqueue/priorityqueue.go`'s
/// `Heap`/`NewHeap`/`Push`/`Top`.
#[test]
fn heap_is_instantiated_at_two_distinct_element_types() {
    let source = r#"
package main

type Heap(type T) struct {
	elems []T
	less  func(T, T) bool
}

func NewHeap(less func(x, y type T) bool) *Heap(T) {
	return &Heap(T){elems: []T{}, less: less}
}

func (h *Heap(type T)) Push(x T) {
	h.elems = append(h.elems, x)
}

func (h *Heap(type T)) Top() T {
	return h.elems[0]
}

func Min(type T ord) func(T, T) bool {
	return func(a, b T) bool {
		return a < b
	}
}

type Person struct {
	name string
	age  int
}

func main() {
	ints := NewHeap(Min(int))
	ints.Push(3)

	people := NewHeap(Min(Person))
	people.Push(Person{name: "Ada", age: 30})
}
"#;

    let person = SemanticType::Named(Named {
        name: "Person".into(),
        type_args: vec![],
        underlying: Box::new(SemanticType::Tuple(vec![])),
    });

    let out = run(source, |file| {
        let mut checker = ReferenceChecker::new();
        let t_heap = TypeParamIdGen::next();
        let t_min = TypeParamIdGen::next();
        checker.insert_type_param_name(t_heap, "T");
        checker.insert_type_param_name(t_min, "T");
        checker.insert_method(
            "Heap",
            MethodEntry {
                name: "Push".into(),
                receiver_type_params: vec![t_heap],
            },
        );
        checker.insert_method(
            "Heap",
            MethodEntry {
                name: "Top".into(),
                receiver_type_params: vec![t_heap],
            },
        );

        for decl in &file.decls {
            match decl {
                Decl::Gen(g) => {
                    for spec in &g.specs {
                        if let Spec::Type(ts) = spec {
                            if ts.name.name == "Heap" {
                                mark_ident_refs(&mut checker, &ts.ty, "T", t_heap);
                            }
                        }
                    }
                }
                Decl::Func(f) if f.name.name == "NewHeap" => {
                    mark_field_list_refs(&mut checker, &f.sig.results, "T", t_heap);
                    if let Some(body) = &f.body {
                        mark_block_refs(&mut checker, body, "T", t_heap);
                    }
                }
                Decl::Func(f) if f.name.name == "Push" => {
                    mark_field_list_refs(&mut checker, &f.sig.params, "T", t_heap);
                }
                Decl::Func(f) if f.name.name == "Top" => {
                    mark_field_list_refs(&mut checker, &f.sig.results, "T", t_heap);
                }
                Decl::Func(f) if f.name.name == "Min" => {
                    mark_field_list_refs(&mut checker, &f.sig.results, "T", t_min);
                    if let Some(body) = &f.body {
                        mark_block_refs(&mut checker, body, "T", t_min);
                    }
                }
                _ => {}
            }
        }

        // `Min(int)` then `Min(Person)`, in source order.
        let min_calls = calls_named(file, "Min");
        if min_calls.len() == 2 {
            let mut int_mapping = Mapping::new();
            int_mapping.insert(t_min, SemanticType::Basic(Basic::Int));
            checker.insert_generic_call(min_calls[0], GenericCall { mapping: int_mapping, num_unnamed: 1 });

            let mut person_mapping = Mapping::new();
            person_mapping.insert(t_min, person.clone());
            checker.insert_generic_call(min_calls[1], GenericCall { mapping: person_mapping, num_unnamed: 1 });
        }

        // `NewHeap(Min(int))` then `NewHeap(Min(Person))`, in source order;
        // `less` is the sole kept parameter (`num_unnamed: 0`).
        let new_heap_calls = calls_named(file, "NewHeap");
        if new_heap_calls.len() == 2 {
            let mut int_mapping = Mapping::new();
            int_mapping.insert(t_heap, SemanticType::Basic(Basic::Int));
            checker.insert_generic_call(new_heap_calls[0], GenericCall { mapping: int_mapping, num_unnamed: 0 });

            let mut person_mapping = Mapping::new();
            person_mapping.insert(t_heap, person.clone());
            checker.insert_generic_call(new_heap_calls[1], GenericCall { mapping: person_mapping, num_unnamed: 0 });
        }

        // `Heap(int)`/`Heap(Person)`'s own unresolved self-references, once
        // `NewHeap_int`/`NewHeap_Person` exist: two sites apiece (the
        // specialized signature's return type, then the body's composite
        // literal), in the same int-then-Person declaration order.
        let heap_calls = calls_named(file, "Heap");
        if heap_calls.len() == 4 {
            for (i, &call_id) in heap_calls.iter().enumerate() {
                let arg = if i < 2 { SemanticType::Basic(Basic::Int) } else { person.clone() };
                let mut mapping = Mapping::new();
                mapping.insert(t_heap, arg.clone());
                checker.insert_generic_instance(call_id, GenericInstance { mapping });
                checker.insert_type(
                    call_id,
                    SemanticType::Named(Named {
                        name: "Heap".into(),
                        type_args: vec![arg],
                        underlying: Box::new(SemanticType::Tuple(vec![])),
                    }),
                );
            }
        }

        checker
    });

    assert!(out.contains("Heap_int"));
    assert!(out.contains("Heap_Person"));
    assert!(out.contains("elems []int"));
    assert!(out.contains("elems []Person"));
    assert!(out.contains("func (h *Heap_int) Push(x int)"));
    assert!(out.contains("func (h *Heap_int) Top() int"));
    assert!(out.contains("func (h *Heap_Person) Push(x Person)"));
    assert!(out.contains("func (h *Heap_Person) Top() Person"));
    assert!(out.contains("func NewHeap_int(less func(x, y int) bool)"));
    assert!(out.contains("func NewHeap_Person(less func(x, y Person) bool)"));
    assert!(!out.contains("type Heap(type T)"));
}

//! Emits `degen_ast` nodes back to the concrete surface syntax so the Pass
//! Driver can reparse a pass's output and recheck it to a fixpoint.
//!
//! A plain visitor-style emitter, not a configurable rule-driven
//! pretty-printer: the degeneration pass needs its output to reparse
//! correctly, not to look nice, so there is no `Config`/`BraceStyle`/
//! quote-style engine here — one fixed, stable rendering.

use degen_ast::*;
use std::fmt::Write as _;

pub fn print_file(file: &File) -> String {
    let mut p = Printer::new();
    p.file(file);
    p.out
}

struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn new() -> Self {
        Self {
            out: String::new(),
            indent: 0,
        }
    }

    fn nl(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push('\t');
        }
    }

    fn file(&mut self, file: &File) {
        let _ = write!(self.out, "package {}", file.package);
        if !file.imports.is_empty() {
            self.out.push('\n');
            self.out.push('\n');
            self.out.push_str("import (");
            self.indent += 1;
            for imp in &file.imports {
                self.nl();
                self.import_spec(imp);
            }
            self.indent -= 1;
            self.nl();
            self.out.push(')');
        }
        for decl in &file.decls {
            self.out.push('\n');
            self.out.push('\n');
            self.decl(decl);
        }
        self.out.push('\n');
    }

    fn import_spec(&mut self, spec: &ImportSpec) {
        if let Some(alias) = &spec.alias {
            let _ = write!(self.out, "{alias} ");
        }
        let _ = write!(self.out, "{:?}", spec.path);
    }

    fn decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Func(f) => self.func_decl(f),
            Decl::Gen(g) => self.gen_decl(g),
        }
    }

    fn gen_decl(&mut self, g: &GenDecl) {
        let kw = match g.tok {
            GenTok::Import => "import",
            GenTok::Const => "const",
            GenTok::Var => "var",
            GenTok::Type => "type",
        };
        if g.specs.len() == 1 {
            let _ = write!(self.out, "{kw} ");
            self.spec(&g.specs[0]);
            return;
        }
        let _ = write!(self.out, "{kw} (");
        self.indent += 1;
        for spec in &g.specs {
            self.nl();
            self.spec(spec);
        }
        self.indent -= 1;
        self.nl();
        self.out.push(')');
    }

    fn spec(&mut self, spec: &Spec) {
        match spec {
            Spec::Import(i) => self.import_spec(i),
            Spec::Value(v) => self.value_spec(v),
            Spec::Type(t) => self.type_spec(t),
        }
    }

    fn value_spec(&mut self, v: &ValueSpec) {
        let names: Vec<_> = v.names.iter().map(|n| n.name.clone()).collect();
        let _ = write!(self.out, "{}", names.join(", "));
        if let Some(ty) = &v.ty {
            self.out.push(' ');
            self.expr(ty);
        }
        if !v.values.is_empty() {
            self.out.push_str(" = ");
            self.expr_list(&v.values);
        }
    }

    fn type_spec(&mut self, t: &TypeSpec) {
        let _ = write!(self.out, "{}", t.name.name);
        if !t.params.is_empty() {
            self.out.push('(');
            self.type_param_list(&t.params);
            self.out.push(')');
        }
        self.out.push(' ');
        self.expr(&t.ty);
    }

    fn type_param_list(&mut self, params: &[TypeParamDecl]) {
        for (i, p) in params.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            let _ = write!(self.out, "type {}", p.name);
            if let Some(c) = &p.constraint {
                let _ = write!(self.out, " {c}");
            }
        }
    }

    fn func_decl(&mut self, f: &FuncDecl) {
        self.out.push_str("func ");
        if let Some(recv) = &f.recv {
            self.out.push('(');
            self.field_list(recv);
            self.out.push_str(") ");
        }
        let _ = write!(self.out, "{}(", f.name.name);
        self.field_list(&f.sig.params);
        self.out.push(')');
        self.results(&f.sig.results);
        if let Some(body) = &f.body {
            self.out.push(' ');
            self.block(body);
        }
    }

    fn results(&mut self, results: &FieldList) {
        if results.list.is_empty() {
            return;
        }
        let single_unnamed = results.list.len() == 1 && results.list[0].names.is_empty();
        if single_unnamed {
            self.out.push(' ');
            self.expr(&results.list[0].ty);
        } else {
            self.out.push_str(" (");
            self.field_list(results);
            self.out.push(')');
        }
    }

    fn field_list(&mut self, fields: &FieldList) {
        for (i, field) in fields.list.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.field(field);
        }
    }

    fn field(&mut self, field: &Field) {
        if !field.names.is_empty() {
            let names: Vec<_> = field.names.iter().map(|n| n.name.clone()).collect();
            let _ = write!(self.out, "{} ", names.join(", "));
        }
        self.expr(&field.ty);
        if let Some(tag) = &field.tag {
            let _ = write!(self.out, " `{tag}`");
        }
    }

    fn block(&mut self, block: &BlockStmt) {
        self.out.push('{');
        self.indent += 1;
        for stmt in &block.list {
            self.nl();
            self.stmt(stmt);
        }
        self.indent -= 1;
        self.nl();
        self.out.push('}');
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Decl(d) => self.decl(d),
            Stmt::Labeled { label, stmt } => {
                let _ = write!(self.out, "{}: ", label.name);
                self.stmt(stmt);
            }
            Stmt::Expr(e) => self.expr(e),
            Stmt::Send { chan, value } => {
                self.expr(chan);
                self.out.push_str(" <- ");
                self.expr(value);
            }
            Stmt::IncDec { x, op } => {
                self.expr(x);
                self.out.push_str(match op {
                    IncDecOp::Inc => "++",
                    IncDecOp::Dec => "--",
                });
            }
            Stmt::Assign { lhs, op, rhs } => {
                self.expr_list(lhs);
                self.out.push(' ');
                self.out.push_str(match op {
                    AssignOp::Assign => "=",
                    AssignOp::Define => ":=",
                    AssignOp::AddAssign => "+=",
                    AssignOp::SubAssign => "-=",
                });
                self.out.push(' ');
                self.expr_list(rhs);
            }
            Stmt::Go(call) => {
                self.out.push_str("go ");
                self.expr(&Expr::Call(call.clone()));
            }
            Stmt::Defer(call) => {
                self.out.push_str("defer ");
                self.expr(&Expr::Call(call.clone()));
            }
            Stmt::Return(values) => {
                self.out.push_str("return");
                if !values.is_empty() {
                    self.out.push(' ');
                    self.expr_list(values);
                }
            }
            Stmt::Block(b) => self.block(b),
            Stmt::If {
                init,
                cond,
                body,
                els,
            } => {
                self.out.push_str("if ");
                if let Some(init) = init {
                    self.stmt(init);
                    self.out.push_str("; ");
                }
                self.expr(cond);
                self.out.push(' ');
                self.block(body);
                if let Some(els) = els {
                    self.out.push_str(" else ");
                    self.stmt(els);
                }
            }
            Stmt::Case { list, body } => {
                if list.is_empty() {
                    self.out.push_str("default:");
                } else {
                    self.out.push_str("case ");
                    self.expr_list(list);
                    self.out.push(':');
                }
                self.indent += 1;
                for s in body {
                    self.nl();
                    self.stmt(s);
                }
                self.indent -= 1;
            }
            Stmt::Switch { init, tag, body } => {
                self.out.push_str("switch ");
                if let Some(init) = init {
                    self.stmt(init);
                    self.out.push_str("; ");
                }
                if let Some(tag) = tag {
                    self.expr(tag);
                    self.out.push(' ');
                }
                self.block(body);
            }
            Stmt::TypeSwitch { init, assign, body } => {
                self.out.push_str("switch ");
                if let Some(init) = init {
                    self.stmt(init);
                    self.out.push_str("; ");
                }
                self.stmt(assign);
                self.out.push(' ');
                self.block(body);
            }
            Stmt::Comm { comm, body } => {
                if let Some(comm) = comm {
                    self.out.push_str("case ");
                    self.stmt(comm);
                    self.out.push(':');
                } else {
                    self.out.push_str("default:");
                }
                self.indent += 1;
                for s in body {
                    self.nl();
                    self.stmt(s);
                }
                self.indent -= 1;
            }
            Stmt::Select { body } => {
                self.out.push_str("select ");
                self.block(body);
            }
            Stmt::For {
                init,
                cond,
                post,
                body,
            } => {
                self.out.push_str("for ");
                if init.is_some() || cond.is_some() || post.is_some() {
                    if let Some(init) = init {
                        self.stmt(init);
                    }
                    self.out.push_str("; ");
                    if let Some(cond) = cond {
                        self.expr(cond);
                    }
                    self.out.push_str("; ");
                    if let Some(post) = post {
                        self.stmt(post);
                    }
                    self.out.push(' ');
                }
                self.block(body);
            }
            Stmt::Range {
                key,
                value,
                define,
                x,
                body,
            } => {
                self.out.push_str("for ");
                if let Some(key) = key {
                    self.expr(key);
                    if let Some(value) = value {
                        self.out.push_str(", ");
                        self.expr(value);
                    }
                    self.out.push(' ');
                    self.out.push_str(if *define { ":=" } else { "=" });
                    self.out.push(' ');
                }
                self.out.push_str("range ");
                self.expr(x);
                self.out.push(' ');
                self.block(body);
            }
            Stmt::Branch { kind, label } => {
                self.out.push_str(match kind {
                    BranchKind::Break => "break",
                    BranchKind::Continue => "continue",
                    BranchKind::Goto => "goto",
                    BranchKind::Fallthrough => "fallthrough",
                });
                if let Some(label) = label {
                    let _ = write!(self.out, " {}", label.name);
                }
            }
            Stmt::Empty => {}
        }
    }

    fn expr_list(&mut self, exprs: &[Expr]) {
        for (i, e) in exprs.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.expr(e);
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(id) => self.out.push_str(&id.name),
            Expr::BasicLit(lit) => match lit.kind {
                BasicLitKind::String => {
                    let _ = write!(self.out, "{:?}", lit.value);
                }
                BasicLitKind::Char => {
                    let _ = write!(self.out, "'{}'", lit.value);
                }
                BasicLitKind::Int | BasicLitKind::Float => self.out.push_str(&lit.value),
            },
            Expr::CompositeLit(c) => {
                self.expr(&c.ty);
                self.out.push('{');
                self.expr_list(&c.elts);
                self.out.push('}');
            }
            Expr::Selector(s) => {
                self.expr(&s.x);
                let _ = write!(self.out, ".{}", s.sel.name);
            }
            Expr::Index(i) => {
                self.expr(&i.x);
                self.out.push('[');
                self.expr(&i.index);
                self.out.push(']');
            }
            Expr::Slice(s) => {
                self.expr(&s.x);
                self.out.push('[');
                if let Some(low) = &s.low {
                    self.expr(low);
                }
                self.out.push(':');
                if let Some(high) = &s.high {
                    self.expr(high);
                }
                if s.slice3 {
                    self.out.push(':');
                    if let Some(max) = &s.max {
                        self.expr(max);
                    }
                }
                self.out.push(']');
            }
            Expr::TypeAssert(t) => {
                self.expr(&t.x);
                self.out.push_str(".(");
                self.expr(&t.ty);
                self.out.push(')');
            }
            Expr::Call(c) => {
                self.expr(&c.func);
                self.out.push('(');
                self.expr_list(&c.args);
                if c.ellipsis {
                    self.out.push_str("...");
                }
                self.out.push(')');
            }
            Expr::Star(s) => {
                self.out.push('*');
                self.expr(&s.x);
            }
            Expr::Unary(u) => {
                self.out.push_str(match u.op {
                    UnOp::Not => "!",
                    UnOp::Neg => "-",
                    UnOp::Plus => "+",
                    UnOp::Address => "&",
                    UnOp::Deref => "*",
                    UnOp::Recv => "<-",
                });
                self.expr(&u.x);
            }
            Expr::Binary(b) => {
                self.expr(&b.x);
                let _ = write!(
                    self.out,
                    " {} ",
                    match b.op {
                        BinOp::Add => "+",
                        BinOp::Sub => "-",
                        BinOp::Mul => "*",
                        BinOp::Quo => "/",
                        BinOp::Rem => "%",
                        BinOp::Eq => "==",
                        BinOp::Ne => "!=",
                        BinOp::Lt => "<",
                        BinOp::Le => "<=",
                        BinOp::Gt => ">",
                        BinOp::Ge => ">=",
                        BinOp::LAnd => "&&",
                        BinOp::LOr => "||",
                    }
                );
                self.expr(&b.y);
            }
            Expr::KeyValue(kv) => {
                self.expr(&kv.key);
                self.out.push_str(": ");
                self.expr(&kv.value);
            }
            Expr::FuncLit(f) => {
                self.out.push_str("func(");
                self.field_list(&f.sig.params);
                self.out.push(')');
                self.results(&f.sig.results);
                self.out.push(' ');
                self.block(&f.body);
            }
            Expr::Paren(p) => {
                self.out.push('(');
                self.expr(&p.x);
                self.out.push(')');
            }
            Expr::Ellipsis(e) => {
                self.out.push_str("...");
                if let Some(elt) = &e.elt {
                    self.expr(elt);
                }
            }
            Expr::ArrayType(a) => {
                self.out.push('[');
                if let Some(len) = &a.len {
                    self.expr(len);
                }
                self.out.push(']');
                self.expr(&a.elt);
            }
            Expr::StructType(s) => {
                self.out.push_str("struct{");
                self.field_list(&s.fields);
                self.out.push('}');
            }
            Expr::FuncType(f) => {
                self.out.push_str("func(");
                self.field_list(&f.params);
                self.out.push(')');
                self.results(&f.results);
            }
            Expr::InterfaceType(i) => {
                self.out.push_str("interface{");
                self.field_list(&i.methods);
                self.out.push('}');
            }
            Expr::MapType(m) => {
                self.out.push_str("map[");
                self.expr(&m.key);
                self.out.push(']');
                self.expr(&m.value);
            }
            Expr::ChanType(c) => match c.dir {
                ChanDir::Both => {
                    self.out.push_str("chan ");
                    self.expr(&c.value);
                }
                ChanDir::Send => {
                    self.out.push_str("chan<- ");
                    self.expr(&c.value);
                }
                ChanDir::Recv => {
                    self.out.push_str("<-chan ");
                    self.expr(&c.value);
                }
            },
            Expr::TypeParam(tp) => {
                let _ = write!(self.out, "type {}", tp.decl.name);
                if let Some(c) = &tp.decl.constraint {
                    let _ = write!(self.out, " {c}");
                }
            }
            Expr::Bad => {}
        }
    }
}

//! The closed AST node set and semantic type model.
//!
//! Grounded in `examples/original_source` (`faiface/generics`'s `go/ast` node
//! shapes, as consumed by `degen/degen.go` and `degen/inst.go`), modeled as a
//! single closed `enum`-of-node-kinds with serde derives on every node, so the
//! AST can be golden-tested and round-tripped through JSON in the reference
//! frontend's tests.
//!
//! Go's own `ast` package does not separate "expression" from "type
//! expression" — a struct type, a pointer type, or a call-shaped generic
//! instantiation are all just `ast.Expr`. This module keeps that unification
//! rather than inventing a parallel `TypeExpr` enum, since the degeneration
//! pass (`degen-engine`) walks exactly this shape.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod sem;
pub use sem::{SemanticType, TypeParamId, TypeParamIdGen};

/// Identity of a node within a single parse, used as the key the
/// type-checker facade correlates its annotation maps against (`type-of`,
/// `object-of`, `generic-calls`, `generic-instances`).
/// Stands in for Go's pointer identity of `*ast.Ident` / `*ast.CallExpr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Hands out fresh `NodeId`s during parsing (or during test/fixture
/// construction). A fresh generator is used each time a file is parsed or
/// reparsed, since each pass needs its own fresh node identities.
#[derive(Debug, Default)]
pub struct NodeIdGen(u32);

impl NodeIdGen {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn next(&mut self) -> NodeId {
        let id = NodeId(self.0);
        self.0 += 1;
        id
    }
}

/// A whole source file: the root the Pass Driver operates on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    pub package: String,
    pub imports: Vec<ImportSpec>,
    pub decls: Vec<Decl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSpec {
    pub path: String,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChanDir {
    Send,
    Recv,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BasicLitKind {
    Int,
    Float,
    String,
    Char,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Quo,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    LAnd,
    LOr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnOp {
    Not,
    Neg,
    Plus,
    Address, // `&x`
    Deref,   // `<-ch` (receive) reuses this slot in Go's ast.UnaryExpr with token.ARROW
    Recv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    Assign,
    Define, // `:=`
    AddAssign,
    SubAssign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncDecOp {
    Inc,
    Dec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchKind {
    Break,
    Continue,
    Goto,
    Fallthrough,
}

/// `x` or `x, y` in a field list; also a single receiver, a single parameter,
/// a single result, a single struct field, or a single interface method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub names: Vec<Ident>,
    pub ty: Expr,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldList {
    pub list: Vec<Field>,
}

impl FieldList {
    pub fn num_fields(&self) -> usize {
        self.list
            .iter()
            .map(|f| f.names.len().max(1))
            .sum()
    }
}

/// A declaration-site named type parameter: `List(type T)`, `(type K eq, type V)`.
/// The constraint is an opaque token preserved verbatim but never interpreted
/// by the engine beyond being carried along in passed-through generic
/// declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParamDecl {
    pub name: String,
    pub constraint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ident {
    pub id: NodeId,
    pub name: String,
}

impl Ident {
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicLit {
    pub kind: BasicLitKind,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeLit {
    pub ty: Box<Expr>,
    pub elts: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorExpr {
    pub x: Box<Expr>,
    pub sel: Ident,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexExpr {
    pub x: Box<Expr>,
    pub index: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceExpr {
    pub x: Box<Expr>,
    pub low: Option<Box<Expr>>,
    pub high: Option<Box<Expr>>,
    pub max: Option<Box<Expr>>,
    pub slice3: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeAssertExpr {
    pub x: Box<Expr>,
    pub ty: Box<Expr>,
}

/// A call expression. Depending on what the checker reports for this node
/// (via `generic_calls` / `generic_instances`), the rewriter treats it either
/// as an ordinary call, a generic function call, or a generic type
/// instantiation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpr {
    pub id: NodeId,
    pub func: Box<Expr>,
    pub args: Vec<Expr>,
    pub ellipsis: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarExpr {
    pub x: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryExpr {
    pub op: UnOp,
    pub x: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpr {
    pub x: Box<Expr>,
    pub op: BinOp,
    pub y: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValueExpr {
    pub key: Box<Expr>,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncLit {
    pub sig: FuncTypeExpr,
    pub body: BlockStmt,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParenExpr {
    pub x: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EllipsisExpr {
    pub elt: Option<Box<Expr>>,
}

/// `[N]T` when `len` is `Some`, `[]T` (a slice type) when `len` is `None` —
/// matching Go's `ast.ArrayType`, which represents both with one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayType {
    pub len: Option<Box<Expr>>,
    pub elt: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructType {
    pub fields: FieldList,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncTypeExpr {
    pub params: FieldList,
    pub results: FieldList,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceType {
    pub methods: FieldList,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapTypeExpr {
    pub key: Box<Expr>,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChanTypeExpr {
    pub dir: ChanDir,
    pub value: Box<Expr>,
}

/// An inline, *declaring* occurrence of a type parameter: `type T`, `type T ord`.
/// A later bare `T` within the same signature is an ordinary `Ident` that the
/// checker resolves back to this declaration — this is how an unnamed type
/// parameter's binding site gets fused into a function signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeParamExpr {
    pub decl: TypeParamDecl,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Ident(Ident),
    BasicLit(BasicLit),
    CompositeLit(CompositeLit),
    Selector(SelectorExpr),
    Index(IndexExpr),
    Slice(SliceExpr),
    TypeAssert(TypeAssertExpr),
    Call(CallExpr),
    Star(StarExpr),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    KeyValue(KeyValueExpr),
    FuncLit(FuncLit),
    Paren(ParenExpr),
    Ellipsis(EllipsisExpr),
    ArrayType(ArrayType),
    StructType(StructType),
    FuncType(FuncTypeExpr),
    InterfaceType(InterfaceType),
    MapType(MapTypeExpr),
    ChanType(ChanTypeExpr),
    TypeParam(TypeParamExpr),
    /// Sentinel produced by the Type Renderer's `to_type_expr` for types that
    /// cannot be written back down (tuples, bare type parameters, signatures
    /// that still contain type parameters).
    Bad,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Decl(Box<Decl>),
    Labeled {
        label: Ident,
        stmt: Box<Stmt>,
    },
    Expr(Expr),
    Send {
        chan: Expr,
        value: Expr,
    },
    IncDec {
        x: Expr,
        op: IncDecOp,
    },
    Assign {
        lhs: Vec<Expr>,
        op: AssignOp,
        rhs: Vec<Expr>,
    },
    Go(CallExpr),
    Defer(CallExpr),
    Return(Vec<Expr>),
    Block(BlockStmt),
    If {
        init: Option<Box<Stmt>>,
        cond: Expr,
        body: BlockStmt,
        els: Option<Box<Stmt>>,
    },
    Case {
        list: Vec<Expr>,
        body: Vec<Stmt>,
    },
    Switch {
        init: Option<Box<Stmt>>,
        tag: Option<Expr>,
        body: BlockStmt,
    },
    TypeSwitch {
        init: Option<Box<Stmt>>,
        assign: Box<Stmt>,
        body: BlockStmt,
    },
    Comm {
        comm: Option<Box<Stmt>>,
        body: Vec<Stmt>,
    },
    Select {
        body: BlockStmt,
    },
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
        body: BlockStmt,
    },
    Range {
        key: Option<Expr>,
        value: Option<Expr>,
        define: bool,
        x: Expr,
        body: BlockStmt,
    },
    Branch {
        kind: BranchKind,
        label: Option<Ident>,
    },
    Empty,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BlockStmt {
    pub list: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSpec {
    pub names: Vec<Ident>,
    pub ty: Option<Expr>,
    pub values: Vec<Expr>,
}

/// A (possibly generic) type declaration: `type List(type T) struct {...}`.
/// `params` non-empty marks this a generic declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSpec {
    pub name: Ident,
    pub params: Vec<TypeParamDecl>,
    pub ty: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Spec {
    Import(ImportSpec),
    Value(ValueSpec),
    Type(TypeSpec),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenTok {
    Import,
    Const,
    Var,
    Type,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenDecl {
    pub tok: GenTok,
    pub specs: Vec<Spec>,
}

/// A (possibly generic) function declaration. `type_params` is the
/// materialized list of every type parameter declared anywhere within this
/// function's receiver or parameter list — a function declaration may
/// additionally carry a prefix of unnamed type parameters.
/// Non-empty `type_params` (however they were spelled) makes this a generic
/// declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncDecl {
    pub recv: Option<FieldList>,
    pub name: Ident,
    pub type_params: Vec<TypeParamDecl>,
    pub sig: FuncTypeExpr,
    pub body: Option<BlockStmt>,
}

impl FuncDecl {
    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }

    pub fn is_method(&self) -> bool {
        self.recv.as_ref().is_some_and(|r| r.num_fields() > 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Decl {
    Func(FuncDecl),
    Gen(GenDecl),
}

/// Type mapping: finite function from type-parameter nominal identity to
/// concrete semantic type.
pub type Mapping = HashMap<TypeParamId, SemanticType>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_list_counts_unnamed_and_named_fields() {
        let fl = FieldList {
            list: vec![
                Field {
                    names: vec![Ident::new(NodeId(0), "x"), Ident::new(NodeId(1), "y")],
                    ty: Expr::Ident(Ident::new(NodeId(2), "T")),
                    tag: None,
                },
                Field {
                    names: vec![],
                    ty: Expr::TypeParam(TypeParamExpr {
                        decl: TypeParamDecl {
                            name: "U".into(),
                            constraint: None,
                        },
                    }),
                    tag: None,
                },
            ],
        };
        assert_eq!(fl.num_fields(), 3);
    }

    #[test]
    fn node_id_gen_is_monotonic() {
        let mut gen = NodeIdGen::new();
        let a = gen.next();
        let b = gen.next();
        assert_ne!(a, b);
        assert!(a.0 < b.0);
    }
}

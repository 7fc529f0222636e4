//! Recursive-descent parser producing `degen_ast` nodes.
//!
//! The corpus this grammar covers (`examples/original_source/test/*.go`,
//! `examples/original_source/examples/*/*.go`) never relies on Go's
//! statement-terminator rule (automatic semicolon insertion from newline
//! position) to disambiguate anything a block-scoped, comma-free statement
//! loop can't already resolve on its own, so `;` is accepted as an optional
//! separator between statements rather than reconstructed from line breaks.
//! `degen-lexer` discards newlines as whitespace, which is what makes that
//! workable here.

use crate::ParseError;
use degen_ast::*;
use degen_lexer::{Lexer, Token, TokenSpan};

pub struct Parser {
    tokens: Vec<TokenSpan>,
    pos: usize,
    ids: NodeIdGen,
    file: String,
}

type PResult<T> = Result<T, ParseError>;

impl Parser {
    pub fn new(source: &str) -> PResult<Self> {
        Self::new_named(source, "<input>")
    }

    pub fn new_named(source: &str, file: &str) -> PResult<Self> {
        let mut tokens = Vec::new();
        for tok in Lexer::new(source) {
            match tok {
                Ok(t) => tokens.push(t),
                Err(e) => return Err(ParseError::LexerError(e.to_string())),
            }
        }
        Ok(Self {
            tokens,
            pos: 0,
            ids: NodeIdGen::new(),
            file: file.to_string(),
        })
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|t| &t.token)
    }

    fn bump(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t.map(|t| t.token)
    }

    fn err(&self, message: impl Into<String>) -> ParseError {
        ParseError::SyntaxError {
            location: format!("{}:{}", self.file, self.pos),
            message: message.into(),
        }
    }

    fn expect(&mut self, want: &Token) -> PResult<()> {
        match self.peek() {
            Some(t) if t == want => {
                self.bump();
                Ok(())
            }
            Some(other) => Err(self.err(format!("expected {want:?}, found {other:?}"))),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    fn consume_if(&mut self, want: &Token) -> bool {
        if self.peek() == Some(want) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect_ident(&mut self) -> PResult<Ident> {
        match self.bump() {
            Some(Token::Ident(name)) => Ok(Ident::new(self.ids.next(), name)),
            Some(other) => Err(self.err(format!("expected identifier, found {other:?}"))),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    // ---- file / top-level -------------------------------------------------

    pub fn parse_file(&mut self) -> PResult<File> {
        self.expect(&Token::Package)?;
        let package = self.expect_ident()?.name;
        self.skip_semis();

        let mut imports = Vec::new();
        while self.peek() == Some(&Token::Import) {
            imports.extend(self.parse_import_decl()?);
            self.skip_semis();
        }

        let mut decls = Vec::new();
        while self.peek().is_some() {
            decls.push(self.parse_top_level_decl()?);
            self.skip_semis();
        }

        Ok(File {
            package,
            imports,
            decls,
        })
    }

    fn skip_semis(&mut self) {
        while self.consume_if(&Token::Semicolon) {}
    }

    fn parse_import_decl(&mut self) -> PResult<Vec<ImportSpec>> {
        self.expect(&Token::Import)?;
        if self.consume_if(&Token::LParen) {
            let mut specs = Vec::new();
            while self.peek() != Some(&Token::RParen) {
                specs.push(self.parse_import_spec()?);
                self.skip_semis();
            }
            self.expect(&Token::RParen)?;
            Ok(specs)
        } else {
            Ok(vec![self.parse_import_spec()?])
        }
    }

    fn parse_import_spec(&mut self) -> PResult<ImportSpec> {
        let alias = if let Some(Token::Ident(_)) = self.peek() {
            Some(self.expect_ident()?.name)
        } else {
            None
        };
        let path = match self.bump() {
            Some(Token::StringLiteral(s)) => s,
            Some(other) => return Err(self.err(format!("expected import path, found {other:?}"))),
            None => return Err(ParseError::UnexpectedEof),
        };
        Ok(ImportSpec { path, alias })
    }

    fn parse_top_level_decl(&mut self) -> PResult<Decl> {
        match self.peek() {
            Some(Token::Func) => Ok(Decl::Func(self.parse_func_decl()?)),
            Some(Token::Type) => Ok(Decl::Gen(self.parse_gen_decl(GenTok::Type)?)),
            Some(Token::Var) => Ok(Decl::Gen(self.parse_gen_decl(GenTok::Var)?)),
            Some(Token::Const) => Ok(Decl::Gen(self.parse_gen_decl(GenTok::Const)?)),
            Some(other) => Err(self.err(format!("expected a top-level declaration, found {other:?}"))),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    fn parse_gen_decl(&mut self, tok: GenTok) -> PResult<GenDecl> {
        self.bump(); // the leading keyword
        let mut specs = Vec::new();
        if self.consume_if(&Token::LParen) {
            while self.peek() != Some(&Token::RParen) {
                specs.push(self.parse_spec(tok)?);
                self.skip_semis();
            }
            self.expect(&Token::RParen)?;
        } else {
            specs.push(self.parse_spec(tok)?);
        }
        Ok(GenDecl { tok, specs })
    }

    fn parse_spec(&mut self, tok: GenTok) -> PResult<Spec> {
        match tok {
            GenTok::Type => Ok(Spec::Type(self.parse_type_spec()?)),
            GenTok::Var | GenTok::Const => Ok(Spec::Value(self.parse_value_spec()?)),
            GenTok::Import => Ok(Spec::Import(self.parse_import_spec()?)),
        }
    }

    fn parse_type_spec(&mut self) -> PResult<TypeSpec> {
        let name = self.expect_ident()?;
        let mut params = Vec::new();
        if self.consume_if(&Token::LParen) {
            params = self.parse_type_param_list()?;
            self.expect(&Token::RParen)?;
        }
        let ty = self.parse_type()?;
        Ok(TypeSpec { name, params, ty })
    }

    /// `(type T)`, `(type K eq, type V)`.
    fn parse_type_param_list(&mut self) -> PResult<Vec<TypeParamDecl>> {
        let mut params = Vec::new();
        while self.peek() != Some(&Token::RParen) {
            self.expect(&Token::Type)?;
            let name = self.expect_ident()?.name;
            let constraint = if let Some(Token::Ident(_)) = self.peek() {
                Some(self.expect_ident()?.name)
            } else {
                None
            };
            params.push(TypeParamDecl { name, constraint });
            if !self.consume_if(&Token::Comma) {
                break;
            }
        }
        Ok(params)
    }

    fn parse_value_spec(&mut self) -> PResult<ValueSpec> {
        let mut names = vec![self.expect_ident()?];
        while self.consume_if(&Token::Comma) {
            names.push(self.expect_ident()?);
        }
        let ty = if !matches!(self.peek(), Some(Token::Eq) | None) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let mut values = Vec::new();
        if self.consume_if(&Token::Eq) {
            values.push(self.parse_expr()?);
            while self.consume_if(&Token::Comma) {
                values.push(self.parse_expr()?);
            }
        }
        Ok(ValueSpec { names, ty, values })
    }

    fn parse_func_decl(&mut self) -> PResult<FuncDecl> {
        self.expect(&Token::Func)?;

        let recv = if self.peek() == Some(&Token::LParen) {
            self.bump();
            let f = self.parse_field_list(&Token::RParen)?;
            self.expect(&Token::RParen)?;
            Some(f)
        } else {
            None
        };

        let name = self.expect_ident()?;

        self.expect(&Token::LParen)?;
        let params = self.parse_field_list(&Token::RParen)?;
        self.expect(&Token::RParen)?;

        let results = self.parse_results()?;

        let body = if self.peek() == Some(&Token::LBrace) {
            Some(self.parse_block()?)
        } else {
            None
        };

        let mut type_params = Vec::new();
        collect_type_params(&recv, &mut type_params);
        collect_type_params(&Some(params.clone()), &mut type_params);

        Ok(FuncDecl {
            recv,
            name,
            type_params,
            sig: FuncTypeExpr { params, results },
            body,
        })
    }

    fn parse_results(&mut self) -> PResult<FieldList> {
        if self.consume_if(&Token::LParen) {
            let fields = self.parse_field_list(&Token::RParen)?;
            self.expect(&Token::RParen)?;
            Ok(fields)
        } else if self.is_type_start() {
            let ty = self.parse_type()?;
            Ok(FieldList {
                list: vec![Field {
                    names: vec![],
                    ty,
                    tag: None,
                }],
            })
        } else {
            Ok(FieldList::default())
        }
    }

    fn is_type_start(&self) -> bool {
        matches!(
            self.peek(),
            Some(
                Token::Ident(_)
                    | Token::Type
                    | Token::Star
                    | Token::LBracket
                    | Token::Map
                    | Token::Chan
                    | Token::Arrow
                    | Token::Func
                    | Token::Interface
                    | Token::Struct
                    | Token::Ellipsis
                    | Token::LParen
            )
        )
    }

    // ---- field lists (params, struct fields, receivers) -------------------

    fn parse_field_list(&mut self, terminator: &Token) -> PResult<FieldList> {
        let mut fields = Vec::new();
        let mut pending_names: Vec<Ident> = Vec::new();

        while self.peek() != Some(terminator) && self.peek().is_some() {
            if let Some(Token::Ident(_)) = self.peek() {
                let id = self.expect_ident()?;
                if self.peek() == Some(&Token::Comma) {
                    pending_names.push(id);
                    self.bump();
                    continue;
                } else if self.peek() == Some(terminator) {
                    for n in pending_names.drain(..) {
                        fields.push(Field {
                            names: vec![],
                            ty: Expr::Ident(n),
                            tag: None,
                        });
                    }
                    fields.push(Field {
                        names: vec![],
                        ty: Expr::Ident(id),
                        tag: None,
                    });
                    break;
                } else {
                    pending_names.push(id);
                    let ty = self.parse_type()?;
                    let tag = self.parse_optional_tag();
                    fields.push(Field {
                        names: std::mem::take(&mut pending_names),
                        ty,
                        tag,
                    });
                    if !self.consume_if(&Token::Comma) {
                        break;
                    }
                }
            } else {
                for n in pending_names.drain(..) {
                    fields.push(Field {
                        names: vec![],
                        ty: Expr::Ident(n),
                        tag: None,
                    });
                }
                let ty = self.parse_type()?;
                let tag = self.parse_optional_tag();
                fields.push(Field {
                    names: vec![],
                    ty,
                    tag,
                });
                if !self.consume_if(&Token::Comma) {
                    break;
                }
            }
        }

        for n in pending_names.drain(..) {
            fields.push(Field {
                names: vec![],
                ty: Expr::Ident(n),
                tag: None,
            });
        }

        Ok(FieldList { list: fields })
    }

    fn parse_optional_tag(&mut self) -> Option<String> {
        if let Some(Token::Tag(_)) = self.peek() {
            match self.bump() {
                Some(Token::Tag(s)) => Some(s),
                _ => None,
            }
        } else {
            None
        }
    }

    // ---- types --------------------------------------------------------

    fn parse_type(&mut self) -> PResult<Expr> {
        match self.peek() {
            Some(Token::Type) => {
                self.bump();
                let name = self.expect_ident()?.name;
                let constraint = if let Some(Token::Ident(_)) = self.peek() {
                    Some(self.expect_ident()?.name)
                } else {
                    None
                };
                Ok(Expr::TypeParam(TypeParamExpr {
                    decl: TypeParamDecl { name, constraint },
                }))
            }
            Some(Token::Ellipsis) => {
                self.bump();
                let elt = self.parse_type()?;
                Ok(Expr::Ellipsis(EllipsisExpr {
                    elt: Some(Box::new(elt)),
                }))
            }
            Some(Token::Star) => {
                self.bump();
                let x = self.parse_type()?;
                Ok(Expr::Star(StarExpr { x: Box::new(x) }))
            }
            Some(Token::LBracket) => {
                self.bump();
                let len = if self.peek() == Some(&Token::RBracket) {
                    None
                } else {
                    Some(Box::new(self.parse_expr()?))
                };
                self.expect(&Token::RBracket)?;
                let elt = Box::new(self.parse_type()?);
                Ok(Expr::ArrayType(ArrayType { len, elt }))
            }
            Some(Token::Map) => {
                self.bump();
                self.expect(&Token::LBracket)?;
                let key = Box::new(self.parse_type()?);
                self.expect(&Token::RBracket)?;
                let value = Box::new(self.parse_type()?);
                Ok(Expr::MapType(MapTypeExpr { key, value }))
            }
            Some(Token::Chan) => {
                self.bump();
                let dir = if self.consume_if(&Token::Arrow) {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                let value = Box::new(self.parse_type()?);
                Ok(Expr::ChanType(ChanTypeExpr { dir, value }))
            }
            Some(Token::Arrow) => {
                self.bump();
                self.expect(&Token::Chan)?;
                let value = Box::new(self.parse_type()?);
                Ok(Expr::ChanType(ChanTypeExpr {
                    dir: ChanDir::Recv,
                    value,
                }))
            }
            Some(Token::Struct) => {
                self.bump();
                self.expect(&Token::LBrace)?;
                let fields = self.parse_field_list(&Token::RBrace)?;
                self.skip_semis();
                self.expect(&Token::RBrace)?;
                Ok(Expr::StructType(StructType { fields }))
            }
            Some(Token::Interface) => {
                self.bump();
                self.expect(&Token::LBrace)?;
                let methods = self.parse_field_list(&Token::RBrace)?;
                self.skip_semis();
                self.expect(&Token::RBrace)?;
                Ok(Expr::InterfaceType(InterfaceType { methods }))
            }
            Some(Token::Func) => {
                self.bump();
                self.expect(&Token::LParen)?;
                let params = self.parse_field_list(&Token::RParen)?;
                self.expect(&Token::RParen)?;
                let results = self.parse_results()?;
                Ok(Expr::FuncType(FuncTypeExpr { params, results }))
            }
            Some(Token::LParen) => {
                self.bump();
                let inner = self.parse_type()?;
                self.expect(&Token::RParen)?;
                Ok(Expr::Paren(ParenExpr { x: Box::new(inner) }))
            }
            Some(Token::Ident(_)) => self.parse_postfix_from_ident(),
            Some(other) => Err(self.err(format!("expected a type, found {other:?}"))),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    fn parse_postfix_from_ident(&mut self) -> PResult<Expr> {
        let id = self.expect_ident()?;
        let mut expr = Expr::Ident(id);
        if self.peek() == Some(&Token::Dot) {
            self.bump();
            let sel = self.expect_ident()?;
            expr = Expr::Selector(SelectorExpr {
                x: Box::new(expr),
                sel,
            });
        }
        if self.peek() == Some(&Token::LParen) {
            expr = self.parse_call(expr)?;
        }
        Ok(expr)
    }

    fn parse_call(&mut self, func: Expr) -> PResult<Expr> {
        let id = self.ids.next();
        self.expect(&Token::LParen)?;
        let mut args = Vec::new();
        let mut ellipsis = false;
        while self.peek() != Some(&Token::RParen) {
            args.push(self.parse_expr()?);
            if self.consume_if(&Token::Ellipsis) {
                ellipsis = true;
            }
            if !self.consume_if(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RParen)?;
        Ok(Expr::Call(CallExpr {
            id,
            func: Box::new(func),
            args,
            ellipsis,
        }))
    }

    // ---- statements -----------------------------------------------------

    fn parse_block(&mut self) -> PResult<BlockStmt> {
        self.expect(&Token::LBrace)?;
        let mut list = Vec::new();
        self.skip_semis();
        while self.peek() != Some(&Token::RBrace) && self.peek().is_some() {
            list.push(self.parse_stmt()?);
            self.skip_semis();
        }
        self.expect(&Token::RBrace)?;
        Ok(BlockStmt { list })
    }

    fn parse_stmt(&mut self) -> PResult<Stmt> {
        match self.peek() {
            Some(Token::Var) => Ok(Stmt::Decl(Box::new(Decl::Gen(
                self.parse_gen_decl(GenTok::Var)?,
            )))),
            Some(Token::Const) => Ok(Stmt::Decl(Box::new(Decl::Gen(
                self.parse_gen_decl(GenTok::Const)?,
            )))),
            Some(Token::Type) => Ok(Stmt::Decl(Box::new(Decl::Gen(
                self.parse_gen_decl(GenTok::Type)?,
            )))),
            Some(Token::LBrace) => Ok(Stmt::Block(self.parse_block()?)),
            Some(Token::If) => self.parse_if(),
            Some(Token::For) => self.parse_for(),
            Some(Token::Switch) => self.parse_switch(),
            Some(Token::Select) => self.parse_select(),
            Some(Token::Go) => {
                self.bump();
                match self.parse_expr()? {
                    Expr::Call(c) => Ok(Stmt::Go(c)),
                    _ => Err(self.err("expected a call expression after `go`")),
                }
            }
            Some(Token::Defer) => {
                self.bump();
                match self.parse_expr()? {
                    Expr::Call(c) => Ok(Stmt::Defer(c)),
                    _ => Err(self.err("expected a call expression after `defer`")),
                }
            }
            Some(Token::Return) => {
                self.bump();
                let mut values = Vec::new();
                if !matches!(self.peek(), Some(Token::Semicolon) | Some(Token::RBrace) | None) {
                    values.push(self.parse_expr()?);
                    while self.consume_if(&Token::Comma) {
                        values.push(self.parse_expr()?);
                    }
                }
                Ok(Stmt::Return(values))
            }
            Some(Token::Break) => {
                self.bump();
                Ok(Stmt::Branch {
                    kind: BranchKind::Break,
                    label: self.parse_optional_label(),
                })
            }
            Some(Token::Continue) => {
                self.bump();
                Ok(Stmt::Branch {
                    kind: BranchKind::Continue,
                    label: self.parse_optional_label(),
                })
            }
            Some(Token::Goto) => {
                self.bump();
                let label = Some(self.expect_ident()?);
                Ok(Stmt::Branch {
                    kind: BranchKind::Goto,
                    label,
                })
            }
            Some(Token::Fallthrough) => {
                self.bump();
                Ok(Stmt::Branch {
                    kind: BranchKind::Fallthrough,
                    label: None,
                })
            }
            Some(Token::Semicolon) => Ok(Stmt::Empty),
            _ => self.parse_simple_stmt(),
        }
    }

    fn parse_optional_label(&mut self) -> Option<Ident> {
        if let Some(Token::Ident(_)) = self.peek() {
            self.expect_ident().ok()
        } else {
            None
        }
    }

    /// Expression, send, inc/dec, assign, or define statement — and, if an
    /// identifier is immediately followed by `:`, a labeled statement.
    fn parse_simple_stmt(&mut self) -> PResult<Stmt> {
        if let (Some(Token::Ident(_)), Some(Token::Colon)) = (self.peek(), self.peek_at(1)) {
            let label = self.expect_ident()?;
            self.bump();
            let stmt = Box::new(self.parse_stmt()?);
            return Ok(Stmt::Labeled { label, stmt });
        }

        let mut lhs = vec![self.parse_expr()?];
        while self.consume_if(&Token::Comma) {
            lhs.push(self.parse_expr()?);
        }

        match self.peek() {
            Some(Token::Arrow) => {
                self.bump();
                let value = self.parse_expr()?;
                let chan = lhs.into_iter().next().ok_or_else(|| self.err("empty send target"))?;
                Ok(Stmt::Send { chan, value })
            }
            Some(Token::Inc) => {
                self.bump();
                Ok(Stmt::IncDec {
                    x: lhs.remove(0),
                    op: IncDecOp::Inc,
                })
            }
            Some(Token::Dec) => {
                self.bump();
                Ok(Stmt::IncDec {
                    x: lhs.remove(0),
                    op: IncDecOp::Dec,
                })
            }
            Some(tok) if assign_op(tok).is_some() => {
                let tok = self.bump().ok_or(ParseError::UnexpectedEof)?;
                let op = assign_op(&tok).ok_or_else(|| self.err("internal: assign token changed"))?;
                let mut rhs = vec![self.parse_expr()?];
                while self.consume_if(&Token::Comma) {
                    rhs.push(self.parse_expr()?);
                }
                Ok(Stmt::Assign { lhs, op, rhs })
            }
            _ => {
                if lhs.len() != 1 {
                    return Err(self.err("expected assignment after expression list"));
                }
                Ok(Stmt::Expr(lhs.remove(0)))
            }
        }
    }

    fn parse_if(&mut self) -> PResult<Stmt> {
        self.expect(&Token::If)?;
        let (init, cond) = self.parse_if_header()?;
        let body = self.parse_block()?;
        let els = if self.consume_if(&Token::Else) {
            if self.peek() == Some(&Token::If) {
                Some(Box::new(self.parse_if()?))
            } else {
                Some(Box::new(Stmt::Block(self.parse_block()?)))
            }
        } else {
            None
        };
        Ok(Stmt::If {
            init: init.map(Box::new),
            cond,
            body,
            els,
        })
    }

    /// `[SimpleStmt ";"] Expr` ahead of a block — the `for`/`switch` header
    /// shares this shape (without `switch`'s tag being mandatory), so we
    /// distinguish init-clauses from the final condition by whether the
    /// header contains a `;`.
    fn parse_if_header(&mut self) -> PResult<(Option<Stmt>, Expr)> {
        let first = self.parse_simple_stmt_no_compound_lit()?;
        if self.consume_if(&Token::Semicolon) {
            let cond = self.parse_expr_no_compound_lit()?;
            Ok((Some(first), cond))
        } else {
            match first {
                Stmt::Expr(e) => Ok((None, e)),
                other => Err(self.err(format!("expected a condition, found {other:?}"))),
            }
        }
    }

    fn parse_simple_stmt_no_compound_lit(&mut self) -> PResult<Stmt> {
        self.parse_simple_stmt()
    }

    fn parse_expr_no_compound_lit(&mut self) -> PResult<Expr> {
        self.parse_expr()
    }

    fn parse_for(&mut self) -> PResult<Stmt> {
        self.expect(&Token::For)?;

        if self.peek() == Some(&Token::LBrace) {
            let body = self.parse_block()?;
            return Ok(Stmt::For {
                init: None,
                cond: None,
                post: None,
                body,
            });
        }

        // range form: `for [k [, v] :=|=] range X { ... }`
        if self.is_range_header() {
            return self.parse_range();
        }

        // condition-only form: `for Expr { ... }`
        let save = self.pos;
        if let Ok(cond) = self.parse_expr() {
            if self.peek() == Some(&Token::LBrace) {
                let body = self.parse_block()?;
                return Ok(Stmt::For {
                    init: None,
                    cond: Some(cond),
                    post: None,
                    body,
                });
            }
        }
        self.pos = save;

        // full three-clause form
        let init = if self.peek() == Some(&Token::Semicolon) {
            None
        } else {
            Some(self.parse_simple_stmt()?)
        };
        self.expect(&Token::Semicolon)?;
        let cond = if self.peek() == Some(&Token::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(&Token::Semicolon)?;
        let post = if self.peek() == Some(&Token::LBrace) {
            None
        } else {
            Some(self.parse_simple_stmt()?)
        };
        let body = self.parse_block()?;
        Ok(Stmt::For {
            init: init.map(Box::new),
            cond,
            post: post.map(Box::new),
            body,
        })
    }

    fn is_range_header(&self) -> bool {
        if self.peek() == Some(&Token::Range) {
            return true;
        }
        let mut i = 0;
        loop {
            match self.peek_at(i) {
                Some(Token::Range) => return true,
                Some(Token::Define) | Some(Token::Eq) => {
                    return matches!(self.peek_at(i + 1), Some(Token::Range))
                }
                Some(Token::Ident(_)) | Some(Token::Comma) => i += 1,
                _ => return false,
            }
        }
    }

    fn parse_range(&mut self) -> PResult<Stmt> {
        let (key, value, define) = if self.peek() == Some(&Token::Range) {
            (None, None, false)
        } else {
            let key = self.parse_expr()?;
            let value = if self.consume_if(&Token::Comma) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            let define = match self.bump() {
                Some(Token::Define) => true,
                Some(Token::Eq) => false,
                other => return Err(self.err(format!("expected `:=` or `=`, found {other:?}"))),
            };
            (Some(key), value, define)
        };
        self.expect(&Token::Range)?;
        let x = self.parse_expr()?;
        let body = self.parse_block()?;
        Ok(Stmt::Range {
            key,
            value,
            define,
            x,
            body,
        })
    }

    fn parse_switch(&mut self) -> PResult<Stmt> {
        self.expect(&Token::Switch)?;
        let (init, tag) = if self.peek() == Some(&Token::LBrace) {
            (None, None)
        } else {
            self.parse_if_header().map(|(i, c)| (i, Some(c)))?
        };
        self.expect(&Token::LBrace)?;
        let mut cases = Vec::new();
        self.skip_semis();
        while self.peek() != Some(&Token::RBrace) && self.peek().is_some() {
            cases.push(self.parse_case_clause()?);
            self.skip_semis();
        }
        self.expect(&Token::RBrace)?;
        Ok(Stmt::Switch {
            init: init.map(Box::new),
            tag,
            body: BlockStmt { list: cases },
        })
    }

    fn parse_case_clause(&mut self) -> PResult<Stmt> {
        let list = if self.consume_if(&Token::Case) {
            let mut list = vec![self.parse_expr()?];
            while self.consume_if(&Token::Comma) {
                list.push(self.parse_expr()?);
            }
            list
        } else {
            self.expect(&Token::Default)?;
            Vec::new()
        };
        self.expect(&Token::Colon)?;
        let mut body = Vec::new();
        self.skip_semis();
        while !matches!(self.peek(), Some(Token::Case) | Some(Token::Default) | Some(Token::RBrace) | None)
        {
            body.push(self.parse_stmt()?);
            self.skip_semis();
        }
        Ok(Stmt::Case { list, body })
    }

    fn parse_select(&mut self) -> PResult<Stmt> {
        self.expect(&Token::Select)?;
        self.expect(&Token::LBrace)?;
        let mut clauses = Vec::new();
        self.skip_semis();
        while self.peek() != Some(&Token::RBrace) && self.peek().is_some() {
            clauses.push(self.parse_comm_clause()?);
            self.skip_semis();
        }
        self.expect(&Token::RBrace)?;
        Ok(Stmt::Select {
            body: BlockStmt { list: clauses },
        })
    }

    fn parse_comm_clause(&mut self) -> PResult<Stmt> {
        let comm = if self.consume_if(&Token::Case) {
            Some(Box::new(self.parse_simple_stmt()?))
        } else {
            self.expect(&Token::Default)?;
            None
        };
        self.expect(&Token::Colon)?;
        let mut body = Vec::new();
        self.skip_semis();
        while !matches!(self.peek(), Some(Token::Case) | Some(Token::Default) | Some(Token::RBrace) | None)
        {
            body.push(self.parse_stmt()?);
            self.skip_semis();
        }
        Ok(Stmt::Comm { comm, body })
    }

    // ---- expressions ------------------------------------------------------

    pub fn parse_expr(&mut self) -> PResult<Expr> {
        self.parse_binary(1)
    }

    fn parse_binary(&mut self, min_prec: u8) -> PResult<Expr> {
        let mut lhs = self.parse_unary()?;
        while let Some(tok) = self.peek() {
            let Some((op, prec)) = binary_op(tok) else {
                break;
            };
            if prec < min_prec {
                break;
            }
            self.bump();
            let rhs = self.parse_binary(prec + 1)?;
            lhs = Expr::Binary(BinaryExpr {
                x: Box::new(lhs),
                op,
                y: Box::new(rhs),
            });
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        match self.peek() {
            Some(Token::Not) => {
                self.bump();
                Ok(Expr::Unary(UnaryExpr {
                    op: UnOp::Not,
                    x: Box::new(self.parse_unary()?),
                }))
            }
            Some(Token::Minus) => {
                self.bump();
                Ok(Expr::Unary(UnaryExpr {
                    op: UnOp::Neg,
                    x: Box::new(self.parse_unary()?),
                }))
            }
            Some(Token::Plus) => {
                self.bump();
                Ok(Expr::Unary(UnaryExpr {
                    op: UnOp::Plus,
                    x: Box::new(self.parse_unary()?),
                }))
            }
            Some(Token::Amp) => {
                self.bump();
                Ok(Expr::Unary(UnaryExpr {
                    op: UnOp::Address,
                    x: Box::new(self.parse_unary()?),
                }))
            }
            Some(Token::Star) => {
                self.bump();
                Ok(Expr::Star(StarExpr {
                    x: Box::new(self.parse_unary()?),
                }))
            }
            Some(Token::Arrow) => {
                self.bump();
                if self.peek() == Some(&Token::Chan) {
                    self.bump();
                    let value = Box::new(self.parse_type()?);
                    Ok(Expr::ChanType(ChanTypeExpr {
                        dir: ChanDir::Recv,
                        value,
                    }))
                } else {
                    Ok(Expr::Unary(UnaryExpr {
                        op: UnOp::Recv,
                        x: Box::new(self.parse_unary()?),
                    }))
                }
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek() {
                Some(Token::Dot) => {
                    self.bump();
                    let sel = self.expect_ident()?;
                    expr = Expr::Selector(SelectorExpr {
                        x: Box::new(expr),
                        sel,
                    });
                }
                Some(Token::LParen) => {
                    expr = self.parse_call(expr)?;
                }
                Some(Token::LBracket) => {
                    expr = self.parse_index_or_slice(expr)?;
                }
                Some(Token::LBrace) if is_composite_lit_head(&expr) => {
                    expr = self.parse_composite_lit(expr)?;
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_index_or_slice(&mut self, x: Expr) -> PResult<Expr> {
        self.bump(); // `[`
        if self.consume_if(&Token::Colon) {
            let high = if self.peek() == Some(&Token::RBracket) {
                None
            } else {
                Some(Box::new(self.parse_expr()?))
            };
            self.expect(&Token::RBracket)?;
            return Ok(Expr::Slice(SliceExpr {
                x: Box::new(x),
                low: None,
                high,
                max: None,
                slice3: false,
            }));
        }
        let first = self.parse_expr()?;
        if self.consume_if(&Token::Colon) {
            let high = if matches!(self.peek(), Some(Token::Colon) | Some(Token::RBracket)) {
                None
            } else {
                Some(Box::new(self.parse_expr()?))
            };
            let (max, slice3) = if self.consume_if(&Token::Colon) {
                (Some(Box::new(self.parse_expr()?)), true)
            } else {
                (None, false)
            };
            self.expect(&Token::RBracket)?;
            Ok(Expr::Slice(SliceExpr {
                x: Box::new(x),
                low: Some(Box::new(first)),
                high,
                max,
                slice3,
            }))
        } else {
            self.expect(&Token::RBracket)?;
            Ok(Expr::Index(IndexExpr {
                x: Box::new(x),
                index: Box::new(first),
            }))
        }
    }

    fn parse_composite_lit(&mut self, ty: Expr) -> PResult<Expr> {
        self.expect(&Token::LBrace)?;
        let mut elts = Vec::new();
        while self.peek() != Some(&Token::RBrace) {
            let key_or_value = self.parse_composite_elt()?;
            if self.consume_if(&Token::Colon) {
                let value = self.parse_composite_elt()?;
                elts.push(Expr::KeyValue(KeyValueExpr {
                    key: Box::new(key_or_value),
                    value: Box::new(value),
                }));
            } else {
                elts.push(key_or_value);
            }
            if !self.consume_if(&Token::Comma) {
                break;
            }
        }
        self.skip_semis();
        self.expect(&Token::RBrace)?;
        Ok(Expr::CompositeLit(CompositeLit {
            ty: Box::new(ty),
            elts,
        }))
    }

    fn parse_composite_elt(&mut self) -> PResult<Expr> {
        if self.peek() == Some(&Token::LBrace) {
            self.parse_composite_lit(Expr::Bad)
        } else {
            self.parse_expr()
        }
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        match self.peek() {
            Some(Token::IntLiteral(_)) => match self.bump() {
                Some(Token::IntLiteral(v)) => Ok(Expr::BasicLit(BasicLit {
                    kind: BasicLitKind::Int,
                    value: v,
                })),
                other => Err(self.err(format!("internal: int literal token changed to {other:?}"))),
            },
            Some(Token::FloatLiteral(_)) => match self.bump() {
                Some(Token::FloatLiteral(v)) => Ok(Expr::BasicLit(BasicLit {
                    kind: BasicLitKind::Float,
                    value: v.to_string(),
                })),
                other => Err(self.err(format!("internal: float literal token changed to {other:?}"))),
            },
            Some(Token::StringLiteral(_)) => match self.bump() {
                Some(Token::StringLiteral(v)) => Ok(Expr::BasicLit(BasicLit {
                    kind: BasicLitKind::String,
                    value: v,
                })),
                other => Err(self.err(format!("internal: string literal token changed to {other:?}"))),
            },
            Some(Token::CharLiteral(_)) => match self.bump() {
                Some(Token::CharLiteral(v)) => Ok(Expr::BasicLit(BasicLit {
                    kind: BasicLitKind::Char,
                    value: v,
                })),
                other => Err(self.err(format!("internal: char literal token changed to {other:?}"))),
            },
            Some(Token::True) => {
                self.bump();
                Ok(Expr::Ident(Ident::new(self.ids.next(), "true")))
            }
            Some(Token::False) => {
                self.bump();
                Ok(Expr::Ident(Ident::new(self.ids.next(), "false")))
            }
            Some(Token::Nil) => {
                self.bump();
                Ok(Expr::Ident(Ident::new(self.ids.next(), "nil")))
            }
            Some(Token::Ident(_)) => Ok(Expr::Ident(self.expect_ident()?)),
            Some(Token::Type) | Some(Token::Star) | Some(Token::LBracket) | Some(Token::Map)
            | Some(Token::Chan) | Some(Token::Struct) | Some(Token::Interface)
            | Some(Token::Func) => self.parse_type_or_func_lit(),
            Some(Token::LParen) => {
                self.bump();
                let inner = self.parse_expr()?;
                self.expect(&Token::RParen)?;
                Ok(Expr::Paren(ParenExpr {
                    x: Box::new(inner),
                }))
            }
            Some(other) => Err(self.err(format!("expected an expression, found {other:?}"))),
            None => Err(ParseError::UnexpectedEof),
        }
    }

    fn parse_type_or_func_lit(&mut self) -> PResult<Expr> {
        if self.peek() == Some(&Token::Func) {
            self.bump();
            self.expect(&Token::LParen)?;
            let params = self.parse_field_list(&Token::RParen)?;
            self.expect(&Token::RParen)?;
            let results = self.parse_results()?;
            if self.peek() == Some(&Token::LBrace) {
                let body = self.parse_block()?;
                return Ok(Expr::FuncLit(FuncLit {
                    sig: FuncTypeExpr { params, results },
                    body,
                }));
            }
            return Ok(Expr::FuncType(FuncTypeExpr { params, results }));
        }
        self.parse_type()
    }
}

fn is_composite_lit_head(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Ident(_)
            | Expr::Selector(_)
            | Expr::Call(_)
            | Expr::ArrayType(_)
            | Expr::MapType(_)
            | Expr::StructType(_)
    )
}

fn collect_type_params(fields: &Option<FieldList>, out: &mut Vec<TypeParamDecl>) {
    let Some(fields) = fields else { return };
    for field in &fields.list {
        collect_type_params_in_expr(&field.ty, out);
    }
}

fn collect_type_params_in_expr(expr: &Expr, out: &mut Vec<TypeParamDecl>) {
    match expr {
        Expr::TypeParam(tp) => out.push(tp.decl.clone()),
        Expr::Star(s) => collect_type_params_in_expr(&s.x, out),
        Expr::Ellipsis(e) => {
            if let Some(elt) = &e.elt {
                collect_type_params_in_expr(elt, out);
            }
        }
        Expr::ArrayType(a) => collect_type_params_in_expr(&a.elt, out),
        Expr::ChanType(c) => collect_type_params_in_expr(&c.value, out),
        Expr::MapType(m) => {
            collect_type_params_in_expr(&m.key, out);
            collect_type_params_in_expr(&m.value, out);
        }
        Expr::FuncType(f) => {
            for field in &f.params.list {
                collect_type_params_in_expr(&field.ty, out);
            }
            for field in &f.results.list {
                collect_type_params_in_expr(&field.ty, out);
            }
        }
        Expr::Call(c) => {
            for arg in &c.args {
                collect_type_params_in_expr(arg, out);
            }
        }
        _ => {}
    }
}

fn assign_op(tok: &Token) -> Option<AssignOp> {
    match tok {
        Token::Eq => Some(AssignOp::Assign),
        Token::Define => Some(AssignOp::Define),
        Token::PlusEq => Some(AssignOp::AddAssign),
        Token::MinusEq => Some(AssignOp::SubAssign),
        _ => None,
    }
}

fn binary_op(tok: &Token) -> Option<(BinOp, u8)> {
    Some(match tok {
        Token::OrOr => (BinOp::LOr, 1),
        Token::AndAnd => (BinOp::LAnd, 2),
        Token::EqEq => (BinOp::Eq, 3),
        Token::NotEq => (BinOp::Ne, 3),
        Token::Lt => (BinOp::Lt, 3),
        Token::LtEq => (BinOp::Le, 3),
        Token::Gt => (BinOp::Gt, 3),
        Token::GtEq => (BinOp::Ge, 3),
        Token::Plus => (BinOp::Add, 4),
        Token::Minus => (BinOp::Sub, 4),
        Token::Star => (BinOp::Mul, 5),
        Token::Slash => (BinOp::Quo, 5),
        Token::Percent => (BinOp::Rem, 5),
        _ => return None,
    })
}

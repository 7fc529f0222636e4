//! The Pass Driver: runs the degeneration pass to a fixpoint, re-parsing
//! and re-checking between passes, then strips any generic declaration
//! still standing.
//!
//! Grounded in `examples/original_source/degen/api.go`'s `Degen` entry
//! point, generalized from its single-shot call into the surrounding
//! reparse/recheck loop this system adds on top. The external parser,
//! checker, and printer are all out of this crate's scope — the
//! type-checker's internal inference algorithm and the concrete syntax are
//! both external collaborators — `degen-parser`/`degen-printer` sit as
//! dev-dependencies of this crate for exactly that reason, so the driver is
//! written against a `Frontend` trait rather than those crates directly.
//! `degen-cli` and the integration tests each supply their own `Frontend`.

use degen_ast::{Decl, File, GenTok, Spec};
use degen_diagnostics::{error_codes, Diagnostic, DiagnosticEngine, Span};

use crate::rewrite::degen_file;
use crate::TypeCheckFacade;

type Result<T> = std::result::Result<T, degen_diagnostics::EngineError>;

/// The external collaborators the Pass Driver needs and nothing more: turn
/// source text into a fresh AST, annotate a fresh AST with checker
/// information, turn an AST back into source text.
pub trait Frontend {
    fn parse(&self, source: &str) -> Result<File>;
    fn check(&self, file: &File) -> Result<Box<dyn TypeCheckFacade>>;
    fn print(&self, file: &File) -> String;
}

/// Runs the parse/check/rewrite/reparse loop to a fixpoint and returns the
/// final, non-generic source text.
///
/// `maxstage` negative means "until fixpoint"; otherwise it caps the number
/// of degeneration passes, matching the CLI's `maxstage` flag. Hitting the
/// cap before the pass reports "no change" is recorded as a warning on
/// `diagnostics`, not a fatal error.
pub fn run_to_fixpoint(
    frontend: &dyn Frontend,
    source: &str,
    maxstage: i64,
    diagnostics: &mut DiagnosticEngine,
) -> Result<String> {
    let mut file = frontend.parse(source)?;
    let mut checker = frontend.check(&file)?;

    let mut stage: i64 = 0;
    loop {
        let (next_file, changed) = degen_file(checker.as_ref(), &file)?;
        let printed = frontend.print(&next_file);

        file = frontend.parse(&printed)?;
        checker = frontend.check(&file)?;
        stage += 1;

        if !changed {
            break;
        }
        if maxstage >= 0 && stage >= maxstage {
            diagnostics.emit(Diagnostic::warning(
                error_codes::MAXSTAGE_REACHED,
                format!("pass cap of {maxstage} reached before a fixpoint was found"),
                Span::unknown(),
            ));
            break;
        }
    }

    let final_file = drop_remaining_generics(&file);
    Ok(frontend.print(&final_file))
}

/// Drops any function declaration and any type specification still
/// carrying a non-empty type-parameter list. A
/// `GenDecl` that loses every one of its specs this way is dropped whole;
/// one that keeps a mix of generic and non-generic type specs keeps only
/// the non-generic ones, mirroring the per-spec (not per-group) rule
/// `rewrite::degen_file` already applies when it preserves still-generic
/// specs verbatim mid-pass.
fn drop_remaining_generics(file: &File) -> File {
    let mut decls = Vec::with_capacity(file.decls.len());
    for decl in &file.decls {
        match decl {
            Decl::Func(f) if f.is_generic() => continue,
            Decl::Gen(g) if g.tok == GenTok::Type => {
                let specs: Vec<Spec> = g
                    .specs
                    .iter()
                    .filter(|spec| !matches!(spec, Spec::Type(ts) if !ts.params.is_empty()))
                    .cloned()
                    .collect();
                if specs.is_empty() {
                    continue;
                }
                decls.push(Decl::Gen(GenDecl {
                    tok: g.tok,
                    specs,
                }));
            }
            other => decls.push(other.clone()),
        }
    }
    File {
        package: file.package.clone(),
        imports: file.imports.clone(),
        decls,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::reference::ReferenceChecker;
    use degen_ast::{FuncDecl, FuncTypeExpr, Ident, NodeId, TypeParamDecl};

    fn generic_min() -> Decl {
        Decl::Func(FuncDecl {
            recv: None,
            name: Ident::new(NodeId(0), "Min"),
            type_params: vec![TypeParamDecl {
                name: "T".into(),
                constraint: None,
            }],
            sig: FuncTypeExpr {
                params: Default::default(),
                results: Default::default(),
            },
            body: Some(Default::default()),
        })
    }

    fn plain_func(name: &str) -> Decl {
        Decl::Func(FuncDecl {
            recv: None,
            name: Ident::new(NodeId(0), name),
            type_params: vec![],
            sig: FuncTypeExpr {
                params: Default::default(),
                results: Default::default(),
            },
            body: Some(Default::default()),
        })
    }

    #[test]
    fn drop_remaining_generics_removes_generic_func_keeps_plain_one() {
        let file = File {
            package: "p".into(),
            imports: vec![],
            decls: vec![generic_min(), plain_func("Min_int")],
        };
        let filtered = drop_remaining_generics(&file);
        assert_eq!(filtered.decls.len(), 1);
        assert!(matches!(&filtered.decls[0], Decl::Func(f) if f.name.name == "Min_int"));
    }

    struct FixedFrontend {
        outputs: std::cell::RefCell<Vec<&'static str>>,
    }

    impl Frontend for FixedFrontend {
        fn parse(&self, _source: &str) -> Result<File> {
            Ok(File {
                package: "p".into(),
                imports: vec![],
                decls: vec![plain_func("Already_done")],
            })
        }

        fn check(&self, _file: &File) -> Result<Box<dyn TypeCheckFacade>> {
            Ok(Box::new(ReferenceChecker::new()))
        }

        fn print(&self, _file: &File) -> String {
            self.outputs
                .borrow_mut()
                .pop()
                .unwrap_or("package p\n")
                .to_string()
        }
    }

    #[test]
    fn run_to_fixpoint_stops_as_soon_as_a_pass_reports_no_change() {
        let frontend = FixedFrontend {
            outputs: std::cell::RefCell::new(vec!["package p\n"]),
        };
        let mut diagnostics = DiagnosticEngine::new();
        let out = run_to_fixpoint(&frontend, "package p\n", -1, &mut diagnostics).unwrap();
        assert!(out.contains("package p"));
        assert!(!diagnostics.has_errors());
    }
}

//! The per-pass specialization registry: a name is Unseen until its first
//! emission registers it, and never leaves Registered within a pass.
//!
//! Grounded in `examples/original_source/degen/api.go`'s `cfg.instantiated
//! map[string]bool`, pre-seeded there by scanning the input's top-level
//! non-method function and type names before the main pass starts (so a
//! later synthesized name can never collide with an author-declared one).

use degen_ast::{Decl, File, GenTok, Spec};
use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct Registry {
    seen: HashSet<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans `file`'s top-level declarations and records every non-method
    /// function name and every type name as already present.
    pub fn pre_seed(file: &File) -> Self {
        let mut seen = HashSet::new();
        for decl in &file.decls {
            match decl {
                Decl::Func(f) if !f.is_method() => {
                    seen.insert(f.name.name.clone());
                }
                Decl::Func(_) => {}
                Decl::Gen(g) if g.tok == GenTok::Type => {
                    for spec in &g.specs {
                        if let Spec::Type(ts) = spec {
                            seen.insert(ts.name.name.clone());
                        }
                    }
                }
                Decl::Gen(_) => {}
            }
        }
        Self { seen }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    /// Attempts to transition `name` from Unseen to Registered. Returns
    /// `true` on a fresh registration (the caller should emit), `false` if
    /// `name` was already registered (the caller should dedup and reuse it).
    pub fn try_register(&mut self, name: impl Into<String>) -> bool {
        self.seen.insert(name.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use degen_ast::{FuncDecl, FuncTypeExpr, Ident, NodeId};

    fn func(name: &str) -> Decl {
        Decl::Func(FuncDecl {
            recv: None,
            name: Ident::new(NodeId(0), name),
            type_params: vec![],
            sig: FuncTypeExpr {
                params: Default::default(),
                results: Default::default(),
            },
            body: None,
        })
    }

    #[test]
    fn pre_seed_blocks_collision_with_author_names() {
        let file = File {
            package: "p".into(),
            imports: vec![],
            decls: vec![func("Min")],
        };
        let mut reg = Registry::pre_seed(&file);
        assert!(reg.contains("Min"));
        assert!(!reg.try_register("Min"));
    }

    #[test]
    fn try_register_dedupes_on_second_call() {
        let mut reg = Registry::new();
        assert!(reg.try_register("Min_int"));
        assert!(!reg.try_register("Min_int"));
    }
}

//! The degeneration pass itself: render, substitute, rewrite, instantiate,
//! and drive to a fixpoint.
//!
//! Grounded in `examples/original_source/degen/{degen,inst,conversions,api}.go`
//! (`faiface/generics`'s actual monomorphizer), with type-argument inference
//! from a call's arguments and pulling a generic struct's methods along when
//! the struct itself is instantiated built in a Rust-native idiom.
//!
//! Every fallible operation here returns `degen_diagnostics::EngineError`
//! rather than panicking, per the workspace's `panic = "deny"` lint: an
//! engine invariant violation is an ordinary (if fatal) `Result` error, not
//! a process abort.

pub mod driver;
pub mod facade;
pub mod inst;
pub mod registry;
pub mod render;
pub mod rewrite;
pub mod subst;

pub use degen_diagnostics::EngineError;
pub use facade::{DeclRef, GenericCall, GenericInstance, TypeCheckFacade};
pub use registry::Registry;
pub use rewrite::degen_file;

pub type EngineResult<T> = Result<T, EngineError>;

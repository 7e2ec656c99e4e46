//! Source-to-source transformation recipes. A recipe is a scope filter
//! plus a rewriting pass over one compilation unit; it holds no state
//! across files, so callers are free to run it over many files in
//! parallel.

use crate::ast::CompilationUnit;

pub mod promote;

#[cfg(test)]
mod tests;

pub trait Recipe {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Scope filter: read-only verdict on whether `run` would have any
    /// work to do. `run` on an out-of-scope unit must be a no-op either
    /// way; this exists so callers can skip the rewrite cheaply.
    fn applies_to(&self, cu: &CompilationUnit) -> bool;

    /// Rewrite the unit in place. Returns true when anything changed
    /// (tree or storage path).
    fn run(&self, cu: &mut CompilationUnit) -> bool;
}

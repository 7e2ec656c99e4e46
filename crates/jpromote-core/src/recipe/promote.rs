//! Promotes types out of `.experimental.` packages: rewrites the package
//! declaration, imports, every syntactic type reference, and all attributed
//! type metadata, then moves the file's storage path to the new package
//! directory and prunes imports made redundant by the move.

use std::sync::LazyLock;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::ast::expression::{build_fq_expression, Expression};
use crate::ast::statement::ClassDecl;
use crate::ast::types::{
    join_fqn, ClassType, GenericType, JavaType, MethodType, ParameterizedType, VariableType,
};
use crate::ast::{CompilationUnit, Import, TypeTree};
use crate::config::MigrationRule;
use crate::context::RewriteContext;
use crate::imports::remove_import_at;
use crate::recipe::Recipe;
use crate::search::UsesType;
use crate::visitor::{self, JavaVisitorMut};

/// Marker segment that puts a package declaration in scope on sight.
pub const EXPERIMENTAL_SEGMENT: &str = ".experimental.";

static EXPERIMENTAL_TYPE: LazyLock<UsesType> =
    LazyLock::new(|| UsesType::new(r".*\.experimental\..*").expect("hard-coded pattern compiles"));

pub struct PromoteExperimental {
    rule: MigrationRule,
}

impl PromoteExperimental {
    pub fn new(rule: MigrationRule) -> Self {
        Self { rule }
    }
}

impl Recipe for PromoteExperimental {
    fn name(&self) -> &'static str {
        "PromoteExperimental"
    }

    fn description(&self) -> &'static str {
        "Moves types out of experimental packages to their promoted locations."
    }

    fn applies_to(&self, cu: &CompilationUnit) -> bool {
        if let Some(package) = &cu.package {
            if package.dotted_name().contains(EXPERIMENTAL_SEGMENT) {
                return true;
            }
        }
        EXPERIMENTAL_TYPE.matches(cu)
    }

    fn run(&self, cu: &mut CompilationUnit) -> bool {
        if !self.applies_to(cu) {
            return false;
        }
        let mut visitor = RenameVisitor::new(&self.rule);
        visitor.enter_package(cu);
        visitor.visit_compilation_unit(cu);
        visitor.finish(cu)
    }
}

/// One file's rewriting pass. The memo table and the rename context are
/// scoped to a single compilation unit and discarded with the visitor.
struct RenameVisitor<'a> {
    rule: &'a MigrationRule,
    ctx: RewriteContext,
    /// Printed old-type identity to its computed replacement, so repeated
    /// occurrences of one original type always resolve to the same new
    /// type.
    memo: FxHashMap<String, JavaType>,
    changed: bool,
}

impl<'a> RenameVisitor<'a> {
    fn new(rule: &'a MigrationRule) -> Self {
        Self {
            rule,
            ctx: RewriteContext::new(),
            memo: FxHashMap::default(),
            changed: false,
        }
    }

    /// Package-declaration state machine, run before the tree walk. A
    /// targeted package is rewritten in place; an empty destination deletes
    /// the declaration and leaves its leading trivia for the next element
    /// to absorb.
    fn enter_package(&mut self, cu: &mut CompilationUnit) {
        let Some(package) = &mut cu.package else {
            return;
        };
        let original = package.dotted_name();
        self.ctx.rename_from = Some(original.clone());
        if !self.rule.targets_package(&original) {
            return;
        }
        let to = self.rule.new_package_name(&original);
        debug!(from = %original, to = %to, "renaming package");
        self.ctx.rename_to = Some(to.clone());
        if to.is_empty() {
            self.ctx.pending_prefix = Some(package.prefix.clone());
            cu.package = None;
        } else {
            package.set_name(&to);
        }
        self.changed = true;
    }

    /// Finalizer, run after the tree walk: move the storage path, prune
    /// imports made redundant by the move, and park any trivia nothing
    /// absorbed.
    fn finish(mut self, cu: &mut CompilationUnit) -> bool {
        if let Some(to) = self.ctx.rename_to.clone() {
            self.rewrite_source_path(cu, &to);
            let mut index = 0;
            while index < cu.imports.len() {
                let import = &cu.imports[index];
                let prune = if to.is_empty() {
                    // Types promoted to the default package cannot be
                    // imported at all.
                    self.rule.targets_package(&import.package_name())
                } else {
                    // A self-import after the file moved into `to`.
                    !import.is_static() && import.package_name() == to
                };
                if prune {
                    remove_import_at(cu, index);
                    self.changed = true;
                } else {
                    index += 1;
                }
            }
        }
        if let Some(prefix) = self.ctx.pending_prefix.take() {
            cu.eof = format!("{prefix}{}", cu.eof);
        }
        self.changed
    }

    fn rewrite_source_path(&mut self, cu: &mut CompilationUnit, to: &str) {
        let Some(from) = &self.ctx.rename_from else {
            return;
        };
        let path = cu.source_path.replace('\\', "/");
        let to_dir = to.replace('.', "/");
        let from_dir = if to_dir.is_empty() {
            format!("{}/", from.replace('.', "/"))
        } else {
            from.replace('.', "/")
        };
        let moved = path.replacen(&from_dir, &to_dir, 1);
        if moved != cu.source_path {
            debug!(from = %cu.source_path, to = %moved, "moving source file");
            cu.source_path = moved;
            self.changed = true;
        }
    }

    fn is_target(&self, class: &ClassType) -> bool {
        (class.package == self.rule.old_package && !class.name.is_empty())
            || self.rule.is_target_recursive_package(&class.package)
    }

    fn moved_class(&self, class: &ClassType) -> JavaType {
        let package = self.rule.new_package_name(&class.package);
        JavaType::build(&join_fqn(&package, &class.name))
    }

    /// Compute the replacement for `old`, memoized on the printed type
    /// identity. Unknown and untargeted plain types pass through as-is.
    fn update_type(&mut self, old: &JavaType) -> JavaType {
        if old.is_unknown() {
            return old.clone();
        }
        let key = old.to_string();
        if let Some(hit) = self.memo.get(&key) {
            return hit.clone();
        }
        let updated = match old {
            JavaType::Class(class) => {
                if !self.is_target(class) {
                    return old.clone();
                }
                self.moved_class(class)
            }
            JavaType::Parameterized(pt) => {
                let args = pt
                    .args
                    .iter()
                    .map(|arg| match arg {
                        JavaType::Class(c) if self.is_target(c) => self.moved_class(c),
                        other => other.clone(),
                    })
                    .collect();
                let base = match pt.base.as_class() {
                    Some(c) if self.is_target(c) => Box::new(self.update_type(&pt.base)),
                    _ => pt.base.clone(),
                };
                JavaType::Parameterized(ParameterizedType { base, args })
            }
            JavaType::Generic(generic) => {
                let bounds = generic
                    .bounds
                    .iter()
                    .map(|bound| match bound {
                        JavaType::Class(c) if self.is_target(c) => self.update_type(bound),
                        other => other.clone(),
                    })
                    .collect();
                JavaType::Generic(GenericType {
                    name: generic.name.clone(),
                    bounds,
                })
            }
            JavaType::Variable(variable) => JavaType::Variable(VariableType {
                name: variable.name.clone(),
                ty: Box::new(self.update_type(&variable.ty)),
            }),
            JavaType::Array(elem) => JavaType::Array(Box::new(self.update_type(elem))),
            JavaType::Method(method) => JavaType::Method(Box::new(MethodType {
                declaring: self.update_type(&method.declaring),
                name: method.name.clone(),
                return_type: self.update_type(&method.return_type),
                parameter_types: method
                    .parameter_types
                    .iter()
                    .map(|p| self.update_type(p))
                    .collect(),
            })),
            JavaType::Unknown | JavaType::Primitive(_) => return old.clone(),
        };
        self.memo.insert(key, updated.clone());
        updated
    }

    /// Rewrite a flattenable name chain: the node spelling exactly the old
    /// package is replaced with a fresh chain for the new package, unless
    /// the chain directly enclosing it already spells the new package
    /// (which would mean the name was rewritten on an earlier run). Owns
    /// the whole chain so the enclosing-name guard sees every level.
    fn rewrite_name_chain(&mut self, expr: &mut Expression, enclosing: Option<&str>) {
        let Some(spelled) = expr.flatten_dotted() else {
            return;
        };
        if matches!(expr, Expression::FieldAccess(_))
            && spelled == self.rule.old_package
            && enclosing != Some(self.rule.new_package.as_str())
            && !self.rule.new_package.is_empty()
        {
            let prefix = expr.prefix().to_string();
            let to = self.rule.new_package.clone();
            *expr = build_fq_expression(&to, prefix, JavaType::build(&to));
            self.changed = true;
            return;
        }
        match expr {
            Expression::FieldAccess(access) => {
                self.rewrite_name_chain(&mut access.target, Some(&spelled));
                access.ty = self.update_type(&access.ty);
            }
            Expression::Ident(ident) => {
                ident.ty = self.update_type(&ident.ty);
            }
            _ => {}
        }
    }
}

impl JavaVisitorMut for RenameVisitor<'_> {
    fn visit_import(&mut self, import: &mut Import) {
        if let Some(prefix) = self.ctx.pending_prefix.take() {
            import.prefix = prefix;
        }
        let package = import.package_name();
        if self.rule.targets_package(&package) && !self.rule.new_package.is_empty() {
            let to = self.rule.new_package_name(&package);
            import.set_dotted(&join_fqn(&to, &import.tail()));
            self.changed = true;
        }
    }

    fn visit_class_decl(&mut self, class: &mut ClassDecl) {
        if let Some(prefix) = self.ctx.pending_prefix.take() {
            class.prefix = prefix;
        }
        visitor::walk_class_decl(self, class);
    }

    fn visit_expression(&mut self, expr: &mut Expression) {
        if matches!(expr, Expression::FieldAccess(_)) && expr.flatten_dotted().is_some() {
            self.rewrite_name_chain(expr, None);
            return;
        }
        visitor::walk_expression(self, expr);
    }

    fn visit_type_tree(&mut self, tree: &mut TypeTree) {
        visitor::walk_type_tree(self, tree);
        if tree.base_is_qualified() {
            let dotted = tree.dotted_base();
            if self.rule.targets_class(&dotted) {
                let class = ClassType::from_fqn(&dotted);
                let package = self.rule.new_package_name(&class.package);
                tree.set_base(&join_fqn(&package, &class.name));
                self.changed = true;
            }
        }
    }

    fn visit_type(&mut self, ty: &mut JavaType) {
        let updated = self.update_type(ty);
        if updated != *ty {
            *ty = updated;
            self.changed = true;
        }
    }
}

//! Mutable AST traversal. Implement `JavaVisitorMut` and override only
//! the hooks you need; call the corresponding `walk_*` function inside an
//! override to keep the default recursion. Walk functions visit children
//! before a node's own type metadata, so type rewriting is post-order:
//! nested type references are final before the node containing them is.

use crate::ast::expression::{Expression, FieldAccess, MethodCall, NewClass};
use crate::ast::statement::{ClassDecl, MethodDecl, Statement, TypeParams, VariableDecl};
use crate::ast::types::JavaType;
use crate::ast::{CompilationUnit, Import, PackageDecl, TypeTree};

pub trait JavaVisitorMut: Sized {
    fn visit_compilation_unit(&mut self, cu: &mut CompilationUnit) {
        walk_compilation_unit(self, cu);
    }

    fn visit_package(&mut self, _package: &mut PackageDecl) {}

    fn visit_import(&mut self, _import: &mut Import) {}

    fn visit_class_decl(&mut self, class: &mut ClassDecl) {
        walk_class_decl(self, class);
    }

    fn visit_method_decl(&mut self, method: &mut MethodDecl) {
        walk_method_decl(self, method);
    }

    fn visit_variable_decl(&mut self, variable: &mut VariableDecl) {
        walk_variable_decl(self, variable);
    }

    fn visit_statement(&mut self, statement: &mut Statement) {
        walk_statement(self, statement);
    }

    fn visit_expression(&mut self, expr: &mut Expression) {
        walk_expression(self, expr);
    }

    fn visit_field_access(&mut self, access: &mut FieldAccess) {
        walk_field_access(self, access);
    }

    fn visit_method_call(&mut self, call: &mut MethodCall) {
        walk_method_call(self, call);
    }

    fn visit_new_class(&mut self, new: &mut NewClass) {
        walk_new_class(self, new);
    }

    fn visit_type_tree(&mut self, tree: &mut TypeTree) {
        walk_type_tree(self, tree);
    }

    /// Hook for every type metadata slot in the tree.
    fn visit_type(&mut self, _ty: &mut JavaType) {}
}

pub fn walk_compilation_unit<V: JavaVisitorMut>(visitor: &mut V, cu: &mut CompilationUnit) {
    if let Some(package) = &mut cu.package {
        visitor.visit_package(package);
    }
    for import in &mut cu.imports {
        visitor.visit_import(import);
    }
    for class in &mut cu.classes {
        visitor.visit_class_decl(class);
    }
}

fn walk_type_params<V: JavaVisitorMut>(visitor: &mut V, type_params: &mut TypeParams) {
    for (_, param) in &mut type_params.params {
        for bound in &mut param.bounds {
            visitor.visit_type_tree(&mut bound.tree);
        }
    }
}

pub fn walk_class_decl<V: JavaVisitorMut>(visitor: &mut V, class: &mut ClassDecl) {
    if let Some(type_params) = &mut class.type_params {
        walk_type_params(visitor, type_params);
    }
    for heritage in &mut class.heritages {
        for (_, tree) in &mut heritage.types {
            visitor.visit_type_tree(tree);
        }
    }
    for member in &mut class.body.members {
        match member {
            crate::ast::statement::ClassMember::Field(field) => visitor.visit_variable_decl(field),
            crate::ast::statement::ClassMember::Method(method) => visitor.visit_method_decl(method),
            crate::ast::statement::ClassMember::Class(inner) => visitor.visit_class_decl(inner),
            crate::ast::statement::ClassMember::Raw(_) => {}
        }
    }
    visitor.visit_type(&mut class.ty);
}

pub fn walk_method_decl<V: JavaVisitorMut>(visitor: &mut V, method: &mut MethodDecl) {
    if let Some(type_params) = &mut method.type_params {
        walk_type_params(visitor, type_params);
    }
    if let Some(return_type) = &mut method.return_type {
        visitor.visit_type_tree(return_type);
    }
    for (_, param) in &mut method.params {
        visitor.visit_type_tree(&mut param.type_tree);
        visitor.visit_type(&mut param.ty);
    }
    if let Some(throws) = &mut method.throws {
        for (_, tree) in &mut throws.types {
            visitor.visit_type_tree(tree);
        }
    }
    if let Some(body) = &mut method.body {
        for statement in &mut body.statements {
            visitor.visit_statement(statement);
        }
    }
    visitor.visit_type(&mut method.method_type);
}

pub fn walk_variable_decl<V: JavaVisitorMut>(visitor: &mut V, variable: &mut VariableDecl) {
    visitor.visit_type_tree(&mut variable.type_tree);
    if let Some(init) = &mut variable.init {
        visitor.visit_expression(&mut init.value);
    }
    visitor.visit_type(&mut variable.ty);
}

pub fn walk_statement<V: JavaVisitorMut>(visitor: &mut V, statement: &mut Statement) {
    match statement {
        Statement::LocalVar(variable) => visitor.visit_variable_decl(variable),
        Statement::Expr(es) => visitor.visit_expression(&mut es.expr),
        Statement::Return(ret) => {
            if let Some(expr) = &mut ret.expr {
                visitor.visit_expression(expr);
            }
        }
        Statement::Raw(_) => {}
    }
}

pub fn walk_expression<V: JavaVisitorMut>(visitor: &mut V, expr: &mut Expression) {
    match expr {
        Expression::Ident(identifier) => visitor.visit_type(&mut identifier.ty),
        Expression::FieldAccess(access) => visitor.visit_field_access(access),
        Expression::MethodCall(call) => visitor.visit_method_call(call),
        Expression::New(new) => visitor.visit_new_class(new),
        Expression::Literal(_) | Expression::Raw(_) => {}
    }
}

pub fn walk_field_access<V: JavaVisitorMut>(visitor: &mut V, access: &mut FieldAccess) {
    visitor.visit_expression(&mut access.target);
    visitor.visit_type(&mut access.ty);
}

pub fn walk_method_call<V: JavaVisitorMut>(visitor: &mut V, call: &mut MethodCall) {
    if let Some(select) = &mut call.select {
        visitor.visit_expression(select);
    }
    for (_, arg) in &mut call.args {
        visitor.visit_expression(arg);
    }
    visitor.visit_type(&mut call.method_type);
}

pub fn walk_new_class<V: JavaVisitorMut>(visitor: &mut V, new: &mut NewClass) {
    visitor.visit_type_tree(&mut new.class);
    for (_, arg) in &mut new.args {
        visitor.visit_expression(arg);
    }
    visitor.visit_type(&mut new.constructor_type);
}

pub fn walk_type_tree<V: JavaVisitorMut>(visitor: &mut V, tree: &mut TypeTree) {
    if let Some(args) = &mut tree.type_args {
        for (_, arg) in &mut args.args {
            visitor.visit_type_tree(arg);
        }
    }
    visitor.visit_type(&mut tree.ty);
}

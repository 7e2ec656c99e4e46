//! Read-only type-usage search: does a compilation unit reference any
//! type whose fully-qualified name matches a pattern? Used as a cheap
//! pre-filter before a rewrite pass runs.

use crate::ast::expression::Expression;
use crate::ast::statement::{ClassDecl, ClassMember, MethodDecl, Statement, VariableDecl};
use crate::ast::CompilationUnit;
use regex::Regex;

pub struct UsesType {
    pattern: Regex,
}

impl UsesType {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn matches(&self, cu: &CompilationUnit) -> bool {
        collect_type_names(cu)
            .iter()
            .any(|name| self.pattern.is_match(name))
    }
}

/// Every fully-qualified name reachable from the file: import targets
/// plus all attributed type metadata, generics and arrays included.
pub fn collect_type_names(cu: &CompilationUnit) -> Vec<String> {
    let mut names = Vec::new();
    for import in &cu.imports {
        names.push(import.dotted());
    }
    for class in &cu.classes {
        collect_class(class, &mut names);
    }
    names
}

fn collect_class(class: &ClassDecl, names: &mut Vec<String>) {
    class.ty.collect_fqns(names);
    if let Some(type_params) = &class.type_params {
        for (_, param) in &type_params.params {
            for bound in &param.bounds {
                bound.tree.ty.collect_fqns(names);
            }
        }
    }
    for heritage in &class.heritages {
        for (_, tree) in &heritage.types {
            tree.ty.collect_fqns(names);
        }
    }
    for member in &class.body.members {
        match member {
            ClassMember::Field(field) => collect_variable(field, names),
            ClassMember::Method(method) => collect_method(method, names),
            ClassMember::Class(inner) => collect_class(inner, names),
            ClassMember::Raw(_) => {}
        }
    }
}

fn collect_variable(variable: &VariableDecl, names: &mut Vec<String>) {
    variable.ty.collect_fqns(names);
    if let Some(init) = &variable.init {
        collect_expression(&init.value, names);
    }
}

fn collect_method(method: &MethodDecl, names: &mut Vec<String>) {
    method.method_type.collect_fqns(names);
    if let Some(type_params) = &method.type_params {
        for (_, param) in &type_params.params {
            for bound in &param.bounds {
                bound.tree.ty.collect_fqns(names);
            }
        }
    }
    if let Some(throws) = &method.throws {
        for (_, tree) in &throws.types {
            tree.ty.collect_fqns(names);
        }
    }
    if let Some(body) = &method.body {
        for statement in &body.statements {
            collect_statement(statement, names);
        }
    }
}

fn collect_statement(statement: &Statement, names: &mut Vec<String>) {
    match statement {
        Statement::LocalVar(variable) => collect_variable(variable, names),
        Statement::Expr(es) => collect_expression(&es.expr, names),
        Statement::Return(ret) => {
            if let Some(expr) = &ret.expr {
                collect_expression(expr, names);
            }
        }
        Statement::Raw(_) => {}
    }
}

fn collect_expression(expr: &Expression, names: &mut Vec<String>) {
    match expr {
        Expression::Ident(identifier) => identifier.ty.collect_fqns(names),
        Expression::FieldAccess(access) => {
            access.ty.collect_fqns(names);
            collect_expression(&access.target, names);
        }
        Expression::MethodCall(call) => {
            call.method_type.collect_fqns(names);
            if let Some(select) = &call.select {
                collect_expression(select, names);
            }
            for (_, arg) in &call.args {
                collect_expression(arg, names);
            }
        }
        Expression::New(new) => {
            new.constructor_type.collect_fqns(names);
            for (_, arg) in &new.args {
                collect_expression(arg, names);
            }
        }
        Expression::Literal(_) | Expression::Raw(_) => {}
    }
}

//! Source reconstruction. Every node stores the trivia that preceded its
//! tokens, so printing an untouched tree reproduces the original file
//! byte for byte.

use crate::ast::expression::Expression;
use crate::ast::statement::{
    Block, ClassDecl, ClassMember, HeritageClause, MethodDecl, Parameter, Statement, TypeParams,
    VariableDecl,
};
use crate::ast::{CompilationUnit, TypeTree};

pub fn print(cu: &CompilationUnit) -> String {
    let mut out = String::new();
    if let Some(package) = &cu.package {
        out.push_str(&package.prefix);
        out.push_str("package");
        out.push_str(&package.name);
        out.push_str(&package.semi_prefix);
        out.push(';');
    }
    for import in &cu.imports {
        out.push_str(&import.prefix);
        out.push_str("import");
        if let Some(static_kw) = &import.static_kw {
            out.push_str(static_kw);
        }
        out.push_str(&import.name);
        out.push_str(&import.semi_prefix);
        out.push(';');
    }
    for class in &cu.classes {
        print_class(&mut out, class);
    }
    out.push_str(&cu.eof);
    out
}

fn print_class(out: &mut String, class: &ClassDecl) {
    out.push_str(&class.prefix);
    out.push_str(&class.modifiers);
    out.push_str(&class.keyword);
    out.push_str(&class.name.prefix);
    out.push_str(&class.name.name);
    if let Some(tp) = &class.type_params {
        print_type_params(out, tp);
    }
    for heritage in &class.heritages {
        print_heritage(out, heritage);
    }
    out.push_str(&class.body.lbrace_prefix);
    out.push('{');
    for member in &class.body.members {
        match member {
            ClassMember::Field(field) => print_variable(out, field),
            ClassMember::Method(method) => print_method(out, method),
            ClassMember::Class(inner) => print_class(out, inner),
            ClassMember::Raw(text) => out.push_str(text),
        }
    }
    out.push_str(&class.body.rbrace_prefix);
    out.push('}');
}

fn print_type_params(out: &mut String, tp: &TypeParams) {
    out.push_str(&tp.lt_prefix);
    out.push('<');
    for (sep, param) in &tp.params {
        out.push_str(sep);
        out.push_str(&param.name.prefix);
        out.push_str(&param.name.name);
        if let Some(extends_prefix) = &param.extends_prefix {
            out.push_str(extends_prefix);
            out.push_str("extends");
            for bound in &param.bounds {
                out.push_str(&bound.sep);
                print_type_tree(out, &bound.tree);
            }
        }
    }
    out.push_str(&tp.gt_prefix);
    out.push('>');
}

fn print_heritage(out: &mut String, heritage: &HeritageClause) {
    out.push_str(&heritage.keyword);
    for (sep, tree) in &heritage.types {
        out.push_str(sep);
        print_type_tree(out, tree);
    }
}

fn print_variable(out: &mut String, variable: &VariableDecl) {
    out.push_str(&variable.modifiers);
    print_type_tree(out, &variable.type_tree);
    out.push_str(&variable.name.prefix);
    out.push_str(&variable.name.name);
    if let Some(init) = &variable.init {
        out.push_str(&init.eq);
        print_expression(out, &init.value);
    }
    out.push_str(&variable.semi_prefix);
    out.push(';');
}

fn print_method(out: &mut String, method: &MethodDecl) {
    out.push_str(&method.modifiers);
    if let Some(tp) = &method.type_params {
        print_type_params(out, tp);
    }
    if let Some(return_type) = &method.return_type {
        print_type_tree(out, return_type);
    }
    out.push_str(&method.name.prefix);
    out.push_str(&method.name.name);
    out.push_str(&method.lparen_prefix);
    out.push('(');
    for (sep, param) in &method.params {
        out.push_str(sep);
        print_parameter(out, param);
    }
    out.push_str(&method.rparen_prefix);
    out.push(')');
    if let Some(throws) = &method.throws {
        print_heritage(out, throws);
    }
    match &method.body {
        Some(body) => print_block(out, body),
        None => {
            out.push_str(&method.semi_prefix);
            out.push(';');
        }
    }
}

fn print_parameter(out: &mut String, param: &Parameter) {
    out.push_str(&param.modifiers);
    print_type_tree(out, &param.type_tree);
    out.push_str(&param.name.prefix);
    out.push_str(&param.name.name);
}

fn print_block(out: &mut String, block: &Block) {
    out.push_str(&block.lbrace_prefix);
    out.push('{');
    for statement in &block.statements {
        print_statement(out, statement);
    }
    out.push_str(&block.rbrace_prefix);
    out.push('}');
}

fn print_statement(out: &mut String, statement: &Statement) {
    match statement {
        Statement::LocalVar(var) => print_variable(out, var),
        Statement::Expr(es) => {
            print_expression(out, &es.expr);
            out.push_str(&es.semi_prefix);
            out.push(';');
        }
        Statement::Return(ret) => {
            out.push_str(&ret.prefix);
            out.push_str("return");
            if let Some(expr) = &ret.expr {
                print_expression(out, expr);
            }
            out.push_str(&ret.semi_prefix);
            out.push(';');
        }
        Statement::Raw(text) => out.push_str(text),
    }
}

pub fn print_type_tree(out: &mut String, tree: &TypeTree) {
    out.push_str(&tree.prefix);
    out.push_str(&tree.base);
    if let Some(args) = &tree.type_args {
        out.push('<');
        for (sep, arg) in &args.args {
            out.push_str(sep);
            print_type_tree(out, arg);
        }
        out.push_str(&args.gt_prefix);
        out.push('>');
    }
    out.push_str(&tree.array_suffix);
}

pub fn print_expression(out: &mut String, expr: &Expression) {
    match expr {
        Expression::Ident(i) => {
            out.push_str(&i.prefix);
            out.push_str(&i.name);
        }
        Expression::FieldAccess(f) => {
            print_expression(out, &f.target);
            out.push_str(&f.dot);
            out.push_str(&f.name.prefix);
            out.push_str(&f.name.name);
        }
        Expression::MethodCall(m) => {
            if let Some(select) = &m.select {
                print_expression(out, select);
            }
            out.push_str(&m.dot);
            out.push_str(&m.name.prefix);
            out.push_str(&m.name.name);
            out.push_str(&m.lparen_prefix);
            out.push('(');
            for (sep, arg) in &m.args {
                out.push_str(sep);
                print_expression(out, arg);
            }
            out.push_str(&m.rparen_prefix);
            out.push(')');
        }
        Expression::New(n) => {
            out.push_str(&n.prefix);
            out.push_str("new");
            print_type_tree(out, &n.class);
            out.push_str(&n.lparen_prefix);
            out.push('(');
            for (sep, arg) in &n.args {
                out.push_str(sep);
                print_expression(out, arg);
            }
            out.push_str(&n.rparen_prefix);
            out.push(')');
        }
        Expression::Literal(l) => {
            out.push_str(&l.prefix);
            out.push_str(&l.text);
        }
        Expression::Raw(text) => out.push_str(text),
    }
}

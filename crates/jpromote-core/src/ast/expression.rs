use super::types::JavaType;
use super::{Ident, TypeTree};

/// Expressions the migration cares about: qualified name chains, method
/// invocations, and constructor calls. Anything else is captured verbatim
/// as `Raw` and passes through the rewrite untouched.
#[derive(Debug, Clone)]
pub enum Expression {
    Ident(Identifier),
    FieldAccess(Box<FieldAccess>),
    MethodCall(Box<MethodCall>),
    New(Box<NewClass>),
    Literal(Literal),
    /// Verbatim source text, leading trivia included.
    Raw(String),
}

#[derive(Debug, Clone)]
pub struct Identifier {
    pub prefix: String,
    pub name: String,
    pub ty: JavaType,
}

#[derive(Debug, Clone)]
pub struct FieldAccess {
    pub target: Expression,
    /// Raw `.` piece, trivia included.
    pub dot: String,
    pub name: Ident,
    pub ty: JavaType,
}

#[derive(Debug, Clone)]
pub struct MethodCall {
    pub select: Option<Expression>,
    /// Raw `.` piece between select and name; empty without a select.
    pub dot: String,
    pub name: Ident,
    pub lparen_prefix: String,
    /// Arguments, each preceded by its raw comma piece (empty for the
    /// first).
    pub args: Vec<(String, Expression)>,
    pub rparen_prefix: String,
    pub method_type: JavaType,
}

#[derive(Debug, Clone)]
pub struct NewClass {
    pub prefix: String,
    pub class: TypeTree,
    pub lparen_prefix: String,
    pub args: Vec<(String, Expression)>,
    pub rparen_prefix: String,
    pub constructor_type: JavaType,
}

#[derive(Debug, Clone)]
pub struct Literal {
    pub prefix: String,
    pub text: String,
}

impl Expression {
    /// Leading trivia of the expression's first token. `Raw` text carries
    /// its trivia inline and reports none here.
    pub fn prefix(&self) -> &str {
        match self {
            Expression::Ident(i) => &i.prefix,
            Expression::FieldAccess(f) => f.target.prefix(),
            Expression::MethodCall(m) => match &m.select {
                Some(select) => select.prefix(),
                None => &m.name.prefix,
            },
            Expression::New(n) => &n.prefix,
            Expression::Literal(l) => &l.prefix,
            Expression::Raw(_) => "",
        }
    }

    pub fn set_prefix(&mut self, prefix: String) {
        match self {
            Expression::Ident(i) => i.prefix = prefix,
            Expression::FieldAccess(f) => f.target.set_prefix(prefix),
            Expression::MethodCall(m) => match &mut m.select {
                Some(select) => select.set_prefix(prefix),
                None => m.name.prefix = prefix,
            },
            Expression::New(n) => n.prefix = prefix,
            Expression::Literal(l) => l.prefix = prefix,
            Expression::Raw(_) => {}
        }
    }

    /// Flatten an identifier / field-access chain into its dotted form,
    /// or `None` if any link is not a plain name.
    pub fn flatten_dotted(&self) -> Option<String> {
        match self {
            Expression::Ident(i) => Some(i.name.clone()),
            Expression::FieldAccess(f) => {
                let target = f.target.flatten_dotted()?;
                Some(format!("{}.{}", target, f.name.name))
            }
            _ => None,
        }
    }
}

/// Build a fresh identifier / field-access chain spelling out `fqn`, with
/// `prefix` on the leading token and `ty` on the outermost node.
pub fn build_fq_expression(fqn: &str, prefix: String, ty: JavaType) -> Expression {
    let mut segments = fqn.split('.');
    let first = segments.next().unwrap_or_default();
    let mut expr = Expression::Ident(Identifier {
        prefix,
        name: first.to_string(),
        ty: JavaType::Unknown,
    });
    for segment in segments {
        expr = Expression::FieldAccess(Box::new(FieldAccess {
            target: expr,
            dot: ".".to_string(),
            name: Ident::new("", segment),
            ty: JavaType::Unknown,
        }));
    }
    if let Expression::FieldAccess(f) = &mut expr {
        f.ty = ty;
    } else if let Expression::Ident(i) = &mut expr {
        i.ty = ty;
    }
    expr
}

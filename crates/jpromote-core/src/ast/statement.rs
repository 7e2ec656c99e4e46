use super::expression::Expression;
use super::types::JavaType;
use super::{Ident, TypeTree};

/// A class, interface, or enum declaration.
#[derive(Debug, Clone)]
pub struct ClassDecl {
    /// Trivia before the declaration's first token. Kept separate so the
    /// package-removal path can hand a deleted package's trivia to the
    /// first remaining declaration.
    pub prefix: String,
    /// Raw annotations and modifiers; empty when absent.
    pub modifiers: String,
    /// Raw `class` / `interface` / `enum` keyword, trivia included unless
    /// it is the declaration's first token.
    pub keyword: String,
    pub name: Ident,
    pub type_params: Option<TypeParams>,
    pub heritages: Vec<HeritageClause>,
    pub body: ClassBody,
    pub ty: JavaType,
}

/// `<T extends Foo & Bar, U>` on a class or method.
#[derive(Debug, Clone)]
pub struct TypeParams {
    pub lt_prefix: String,
    /// Each parameter preceded by its raw comma piece (empty for the
    /// first).
    pub params: Vec<(String, TypeParameter)>,
    pub gt_prefix: String,
}

#[derive(Debug, Clone)]
pub struct TypeParameter {
    pub name: Ident,
    /// Trivia before `extends`; `None` when unbounded.
    pub extends_prefix: Option<String>,
    pub bounds: Vec<TypeBound>,
}

#[derive(Debug, Clone)]
pub struct TypeBound {
    /// Raw `&` piece before this bound; empty for the first.
    pub sep: String,
    pub tree: TypeTree,
}

/// An `extends`, `implements`, or `throws` clause.
#[derive(Debug, Clone)]
pub struct HeritageClause {
    /// Raw keyword, trivia included.
    pub keyword: String,
    /// Each type preceded by its raw comma piece (empty for the first).
    pub types: Vec<(String, TypeTree)>,
}

#[derive(Debug, Clone)]
pub struct ClassBody {
    pub lbrace_prefix: String,
    pub members: Vec<ClassMember>,
    pub rbrace_prefix: String,
}

#[derive(Debug, Clone)]
pub enum ClassMember {
    Field(VariableDecl),
    Method(MethodDecl),
    Class(ClassDecl),
    /// Verbatim member text (stray semicolons, constructs outside the
    /// supported subset).
    Raw(String),
}

/// A field or local-variable declaration. `ty` is the variable-typed
/// metadata slot: a named binding of the declared type.
#[derive(Debug, Clone)]
pub struct VariableDecl {
    /// Raw annotations and modifiers, leading trivia included; empty when
    /// absent (the type tree then carries the leading trivia).
    pub modifiers: String,
    pub type_tree: TypeTree,
    pub name: Ident,
    pub init: Option<Initializer>,
    pub semi_prefix: String,
    pub ty: JavaType,
}

#[derive(Debug, Clone)]
pub struct Initializer {
    /// Raw `=` piece, trivia included.
    pub eq: String,
    pub value: Expression,
}

/// A method or constructor declaration. Constructors have no return type
/// tree; their method type returns the declaring class.
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub modifiers: String,
    pub type_params: Option<TypeParams>,
    pub return_type: Option<TypeTree>,
    pub name: Ident,
    pub lparen_prefix: String,
    pub params: Vec<(String, Parameter)>,
    pub rparen_prefix: String,
    pub throws: Option<HeritageClause>,
    pub body: Option<Block>,
    /// Trivia before the terminating `;` of a body-less declaration.
    pub semi_prefix: String,
    pub method_type: JavaType,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub modifiers: String,
    pub type_tree: TypeTree,
    pub name: Ident,
    pub ty: JavaType,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub lbrace_prefix: String,
    pub statements: Vec<Statement>,
    pub rbrace_prefix: String,
}

#[derive(Debug, Clone)]
pub enum Statement {
    LocalVar(VariableDecl),
    Expr(ExprStatement),
    Return(ReturnStatement),
    /// Verbatim statement text, trivia and terminator included.
    Raw(String),
}

#[derive(Debug, Clone)]
pub struct ExprStatement {
    pub expr: Expression,
    pub semi_prefix: String,
}

#[derive(Debug, Clone)]
pub struct ReturnStatement {
    pub prefix: String,
    pub expr: Option<Expression>,
    pub semi_prefix: String,
}

#[cfg(test)]
mod tests;

use crate::ast::expression::{
    Expression, FieldAccess, Identifier, Literal, MethodCall, NewClass,
};
use crate::ast::statement::{
    Block, ClassBody, ClassDecl, ClassMember, ExprStatement, HeritageClause, Initializer,
    MethodDecl, Parameter, ReturnStatement, Statement, TypeBound, TypeParameter, TypeParams,
    VariableDecl,
};
use crate::ast::types::{ClassType, GenericType, JavaType, MethodType, VariableType};
use crate::ast::{strip_whitespace, CompilationUnit, Ident, Import, PackageDecl, TypeArgs, TypeTree};
use crate::lexer::{Lexer, Token, TokenKind};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone)]
pub struct ParserError {
    pub message: String,
    pub line: u32,
}

impl std::fmt::Display for ParserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at line {}", self.message, self.line)
    }
}

impl std::error::Error for ParserError {}

const MODIFIERS: &[&str] = &[
    "public",
    "private",
    "protected",
    "static",
    "final",
    "abstract",
    "native",
    "synchronized",
    "transient",
    "volatile",
    "strictfp",
    "default",
    "sealed",
];

const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "short", "int", "long", "char", "float", "double", "void",
];

fn is_modifier(text: &str) -> bool {
    MODIFIERS.contains(&text)
}

fn is_primitive(text: &str) -> bool {
    PRIMITIVES.contains(&text)
}

/// What terminates a raw capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    /// A `;` at bracket depth zero (left unconsumed).
    Semi,
    /// A `,` or `)` at bracket depth zero (left unconsumed).
    ArgEnd,
}

/// Parse a source string into a compilation unit with an empty storage
/// path.
pub fn parse_source(source: &str) -> Result<CompilationUnit, ParserError> {
    Parser::new(Lexer::new(source).tokenize()).parse()
}

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    /// Package of the file being parsed, for attributing its own classes.
    package: String,
    /// Simple name to package, built from the import list and the file's
    /// own declarations.
    imports: FxHashMap<String, String>,
    /// Type-parameter names currently in scope.
    generics: Vec<String>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            position: 0,
            package: String::new(),
            imports: FxHashMap::default(),
            generics: Vec::new(),
        }
    }

    pub fn parse(mut self) -> Result<CompilationUnit, ParserError> {
        let mut package = None;
        if self.current().is_ident("package") {
            let decl = self.parse_package()?;
            self.package = decl.dotted_name();
            package = Some(decl);
        }

        let mut imports = Vec::new();
        while self.current().is_ident("import") {
            let import = self.parse_import()?;
            if !import.is_static() && import.type_name() != "*" {
                self.imports
                    .insert(import.type_name(), import.package_name());
            }
            imports.push(import);
        }

        let mut classes = Vec::new();
        while !self.is_at_end() {
            let mod_tokens = self.collect_modifier_tokens();
            classes.push(self.parse_class_decl(mod_tokens)?);
        }

        let eof = self.current().prefix.clone();
        Ok(CompilationUnit {
            source_path: String::new(),
            package,
            imports,
            classes,
            eof,
        })
    }

    // Token stream management

    fn current(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or_else(|| {
            self.tokens
                .last()
                .expect("token stream always ends with Eof")
        })
    }

    fn peek(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.position + offset)
    }

    fn peek_is_ident(&self, offset: usize) -> bool {
        self.peek(offset)
            .map(|t| t.kind == TokenKind::Ident)
            .unwrap_or(false)
    }

    fn peek_is_punct(&self, offset: usize, ch: char) -> bool {
        self.peek(offset).map(|t| t.is_punct(ch)).unwrap_or(false)
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current().kind, TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.is_at_end() {
            self.position += 1;
        }
        token
    }

    fn expect_punct(&mut self, ch: char, context: &str) -> Result<Token, ParserError> {
        if self.current().is_punct(ch) {
            return Ok(self.advance());
        }
        Err(self.error(format!("expected '{ch}' {context}")))
    }

    fn expect_ident(&mut self, context: &str) -> Result<Token, ParserError> {
        if self.current().kind == TokenKind::Ident {
            return Ok(self.advance());
        }
        Err(self.error(format!("expected identifier {context}")))
    }

    fn error(&self, message: String) -> ParserError {
        ParserError {
            message,
            line: self.current().line,
        }
    }

    // Declarations

    fn parse_package(&mut self) -> Result<PackageDecl, ParserError> {
        let kw = self.advance();
        let mut name = String::new();
        while !self.current().is_punct(';') && !self.is_at_end() {
            name.push_str(&self.advance().raw());
        }
        let semi = self.expect_punct(';', "after package name")?;
        Ok(PackageDecl {
            prefix: kw.prefix,
            name,
            semi_prefix: semi.prefix,
        })
    }

    fn parse_import(&mut self) -> Result<Import, ParserError> {
        let kw = self.advance();
        let static_kw = if self.current().is_ident("static") {
            Some(self.advance().raw())
        } else {
            None
        };
        let mut name = String::new();
        while !self.current().is_punct(';') && !self.is_at_end() {
            name.push_str(&self.advance().raw());
        }
        let semi = self.expect_punct(';', "after import")?;
        Ok(Import {
            prefix: kw.prefix,
            static_kw,
            name,
            semi_prefix: semi.prefix,
        })
    }

    /// Annotations and modifier keywords before a declaration, verbatim.
    fn collect_modifier_tokens(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            if self.current().kind == TokenKind::Ident && is_modifier(&self.current().text) {
                tokens.push(self.advance());
            } else if self.current().is_punct('@')
                && self.peek_is_ident(1)
                && !self.peek(1).map(|t| t.is_ident("interface")).unwrap_or(false)
            {
                tokens.push(self.advance());
                tokens.push(self.advance());
                while self.current().is_punct('.') && self.peek_is_ident(1) {
                    tokens.push(self.advance());
                    tokens.push(self.advance());
                }
                if self.current().is_punct('(') {
                    self.capture_balanced(&mut tokens);
                }
            } else {
                break;
            }
        }
        tokens
    }

    /// Consume a balanced `(...)`, `[...]`, or `{...}` run into `tokens`.
    fn capture_balanced(&mut self, tokens: &mut Vec<Token>) {
        let mut depth = 0usize;
        loop {
            if self.is_at_end() {
                return;
            }
            let token = self.advance();
            match token.text.as_str() {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => depth = depth.saturating_sub(1),
                _ => {}
            }
            tokens.push(token);
            if depth == 0 {
                return;
            }
        }
    }

    fn parse_class_decl(&mut self, mod_tokens: Vec<Token>) -> Result<ClassDecl, ParserError> {
        let kw_token = self.current().clone();
        if !(kw_token.is_ident("class") || kw_token.is_ident("interface") || kw_token.is_ident("enum"))
        {
            return Err(self.error("expected class, interface, or enum".to_string()));
        }
        self.advance();

        let (prefix, modifiers, keyword) = match mod_tokens.first() {
            Some(first) => {
                let mut modifiers = first.text.clone();
                for token in &mod_tokens[1..] {
                    modifiers.push_str(&token.raw());
                }
                (first.prefix.clone(), modifiers, kw_token.raw())
            }
            None => (kw_token.prefix.clone(), String::new(), kw_token.text.clone()),
        };

        let name_token = self.expect_ident("after class keyword")?;
        let name = Ident::new(name_token.prefix.clone(), name_token.text.clone());
        let ty = JavaType::Class(ClassType::new(self.package.clone(), name.name.clone()));
        self.imports
            .insert(name.name.clone(), self.package.clone());

        let generics_mark = self.generics.len();
        let type_params = if self.current().is_punct('<') {
            let tp = self.parse_type_params()?;
            self.register_type_params(&tp);
            Some(tp)
        } else {
            None
        };

        let mut heritages = Vec::new();
        while self.current().is_ident("extends") || self.current().is_ident("implements") {
            let kw = self.advance();
            let types = self.parse_type_list()?;
            heritages.push(HeritageClause {
                keyword: kw.raw(),
                types,
            });
        }

        let body = self.parse_class_body(&ty)?;
        self.generics.truncate(generics_mark);

        Ok(ClassDecl {
            prefix,
            modifiers,
            keyword,
            name,
            type_params,
            heritages,
            body,
            ty,
        })
    }

    fn parse_type_list(&mut self) -> Result<Vec<(String, TypeTree)>, ParserError> {
        let mut types = Vec::new();
        let mut sep = String::new();
        loop {
            let tree = self.parse_type_tree()?;
            types.push((std::mem::take(&mut sep), tree));
            if self.current().is_punct(',') {
                sep = self.advance().raw();
            } else {
                return Ok(types);
            }
        }
    }

    fn parse_class_body(&mut self, class_ty: &JavaType) -> Result<ClassBody, ParserError> {
        let lbrace = self.expect_punct('{', "to open class body")?;
        let mut members = Vec::new();
        while !self.current().is_punct('}') && !self.is_at_end() {
            members.push(self.parse_member(class_ty)?);
        }
        let rbrace = self.expect_punct('}', "to close class body")?;
        Ok(ClassBody {
            lbrace_prefix: lbrace.prefix,
            members,
            rbrace_prefix: rbrace.prefix,
        })
    }

    fn parse_member(&mut self, class_ty: &JavaType) -> Result<ClassMember, ParserError> {
        if self.current().is_punct(';') {
            return Ok(ClassMember::Raw(self.advance().raw()));
        }
        let save = self.position;
        match self.try_parse_member(class_ty) {
            Ok(member) => Ok(member),
            Err(_) => {
                // Outside the supported subset; keep the text verbatim.
                self.position = save;
                Ok(ClassMember::Raw(self.capture_raw_statement()))
            }
        }
    }

    fn try_parse_member(&mut self, class_ty: &JavaType) -> Result<ClassMember, ParserError> {
        let mod_tokens = self.collect_modifier_tokens();

        if self.current().is_ident("class")
            || self.current().is_ident("interface")
            || self.current().is_ident("enum")
        {
            return Ok(ClassMember::Class(self.parse_class_decl(mod_tokens)?));
        }

        let mut modifiers = String::new();
        for token in &mod_tokens {
            modifiers.push_str(&token.raw());
        }

        let generics_mark = self.generics.len();
        let type_params = if self.current().is_punct('<') {
            let tp = self.parse_type_params()?;
            self.register_type_params(&tp);
            Some(tp)
        } else {
            None
        };

        let class_name = match class_ty.as_class() {
            Some(c) => c.name.clone(),
            None => String::new(),
        };

        // Constructor: the class name immediately followed by `(`.
        if self.current().is_ident(&class_name) && self.peek_is_punct(1, '(') {
            let name_token = self.advance();
            let name = Ident::new(name_token.prefix, name_token.text);
            let member =
                self.parse_method_rest(class_ty, modifiers, type_params, None, name)?;
            self.generics.truncate(generics_mark);
            return Ok(member);
        }

        let type_tree = self.parse_type_tree()?;
        let name_token = self.expect_ident("after type in member declaration")?;
        let name = Ident::new(name_token.prefix, name_token.text);

        if self.current().is_punct('(') {
            let member = self.parse_method_rest(
                class_ty,
                modifiers,
                type_params,
                Some(type_tree),
                name,
            )?;
            self.generics.truncate(generics_mark);
            return Ok(member);
        }
        self.generics.truncate(generics_mark);

        let init = if self.current().is_punct('=') {
            let eq = self.advance().raw();
            let value = self.parse_expression_or_raw(Stop::Semi);
            Some(Initializer { eq, value })
        } else {
            None
        };
        let semi = self.expect_punct(';', "after field declaration")?;
        let ty = JavaType::Variable(VariableType {
            name: name.name.clone(),
            ty: Box::new(type_tree.ty.clone()),
        });
        Ok(ClassMember::Field(VariableDecl {
            modifiers,
            type_tree,
            name,
            init,
            semi_prefix: semi.prefix,
            ty,
        }))
    }

    fn parse_method_rest(
        &mut self,
        class_ty: &JavaType,
        modifiers: String,
        type_params: Option<TypeParams>,
        return_type: Option<TypeTree>,
        name: Ident,
    ) -> Result<ClassMember, ParserError> {
        let lparen = self.expect_punct('(', "to open parameter list")?;
        let mut params = Vec::new();
        let mut sep = String::new();
        if !self.current().is_punct(')') {
            loop {
                let param = self.parse_parameter()?;
                params.push((std::mem::take(&mut sep), param));
                if self.current().is_punct(',') {
                    sep = self.advance().raw();
                } else {
                    break;
                }
            }
        }
        let rparen = self.expect_punct(')', "to close parameter list")?;

        let throws = if self.current().is_ident("throws") {
            let kw = self.advance();
            Some(HeritageClause {
                keyword: kw.raw(),
                types: self.parse_type_list()?,
            })
        } else {
            None
        };

        let (body, semi_prefix) = if self.current().is_punct('{') {
            (Some(self.parse_block()?), String::new())
        } else {
            let semi = self.expect_punct(';', "after method declaration")?;
            (None, semi.prefix)
        };

        let return_ty = match &return_type {
            Some(tree) => tree.ty.clone(),
            None => class_ty.clone(),
        };
        let method_type = JavaType::Method(Box::new(MethodType {
            declaring: class_ty.clone(),
            name: name.name.clone(),
            return_type: return_ty,
            parameter_types: params.iter().map(|(_, p)| p.type_tree.ty.clone()).collect(),
        }));

        Ok(ClassMember::Method(MethodDecl {
            modifiers,
            type_params,
            return_type,
            name,
            lparen_prefix: lparen.prefix,
            params,
            rparen_prefix: rparen.prefix,
            throws,
            body,
            semi_prefix,
            method_type,
        }))
    }

    fn parse_parameter(&mut self) -> Result<Parameter, ParserError> {
        let mod_tokens = self.collect_modifier_tokens();
        let mut modifiers = String::new();
        for token in &mod_tokens {
            modifiers.push_str(&token.raw());
        }
        let mut type_tree = self.parse_type_tree()?;
        // Varargs fold into the array suffix.
        if self.current().is_punct('.') && self.peek_is_punct(1, '.') && self.peek_is_punct(2, '.')
        {
            for _ in 0..3 {
                type_tree.array_suffix.push_str(&self.advance().raw());
            }
            type_tree.ty = JavaType::Array(Box::new(type_tree.ty.clone()));
        }
        let name_token = self.expect_ident("after parameter type")?;
        let name = Ident::new(name_token.prefix, name_token.text);
        let ty = JavaType::Variable(VariableType {
            name: name.name.clone(),
            ty: Box::new(type_tree.ty.clone()),
        });
        Ok(Parameter {
            modifiers,
            type_tree,
            name,
            ty,
        })
    }

    // Types

    fn parse_type_params(&mut self) -> Result<TypeParams, ParserError> {
        let lt = self.expect_punct('<', "to open type parameters")?;
        let mut params = Vec::new();
        let mut sep = String::new();
        loop {
            let name_token = self.expect_ident("as type parameter name")?;
            let name = Ident::new(name_token.prefix, name_token.text);
            let mut extends_prefix = None;
            let mut bounds = Vec::new();
            if self.current().is_ident("extends") {
                let kw = self.advance();
                extends_prefix = Some(kw.prefix);
                let mut bound_sep = String::new();
                loop {
                    let tree = self.parse_type_tree()?;
                    bounds.push(TypeBound {
                        sep: std::mem::take(&mut bound_sep),
                        tree,
                    });
                    if self.current().is_punct('&') {
                        bound_sep = self.advance().raw();
                    } else {
                        break;
                    }
                }
            }
            params.push((
                std::mem::take(&mut sep),
                TypeParameter {
                    name,
                    extends_prefix,
                    bounds,
                },
            ));
            if self.current().is_punct(',') {
                sep = self.advance().raw();
            } else {
                break;
            }
        }
        let gt = self.expect_punct('>', "to close type parameters")?;
        Ok(TypeParams {
            lt_prefix: lt.prefix,
            params,
            gt_prefix: gt.prefix,
        })
    }

    fn register_type_params(&mut self, tp: &TypeParams) {
        for (_, param) in &tp.params {
            self.generics.push(param.name.name.clone());
        }
    }

    fn parse_type_tree(&mut self) -> Result<TypeTree, ParserError> {
        if self.current().is_punct('?') {
            return self.parse_wildcard();
        }
        let first = self.expect_ident("as type name")?;
        let prefix = first.prefix;
        let mut base = first.text;
        while self.current().is_punct('.') && self.peek_is_ident(1) {
            base.push_str(&self.advance().raw());
            base.push_str(&self.advance().raw());
        }
        let type_args = if self.current().is_punct('<') {
            Some(self.parse_type_args()?)
        } else {
            None
        };
        let mut array_suffix = String::new();
        let mut dims = 0usize;
        while self.current().is_punct('[') && self.peek_is_punct(1, ']') {
            array_suffix.push_str(&self.advance().raw());
            array_suffix.push_str(&self.advance().raw());
            dims += 1;
        }
        let ty = self.attribute_type(&strip_whitespace(&base), &type_args, dims);
        Ok(TypeTree {
            prefix,
            base,
            type_args,
            array_suffix,
            ty,
        })
    }

    /// Wildcard type argument, captured verbatim up to the enclosing `,`
    /// or `>`.
    fn parse_wildcard(&mut self) -> Result<TypeTree, ParserError> {
        let first = self.advance();
        let prefix = first.prefix;
        let mut base = first.text;
        let mut depth = 0usize;
        loop {
            let current = self.current();
            if self.is_at_end() {
                break;
            }
            if depth == 0 && (current.is_punct(',') || current.is_punct('>')) {
                break;
            }
            if current.is_punct('<') {
                depth += 1;
            } else if current.is_punct('>') {
                depth -= 1;
            }
            base.push_str(&self.advance().raw());
        }
        Ok(TypeTree {
            prefix,
            base,
            type_args: None,
            array_suffix: String::new(),
            ty: JavaType::Unknown,
        })
    }

    fn parse_type_args(&mut self) -> Result<TypeArgs, ParserError> {
        self.advance(); // '<'
        if self.current().is_punct('>') {
            let gt = self.advance();
            return Ok(TypeArgs {
                args: Vec::new(),
                gt_prefix: gt.prefix,
            });
        }
        let mut args = Vec::new();
        let mut sep = String::new();
        loop {
            let tree = self.parse_type_tree()?;
            args.push((std::mem::take(&mut sep), tree));
            if self.current().is_punct(',') {
                sep = self.advance().raw();
            } else {
                break;
            }
        }
        let gt = self.expect_punct('>', "to close type arguments")?;
        Ok(TypeArgs {
            args,
            gt_prefix: gt.prefix,
        })
    }

    /// Purely syntactic type attribution: fully-qualified names resolve
    /// directly, simple names through the import map, primitives to
    /// `Primitive`, and anything else stays `Unknown`.
    fn attribute_type(&self, dotted: &str, type_args: &Option<TypeArgs>, dims: usize) -> JavaType {
        let base = if dotted.starts_with('?') {
            JavaType::Unknown
        } else if is_primitive(dotted) {
            JavaType::Primitive(dotted.to_string())
        } else if dotted.contains('.') {
            JavaType::build(dotted)
        } else if self.generics.iter().any(|g| g == dotted) {
            JavaType::Generic(GenericType {
                name: dotted.to_string(),
                bounds: Vec::new(),
            })
        } else if let Some(package) = self.imports.get(dotted) {
            JavaType::Class(ClassType::new(package.clone(), dotted))
        } else {
            JavaType::Unknown
        };

        let ty = match (type_args, &base) {
            (Some(ta), JavaType::Class(_)) => {
                JavaType::Parameterized(crate::ast::types::ParameterizedType {
                    base: Box::new(base),
                    args: ta.args.iter().map(|(_, t)| t.ty.clone()).collect(),
                })
            }
            _ => base,
        };

        let mut wrapped = ty;
        for _ in 0..dims {
            wrapped = JavaType::Array(Box::new(wrapped));
        }
        wrapped
    }

    // Statements

    fn parse_block(&mut self) -> Result<Block, ParserError> {
        let lbrace = self.expect_punct('{', "to open block")?;
        let mut statements = Vec::new();
        while !self.current().is_punct('}') && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }
        let rbrace = self.expect_punct('}', "to close block")?;
        Ok(Block {
            lbrace_prefix: lbrace.prefix,
            statements,
            rbrace_prefix: rbrace.prefix,
        })
    }

    fn parse_statement(&mut self) -> Result<Statement, ParserError> {
        if self.current().is_ident("return") {
            let kw = self.advance();
            let expr = if self.current().is_punct(';') {
                None
            } else {
                Some(self.parse_expression_or_raw(Stop::Semi))
            };
            let semi = self.expect_punct(';', "after return")?;
            return Ok(Statement::Return(ReturnStatement {
                prefix: kw.prefix,
                expr,
                semi_prefix: semi.prefix,
            }));
        }

        let save = self.position;
        if let Ok(statement) = self.try_parse_local_var() {
            return Ok(statement);
        }
        self.position = save;
        if let Ok(statement) = self.try_parse_expr_statement() {
            return Ok(statement);
        }
        self.position = save;
        Ok(Statement::Raw(self.capture_raw_statement()))
    }

    fn try_parse_local_var(&mut self) -> Result<Statement, ParserError> {
        let mod_tokens = self.collect_modifier_tokens();
        let mut modifiers = String::new();
        for token in &mod_tokens {
            modifiers.push_str(&token.raw());
        }
        let type_tree = self.parse_type_tree()?;
        let name_token = self.expect_ident("after local variable type")?;
        let name = Ident::new(name_token.prefix, name_token.text);
        if !(self.current().is_punct('=') || self.current().is_punct(';')) {
            return Err(self.error("not a local variable declaration".to_string()));
        }
        let init = if self.current().is_punct('=') {
            let eq = self.advance().raw();
            let value = self.parse_expression_or_raw(Stop::Semi);
            Some(Initializer { eq, value })
        } else {
            None
        };
        let semi = self.expect_punct(';', "after local variable")?;
        let ty = JavaType::Variable(VariableType {
            name: name.name.clone(),
            ty: Box::new(type_tree.ty.clone()),
        });
        Ok(Statement::LocalVar(VariableDecl {
            modifiers,
            type_tree,
            name,
            init,
            semi_prefix: semi.prefix,
            ty,
        }))
    }

    fn try_parse_expr_statement(&mut self) -> Result<Statement, ParserError> {
        let expr = self.parse_expression()?;
        let semi = self.expect_punct(';', "after expression statement")?;
        Ok(Statement::Expr(ExprStatement {
            expr,
            semi_prefix: semi.prefix,
        }))
    }

    // Expressions

    fn parse_expression(&mut self) -> Result<Expression, ParserError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.current().is_punct('.') && self.peek_is_ident(1) {
                let dot = self.advance().raw();
                let name_token = self.advance();
                let name = Ident::new(name_token.prefix, name_token.text);
                if self.current().is_punct('(') {
                    let (lparen_prefix, args, rparen_prefix) = self.parse_arguments()?;
                    let method_type = self.method_type_for(Some(&expr), &name, &args);
                    expr = Expression::MethodCall(Box::new(MethodCall {
                        select: Some(expr),
                        dot,
                        name,
                        lparen_prefix,
                        args,
                        rparen_prefix,
                        method_type,
                    }));
                } else {
                    let mut access = FieldAccess {
                        target: expr,
                        dot,
                        name,
                        ty: JavaType::Unknown,
                    };
                    access.ty = self.chain_type(&access);
                    expr = Expression::FieldAccess(Box::new(access));
                }
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expression, ParserError> {
        let current = self.current().clone();
        match current.kind {
            TokenKind::Ident if current.text == "new" => {
                let kw = self.advance();
                let class = self.parse_type_tree()?;
                let (lparen_prefix, args, rparen_prefix) = self.parse_arguments()?;
                let constructor_type = JavaType::Method(Box::new(MethodType {
                    declaring: class.ty.clone(),
                    name: class_simple_name(&class),
                    return_type: class.ty.clone(),
                    parameter_types: args.iter().map(|(_, a)| expr_type(a)).collect(),
                }));
                Ok(Expression::New(Box::new(NewClass {
                    prefix: kw.prefix,
                    class,
                    lparen_prefix,
                    args,
                    rparen_prefix,
                    constructor_type,
                })))
            }
            TokenKind::Ident => {
                let token = self.advance();
                let name = Ident::new(token.prefix.clone(), token.text.clone());
                if self.current().is_punct('(') {
                    let (lparen_prefix, args, rparen_prefix) = self.parse_arguments()?;
                    let method_type = self.method_type_for(None, &name, &args);
                    return Ok(Expression::MethodCall(Box::new(MethodCall {
                        select: None,
                        dot: String::new(),
                        name,
                        lparen_prefix,
                        args,
                        rparen_prefix,
                        method_type,
                    })));
                }
                let ty = self.resolve_simple(&token.text);
                Ok(Expression::Ident(Identifier {
                    prefix: token.prefix,
                    name: token.text,
                    ty,
                }))
            }
            TokenKind::Number | TokenKind::Str | TokenKind::Char => {
                let token = self.advance();
                Ok(Expression::Literal(Literal {
                    prefix: token.prefix,
                    text: token.text,
                }))
            }
            _ => Err(self.error("expected expression".to_string())),
        }
    }

    fn parse_arguments(
        &mut self,
    ) -> Result<(String, Vec<(String, Expression)>, String), ParserError> {
        let lparen = self.expect_punct('(', "to open arguments")?;
        let mut args = Vec::new();
        if self.current().is_punct(')') {
            let rparen = self.advance();
            return Ok((lparen.prefix, args, rparen.prefix));
        }
        let mut sep = String::new();
        loop {
            let value = self.parse_expression_or_raw(Stop::ArgEnd);
            args.push((std::mem::take(&mut sep), value));
            if self.current().is_punct(',') {
                sep = self.advance().raw();
            } else {
                break;
            }
        }
        let rparen = self.expect_punct(')', "to close arguments")?;
        Ok((lparen.prefix, args, rparen.prefix))
    }

    /// Structured expression where possible; verbatim text otherwise.
    fn parse_expression_or_raw(&mut self, stop: Stop) -> Expression {
        let save = self.position;
        if let Ok(expr) = self.parse_expression() {
            if self.at_stop(stop) {
                return expr;
            }
        }
        self.position = save;
        Expression::Raw(self.capture_raw_until(stop))
    }

    fn at_stop(&self, stop: Stop) -> bool {
        match stop {
            Stop::Semi => self.current().is_punct(';'),
            Stop::ArgEnd => self.current().is_punct(',') || self.current().is_punct(')'),
        }
    }

    fn capture_raw_until(&mut self, stop: Stop) -> String {
        let mut text = String::new();
        let mut depth = 0usize;
        loop {
            if self.is_at_end() {
                return text;
            }
            let current = self.current();
            if depth == 0 && self.at_stop(stop) {
                return text;
            }
            match current.text.as_str() {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => {
                    if depth == 0 {
                        return text;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            text.push_str(&self.advance().raw());
        }
    }

    /// Verbatim statement capture: everything up to and including a
    /// depth-zero `;`, or through a balanced brace block opened at depth
    /// zero. A closing `}` at depth zero belongs to the enclosing block
    /// and is left unconsumed.
    fn capture_raw_statement(&mut self) -> String {
        let mut text = String::new();
        let mut depth = 0usize;
        loop {
            if self.is_at_end() {
                return text;
            }
            let current = self.current();
            if depth == 0 && current.is_punct('}') {
                return text;
            }
            let opened = matches!(current.text.as_str(), "(" | "[" | "{");
            let closed = matches!(current.text.as_str(), ")" | "]" | "}");
            let token = self.advance();
            if opened {
                depth += 1;
            } else if closed {
                depth = depth.saturating_sub(1);
            }
            text.push_str(&token.raw());
            let ended_block = token.is_punct('}') && depth == 0;
            if (token.is_punct(';') && depth == 0) || ended_block {
                return text;
            }
        }
    }

    // Attribution helpers

    fn resolve_simple(&self, name: &str) -> JavaType {
        if self.generics.iter().any(|g| g == name) {
            return JavaType::Generic(GenericType {
                name: name.to_string(),
                bounds: Vec::new(),
            });
        }
        match self.imports.get(name) {
            Some(package) => JavaType::Class(ClassType::new(package.clone(), name)),
            None => JavaType::Unknown,
        }
    }

    /// A field-access chain that spells out `pkg.Name` is attributed as a
    /// class reference; anything else is an ordinary member access.
    fn chain_type(&self, access: &FieldAccess) -> JavaType {
        let expr = Expression::FieldAccess(Box::new(access.clone()));
        if let Some(dotted) = expr.flatten_dotted() {
            if dotted.contains('.') {
                let last = dotted.rsplit('.').next().unwrap_or_default();
                if last.chars().next().map(char::is_uppercase).unwrap_or(false) {
                    return JavaType::build(&dotted);
                }
            }
        }
        JavaType::Unknown
    }

    fn method_type_for(
        &self,
        select: Option<&Expression>,
        name: &Ident,
        args: &[(String, Expression)],
    ) -> JavaType {
        let declaring = match select {
            Some(expr) => match expr_type(expr) {
                JavaType::Class(c) => JavaType::Class(c),
                JavaType::Parameterized(p) => JavaType::Parameterized(p),
                _ => JavaType::Unknown,
            },
            None => JavaType::Unknown,
        };
        JavaType::Method(Box::new(MethodType {
            declaring,
            name: name.name.clone(),
            return_type: JavaType::Unknown,
            parameter_types: args.iter().map(|(_, a)| expr_type(a)).collect(),
        }))
    }
}

fn expr_type(expr: &Expression) -> JavaType {
    match expr {
        Expression::Ident(i) => i.ty.clone(),
        Expression::FieldAccess(f) => f.ty.clone(),
        Expression::New(n) => n.class.ty.clone(),
        _ => JavaType::Unknown,
    }
}

fn class_simple_name(tree: &TypeTree) -> String {
    tree.dotted_base()
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_string()
}

pub mod expression;
pub mod statement;
pub mod types;

use types::JavaType;

/// Remove every whitespace character. Dotted-name comparisons are always
/// made on the stripped form so interior trivia never affects matching.
pub fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// An identifier together with the trivia (whitespace and comments) that
/// precedes it in the source.
#[derive(Debug, Clone)]
pub struct Ident {
    pub prefix: String,
    pub name: String,
}

impl Ident {
    pub fn new(prefix: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            name: name.into(),
        }
    }
}

/// A syntactic type usage: a possibly qualified base name, optional type
/// arguments, and optional array brackets. The raw text is kept verbatim
/// so untouched types print byte-identically; `ty` carries the attributed
/// type metadata.
#[derive(Debug, Clone)]
pub struct TypeTree {
    pub prefix: String,
    /// Base name as written, interior trivia included (`a.b.Foo`, `Foo`,
    /// `int`, or a wildcard such as `? extends Foo`).
    pub base: String,
    pub type_args: Option<TypeArgs>,
    /// Raw `[]` runs, trivia included.
    pub array_suffix: String,
    pub ty: JavaType,
}

/// Type arguments between `<` and `>`. Each entry carries the raw comma
/// piece that precedes it (empty for the first).
#[derive(Debug, Clone)]
pub struct TypeArgs {
    pub args: Vec<(String, TypeTree)>,
    pub gt_prefix: String,
}

impl TypeTree {
    pub fn dotted_base(&self) -> String {
        strip_whitespace(&self.base)
    }

    pub fn base_is_qualified(&self) -> bool {
        self.base.contains('.')
    }

    pub fn set_base(&mut self, base: &str) {
        self.base = base.to_string();
    }
}

/// The `package` declaration. `name` is the raw dotted name as written,
/// leading trivia included.
#[derive(Debug, Clone)]
pub struct PackageDecl {
    pub prefix: String,
    pub name: String,
    pub semi_prefix: String,
}

impl PackageDecl {
    pub fn dotted_name(&self) -> String {
        strip_whitespace(&self.name)
    }

    pub fn set_name(&mut self, dotted: &str) {
        self.name = format!(" {dotted}");
    }
}

/// An `import` statement. `name` is the raw dotted path (member or `*`
/// included for static/wildcard imports); the `static` keyword piece is
/// kept separately, trivia included.
#[derive(Debug, Clone)]
pub struct Import {
    pub prefix: String,
    pub static_kw: Option<String>,
    pub name: String,
    pub semi_prefix: String,
}

impl Import {
    pub fn is_static(&self) -> bool {
        self.static_kw.is_some()
    }

    pub fn dotted(&self) -> String {
        strip_whitespace(&self.name)
    }

    fn segments(&self) -> Vec<String> {
        self.dotted().split('.').map(str::to_string).collect()
    }

    /// Package of the imported type. Static imports name a member after
    /// the type, so they drop two trailing segments instead of one.
    pub fn package_name(&self) -> String {
        let segments = self.segments();
        let drop = if self.is_static() { 2 } else { 1 };
        if segments.len() <= drop {
            return String::new();
        }
        segments[..segments.len() - drop].join(".")
    }

    /// Simple name of the imported type (`*` for wildcard imports).
    pub fn type_name(&self) -> String {
        let segments = self.segments();
        let back = if self.is_static() { 2 } else { 1 };
        if segments.len() < back {
            return String::new();
        }
        segments[segments.len() - back].clone()
    }

    /// Everything after the package: the type name, plus the member for
    /// static imports.
    pub fn tail(&self) -> String {
        let segments = self.segments();
        let keep = if self.is_static() { 2 } else { 1 };
        let start = segments.len().saturating_sub(keep);
        segments[start..].join(".")
    }

    pub fn set_dotted(&mut self, dotted: &str) {
        self.name = format!(" {dotted}");
    }
}

/// One parsed source file, with enough trivia retained to print it back
/// byte-identically when nothing was rewritten.
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    /// Slash-normalized logical storage path.
    pub source_path: String,
    pub package: Option<PackageDecl>,
    pub imports: Vec<Import>,
    pub classes: Vec<statement::ClassDecl>,
    /// Trailing trivia after the last declaration.
    pub eof: String,
}

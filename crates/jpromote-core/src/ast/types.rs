use std::fmt;

/// A class identity split into its package and simple name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassType {
    pub package: String,
    pub name: String,
}

impl ClassType {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Split a dotted fully-qualified name at its last segment.
    /// `"a.b.Foo"` becomes package `"a.b"`, name `"Foo"`; a bare name has
    /// an empty package (the default package).
    pub fn from_fqn(fqn: &str) -> Self {
        match fqn.rsplit_once('.') {
            Some((package, name)) => Self::new(package, name),
            None => Self::new("", fqn),
        }
    }

    pub fn fully_qualified_name(&self) -> String {
        join_fqn(&self.package, &self.name)
    }
}

/// Join a package and a simple name, tolerating the default package.
pub fn join_fqn(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{package}.{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterizedType {
    pub base: Box<JavaType>,
    pub args: Vec<JavaType>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericType {
    pub name: String,
    pub bounds: Vec<JavaType>,
}

/// The type of a declared variable slot (field, parameter, or local).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableType {
    pub name: String,
    pub ty: Box<JavaType>,
}

/// Method signature metadata: the declaring class, return type, and
/// parameter types all participate in package migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodType {
    pub declaring: JavaType,
    pub name: String,
    pub return_type: JavaType,
    pub parameter_types: Vec<JavaType>,
}

/// Type metadata attached to syntax nodes. Attribution is purely
/// syntactic: names that cannot be resolved through the file's imports
/// or its own package stay `Unknown` and are never rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JavaType {
    Unknown,
    Primitive(String),
    Class(ClassType),
    Parameterized(ParameterizedType),
    Generic(GenericType),
    Variable(VariableType),
    Array(Box<JavaType>),
    Method(Box<MethodType>),
}

impl JavaType {
    /// Construct a resolvable class type from a fully-qualified name.
    pub fn build(fqn: &str) -> JavaType {
        JavaType::Class(ClassType::from_fqn(fqn))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, JavaType::Unknown)
    }

    pub fn as_class(&self) -> Option<&ClassType> {
        match self {
            JavaType::Class(c) => Some(c),
            JavaType::Parameterized(p) => p.base.as_class(),
            _ => None,
        }
    }

    /// Fully-qualified names reachable from this type, including those
    /// nested in generics, arrays, and method signatures.
    pub fn collect_fqns(&self, out: &mut Vec<String>) {
        match self {
            JavaType::Unknown | JavaType::Primitive(_) => {}
            JavaType::Class(c) => out.push(c.fully_qualified_name()),
            JavaType::Parameterized(p) => {
                p.base.collect_fqns(out);
                for arg in &p.args {
                    arg.collect_fqns(out);
                }
            }
            JavaType::Generic(g) => {
                for bound in &g.bounds {
                    bound.collect_fqns(out);
                }
            }
            JavaType::Variable(v) => v.ty.collect_fqns(out),
            JavaType::Array(elem) => elem.collect_fqns(out),
            JavaType::Method(m) => {
                m.declaring.collect_fqns(out);
                m.return_type.collect_fqns(out);
                for p in &m.parameter_types {
                    p.collect_fqns(out);
                }
            }
        }
    }
}

/// The printed identity of a type. Used as the per-file memo key so two
/// occurrences of the same original type always map to the same
/// replacement.
impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JavaType::Unknown => write!(f, "<unknown>"),
            JavaType::Primitive(p) => write!(f, "{p}"),
            JavaType::Class(c) => write!(f, "{}", c.fully_qualified_name()),
            JavaType::Parameterized(p) => {
                write!(f, "{}<", p.base)?;
                for (i, arg) in p.args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ">")
            }
            JavaType::Generic(g) => {
                write!(f, "{}", g.name)?;
                for (i, bound) in g.bounds.iter().enumerate() {
                    write!(f, "{}{}", if i == 0 { " extends " } else { " & " }, bound)?;
                }
                Ok(())
            }
            JavaType::Variable(v) => write!(f, "{} {}", v.ty, v.name),
            JavaType::Array(elem) => write!(f, "{elem}[]"),
            JavaType::Method(m) => {
                write!(f, "{}#{}(", m.declaring, m.name)?;
                for (i, p) in m.parameter_types.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, "):{}", m.return_type)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fqn_splits_at_last_segment() {
        let c = ClassType::from_fqn("dev.morphia.query.Filter");
        assert_eq!(c.package, "dev.morphia.query");
        assert_eq!(c.name, "Filter");
    }

    #[test]
    fn test_from_fqn_default_package() {
        let c = ClassType::from_fqn("Filter");
        assert_eq!(c.package, "");
        assert_eq!(c.fully_qualified_name(), "Filter");
    }

    #[test]
    fn test_display_is_stable_identity() {
        let a = JavaType::Parameterized(ParameterizedType {
            base: Box::new(JavaType::build("java.util.List")),
            args: vec![JavaType::build("a.b.Foo")],
        });
        assert_eq!(a.to_string(), "java.util.List<a.b.Foo>");
    }

    #[test]
    fn test_collect_fqns_recurses() {
        let ty = JavaType::Array(Box::new(JavaType::Parameterized(ParameterizedType {
            base: Box::new(JavaType::build("java.util.Map")),
            args: vec![JavaType::build("a.experimental.K"), JavaType::Unknown],
        })));
        let mut fqns = Vec::new();
        ty.collect_fqns(&mut fqns);
        assert_eq!(fqns, vec!["java.util.Map", "a.experimental.K"]);
    }
}

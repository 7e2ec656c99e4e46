pub mod ast;
pub mod config;
pub mod context;
pub mod errors;
pub mod imports;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod recipe;
pub mod search;
pub mod visitor;

pub use ast::CompilationUnit;
pub use config::{MigrationConfig, MigrationRule};
pub use errors::{MigrateError, Result};
pub use parser::{parse_source, ParserError};
pub use recipe::promote::PromoteExperimental;
pub use recipe::Recipe;
pub use search::UsesType;
pub use visitor::JavaVisitorMut;

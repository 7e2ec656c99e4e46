//! Import-list edits that keep surrounding trivia intact.

use crate::ast::CompilationUnit;

/// Remove the import at `index`. If its leading trivia carries a comment,
/// the trivia moves to whatever element follows (next import, first
/// class, or the file's trailing trivia) instead of being dropped.
pub fn remove_import_at(cu: &mut CompilationUnit, index: usize) {
    let removed = cu.imports.remove(index);
    if !has_comment(&removed.prefix) {
        return;
    }
    if let Some(next) = cu.imports.get_mut(index) {
        if has_comment(&next.prefix) {
            next.prefix = format!("{}{}", removed.prefix, next.prefix);
        } else {
            next.prefix = removed.prefix;
        }
    } else if let Some(class) = cu.classes.first_mut() {
        if has_comment(&class.prefix) {
            class.prefix = format!("{}{}", removed.prefix, class.prefix);
        } else {
            class.prefix = removed.prefix;
        }
    } else {
        cu.eof = format!("{}{}", removed.prefix, cu.eof);
    }
}

fn has_comment(trivia: &str) -> bool {
    trivia.contains("//") || trivia.contains("/*")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_source;
    use crate::printer;

    #[test]
    fn test_remove_import_drops_plain_trivia() {
        let mut cu = parse_source(
            "package a;\n\nimport b.Foo;\nimport b.Bar;\n\nclass C {}\n",
        )
        .unwrap();
        remove_import_at(&mut cu, 0);
        assert_eq!(
            printer::print(&cu),
            "package a;\nimport b.Bar;\n\nclass C {}\n"
        );
    }

    #[test]
    fn test_remove_import_keeps_comment_trivia() {
        let mut cu = parse_source(
            "package a;\n// keep me\nimport b.Foo;\nimport b.Bar;\nclass C {}\n",
        )
        .unwrap();
        remove_import_at(&mut cu, 0);
        assert_eq!(
            printer::print(&cu),
            "package a;\n// keep me\nimport b.Bar;\nclass C {}\n"
        );
    }

    #[test]
    fn test_remove_last_import_moves_comment_to_class() {
        let mut cu = parse_source("package a;\n/* note */\nimport b.Foo;\nclass C {}\n").unwrap();
        remove_import_at(&mut cu, 0);
        assert_eq!(printer::print(&cu), "package a;\n/* note */\nclass C {}\n");
    }
}

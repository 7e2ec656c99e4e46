use indoc::indoc;

use crate::ast::types::{JavaType, ParameterizedType};
use crate::ast::statement::ClassMember;
use crate::ast::CompilationUnit;
use crate::config::MigrationRule;
use crate::parser::parse_source;
use crate::printer;
use crate::recipe::promote::PromoteExperimental;
use crate::recipe::Recipe;

fn apply(rule: MigrationRule, path: &str, source: &str) -> (CompilationUnit, bool) {
    let mut cu = parse_source(source).expect("Parse failed");
    cu.source_path = path.to_string();
    let changed = PromoteExperimental::new(rule).run(&mut cu);
    (cu, changed)
}

#[test]
fn test_morphia_promotion_moves_package_path_and_prunes_self_import() {
    let rule = MigrationRule::new(
        "dev.morphia.aggregation.experimental",
        "dev.morphia.aggregation",
        true,
    );
    let (cu, changed) = apply(
        rule,
        "core/src/main/java/dev/morphia/aggregation/experimental/Foo.java",
        indoc! {"
            package dev.morphia.aggregation.experimental;

            import dev.morphia.aggregation.AggregationPipeline;

            public class Foo {
            }
        "},
    );

    assert!(changed);
    assert_eq!(
        cu.source_path,
        "core/src/main/java/dev/morphia/aggregation/Foo.java"
    );
    assert_eq!(
        printer::print(&cu),
        indoc! {"
            package dev.morphia.aggregation;

            public class Foo {
            }
        "}
    );
    assert_eq!(
        cu.classes[0].ty,
        JavaType::build("dev.morphia.aggregation.Foo")
    );
}

#[test]
fn test_out_of_scope_file_is_untouched() {
    let source = indoc! {"
        package com.example;

        import java.util.List;

        class Plain {
            List<String> names;
        }
    "};
    let rule = MigrationRule::new("a.experimental", "a", true);
    let (cu, changed) = apply(rule, "src/com/example/Plain.java", source);

    assert!(!changed);
    assert_eq!(cu.source_path, "src/com/example/Plain.java");
    assert_eq!(printer::print(&cu), source);
}

#[test]
fn test_repeated_occurrences_resolve_to_one_type() {
    let rule = MigrationRule::new("a.experimental", "a", true);
    let (cu, changed) = apply(
        rule,
        "src/com/example/Holder.java",
        indoc! {"
            package com.example;

            import a.experimental.Foo;

            class Holder {
                Foo first;
                Foo second;
            }
        "},
    );

    assert!(changed);
    let fields: Vec<_> = cu.classes[0]
        .body
        .members
        .iter()
        .filter_map(|m| match m {
            ClassMember::Field(f) => Some(f),
            _ => None,
        })
        .collect();
    assert_eq!(fields[0].type_tree.ty, JavaType::build("a.Foo"));
    assert_eq!(fields[0].type_tree.ty, fields[1].type_tree.ty);
    assert!(printer::print(&cu).contains("import a.Foo;"));
}

#[test]
fn test_recursive_rule_preserves_subpackage_suffix() {
    let rule = MigrationRule::new("a.b.experimental", "a.b", true);
    let (cu, changed) = apply(
        rule,
        "src/com/example/Holder.java",
        indoc! {"
            package com.example;

            import a.b.experimental.sub.Foo;

            class Holder {
                a.b.experimental.sub.Foo qualified;
            }
        "},
    );

    assert!(changed);
    let printed = printer::print(&cu);
    assert!(printed.contains("import a.b.sub.Foo;"));
    assert!(printed.contains("a.b.sub.Foo qualified;"));
    let ClassMember::Field(field) = &cu.classes[0].body.members[0] else {
        panic!("Expected field member");
    };
    assert_eq!(field.type_tree.ty, JavaType::build("a.b.sub.Foo"));
}

#[test]
fn test_non_recursive_rule_matches_exact_package_only() {
    let rule = MigrationRule::new("a.b.experimental", "a.b", false);
    let (cu, changed) = apply(
        rule,
        "src/com/example/Holder.java",
        indoc! {"
            package com.example;

            import a.b.experimental.Foo;
            import a.b.experimental.sub.Bar;

            class Holder {
            }
        "},
    );

    assert!(changed);
    let printed = printer::print(&cu);
    assert!(printed.contains("import a.b.Foo;"));
    assert!(printed.contains("import a.b.experimental.sub.Bar;"));
}

#[test]
fn test_qualified_call_chain_is_rewritten_once() {
    let rule = MigrationRule::new("a.experimental", "a.b", true);
    let (cu, changed) = apply(
        rule,
        "src/com/example/User.java",
        indoc! {"
            package com.example;

            class User {
                void run() {
                    a.experimental.Filters.eq();
                }
            }
        "},
    );

    assert!(changed);
    assert!(printer::print(&cu).contains("a.b.Filters.eq();"));
}

#[test]
fn test_static_import_is_rewritten() {
    let rule = MigrationRule::new("a.experimental", "a", true);
    let (cu, changed) = apply(
        rule,
        "src/com/example/User.java",
        indoc! {"
            package com.example;

            import static a.experimental.Filters.eq;

            class User {
            }
        "},
    );

    assert!(changed);
    assert!(printer::print(&cu).contains("import static a.Filters.eq;"));
}

#[test]
fn test_generic_arguments_and_arrays_follow_the_move() {
    let rule = MigrationRule::new("a.experimental", "a", true);
    let (cu, changed) = apply(
        rule,
        "src/com/example/Holder.java",
        indoc! {"
            package com.example;

            import java.util.List;
            import a.experimental.Filter;

            class Holder {
                List<Filter> filters;
                Filter[] array;
            }
        "},
    );

    assert!(changed);
    let fields: Vec<_> = cu.classes[0]
        .body
        .members
        .iter()
        .filter_map(|m| match m {
            ClassMember::Field(f) => Some(f),
            _ => None,
        })
        .collect();
    assert_eq!(
        fields[0].type_tree.ty,
        JavaType::Parameterized(ParameterizedType {
            base: Box::new(JavaType::build("java.util.List")),
            args: vec![JavaType::build("a.Filter")],
        })
    );
    assert_eq!(
        fields[1].type_tree.ty,
        JavaType::Array(Box::new(JavaType::build("a.Filter")))
    );
    // Simple-name usages keep their spelling; only the import moves.
    let printed = printer::print(&cu);
    assert!(printed.contains("List<Filter> filters;"));
    assert!(printed.contains("import a.Filter;"));
}

#[test]
fn test_method_signature_metadata_follows_the_move() {
    let rule = MigrationRule::new("a.experimental", "a", true);
    let (cu, changed) = apply(
        rule,
        "src/a/experimental/Filters.java",
        indoc! {"
            package a.experimental;

            public class Filters {
                public Filters copy(Filters other) {
                    return other;
                }
            }
        "},
    );

    assert!(changed);
    let ClassMember::Method(method) = &cu.classes[0].body.members[0] else {
        panic!("Expected method member");
    };
    let JavaType::Method(m) = &method.method_type else {
        panic!("Expected method type");
    };
    assert_eq!(m.declaring, JavaType::build("a.Filters"));
    assert_eq!(m.return_type, JavaType::build("a.Filters"));
    assert_eq!(m.parameter_types, vec![JavaType::build("a.Filters")]);
}

#[test]
fn test_applying_twice_changes_nothing_further() {
    let rule = MigrationRule::new("a.b.experimental", "a.b", true);
    let (cu, changed) = apply(
        rule.clone(),
        "src/a/b/experimental/Foo.java",
        indoc! {"
            package a.b.experimental;

            public class Foo {
            }
        "},
    );
    assert!(changed);

    let once = printer::print(&cu);
    let (cu, changed) = apply(rule, &cu.source_path.clone(), &once);
    assert!(!changed);
    assert_eq!(printer::print(&cu), once);
    assert_eq!(cu.source_path, "src/a/b/Foo.java");
}

#[test]
fn test_nested_destination_does_not_stack_prefix() {
    // The destination lives under the source: a second run must not
    // re-target packages that already sit at the destination.
    let rule = MigrationRule::new("a.experimental", "a.experimental.stable", true);
    let (cu, changed) = apply(
        rule.clone(),
        "src/a/experimental/x/Foo.java",
        indoc! {"
            package a.experimental.x;

            public class Foo {
            }
        "},
    );
    assert!(changed);
    let once = printer::print(&cu);
    assert!(once.contains("package a.experimental.stable.x;"));
    assert_eq!(cu.source_path, "src/a/experimental/stable/x/Foo.java");

    let (cu, changed) = apply(rule, &cu.source_path.clone(), &once);
    assert!(!changed);
    assert_eq!(printer::print(&cu), once);
}

#[test]
fn test_package_removal_hands_trivia_to_first_class() {
    let rule = MigrationRule::new("a.experimental", "", true);
    let (cu, changed) = apply(
        rule,
        "src/a/experimental/Foo.java",
        "// header\npackage a.experimental;\n\nclass Foo {}\n",
    );

    assert!(changed);
    assert!(cu.package.is_none());
    assert_eq!(printer::print(&cu), "// header\nclass Foo {}\n");
    assert_eq!(cu.source_path, "src/Foo.java");
    assert_eq!(cu.classes[0].ty, JavaType::build("Foo"));
}

#[test]
fn test_package_removal_with_no_other_elements_keeps_trivia() {
    let rule = MigrationRule::new("a.experimental.info", "", true);
    let (cu, changed) = apply(
        rule,
        "src/a/experimental/info/package-info.java",
        "/* top */\npackage a.experimental.info;\n",
    );

    assert!(changed);
    assert_eq!(printer::print(&cu), "/* top */\n\n");
}

#[test]
fn test_scope_filter_catches_marker_free_own_package() {
    // The package text has no trailing `.experimental.` marker; the file's
    // own class identity still matches the type-usage search.
    let rule = MigrationRule::new("a.b.experimental", "a.b", true);
    let recipe = PromoteExperimental::new(rule);
    let cu = parse_source("package a.b.experimental;\n\nclass Foo {}\n").expect("Parse failed");
    assert!(recipe.applies_to(&cu));
}

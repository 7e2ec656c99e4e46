use super::*;
use crate::printer;
use indoc::indoc;

fn round_trip(source: &str) {
    let cu = parse_source(source).expect("Parse failed");
    assert_eq!(printer::print(&cu), source);
}

#[test]
fn test_parse_package_and_imports() {
    let cu = parse_source(indoc! {"
        package dev.morphia.query;

        import java.util.List;
        import static dev.morphia.query.Filters.eq;
        import dev.morphia.aggregation.*;

        class Query {}
    "})
    .expect("Parse failed");

    let package = cu.package.as_ref().expect("Expected package declaration");
    assert_eq!(package.dotted_name(), "dev.morphia.query");
    assert_eq!(cu.imports.len(), 3);
    assert_eq!(cu.imports[0].package_name(), "java.util");
    assert_eq!(cu.imports[0].type_name(), "List");
    assert!(cu.imports[1].is_static());
    assert_eq!(cu.imports[1].package_name(), "dev.morphia.query");
    assert_eq!(cu.imports[1].tail(), "Filters.eq");
    assert_eq!(cu.imports[2].type_name(), "*");
    assert_eq!(cu.classes.len(), 1);
}

#[test]
fn test_class_attributed_with_file_package() {
    let cu = parse_source("package a.b;\n\nclass Foo {}\n").expect("Parse failed");
    match &cu.classes[0].ty {
        JavaType::Class(c) => {
            assert_eq!(c.package, "a.b");
            assert_eq!(c.name, "Foo");
        }
        other => panic!("Expected class type, got {other}"),
    }
}

#[test]
fn test_field_type_resolved_through_imports() {
    let cu = parse_source(indoc! {"
        package com.example;

        import dev.morphia.query.experimental.filters.Filter;

        class Holder {
            private Filter filter;
        }
    "})
    .expect("Parse failed");

    let ClassMember::Field(field) = &cu.classes[0].body.members[0] else {
        panic!("Expected field member");
    };
    match &field.type_tree.ty {
        JavaType::Class(c) => {
            assert_eq!(
                c.fully_qualified_name(),
                "dev.morphia.query.experimental.filters.Filter"
            );
        }
        other => panic!("Expected class type, got {other}"),
    }
    match &field.ty {
        JavaType::Variable(v) => assert_eq!(v.name, "filter"),
        other => panic!("Expected variable type, got {other}"),
    }
}

#[test]
fn test_fully_qualified_type_resolved_directly() {
    let cu = parse_source(indoc! {"
        class Holder {
            a.experimental.Foo foo;
        }
    "})
    .expect("Parse failed");

    let ClassMember::Field(field) = &cu.classes[0].body.members[0] else {
        panic!("Expected field member");
    };
    assert_eq!(field.type_tree.ty, JavaType::build("a.experimental.Foo"));
}

#[test]
fn test_generic_parameter_attribution() {
    let cu = parse_source(indoc! {"
        package a;

        import a.experimental.Bound;

        class Box<T extends Bound> {
            T value;
        }
    "})
    .expect("Parse failed");

    let class = &cu.classes[0];
    let params = class.type_params.as_ref().expect("Expected type params");
    let bound = &params.params[0].1.bounds[0];
    assert_eq!(bound.tree.ty, JavaType::build("a.experimental.Bound"));

    let ClassMember::Field(field) = &class.body.members[0] else {
        panic!("Expected field member");
    };
    match &field.type_tree.ty {
        JavaType::Generic(g) => assert_eq!(g.name, "T"),
        other => panic!("Expected generic type, got {other}"),
    }
}

#[test]
fn test_constructor_method_type_returns_declaring_class() {
    let cu = parse_source(indoc! {"
        package a;

        class Foo {
            Foo(int count) {}
        }
    "})
    .expect("Parse failed");

    let ClassMember::Method(ctor) = &cu.classes[0].body.members[0] else {
        panic!("Expected constructor member");
    };
    assert!(ctor.return_type.is_none());
    match &ctor.method_type {
        JavaType::Method(m) => {
            assert_eq!(m.declaring, JavaType::build("a.Foo"));
            assert_eq!(m.return_type, JavaType::build("a.Foo"));
            assert_eq!(m.parameter_types, vec![JavaType::Primitive("int".into())]);
        }
        other => panic!("Expected method type, got {other}"),
    }
}

#[test]
fn test_unsupported_members_survive_as_raw() {
    let source = indoc! {"
        package a;

        enum Color {
            RED, GREEN;
        }
    "};
    let cu = parse_source(source).expect("Parse failed");
    assert_eq!(cu.classes[0].keyword, "enum");
    assert!(matches!(
        cu.classes[0].body.members[0],
        ClassMember::Raw(_)
    ));
    assert_eq!(printer::print(&cu), source);
}

#[test]
fn test_round_trip_is_byte_identical() {
    round_trip(indoc! {r#"
        // License header comment.
        package dev.morphia.aggregation.experimental;

        import java.util.List; // trailing comment
        import dev.morphia.query.experimental.filters.Filter;

        /**
         * A stage.
         */
        @SuppressWarnings("unchecked")
        public class Stage<T extends Filter> {
            private static final int LIMIT = 10;
            private List<Filter> filters;

            public Stage(List<Filter> filters) {
                this.filters = filters;
            }

            public Filter first() {
                Filter head = filters.get(0);
                return head;
            }

            void walk() {
                for (int i = 0; i < LIMIT; i++) {
                    process(filters.get(i));
                }
            }
        }
    "#});
}

#[test]
fn test_round_trip_preserves_odd_spacing() {
    round_trip("package  a . b ;\n\nclass   C\n{\n    int  x  =  1 ;\n}\n");
}

#[test]
fn test_parse_error_reports_line() {
    let err = parse_source("package a;\n\nclass {\n").expect_err("Expected parse failure");
    assert!(err.to_string().contains("line 3"), "{err}");
}

use crate::ast;
use crate::tables::LiteralValue;
use crate::tests::build_tables;

#[test]
fn collects_literal_arrays_from_declarations_and_assignments() {
    let code = r#"
        var a = [1, 2, 3];
        let b = ["x", "y"];
        c = [0x41, "mixed"];
    "#;
    let tree = ast::parse_program(code).unwrap();
    let tables = build_tables(tree.root_node(), code);

    assert_eq!(
        tables.arrays.get("a"),
        Some(&vec![
            LiteralValue::Num(1.0),
            LiteralValue::Num(2.0),
            LiteralValue::Num(3.0)
        ])
    );
    assert_eq!(
        tables.arrays.get("b"),
        Some(&vec![
            LiteralValue::Str("x".to_string()),
            LiteralValue::Str("y".to_string())
        ])
    );
    assert_eq!(
        tables.arrays.get("c"),
        Some(&vec![
            LiteralValue::Num(65.0),
            LiteralValue::Str("mixed".to_string())
        ])
    );
}

#[test]
fn any_non_literal_element_excludes_the_array() {
    let code = r#"
        var bad1 = [1, f(), 3];
        var bad2 = [1, ...rest];
        var bad3 = [x, 2];
        var ok = [];
    "#;
    let tree = ast::parse_program(code).unwrap();
    let tables = build_tables(tree.root_node(), code);

    assert!(!tables.arrays.contains_key("bad1"));
    assert!(!tables.arrays.contains_key("bad2"));
    assert!(!tables.arrays.contains_key("bad3"));
    assert_eq!(tables.arrays.get("ok"), Some(&vec![]));
}

#[test]
fn redeclaration_is_last_write_wins() {
    let code = r#"
        var a = [1, 2];
        var a = ["later"];
    "#;
    let tree = ast::parse_program(code).unwrap();
    let tables = build_tables(tree.root_node(), code);

    assert_eq!(
        tables.arrays.get("a"),
        Some(&vec![LiteralValue::Str("later".to_string())])
    );
}

#[test]
fn collects_segment_functions_in_all_three_forms() {
    let code = r#"
        function decl() { return "one"; }
        var expr = function () { return "two"; };
        var concise = () => "three";
        assigned = () => { return "four"; };
    "#;
    let tree = ast::parse_program(code).unwrap();
    let tables = build_tables(tree.root_node(), code);

    assert_eq!(tables.segments.get("decl").map(|s| s.value.as_str()), Some("one"));
    assert_eq!(tables.segments.get("expr").map(|s| s.value.as_str()), Some("two"));
    assert_eq!(
        tables.segments.get("concise").map(|s| s.value.as_str()),
        Some("three")
    );
    assert_eq!(
        tables.segments.get("assigned").map(|s| s.value.as_str()),
        Some("four")
    );
}

#[test]
fn nested_function_returns_do_not_count() {
    let code = r#"
        function outer() {
            function inner() { return "nested"; }
            return inner;
        }
    "#;
    let tree = ast::parse_program(code).unwrap();
    let tables = build_tables(tree.root_node(), code);

    assert!(tables.segments.contains_key("inner"));
    assert!(!tables.segments.contains_key("outer"));
}

#[test]
fn first_string_return_wins() {
    let code = r#"
        function branchy(flag) {
            if (flag) {
                return "first";
            }
            return "second";
        }
    "#;
    let tree = ast::parse_program(code).unwrap();
    let tables = build_tables(tree.root_node(), code);

    assert_eq!(
        tables.segments.get("branchy").map(|s| s.value.as_str()),
        Some("first")
    );
}

#[test]
fn non_string_returns_are_skipped_not_fatal() {
    let code = r#"
        function eventually(flag) {
            if (flag) {
                return 42;
            }
            return "text";
        }
    "#;
    let tree = ast::parse_program(code).unwrap();
    let tables = build_tables(tree.root_node(), code);

    assert_eq!(
        tables.segments.get("eventually").map(|s| s.value.as_str()),
        Some("text")
    );
}

#[test]
fn collects_numeric_constants_and_aliases() {
    let code = r#"
        var k = 0x10;
        let offset = 7;
        shift = 3.5;
        var S = b3;
        T = S;
    "#;
    let tree = ast::parse_program(code).unwrap();
    let tables = build_tables(tree.root_node(), code);

    assert_eq!(tables.constants.get("k"), Some(&16.0));
    assert_eq!(tables.constants.get("offset"), Some(&7.0));
    assert_eq!(tables.constants.get("shift"), Some(&3.5));
    assert_eq!(tables.aliases.get("S").map(String::as_str), Some("b3"));
    // Chains resolve through every edge.
    assert_eq!(tables.resolve_alias("T"), "b3");
}

#[test]
fn collects_object_property_maps() {
    let code = r#"
        var b3 = {
            a: function () { return "aa"; },
            "b": () => "bb",
            c() { return "cc"; }
        };
        b3.d = () => "dd";
        b3["e"] = function () { return "ee"; };
    "#;
    let tree = ast::parse_program(code).unwrap();
    let tables = build_tables(tree.root_node(), code);

    let props = tables.objects.get("b3").expect("object map collected");
    for key in ["a", "b", "c", "d", "e"] {
        assert!(props.contains_key(key), "missing property {key}");
    }
}

#[test]
fn object_redeclaration_replaces_the_map() {
    let code = r#"
        var b3 = { old: () => "oo" };
        var b3 = { fresh: () => "ff" };
    "#;
    let tree = ast::parse_program(code).unwrap();
    let tables = build_tables(tree.root_node(), code);

    let props = tables.objects.get("b3").unwrap();
    assert!(!props.contains_key("old"));
    assert!(props.contains_key("fresh"));
}

#[test]
fn callable_resolution_prefers_declarations_over_assignments() {
    let code = r#"
        var f;
        f = () => "via assignment";
        function g() { return "declared"; }
        g = () => "shadowed";
    "#;
    let tree = ast::parse_program(code).unwrap();
    let tables = build_tables(tree.root_node(), code);

    // f has only assignment history; the assignment applies.
    let f = tables.callables.get("f").unwrap();
    assert!(f.declared.is_none());
    assert!(f.assigned.is_some());

    // g is declared; the declaration wins over the later assignment.
    let g = tables.callables.get("g").unwrap();
    assert!(g.declared.is_some());
    assert_eq!(g.resolve().unwrap().id(), g.declared.unwrap().id());
}

#[test]
fn last_assignment_wins_in_write_history() {
    let code = r#"
        var f;
        f = () => "early";
        f = () => "late";
    "#;
    let tree = ast::parse_program(code).unwrap();
    let tables = build_tables(tree.root_node(), code);

    let resolved = tables.resolve_callable("f").unwrap();
    let text = ast::node_text(&resolved, code);
    assert!(text.contains("late"), "resolved {text:?}");
}

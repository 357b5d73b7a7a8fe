mod common;

use color_eyre::Result;
use common::*;
use proptest::prelude::*;
use templar::{
    expression::{Expression, InfixOperator},
    statement::{Statement, StatementList},
    value::{ListAdapter, Value},
};

fn defined_or_dash(object: &str, name: &str) -> Statement {
    if_chain(
        Expression::is_defined(attr(object, name)),
        vec![output(attr(object, name))],
        vec![(None, vec![text("-")])],
    )
}

#[test]
fn test_loop_metadata() -> Result<()> {
    let body = vec![
        output(attr("loop", "index")),
        text(":"),
        output(attr("loop", "index0")),
        text(":"),
        output(var("item")),
        text(":"),
        output(attr("loop", "first")),
        text(":"),
        output(attr("loop", "last")),
        text(":"),
        output(attr("loop", "length")),
        text("|"),
    ];
    let stmt = for_each(&["item"], var("items"), body);
    let actual = render_body(
        vec![Statement::For(stmt)],
        vec![("items", strings(&["a", "b", "c"]))],
    )?;
    assert_eq!(
        actual,
        "1:0:a:true:false:3|2:1:b:false:false:3|3:2:c:false:true:3|"
    );
    Ok(())
}

#[test]
fn test_single_item_is_first_and_last() -> Result<()> {
    let body = vec![output(attr("loop", "first")), output(attr("loop", "last"))];
    let stmt = for_each(&["item"], constant(Value::list([Value::from(7i64)])), body);
    assert_eq!(render_body(vec![Statement::For(stmt)], vec![])?, "truetrue");
    Ok(())
}

#[test]
fn test_previtem_and_nextitem_are_absent_at_edges() -> Result<()> {
    let body = vec![
        defined_or_dash("loop", "previtem"),
        text(">"),
        defined_or_dash("loop", "nextitem"),
        text("|"),
    ];
    let stmt = for_each(&["item"], constant(ints(&[1, 2, 3])), body);
    assert_eq!(render_body(vec![Statement::For(stmt)], vec![])?, "->2|1>3|2>-|");
    Ok(())
}

#[test]
fn test_neighbours_are_defined_even_when_falsy() -> Result<()> {
    let body = vec![defined_or_dash("loop", "nextitem"), text("|")];
    let items = Value::list([Value::from(false), Value::Empty]);
    let stmt = for_each(&["item"], constant(items), body);
    // The first item's neighbour is `Empty` but still bound, so it renders as nothing.
    assert_eq!(render_body(vec![Statement::For(stmt)], vec![])?, "|-|");
    Ok(())
}

#[test]
fn test_empty_sequence_renders_else_once() -> Result<()> {
    let mut stmt = for_each(&["item"], constant(ints(&[])), vec![text("body")]);
    stmt.else_body = Some(StatementList::new(vec![text("empty")]));
    assert_eq!(render_body(vec![Statement::For(stmt)], vec![])?, "empty");
    Ok(())
}

#[test]
fn test_non_iterable_source_renders_nothing() -> Result<()> {
    let mut stmt = for_each(&["item"], constant(42i64), vec![text("body")]);
    stmt.else_body = Some(StatementList::new(vec![text("empty")]));
    let actual = render_body(vec![text("<"), Statement::For(stmt), text(">")], vec![])?;
    assert_eq!(actual, "<>");
    Ok(())
}

#[test]
fn test_undefined_source_renders_nothing() -> Result<()> {
    let stmt = for_each(&["item"], var("missing"), vec![text("body")]);
    assert_eq!(render_body(vec![Statement::For(stmt)], vec![])?, "");
    Ok(())
}

#[test]
fn test_filter_keeps_matching_items_in_order() -> Result<()> {
    let mut stmt = for_each(
        &["item"],
        constant(Value::range(0, 7)),
        vec![output(var("item")), text("/"), output(attr("loop", "length")), text(" ")],
    );
    stmt.if_expr = Some(infix(
        InfixOperator::Equal,
        infix(InfixOperator::Modulo, var("item"), constant(2i64)),
        constant(0i64),
    ));
    assert_eq!(
        render_body(vec![Statement::For(stmt)], vec![])?,
        "0/4 2/4 4/4 6/4 "
    );
    Ok(())
}

#[test]
fn test_filter_rejecting_everything_renders_else() -> Result<()> {
    let mut stmt = for_each(&["item"], constant(ints(&[1, 2])), vec![text("body")]);
    stmt.if_expr = Some(constant(false));
    stmt.else_body = Some(StatementList::new(vec![text("empty")]));
    assert_eq!(render_body(vec![Statement::For(stmt)], vec![])?, "empty");
    Ok(())
}

#[test]
fn test_filter_bindings_do_not_leak() -> Result<()> {
    let mut stmt = for_each(&["item"], constant(ints(&[1, 2])), vec![]);
    stmt.if_expr = Some(constant(false));
    let body = vec![
        Statement::For(stmt),
        if_chain(
            Expression::is_defined(var("item")),
            vec![text("leaked")],
            vec![(None, vec![text("clean")])],
        ),
    ];
    assert_eq!(render_body(body, vec![])?, "clean");
    Ok(())
}

#[test]
fn test_multiple_vars_read_fields() -> Result<()> {
    let items = Value::list([
        Value::map([("name", Value::from("a")), ("count", Value::from(1i64))]),
        Value::map([("name", Value::from("b")), ("count", Value::from(2i64))]),
    ]);
    let stmt = for_each(
        &["name", "count"],
        constant(items),
        vec![output(var("name")), output(var("count"))],
    );
    assert_eq!(render_body(vec![Statement::For(stmt)], vec![])?, "a1b2");
    Ok(())
}

#[test]
fn test_filter_on_field_bound_vars() -> Result<()> {
    let items = Value::list([
        Value::map([("name", Value::from("a")), ("count", Value::from(1i64))]),
        Value::map([("name", Value::from("b")), ("count", Value::from(3i64))]),
        Value::map([("name", Value::from("c")), ("count", Value::from(2i64))]),
        Value::map([("name", Value::from("d")), ("count", Value::from(0i64))]),
        Value::map([("name", Value::from("e")), ("count", Value::from(5i64))]),
    ]);
    let mut stmt = for_each(
        &["name", "count"],
        constant(items),
        vec![
            output(var("name")),
            output(var("count")),
            text(":"),
            output(attr("loop", "index")),
            text("/"),
            output(attr("loop", "length")),
            text(" "),
        ],
    );
    stmt.if_expr = Some(infix(InfixOperator::Greater, var("count"), constant(1i64)));
    assert_eq!(
        render_body(vec![Statement::For(stmt)], vec![])?,
        "b3:1/3 c2:2/3 e5:3/3 "
    );
    Ok(())
}

fn range(start: i64, stop: i64, step: i64) -> Value {
    Value::List(ListAdapter::Range { start, stop, step })
}

fn joined(source: Value) -> Statement {
    Statement::For(for_each(&["i"], constant(source), vec![output(var("i")), text(",")]))
}

#[test]
fn test_extreme_range_with_rejecting_filter_renders_else() -> Result<()> {
    let mut stmt = for_each(&["i"], constant(range(i64::MIN, i64::MAX, i64::MAX)), vec![]);
    stmt.if_expr = Some(constant(false));
    stmt.else_body = Some(StatementList::new(vec![text("empty")]));
    assert_eq!(render_body(vec![Statement::For(stmt)], vec![])?, "empty");
    Ok(())
}

#[test]
fn test_ranges_at_integer_limits() -> Result<()> {
    assert_eq!(
        render_body(vec![joined(range(i64::MIN, i64::MAX, i64::MAX))], vec![])?,
        "-9223372036854775808,-1,9223372036854775806,"
    );
    assert_eq!(
        render_body(vec![joined(range(i64::MAX, i64::MIN, i64::MIN))], vec![])?,
        "9223372036854775807,-1,"
    );
    assert_eq!(
        render_body(vec![joined(Value::range(i64::MAX - 2, i64::MAX))], vec![])?,
        "9223372036854775805,9223372036854775806,"
    );
    Ok(())
}

#[test]
fn test_full_width_range_size_saturates() {
    let Value::List(items) = Value::range(i64::MIN, i64::MAX) else {
        panic!("range is a list");
    };
    assert_eq!(items.size(), usize::MAX);
    assert_eq!(items.get(0).map(|v| v.to_string()), Some(i64::MIN.to_string()));
}

#[test]
fn test_map_source_iterates_keys() -> Result<()> {
    let items = Value::map([("beta", Value::from(2i64)), ("alpha", Value::from(1i64))]);
    let stmt = for_each(&["key"], constant(items), vec![output(var("key")), text(",")]);
    assert_eq!(render_body(vec![Statement::For(stmt)], vec![])?, "alpha,beta,");
    Ok(())
}

#[test]
fn test_inner_loop_shadows_outer_loop_metadata() -> Result<()> {
    let inner = for_each(&["y"], constant(strings(&["a", "b"])), vec![output(attr("loop", "index"))]);
    let outer = for_each(
        &["x"],
        constant(ints(&[1, 2])),
        vec![Statement::For(inner), output(attr("loop", "index")), text(";")],
    );
    assert_eq!(render_body(vec![Statement::For(outer)], vec![])?, "121;122;");
    Ok(())
}

#[test]
fn test_else_uses_enclosing_scope() -> Result<()> {
    let mut empty = for_each(&["item"], constant(ints(&[])), vec![]);
    empty.else_body = Some(StatementList::new(vec![output(var("item"))]));
    let full = for_each(&["item"], constant(ints(&[1, 2])), vec![output(var("item"))]);
    let body = vec![
        set(&["item"], constant("outer")),
        Statement::For(empty),
        text("|"),
        Statement::For(full),
        text("|"),
        output(var("item")),
    ];
    assert_eq!(render_body(body, vec![])?, "outer|12|outer");
    Ok(())
}

#[test]
fn test_loop_propagates_evaluation_errors() {
    let stmt = for_each(
        &["item"],
        constant(ints(&[1])),
        vec![output(infix(InfixOperator::Add, var("item"), constant("x")))],
    );
    let error = render_body(vec![Statement::For(stmt)], vec![]).unwrap_err();
    assert_eq!(error.code(), "EV003");
}

proptest! {
    #[test]
    fn loop_indices_follow_position(items in prop::collection::vec(any::<i64>(), 0..16)) {
        let body = vec![
            output(attr("loop", "index0")),
            text(","),
            output(attr("loop", "index")),
            text(","),
            output(attr("loop", "first")),
            text(","),
            output(attr("loop", "last")),
            text(";"),
        ];
        let stmt = for_each(&["item"], constant(ints(&items)), body);
        let actual = render_body(vec![Statement::For(stmt)], vec![]).unwrap();
        let expected = (0..items.len())
            .map(|i| format!("{},{},{},{};", i, i + 1, i == 0, i + 1 == items.len()))
            .collect::<String>();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn loop_neighbours_match_sequence(items in prop::collection::vec(0i64..1000, 1..16)) {
        let body = vec![
            defined_or_dash("loop", "previtem"),
            text(">"),
            defined_or_dash("loop", "nextitem"),
            text(";"),
        ];
        let stmt = for_each(&["item"], constant(ints(&items)), body);
        let actual = render_body(vec![Statement::For(stmt)], vec![]).unwrap();
        let expected = (0..items.len())
            .map(|i| {
                let previous = if i > 0 { items[i - 1].to_string() } else { "-".to_string() };
                let next = items.get(i + 1).map_or("-".to_string(), |v| v.to_string());
                format!("{previous}>{next};")
            })
            .collect::<String>();
        prop_assert_eq!(actual, expected);
    }
}

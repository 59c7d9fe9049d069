use std::cell::Cell;
use std::rc::Rc;

use retree_core::{h, memo, memo_with, Component, EventHandler, Props, VNode};
use retree_testing::TestRoot;

fn counted_row(calls: &Rc<Cell<usize>>) -> Component {
    let calls = calls.clone();
    Component::new("Row", move |_, props| {
        calls.set(calls.get() + 1);
        let label = props.get("label").map(ToString::to_string);
        Some(h("li").child(label).build())
    })
}

fn rows(row: &Component, labels: &[&str], tick: i32) -> VNode {
    h("ul")
        .children(labels.iter().enumerate().map(|(index, label)| {
            row.element()
                .key(index)
                .prop("label", *label)
                .prop("tick", tick)
        }))
        .build()
}

fn label(props: &Props) -> Option<String> {
    props.get("label").map(ToString::to_string)
}

#[test]
fn memo_skips_rows_with_equal_props() {
    let calls = Rc::new(Cell::new(0));
    let row = memo(&counted_row(&calls));
    assert_eq!(row.name(), "Memo(Row)");

    let mut test = TestRoot::mount(rows(&row, &["a", "b"], 0));
    assert_eq!(calls.get(), 2);

    test.update(rows(&row, &["a", "b"], 0)).unwrap();
    assert_eq!(calls.get(), 2);
    assert!(test.mutations().is_empty());

    test.update(rows(&row, &["a", "c"], 0)).unwrap();
    assert_eq!(calls.get(), 3);
    assert_eq!(test.text(), "ac");
    assert_eq!(test.stats().text_updates, 1);
}

#[test]
fn plain_components_rerender_every_pass() {
    let calls = Rc::new(Cell::new(0));
    let row = counted_row(&calls);

    let mut test = TestRoot::mount(rows(&row, &["a", "b"], 0));
    test.update(rows(&row, &["a", "b"], 0)).unwrap();

    assert_eq!(calls.get(), 4);
    assert!(test.mutations().is_empty());
}

#[test]
fn memo_with_uses_the_custom_comparison() {
    let calls = Rc::new(Cell::new(0));
    let row = memo_with(&counted_row(&calls), |prev, next| label(prev) == label(next));

    let mut test = TestRoot::mount(rows(&row, &["a"], 0));
    test.update(rows(&row, &["a"], 1)).unwrap();
    test.update(rows(&row, &["a"], 2)).unwrap();
    assert_eq!(calls.get(), 1);

    test.update(rows(&row, &["z"], 2)).unwrap();
    assert_eq!(calls.get(), 2);
    assert_eq!(test.text(), "z");
}

#[test]
fn memo_changes_on_tick_without_custom_comparison() {
    let calls = Rc::new(Cell::new(0));
    let row = memo(&counted_row(&calls));

    let mut test = TestRoot::mount(rows(&row, &["a"], 0));
    test.update(rows(&row, &["a"], 1)).unwrap();

    assert_eq!(calls.get(), 2);
    assert!(test.mutations().is_empty());
}

#[test]
fn memo_skips_rows_sharing_a_handler() {
    let calls = Rc::new(Cell::new(0));
    let row = memo(&counted_row(&calls));
    let stable = EventHandler::new(|_| {});
    let list = |handler: &EventHandler| {
        h("ul")
            .child(
                row.element()
                    .key(1)
                    .prop("label", "a")
                    .prop("onToggle", handler.clone()),
            )
            .build()
    };

    let mut test = TestRoot::mount(list(&stable));
    test.update(list(&stable)).unwrap();
    test.update(list(&stable)).unwrap();
    assert_eq!(calls.get(), 1);

    test.update(list(&EventHandler::new(|_| {}))).unwrap();
    assert_eq!(calls.get(), 2);
}

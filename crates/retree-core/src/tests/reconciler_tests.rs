use super::{child_at, mounted};
use crate::{
    first_host_node, fragment, h, Component, HostDocument, HostError, MemoryDocument, Mutation,
    RenderError, Root, VNode, Value,
};

fn keyed_list(keys: &[&str]) -> VNode {
    h("ul")
        .children(keys.iter().map(|key| h("li").key(*key).child(*key)))
        .build()
}

#[test]
fn text_change_only_touches_the_text_node() {
    let (mut root, container) = mounted(h("p").child("a").build());
    let paragraph = child_at(&root, container, 0);
    let text = child_at(&root, paragraph, 0);

    root.update(h("p").child("b").build()).unwrap();

    assert_eq!(
        root.document().mutations(),
        &[Mutation::SetText {
            id: text,
            text: "b".into()
        }]
    );
}

#[test]
fn identical_tree_is_a_no_op() {
    let (mut root, _) = mounted(keyed_list(&["a", "b", "c"]));
    root.update(keyed_list(&["a", "b", "c"])).unwrap();
    root.run_until_idle().unwrap();
    assert!(root.document().mutations().is_empty());
}

#[test]
fn keyed_reorder_moves_existing_nodes() {
    let (mut root, container) = mounted(keyed_list(&["a", "b", "c", "d"]));
    let list = child_at(&root, container, 0);
    let before = root.document().children(list);

    root.update(keyed_list(&["d", "a", "c", "b"])).unwrap();

    let after = root.document().children(list);
    assert_eq!(after, vec![before[3], before[0], before[2], before[1]]);
    assert_eq!(root.document().text_content(list), "dacb");
    let stats = root.document().stats();
    assert_eq!(stats.created, 0);
    assert_eq!(stats.removed, 0);
    assert_eq!(stats.inserted, 3);
}

#[test]
fn duplicate_keys_are_all_accounted_for() {
    let (mut root, container) = mounted(keyed_list(&["a", "a", "b"]));
    let list = child_at(&root, container, 0);
    let first = child_at(&root, list, 0);

    root.update(keyed_list(&["a"])).unwrap();
    assert_eq!(root.document().children(list), vec![first]);
    // container, list, item, item text
    assert_eq!(root.document().len(), 4);

    root.update(keyed_list(&[])).unwrap();
    assert!(root.document().children(list).is_empty());
    assert_eq!(root.document().len(), 2);
}

#[test]
fn unkeyed_children_match_by_forward_type_scan() {
    let (mut root, container) = mounted(
        h("div")
            .child(h("span").prop("title", "A"))
            .child(h("p"))
            .child(h("span").prop("title", "B"))
            .build(),
    );
    let div = child_at(&root, container, 0);
    let span_a = child_at(&root, div, 0);
    let paragraph = child_at(&root, div, 1);
    let span_b = child_at(&root, div, 2);

    root.update(
        h("div")
            .child(h("p"))
            .child(h("span").prop("title", "B"))
            .build(),
    )
    .unwrap();

    assert_eq!(root.document().children(div), vec![paragraph, span_b]);
    assert!(!root.document().contains(span_a));
    assert_eq!(
        root.document().mutations(),
        &[Mutation::Remove {
            parent: div,
            child: span_a
        }]
    );
}

#[test]
fn type_change_replaces_the_host_node() {
    let (mut root, container) = mounted(h("div").child(h("span").child("x")).build());
    let div = child_at(&root, container, 0);
    let span = child_at(&root, div, 0);

    root.update(h("div").child(h("p").child("x")).build()).unwrap();

    let replacement = child_at(&root, div, 0);
    assert_ne!(replacement, span);
    assert!(!root.document().contains(span));
    assert_eq!(root.document().tag(replacement), Some("p"));
    assert!(root
        .document()
        .mutations()
        .contains(&Mutation::Remove { parent: div, child: span }));
}

#[test]
fn component_rendering_nothing_keeps_its_slot() {
    let maybe = Component::new("Maybe", |_, props| {
        props
            .get("show")
            .and_then(Value::as_bool)
            .unwrap_or(false)
            .then(|| h("b").child("x").build())
    });
    let tree = |show: bool| {
        h("div")
            .child(maybe.element().prop("show", show))
            .child(h("i"))
            .build()
    };

    let (mut root, container) = mounted(tree(false));
    let div = child_at(&root, container, 0);
    assert_eq!(root.document().children(div).len(), 1);

    root.update(tree(true)).unwrap();
    let tags: Vec<_> = root
        .document()
        .children(div)
        .into_iter()
        .map(|id| root.document().tag(id).unwrap_or_default().to_owned())
        .collect();
    assert_eq!(tags, ["b", "i"]);

    let component = root.instance().unwrap().children()[0].as_ref().unwrap();
    assert_eq!(component.path().as_str(), "root/Maybe:0");
    assert_eq!(
        first_host_node(component),
        Some(child_at(&root, div, 0))
    );
    assert_eq!(
        component.children()[0].as_ref().unwrap().path().as_str(),
        "root/Maybe:0/b:0"
    );

    root.update(tree(false)).unwrap();
    assert_eq!(root.document().text_content(div), "");
    assert_eq!(root.document().children(div).len(), 1);
}

#[test]
fn fragments_reorder_in_front_of_their_next_sibling() {
    let tree = |keys: [&str; 2]| {
        h("div")
            .child(fragment(keys.map(|key| h("span").key(key).child(key))))
            .child(h("footer").child("end"))
            .build()
    };
    let (mut root, container) = mounted(tree(["a", "b"]));
    let div = child_at(&root, container, 0);

    root.update(tree(["b", "a"])).unwrap();

    assert_eq!(root.document().text_content(div), "baend");
    assert_eq!(root.document().stats().inserted, 1);
}

#[test]
fn unkeyed_component_paths_rank_among_same_typed_siblings() {
    let child = Component::new("Child", |scope, _| {
        scope.use_state(|| 0);
        None
    });
    let app = {
        let child = child.clone();
        Component::new("App", move |_, _| {
            Some(
                h("div")
                    .child(child.element().key("x"))
                    .child(child.element())
                    .child(child.element())
                    .build(),
            )
        })
    };

    let (root, _) = mounted(app.element().build());
    let paths: Vec<_> = root
        .tracked_paths()
        .iter()
        .map(|path| path.to_string())
        .collect();
    assert_eq!(
        paths,
        ["root", "root/div:0/x", "root/div:0/Child:1", "root/div:0/Child:2"]
    );
}

#[test]
fn host_failures_surface_as_render_errors() {
    let mut document = MemoryDocument::new();
    let text = document.create_text("not an element");
    let mut root = Root::new(document);

    let err = root
        .setup(Some(h("div").build()), Some(text))
        .unwrap_err();
    assert!(matches!(
        err,
        RenderError::Host(HostError::NotAnElement { id }) if id == text
    ));
    assert!(root.instance().is_none());
}

use std::cell::RefCell;
use std::rc::Rc;

use super::{mounted, take, Log};
use crate::{
    deps, h, Cleanup, Component, HostDocument, MemoryDocument, RenderError, RenderOptions, Root,
    StateSetter,
};

fn tracked_counter(log: &Log, setter: &Rc<RefCell<Option<StateSetter<i32>>>>) -> Component {
    let log = log.clone();
    let setter = setter.clone();
    Component::new("Counter", move |scope, _| {
        let (count, set_count) = scope.use_state(|| 0);
        *setter.borrow_mut() = Some(set_count);
        let log = log.clone();
        scope.use_effect(
            move || {
                log.borrow_mut().push("mounted".into());
                Cleanup::new(move || log.borrow_mut().push("cleanup".into()))
            },
            deps![],
        );
        Some(h("span").child(count).build())
    })
}

#[test]
fn setup_validates_its_arguments_in_order() {
    let mut document = MemoryDocument::new();
    let container = document.create_element("div");
    let mut root = Root::new(document);

    assert!(matches!(
        root.setup(None, None),
        Err(RenderError::MissingContainer)
    ));
    assert!(matches!(
        root.setup(None, Some(container)),
        Err(RenderError::MissingRoot)
    ));
    assert!(matches!(
        root.setup(Some(h("p").build()), Some(99)),
        Err(RenderError::UnknownContainer(99))
    ));
    assert!(root.instance().is_none());
    assert_eq!(root.passes(), 0);
}

#[test]
fn setup_replaces_the_previous_root() {
    let log: Log = Rc::default();
    let setter = Rc::default();
    let counter = tracked_counter(&log, &setter);
    let (mut root, container) = mounted(counter.element().build());
    assert_eq!(take(&log), ["mounted"]);

    let stale = setter.borrow().clone().unwrap();
    stale.set(3);
    assert!(root.has_pending_work());

    root.setup(Some(h("p").child("fresh").build()), Some(container))
        .unwrap();

    assert_eq!(take(&log), ["cleanup"]);
    assert!(!root.has_pending_work());
    assert_eq!(stale.get(), None);
    assert_eq!(root.document().children(container).len(), 1);
    assert_eq!(root.document().text_content(container), "fresh");
    assert!(root.tracked_paths().is_empty());
}

#[test]
fn setup_empties_a_prefilled_container() {
    let mut document = MemoryDocument::new();
    let container = document.create_element("div");
    let stray = document.create_element("aside");
    document.insert_before(container, stray, None).unwrap();
    let mut root = Root::new(document);

    root.setup(Some(h("main").build()), Some(container)).unwrap();

    assert!(!root.document().contains(stray));
    let children = root.document().children(container);
    assert_eq!(children.len(), 1);
    assert_eq!(root.document().tag(children[0]), Some("main"));
}

#[test]
fn unmount_removes_the_tree_and_runs_cleanups() {
    let log: Log = Rc::default();
    let setter = Rc::default();
    let counter = tracked_counter(&log, &setter);
    let (mut root, container) = mounted(h("section").child(counter.element()).build());
    take(&log);

    root.unmount().unwrap();

    assert_eq!(take(&log), ["cleanup"]);
    assert!(root.document().children(container).is_empty());
    assert!(root.instance().is_none());
    assert!(root.container().is_none());
    assert!(root.tracked_paths().is_empty());
    assert!(matches!(
        root.update(h("p").build()),
        Err(RenderError::MissingContainer)
    ));
}

#[test]
fn step_runs_one_task_at_a_time() {
    let log: Log = Rc::default();
    let setter = Rc::default();
    let counter = tracked_counter(&log, &setter);
    let (mut root, container) = mounted(counter.element().build());
    assert!(!root.step().unwrap());

    setter.borrow().clone().unwrap().set(4);
    let passes = root.passes();
    assert!(root.step().unwrap());
    assert_eq!(root.passes(), passes + 1);
    assert_eq!(root.document().text_content(container), "4");
    assert!(!root.step().unwrap());
}

#[test]
fn runaway_updates_report_unsettled() {
    let runaway = Component::new("Runaway", |scope, _| {
        let (count, set_count) = scope.use_state(|| 0);
        scope.use_effect(move || set_count.set(count + 1), None);
        Some(h("span").child(count).build())
    });
    let mut document = MemoryDocument::new();
    let container = document.create_element("div");
    let options = RenderOptions {
        max_passes: 5,
        ..RenderOptions::default()
    };
    let mut root = Root::with_options(document, options);
    root.setup(Some(runaway.element().build()), Some(container))
        .unwrap();

    let err = root.run_until_idle().unwrap_err();

    assert!(matches!(err, RenderError::Unsettled { passes: 5 }));
    assert!(!root.has_pending_work());
    assert_eq!(root.document().text_content(container), "5");
}

#[test]
fn root_path_is_configurable() {
    let child = Component::new("Child", |_, _| None);
    let app = {
        let child = child.clone();
        Component::new("App", move |_, _| Some(h("div").child(child.element()).build()))
    };
    let mut document = MemoryDocument::new();
    let container = document.create_element("div");
    let options = RenderOptions {
        root_path: "app".into(),
        ..RenderOptions::default()
    };
    let mut root = Root::with_options(document, options);
    root.setup(Some(app.element().build()), Some(container))
        .unwrap();

    let paths: Vec<_> = root.tracked_paths().iter().map(|p| p.to_string()).collect();
    assert_eq!(paths, ["app", "app/div:0/Child:0"]);
}

#[test]
fn render_without_setup_does_nothing() {
    let mut root = Root::new(MemoryDocument::new());
    root.render().unwrap();
    assert_eq!(root.passes(), 0);
    assert!(root.instance().is_none());
    assert_eq!(root.run_until_idle().unwrap(), 0);
}

use retree_core::{deps, h, Cleanup, Component, RenderError, RenderOptions, VNode};
use retree_testing::{CallLog, TestRoot};

fn logged(name: &'static str, log: &CallLog, child: Option<Component>) -> Component {
    let log = log.clone();
    Component::new(name, move |scope, _| {
        let log = log.clone();
        scope.use_effect(
            move || {
                log.push(format!("effect {name}"));
                Cleanup::new(move || log.push(format!("cleanup {name}")))
            },
            deps![],
        );
        Some(
            h("div")
                .child(child.as_ref().map(|child| child.element()))
                .build(),
        )
    })
}

#[test]
fn effects_run_in_render_order_after_the_pass() {
    let log = CallLog::new();
    let child = logged("Child", &log, None);
    let parent = logged("Parent", &log, Some(child));
    let mut test = TestRoot::new();

    test.setup(parent.element()).unwrap();
    assert!(log.is_empty());
    assert!(test.root().has_pending_work());

    assert_eq!(test.flush().unwrap(), 0);
    assert_eq!(log.take(), ["effect Parent", "effect Child"]);

    test.root_mut().unmount().unwrap();
    assert_eq!(log.take(), ["cleanup Parent", "cleanup Child"]);
    assert!(test.host_children().is_empty());
}

#[test]
fn removing_a_keyed_item_runs_only_its_cleanup() {
    let log = CallLog::new();
    let items = ["a", "b", "c"].map(|name| logged(name, &log, None));
    let list = |keep: &[usize]| -> VNode {
        h("section")
            .children(keep.iter().map(|&i| items[i].element().key(i)))
            .build()
    };
    let mut test = TestRoot::mount(list(&[0, 1, 2]));
    log.take();

    test.update(list(&[0, 2])).unwrap();
    test.flush().unwrap();

    assert_eq!(log.take(), ["cleanup b"]);
    assert_eq!(test.root().tracked_paths().len(), 2);
}

#[test]
fn state_set_from_an_effect_settles() {
    let loader = Component::new("Loader", |scope, _| {
        let (status, set_status) = scope.use_state_value(String::from("loading"));
        scope.use_effect(move || set_status.set(String::from("ready")), deps![]);
        Some(h("p").child(status).build())
    });
    let mut test = TestRoot::new();

    test.setup(loader.element()).unwrap();
    assert_eq!(test.text(), "loading");

    assert_eq!(test.flush().unwrap(), 1);
    assert_eq!(test.text(), "ready");
    assert!(!test.root().has_pending_work());
}

#[test]
fn effect_loops_are_cut_off() {
    let runaway = Component::new("Runaway", |scope, _| {
        let (count, set_count) = scope.use_state(|| 0u64);
        scope.use_effect(move || set_count.set(count + 1), None);
        Some(h("output").child(count).build())
    });
    let mut test = TestRoot::with_options(RenderOptions {
        max_passes: 5,
        ..RenderOptions::default()
    });

    test.setup(runaway.element()).unwrap();
    let err = test.flush().unwrap_err();

    assert!(matches!(err, RenderError::Unsettled { passes: 5 }));
    assert!(err.to_string().contains('5'));
    assert!(!test.root().has_pending_work());
}

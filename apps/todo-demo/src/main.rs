use std::collections::BTreeMap;
use std::rc::Rc;

use log::{info, warn};
use retree_core::{
    component, deps, h, memo, Component, Element, Event, EventHandler, HostDocument,
    HostNodeId, MemoryDocument, Props, RenderError, Root, Scope, Value,
};
use retree_runtime_std::StdRuntime;

#[derive(Debug, Clone)]
struct Todo {
    id: u32,
    title: Rc<str>,
    done: bool,
}

type Todos = Rc<Vec<Todo>>;

const TITLES: &[&str] = &["write the reconciler", "wire up hooks", "ship the demo"];

#[component]
fn TodoItem(_scope: &mut Scope<'_>, props: &Props) -> Element {
    let id = props.get("id").and_then(Value::as_int).unwrap_or_default();
    let done = props.get("done").and_then(Value::as_bool).unwrap_or(false);
    let title = props.get("title").map(ToString::to_string).unwrap_or_default();
    info!("rendering todo {id}");
    let mut toggle = h("button").prop("id", format!("toggle-{id}"));
    if let Some(handler) = props.get("onToggle").and_then(Value::as_handler) {
        toggle = toggle.on_handler("click", handler.clone());
    }
    Some(
        h("li")
            .class(if done { "done" } else { "" })
            .child(toggle.child(if done { "undo" } else { "done" }))
            .child(title)
            .build(),
    )
}

#[component]
fn Footer(scope: &mut Scope<'_>, props: &Props) -> Element {
    let remaining = props.get("remaining").cloned().unwrap_or(Value::Int(0));
    let logged = remaining.clone();
    scope.use_effect(move || info!("{logged} todos left"), deps![remaining.clone()]);
    Some(h("footer").child(format!("{remaining} left")).build())
}

#[component]
fn TodoApp(scope: &mut Scope<'_>, _props: &Props) -> Element {
    let item = scope.use_ref(|| memo(&TodoItem)).borrow().clone();
    let (todos, set_todos) = scope.use_state(|| Todos::new(Vec::new()));
    let (next_id, set_next_id) = scope.use_state(|| 1u32);
    // One toggle handler per todo id, so unchanged rows keep equal props.
    let handlers = scope.use_ref(BTreeMap::<u32, EventHandler>::new);

    let add = {
        let set_todos = set_todos.clone();
        move |_: &Event| {
            let title = TITLES[(next_id as usize - 1) % TITLES.len()];
            set_todos.update(|todos| {
                let mut todos = Vec::clone(todos);
                todos.push(Todo {
                    id: next_id,
                    title: title.into(),
                    done: false,
                });
                Rc::new(todos)
            });
            set_next_id.set(next_id + 1);
        }
    };
    let clear = {
        let set_todos = set_todos.clone();
        move |_: &Event| {
            set_todos.update(|todos| {
                Rc::new(todos.iter().filter(|todo| !todo.done).cloned().collect())
            });
        }
    };

    let mut handlers = handlers.borrow_mut();
    handlers.retain(|id, _| todos.iter().any(|todo| todo.id == *id));
    let rows: Vec<_> = todos
        .iter()
        .map(|todo| {
            let id = todo.id;
            let toggle = handlers
                .entry(id)
                .or_insert_with(|| {
                    let set_todos = set_todos.clone();
                    EventHandler::new(move |_| {
                        set_todos.update(|todos| {
                            Rc::new(
                                todos
                                    .iter()
                                    .map(|t| Todo {
                                        done: t.done != (t.id == id),
                                        ..t.clone()
                                    })
                                    .collect(),
                            )
                        });
                    })
                })
                .clone();
            item.element()
                .key(id)
                .prop("id", id)
                .prop("title", todo.title.clone())
                .prop("done", todo.done)
                .prop("onToggle", toggle)
        })
        .collect();
    let remaining = todos.iter().filter(|todo| !todo.done).count();

    Some(
        h("section")
            .prop("id", "app")
            .child(h("h1").child("todos"))
            .child(h("button").prop("id", "add").on("click", add).child("add"))
            .child(h("ul").children(rows))
            .child(
                h("button")
                    .prop("id", "clear")
                    .on("click", clear)
                    .child("clear done"),
            )
            .child(Footer.element().prop("remaining", remaining))
            .build(),
    )
}

fn click(root: &Root<MemoryDocument>, container: HostNodeId, id: &str) -> Result<(), RenderError> {
    let Some(target) = root.document().find_by_id(container, id) else {
        warn!("no element with id `{id}`");
        return Ok(());
    };
    let listeners = root.document().dispatch_event(target, "click")?;
    info!("click on `{id}` reached {listeners} listener(s)");
    Ok(())
}

fn drive(runtime: &StdRuntime, root: &mut Root<MemoryDocument>) -> Result<(), RenderError> {
    if runtime.take_frame_request() {
        let passes = root.run_until_idle()?;
        info!("frame settled after {passes} render pass(es)");
    }
    Ok(())
}

fn main() -> Result<(), RenderError> {
    env_logger::init();

    let runtime = StdRuntime::new();
    let mut document = MemoryDocument::new();
    let container = document.create_element("div");
    let mut root = runtime.root(document);

    let app: &Component = &TodoApp;
    root.setup(Some(app.element().build()), Some(container))?;
    drive(&runtime, &mut root)?;

    let script = ["add", "add", "add", "toggle-2", "toggle-1", "clear", "toggle-3"];
    for id in script {
        click(&root, container, id)?;
        drive(&runtime, &mut root)?;
        println!("after {id}:");
        println!("  {}", root.document().inner_html(container));
        let stats = root.document().stats();
        println!(
            "  {} mutations ({} created, {} text updates)",
            stats.total(),
            stats.created,
            stats.text_updates
        );
        root.document_mut().clear_mutations();
    }

    root.unmount()?;
    Ok(())
}

use crate::element::{Component, Element, Props};
use crate::equals::props_shallow_equal;

/// Wraps `component` so it is only re-invoked when its props change under
/// [`props_shallow_equal`]. Otherwise the previous descriptor is reused.
///
/// Every call returns a new component type; create the wrapper once and
/// reuse it, or hook state is lost on each render.
pub fn memo(component: &Component) -> Component {
    memo_with(component, props_shallow_equal)
}

pub fn memo_with<F>(component: &Component, equals: F) -> Component
where
    F: Fn(&Props, &Props) -> bool + 'static,
{
    let inner = component.clone();
    let name = format!("Memo({})", inner.name());
    Component::new(name, move |scope, props| {
        let cache = scope.use_ref(|| None::<(Props, Element)>);
        if let Some((previous, result)) = &*cache.borrow() {
            if equals(previous, props) {
                return result.clone();
            }
        }
        let result = inner.render(scope, props);
        *cache.borrow_mut() = Some((props.clone(), result.clone()));
        result
    })
}

#![forbid(unsafe_code)]

//! The component host: mount, unmount, and the update loop.
//!
//! # Design
//!
//! [`App`] wraps a component together with its state store, a shared
//! document, the live-node reference, and the event binding table. The
//! state container's change listener is the internal update routine; it
//! holds a `Weak` back-reference, so views handed to handlers never keep a
//! dropped app alive.
//!
//! The update routine runs only while mounted: render → parse to one root
//! element → replace the previous live node in place → rebind declarative
//! handlers → fire `on_update`. All of it happens synchronously inside the
//! state write that triggered it.
//!
//! # Failure Modes
//!
//! - **Host missing**: `mount` fails with [`RuntimeError::TargetNotFound`]
//!   and inserts nothing anywhere.
//! - **Bad render output**: parse errors surface from `mount` or, for
//!   updates, propagate out of the state write that triggered the render.
//! - **Unknown handler name in a marker**: the one permissive path —
//!   binding is skipped silently.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use ahash::RandomState;
use joko_dom::{Document, DomError, MarkupError, NodeId};
use joko_reactive::{BoxError, Change, ChangeListener, Fields, StateView};
use tracing::debug;

use crate::component::{Component, Event, EventKind};

/// Mount/update failures.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// No attached element carries the requested host identifier.
    #[error("mount target not found: #{id}")]
    TargetNotFound { id: String },

    /// Render output did not parse to a single root element.
    #[error(transparent)]
    Markup(#[from] MarkupError),

    #[error(transparent)]
    Dom(#[from] DomError),

    /// A component instance supports one mount round-trip.
    #[error("component is already mounted")]
    AlreadyMounted,

    /// The update routine ran without a live node.
    #[error("component has no live node")]
    NotAttached,
}

type BindingTable = HashMap<(NodeId, EventKind), String, RandomState>;

/// A component host owning one state container and one live-node slot.
pub struct App<C: Component + 'static> {
    inner: Rc<AppInner<C>>,
}

impl<C: Component + 'static> std::fmt::Debug for App<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("mounted", &self.inner.mounted.get())
            .field("live", &self.inner.live.get())
            .finish_non_exhaustive()
    }
}

struct AppInner<C: Component + 'static> {
    component: C,
    doc: Rc<RefCell<Document>>,
    /// Swappable backing store. `set_state` replaces the inner `Rc`
    /// wholesale; existing views keep pointing at the superseded store.
    store: RefCell<Rc<RefCell<Fields>>>,
    listener: ChangeListener,
    live: Cell<Option<NodeId>>,
    mounted: Cell<bool>,
    bindings: RefCell<BindingTable>,
}

impl<C: Component + 'static> App<C> {
    /// Host `component` over `doc` with an empty state container.
    #[must_use]
    pub fn new(component: C, doc: Rc<RefCell<Document>>) -> Self {
        Self::with_state(component, doc, Fields::new())
    }

    /// Host `component` over `doc` with `initial` state fields.
    #[must_use]
    pub fn with_state(component: C, doc: Rc<RefCell<Document>>, initial: Fields) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<AppInner<C>>| {
            let weak = weak.clone();
            let listener: ChangeListener = Rc::new(move |change: &Change| {
                // Pre-mount (and post-unmount) writes update the store but
                // trigger no render.
                match weak.upgrade() {
                    Some(inner) if inner.mounted.get() => AppInner::update(&inner, change),
                    _ => Ok(()),
                }
            });
            AppInner {
                component,
                doc,
                store: RefCell::new(Rc::new(RefCell::new(initial))),
                listener,
                live: Cell::new(None),
                mounted: Cell::new(false),
                bindings: RefCell::new(BindingTable::default()),
            }
        });
        Self { inner }
    }

    /// Replace the backing store wholesale with `fields`.
    ///
    /// This is the only way to introduce new top-level fields after
    /// construction. The swap itself is not a tracked write: it triggers
    /// no render even when mounted. The next tracked field write does.
    pub fn set_state(&self, fields: Fields) {
        *self.inner.store.borrow_mut() = Rc::new(RefCell::new(fields));
        debug!(mounted = self.inner.mounted.get(), "state store replaced");
    }

    /// A fresh reactive view over the current store.
    #[must_use]
    pub fn state(&self) -> StateView {
        self.inner.view()
    }

    /// Render, insert into the host identified by `host_id`, bind events,
    /// and fire `on_mount`. Returns `&self` for chaining.
    ///
    /// On any failure nothing has been inserted and the host's previous
    /// content is untouched.
    pub fn mount(&self, host_id: &str) -> Result<&Self, RuntimeError> {
        if self.inner.mounted.get() {
            return Err(RuntimeError::AlreadyMounted);
        }
        let host = self
            .inner
            .doc
            .borrow()
            .element_by_id(host_id)
            .ok_or_else(|| RuntimeError::TargetNotFound {
                id: host_id.to_string(),
            })?;

        let markup = self.inner.component.render(&self.inner.view());
        let node = self.inner.doc.borrow_mut().parse_markup(&markup)?;
        {
            let mut doc = self.inner.doc.borrow_mut();
            doc.clear_children(host);
            doc.append_child(host, node);
        }
        self.inner.live.set(Some(node));
        self.inner.mounted.set(true);
        self.inner.bind_events(node);
        self.inner.component.on_mount(&self.inner.view());
        debug!(host = host_id, node = %node, "component mounted");
        Ok(self)
    }

    /// Remove the live node and reset the mounted flag. No-op unless
    /// currently mounted with a live node. `on_unmount` fires before
    /// removal, so the hook observes the still-attached node.
    pub fn unmount(&self) {
        if !self.inner.mounted.get() {
            return;
        }
        let Some(live) = self.inner.live.get() else {
            return;
        };
        self.inner.component.on_unmount(&self.inner.view());
        self.inner.doc.borrow_mut().remove_node(live);
        self.inner.live.set(None);
        self.inner.mounted.set(false);
        self.inner.bindings.borrow_mut().clear();
        debug!(node = %live, "component unmounted");
    }

    /// Simulate a click on `target`. `Ok(false)` when nothing is bound
    /// there.
    pub fn click(&self, target: NodeId) -> Result<bool, BoxError> {
        self.dispatch(EventKind::Click, target, None)
    }

    /// Simulate text input on `target`: writes the element's `value`
    /// attribute, then fires the bound handler with the text.
    pub fn input(&self, target: NodeId, text: &str) -> Result<bool, BoxError> {
        self.inner.doc.borrow_mut().set_attr(target, "value", text);
        self.dispatch(EventKind::Input, target, Some(text.to_string()))
    }

    /// Simulate a form submit on `target`. The default action is marked
    /// prevented before the handler runs.
    pub fn submit(&self, target: NodeId) -> Result<bool, BoxError> {
        self.dispatch(EventKind::Submit, target, None)
    }

    fn dispatch(
        &self,
        kind: EventKind,
        target: NodeId,
        value: Option<String>,
    ) -> Result<bool, BoxError> {
        let name = self.inner.bindings.borrow().get(&(target, kind)).cloned();
        let Some(name) = name else {
            return Ok(false);
        };
        let mut event = Event::new(kind, target);
        if let Some(value) = value {
            event = event.with_value(value);
        }
        if kind == EventKind::Submit {
            event.prevent_default();
        }
        self.inner
            .component
            .handle(&name, &mut event, &self.inner.view())?;
        Ok(true)
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.inner.mounted.get()
    }

    /// The component's live presentation node, while mounted.
    #[must_use]
    pub fn live_node(&self) -> Option<NodeId> {
        self.inner.live.get()
    }

    #[must_use]
    pub fn document(&self) -> Rc<RefCell<Document>> {
        Rc::clone(&self.inner.doc)
    }

    #[must_use]
    pub fn component(&self) -> &C {
        &self.inner.component
    }
}

impl<C: Component + 'static> AppInner<C> {
    fn view(&self) -> StateView {
        StateView::over(Rc::clone(&self.store.borrow()), Rc::clone(&self.listener))
    }

    /// The internal update routine — the state container's change
    /// listener while mounted.
    fn update(inner: &Rc<Self>, change: &Change) -> Result<(), BoxError> {
        let markup = inner.component.render(&inner.view());
        let old = inner.live.get().ok_or(RuntimeError::NotAttached)?;
        let new = inner
            .doc
            .borrow_mut()
            .parse_markup(&markup)
            .map_err(RuntimeError::from)?;
        inner
            .doc
            .borrow_mut()
            .replace_node(old, new)
            .map_err(RuntimeError::from)?;
        inner.live.set(Some(new));
        inner.bind_events(new);
        inner.component.on_update(&inner.view());
        debug!(field = %change.field, node = %new, "update cycle completed");
        Ok(())
    }

    /// Rebuild the binding table from the live subtree's marker
    /// attributes. Assignment semantics: the previous table is replaced,
    /// never appended to.
    fn bind_events(&self, root: NodeId) {
        let mut table = BindingTable::default();
        {
            let doc = self.doc.borrow();
            for kind in EventKind::ALL {
                for node in doc.descendants_with_attr(root, kind.marker()) {
                    let Some(name) = doc.attr(node, kind.marker()) else {
                        continue;
                    };
                    if self.component.has_handler(name) {
                        table.insert((node, kind), name.to_string());
                    } else {
                        debug!(
                            handler = name,
                            marker = kind.marker(),
                            "binding skipped: component has no such handler"
                        );
                    }
                }
            }
        }
        *self.bindings.borrow_mut() = table;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use joko_reactive::value::fields;

    fn page_with_host(host_id: &str) -> Rc<RefCell<Document>> {
        let mut doc = Document::new();
        let host = doc.create_element("div");
        doc.set_attr(host, "id", host_id);
        let root = doc.root();
        doc.append_child(root, host);
        Rc::new(RefCell::new(doc))
    }

    /// Counter view used across the lifecycle tests.
    struct Counter {
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Counter {
        fn new() -> Self {
            Self {
                log: Rc::new(RefCell::new(Vec::new())),
            }
        }
    }

    impl Component for Counter {
        fn render(&self, state: &StateView) -> String {
            let count = state.get_i64("count").unwrap_or(0);
            format!(
                r#"<div><p class="count">{count}</p><button data-joko-click="increment">+</button><button data-joko-click="reset">0</button></div>"#
            )
        }

        fn on_mount(&self, _state: &StateView) {
            self.log.borrow_mut().push("mount".to_string());
        }

        fn on_update(&self, _state: &StateView) {
            self.log.borrow_mut().push("update".to_string());
        }

        fn on_unmount(&self, _state: &StateView) {
            self.log.borrow_mut().push("unmount".to_string());
        }

        fn has_handler(&self, name: &str) -> bool {
            matches!(name, "increment" | "reset")
        }

        fn handle(
            &self,
            name: &str,
            _event: &mut Event,
            state: &StateView,
        ) -> crate::component::HandlerResult {
            match name {
                "increment" => state.set("count", state.get_i64("count").unwrap_or(0) + 1),
                "reset" => state.set("count", 0),
                _ => Ok(()),
            }
        }
    }

    fn counter_app(host_id: &str) -> App<Counter> {
        let doc = page_with_host(host_id);
        App::with_state(Counter::new(), doc, fields([("count", 0)]))
    }

    fn count_text(app: &App<Counter>) -> String {
        let doc = app.document();
        let doc = doc.borrow();
        let live = app.live_node().expect("live node");
        let p = doc.find_descendant(live, "class", "count").expect("count node");
        doc.text_content(p)
    }

    fn button(app: &App<Counter>, handler: &str) -> NodeId {
        let doc = app.document();
        let doc = doc.borrow();
        let live = app.live_node().expect("live node");
        doc.find_descendant(live, "data-joko-click", handler)
            .expect("button")
    }

    #[test]
    fn mount_renders_into_host() {
        let app = counter_app("app");
        app.mount("app").unwrap();

        assert!(app.is_mounted());
        assert_eq!(count_text(&app), "0");
        assert_eq!(app.component().log.borrow().as_slice(), ["mount"]);
    }

    #[test]
    fn mount_to_missing_host_fails_clean() {
        let app = counter_app("app");
        let err = app.mount("nope").unwrap_err();
        assert!(matches!(err, RuntimeError::TargetNotFound { .. }));
        assert!(!app.is_mounted());
        assert!(app.live_node().is_none());

        // Nothing was inserted anywhere.
        let doc = app.document();
        let doc = doc.borrow();
        let host = doc.element_by_id("app").unwrap();
        assert_eq!(doc.child_count(host), 0);
    }

    #[test]
    fn mount_twice_is_rejected() {
        let app = counter_app("app");
        app.mount("app").unwrap();
        assert!(matches!(
            app.mount("app").unwrap_err(),
            RuntimeError::AlreadyMounted
        ));
    }

    #[test]
    fn click_rerenders_synchronously() {
        let app = counter_app("app");
        app.mount("app").unwrap();

        for _ in 0..3 {
            // The node is replaced each update, so re-query every time.
            assert!(app.click(button(&app, "increment")).unwrap());
        }
        assert_eq!(count_text(&app), "3");

        assert!(app.click(button(&app, "reset")).unwrap());
        assert_eq!(count_text(&app), "0");

        assert_eq!(
            app.component().log.borrow().as_slice(),
            ["mount", "update", "update", "update", "update"]
        );
    }

    #[test]
    fn host_holds_exactly_one_node_after_updates() {
        let app = counter_app("app");
        app.mount("app").unwrap();
        for _ in 0..5 {
            app.click(button(&app, "increment")).unwrap();
        }

        let doc = app.document();
        let doc = doc.borrow();
        let host = doc.element_by_id("app").unwrap();
        assert_eq!(doc.child_count(host), 1);
        assert_eq!(doc.children(host)[0], app.live_node().unwrap());
    }

    #[test]
    fn pre_mount_write_does_not_render() {
        let app = counter_app("app");
        app.state().set("count", 7).unwrap();
        assert!(app.component().log.borrow().is_empty());

        app.mount("app").unwrap();
        assert_eq!(count_text(&app), "7");
    }

    #[test]
    fn set_state_after_mount_does_not_render_until_next_write() {
        let app = counter_app("app");
        app.mount("app").unwrap();

        app.set_state(fields([("count", 42)]));
        // The swap is not a tracked write: the view still shows the old
        // render.
        assert_eq!(count_text(&app), "0");

        app.state().set("count", 43).unwrap();
        assert_eq!(count_text(&app), "43");
    }

    #[test]
    fn idempotent_write_does_not_update() {
        let app = counter_app("app");
        app.mount("app").unwrap();
        app.state().set("count", 0).unwrap();
        assert_eq!(app.component().log.borrow().as_slice(), ["mount"]);
    }

    #[test]
    fn unmount_fires_hook_before_removal_and_is_idempotent() {
        let app = counter_app("app");
        app.mount("app").unwrap();
        let live = app.live_node().unwrap();

        app.unmount();
        assert!(!app.is_mounted());
        assert!(app.live_node().is_none());
        {
            let doc = app.document();
            let doc = doc.borrow();
            assert!(!doc.is_attached(live));
            let host = doc.element_by_id("app").unwrap();
            assert_eq!(doc.child_count(host), 0);
        }
        assert_eq!(
            app.component().log.borrow().as_slice(),
            ["mount", "unmount"]
        );

        // Second unmount is a no-op.
        app.unmount();
        assert_eq!(
            app.component().log.borrow().as_slice(),
            ["mount", "unmount"]
        );
    }

    #[test]
    fn write_after_unmount_is_silent() {
        let app = counter_app("app");
        app.mount("app").unwrap();
        let state = app.state();
        app.unmount();

        state.set("count", 9).unwrap();
        assert_eq!(
            app.component().log.borrow().as_slice(),
            ["mount", "unmount"]
        );
    }

    #[test]
    fn dispatch_on_unbound_node_is_false() {
        let app = counter_app("app");
        app.mount("app").unwrap();
        let live = app.live_node().unwrap();
        assert!(!app.click(live).unwrap());
        assert!(!app.submit(button(&app, "increment")).unwrap());
    }

    /// Component whose markup names a handler that does not exist.
    struct MissingHandler;

    impl Component for MissingHandler {
        fn render(&self, _state: &StateView) -> String {
            r#"<div><button data-joko-click="nope">x</button></div>"#.to_string()
        }
    }

    #[test]
    fn unknown_handler_binding_is_skipped_silently() {
        let doc = page_with_host("app");
        let app = App::new(MissingHandler, doc);
        app.mount("app").unwrap();

        let target = {
            let doc = app.document();
            let doc = doc.borrow();
            doc.find_descendant(app.live_node().unwrap(), "data-joko-click", "nope")
                .unwrap()
        };
        assert!(!app.click(target).unwrap());
    }

    /// Component that renders invalid markup once `broken` is set.
    struct Fragile;

    impl Component for Fragile {
        fn render(&self, state: &StateView) -> String {
            if state.get_bool("broken").unwrap_or(false) {
                "<div><p>a</p>".to_string()
            } else {
                "<div>ok</div>".to_string()
            }
        }
    }

    #[test]
    fn update_propagates_render_parse_errors_to_the_writer() {
        let doc = page_with_host("app");
        let app = App::with_state(Fragile, doc, fields([("broken", false)]));
        app.mount("app").unwrap();

        let err = app.state().set("broken", true).unwrap_err();
        assert!(err.to_string().contains("unclosed"));
        // The previous live node is still in place.
        assert!(app.is_mounted());
        assert!(app.live_node().is_some());
    }
}

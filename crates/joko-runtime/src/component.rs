#![forbid(unsafe_code)]

//! The component capability and its event types.

use joko_dom::NodeId;
use joko_reactive::{BoxError, StateView};

/// Result type for component event handlers.
pub type HandlerResult = Result<(), BoxError>;

/// The three supported event families, one declarative marker attribute
/// each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Input,
    Submit,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::Click, EventKind::Input, EventKind::Submit];

    /// The marker attribute scanned for during event binding. Its value
    /// names a component handler.
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            EventKind::Click => "data-joko-click",
            EventKind::Input => "data-joko-input",
            EventKind::Submit => "data-joko-submit",
        }
    }
}

/// A dispatched user interaction.
#[derive(Debug, Clone)]
pub struct Event {
    pub kind: EventKind,
    /// The element the marker attribute was bound on.
    pub target: NodeId,
    /// Current input text, for [`EventKind::Input`] events.
    pub value: Option<String>,
    default_prevented: bool,
}

impl Event {
    #[must_use]
    pub fn new(kind: EventKind, target: NodeId) -> Self {
        Self {
            kind,
            target,
            value: None,
            default_prevented: false,
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Suppress the default action. The runtime calls this for submit
    /// events before the handler runs.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// What a view implements to participate in the runtime.
///
/// A component is composed by [`crate::App`] through this interface: it
/// renders to a complete markup fragment and optionally reacts to
/// lifecycle moments and named events. Hooks take `&self`; components that
/// need private mutable state use `Cell`/`RefCell` internally, while
/// anything that should drive re-renders belongs in the reactive
/// [`StateView`].
pub trait Component {
    /// Produce the complete markup for the current state — the whole
    /// visual state, not a diff. Must parse to exactly one root element
    /// and must be pure with respect to `state`.
    fn render(&self, state: &StateView) -> String;

    /// Called once per mount, after the node is inserted and events are
    /// bound.
    fn on_mount(&self, _state: &StateView) {}

    /// Called once per completed update cycle, after the live node was
    /// replaced and events rebound.
    fn on_update(&self, _state: &StateView) {}

    /// Called once per unmount, before the node is removed (the hook
    /// observes the still-attached node).
    fn on_unmount(&self, _state: &StateView) {}

    /// Whether a handler with this name exists. Bindings whose marker
    /// names an unknown handler are silently skipped.
    fn has_handler(&self, _name: &str) -> bool {
        false
    }

    /// Invoke the named handler. Only called with names for which
    /// [`Component::has_handler`] returned true.
    fn handle(&self, _name: &str, _event: &mut Event, _state: &StateView) -> HandlerResult {
        Ok(())
    }
}

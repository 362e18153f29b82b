#![forbid(unsafe_code)]

//! joko public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users.

pub use joko_dom as dom;
pub use joko_http as http;
pub use joko_reactive as reactive;
pub use joko_runtime as runtime;

pub mod prelude {
    pub use joko_dom::{Child, Document, Element, NodeId};
    pub use joko_http::{HttpClient, HttpError, Method, Response};
    pub use joko_reactive::value::fields;
    pub use joko_reactive::{Change, Fields, StateView, Value};
    pub use joko_runtime::{App, Component, Event, EventKind, HandlerResult, RuntimeError};
}

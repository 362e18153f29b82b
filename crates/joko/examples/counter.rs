//! Minimal counter: mount into an in-memory page, simulate clicks, print
//! the rendered markup after each interaction.
//!
//! Run with: cargo run -p joko --example counter

use std::cell::RefCell;
use std::rc::Rc;

use joko::prelude::*;

struct Counter;

impl Component for Counter {
    fn render(&self, state: &StateView) -> String {
        let count = state.get_i64("count").unwrap_or(0);
        Element::new("div")
            .child(Element::new("p").attr("class", "count").child(count))
            .child(
                Element::new("button")
                    .attr("data-joko-click", "increment")
                    .text("+"),
            )
            .to_markup()
    }

    fn has_handler(&self, name: &str) -> bool {
        name == "increment"
    }

    fn handle(&self, name: &str, _event: &mut Event, state: &StateView) -> HandlerResult {
        match name {
            "increment" => state.set("count", state.get_i64("count").unwrap_or(0) + 1),
            _ => Ok(()),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // An in-memory page with one host location.
    let mut doc = Document::new();
    let host = doc.create_element("div");
    doc.set_attr(host, "id", "app");
    let root = doc.root();
    doc.append_child(root, host);
    let doc = Rc::new(RefCell::new(doc));

    let app = App::with_state(Counter, Rc::clone(&doc), fields([("count", 0)]));
    app.mount("app")?;

    for _ in 0..3 {
        let button = {
            let doc = doc.borrow();
            doc.find_descendant(app.live_node().unwrap(), "data-joko-click", "increment")
                .expect("increment button")
        };
        app.click(button)?;
        println!("{}", doc.borrow().to_markup(app.live_node().unwrap()));
    }

    app.unmount();
    Ok(())
}

//! Property-based invariant tests for the reactive state container.
//!
//! These verify the write-interception contract for **any** sequence of
//! writes:
//!
//! 1. The listener fires exactly once per value-changing write.
//! 2. A repeated write of the same value never fires the listener.
//! 3. The stored value after a write sequence equals the last written value.
//! 4. Every notification's snapshot agrees with the store at that moment.

use std::cell::RefCell;
use std::rc::Rc;

use joko_reactive::{Change, Fields, StateView, Value};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn logging_view(initial: Fields) -> (StateView, Rc<RefCell<Vec<Change>>>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let log_clone = Rc::clone(&log);
    let view = StateView::new(&initial, move |change| {
        log_clone.borrow_mut().push(change.clone());
        Ok(())
    });
    (view, log)
}

/// Strategy for a small field name.
fn field_name() -> impl Strategy<Value = String> {
    prop_oneof![Just("a"), Just("b"), Just("c")].prop_map(str::to_string)
}

/// Strategy for a primitive value.
fn primitive() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        (-100i64..100).prop_map(Value::from),
        "[a-z]{0,6}".prop_map(Value::from),
    ]
}

proptest! {
    #[test]
    fn listener_fires_once_per_actual_change(
        writes in proptest::collection::vec((field_name(), primitive()), 0..40)
    ) {
        let (view, log) = logging_view(Fields::new());

        let mut expected = 0usize;
        for (field, value) in &writes {
            let before = view.get(field);
            view.set(field, value.clone()).unwrap();
            if before.as_ref() != Some(value) {
                expected += 1;
            }
        }
        prop_assert_eq!(log.borrow().len(), expected);
    }

    #[test]
    fn double_write_notifies_exactly_once(
        field in field_name(),
        value in primitive(),
    ) {
        let (view, log) = logging_view(Fields::new());
        view.set(&field, value.clone()).unwrap();
        view.set(&field, value.clone()).unwrap();

        // A write of Null to an absent field is still a creation the first
        // time, so exactly one notification either way.
        prop_assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn last_write_wins(
        field in field_name(),
        values in proptest::collection::vec(primitive(), 1..20),
    ) {
        let (view, _log) = logging_view(Fields::new());
        for value in &values {
            view.set(&field, value.clone()).unwrap();
        }
        prop_assert_eq!(view.get(&field), values.last().cloned());
    }

    #[test]
    fn snapshot_matches_store_at_notification_time(
        writes in proptest::collection::vec((field_name(), primitive()), 1..30)
    ) {
        let snapshots: Rc<RefCell<Vec<Fields>>> = Rc::new(RefCell::new(Vec::new()));
        let snap_clone = Rc::clone(&snapshots);
        let view = StateView::new(&Fields::new(), move |change| {
            snap_clone.borrow_mut().push(change.state.clone());
            Ok(())
        });

        for (field, value) in &writes {
            view.set(field, value.clone()).unwrap();
            if let Some(last) = snapshots.borrow().last() {
                // The most recent snapshot reflects that write.
                let current = view.get(field);
                prop_assert_eq!(last.get(field), current.as_ref());
            }
        }
    }
}

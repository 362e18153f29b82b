#![no_main]

use joko_dom::Document;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(source) = std::str::from_utf8(data) {
        let mut doc = Document::new();
        let _ = doc.parse_markup(source);
        // Parse failures must never leave nodes attached.
        assert_eq!(doc.child_count(doc.root()), 0);
    }
});

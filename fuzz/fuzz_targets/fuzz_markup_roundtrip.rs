#![no_main]

use joko_dom::Document;
use libfuzzer_sys::fuzz_target;

// If a fragment parses, its serialization must parse again and
// re-serialize to the same bytes (serializer output is a fixpoint).
fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };
    let mut doc = Document::new();
    let Ok(root) = doc.parse_markup(source) else {
        return;
    };
    let serialized = doc.to_markup(root);

    let mut doc2 = Document::new();
    let root2 = doc2
        .parse_markup(&serialized)
        .expect("serializer output must parse");
    assert_eq!(doc2.to_markup(root2), serialized);
});

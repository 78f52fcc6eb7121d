//! Fuzz test for the entry codec
//!
//! Feeds arbitrary text to the line parser. Any line that parses must
//! re-render to a line that parses back to the same entry, in both trail
//! placements. Titles come back in their sanitized form.
//!
//! Run with: cargo +nightly fuzz run codec_fuzz -- -max_total_time=60

#![no_main]

use histrail_core::{format_entry, parse_entry, sanitize_title, TrailFormat};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(line) = std::str::from_utf8(data) {
        let Ok(entry) = parse_entry(line) else {
            return;
        };
        let title = sanitize_title(&entry.title);
        if title.is_empty() {
            return;
        }

        for format in [TrailFormat::BeforeTitle, TrailFormat::AfterTitle] {
            let rendered = format_entry(&entry, format);
            match parse_entry(&rendered) {
                Ok(reparsed) => {
                    assert_eq!(reparsed.timestamp, entry.timestamp);
                    assert_eq!(reparsed.item_id, entry.item_id);
                    assert_eq!(reparsed.title, title);
                    assert!(!rendered.contains(['\n', '\r']));
                    assert_eq!(reparsed.trails, entry.trails);
                }
                Err(e) => panic!("rendered line {rendered:?} failed to parse: {e}"),
            }
        }
    }
});

#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 8192 { return; }
    if let Ok(s) = std::str::from_utf8(data) {
        // Parse then compile; neither step may panic
        if let Ok(w) = nexus_records::query::parse_where_json(s) {
            let _ = nexus_records::query::compile_filter(Some(&w));
        }
    }
});

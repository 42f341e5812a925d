#![no_main]
use libfuzzer_sys::fuzz_target;
use nexus_records::records::CreateArgs;
use std::sync::Arc;

fuzz_target!(|data: &[u8]| {
    if data.len() > 8192 { return; }
    if let Ok(s) = std::str::from_utf8(data) {
        let svc = nexus_records::RecordService::new(Arc::new(nexus_records::MemoryStore::new()));
        let docs = [
            bson::doc!{"id": "a", "n": 1, "name": "x"},
            bson::doc!{"id": "b", "n": -5, "name": "y", "nested": {"z": 3}},
            bson::doc!{"active": true, "tags": ["p", "q"]},
        ];
        for d in docs {
            let _ = svc.create("f", CreateArgs { data: Some(d) });
        }
        let _ = svc.find_many_json("f", s);
    }
});

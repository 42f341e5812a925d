#![allow(dead_code)]

use bson::{Document, doc};
use fake::{Fake, faker::name::en::Name};
use nexus_records::records::CreateArgs;
use nexus_records::{MemoryStore, RecordService};
use std::sync::Arc;

pub type Service = RecordService<Arc<MemoryStore>>;

pub fn service() -> Service {
    RecordService::new(Arc::new(MemoryStore::new()))
}

/// Ten people with ids p0..p9, ages 20..29, alternating cities.
pub fn seeded_people() -> Service {
    let svc = service();
    for i in 0..10 {
        let city = if i % 2 == 0 { "Oslo" } else { "Lima" };
        svc.create(
            "people",
            CreateArgs { data: Some(doc! {"id": format!("p{i}"), "age": 20 + i, "city": city, "name": format!("Person {i}")}) },
        )
        .unwrap();
    }
    svc
}

pub fn ids(docs: &[Document]) -> Vec<String> {
    docs.iter().map(|d| d.get_str("_id").unwrap().to_string()).collect()
}

/// `n` records with generated person names under `_id` r0..r(n-1).
pub fn named_people(n: usize) -> (Service, Vec<String>) {
    let svc = service();
    let names: Vec<String> = (0..n).map(|_| Name().fake::<String>()).collect();
    for (i, name) in names.iter().enumerate() {
        svc.create("named", CreateArgs { data: Some(doc! {"id": format!("r{i}"), "name": name}) }).unwrap();
    }
    (svc, names)
}

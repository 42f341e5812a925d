// Per-area integration suites
#[path = "../_support/mod.rs"]
mod support;

mod mod_config;
mod mod_filter;
mod mod_identity;
mod mod_records;

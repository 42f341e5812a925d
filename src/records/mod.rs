//! Record operations: `findMany`, `findUnique`, `create`, `update`, `delete` and `count`
//! over any [`crate::store::DocumentStore`].

mod args;
mod async_service;
mod service;

pub use args::{CountArgs, CreateArgs, DeleteArgs, FindManyArgs, FindUniqueArgs, UpdateArgs};
pub use async_service::AsyncRecordService;
pub(crate) use service::{check_operators, effective_take, parse_args};
pub use service::RecordService;

//! Data model shared by both harvest phases

mod batch_result;
mod result_log;
mod url_record;

pub use batch_result::{BatchResult, Payload, RecordFailure};
pub use result_log::ResultLog;
pub use url_record::{RedirectTrace, UrlRecord, UNRESOLVED};

mod dispatch;
mod media;
mod requests;

pub use dispatch::spawn_worker;
pub(crate) use dispatch::{send, send_error, send_log};

// HTTP routes
pub mod chat_queue;
pub mod dialogs;
pub mod health;
pub mod online;

pub use chat_queue::*;
pub use dialogs::*;
pub use health::*;
pub use online::*;

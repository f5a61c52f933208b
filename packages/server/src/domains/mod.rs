// Domain modules - each owns its models and the rules around them

pub mod anonymize;
pub mod chat_queue;
pub mod dialogs;
pub mod member;
pub mod organization;
pub mod presence;

pub mod engine;
pub mod notification;
pub mod placement;
pub mod time_text;

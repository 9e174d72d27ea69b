pub mod actions;
pub mod app;
pub mod drag;
pub mod input;
pub mod notify;
pub mod popup;
pub mod render;
pub mod text_input;
pub mod theme;

pub use app::run;

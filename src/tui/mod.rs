pub mod app;
pub mod console_view;

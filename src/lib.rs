pub mod app;
pub mod config;
pub mod gemini;
pub mod handler;
pub mod markup;
pub mod prompt;
pub mod scope;
pub mod session;
pub mod speech;
pub mod theme;
pub mod tui;
pub mod ui;

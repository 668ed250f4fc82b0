pub mod provider;
pub mod render;
pub mod tui;
pub mod view;

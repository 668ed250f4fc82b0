pub mod client;
pub mod geometry;
pub mod models;

//! Terminal explorer for the OEDS catalog service: browse dataset profiles and
//! their generated REST API, and explore dataset metadata on a timeline and a map.

pub mod analysis;
pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;

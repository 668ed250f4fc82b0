pub mod format;
pub mod overview;
pub mod spatial;
pub mod timeline;

pub mod portinfo;
pub mod procwatch;

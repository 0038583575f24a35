pub mod command;
pub mod command_parser;
pub mod config;
pub mod portinfo;
pub mod procwatch;

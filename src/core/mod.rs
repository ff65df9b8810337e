pub mod cache;
pub mod config;
pub mod game;
pub mod library;
pub mod parser;
pub mod render;
pub mod select;
pub mod words;

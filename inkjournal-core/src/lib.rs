#![warn(clippy::pedantic)]

pub mod bbox;
pub mod brush;
pub mod color;
pub mod commands;
pub mod config;
pub mod document;
pub mod erase;
pub mod history;
pub mod id;
pub mod item;
pub mod refstring;
pub mod renderer;
pub mod state;
pub mod transform;
pub mod util;

pub use document::Document;
use id::InkID;

#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod formats;
pub mod logging;
pub mod mapping;
pub mod normalize;
pub mod pipeline;
pub mod sync;
pub mod unescape;

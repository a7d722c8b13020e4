pub mod app;
pub mod config;
pub mod data;
pub mod export;
pub mod geometry;
pub mod layout;
pub mod palette;
pub mod pipeline;
pub mod request;
pub mod selection;
pub mod util;
pub mod viewport;

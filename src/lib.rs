pub mod config;
pub mod crawler;
pub mod error;
pub mod features;
pub mod page;
pub mod path;
pub mod pipeline;
pub mod primary;
pub mod record;
pub mod schema;
pub mod sink;
pub mod spec;

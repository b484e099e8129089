//! CLI domain: parse, route, output, and presentation only.
//! No domain orchestration; single route table dispatches to the node API.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{format_json, format_listing, format_trash};
pub use route::RunContext;

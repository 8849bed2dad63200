//! CLI command handlers.

mod fetch;
mod serve;

pub use fetch::run_fetch;
#[cfg(test)]
pub(crate) use fetch::progress_line;
pub use serve::run_serve;

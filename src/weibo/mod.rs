pub mod client;
pub mod model;

pub use client::{Client, ClientOptions};
pub use model::Mblog;

use anyhow::Result;

/// Source of timeline pages for one account.
///
/// Pages are 1-based. A returned page is taken as complete; any error aborts
/// the whole account for the current run.
pub trait Fetcher {
    fn fetch(&self, userid: &str, page: u32, extra_detail: bool) -> Result<Vec<Mblog>>;
}

//! Remote half of the client and the remote-first orchestration.

pub mod accessor;
pub mod client;
pub mod ids;
pub mod path;
pub mod site;

#[cfg(test)]
pub(crate) mod testing;

pub use accessor::Accessor;
pub use client::{ApiClient, RemoteSource};
pub use site::{LiveSiteClient, SiteClient};

pub mod client;
pub mod digest;
pub mod reference;

pub use client::{GitHubClient, GitHubSettings};
pub use digest::summarize;

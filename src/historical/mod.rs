pub mod error;
pub mod fetcher;
pub(crate) mod response;

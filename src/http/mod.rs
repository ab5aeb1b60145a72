// Rate-limited HTTP plumbing shared by the backend service clients

pub mod client;
mod test;

pub use client::RateLimitedHttpClient;

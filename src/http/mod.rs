pub mod client;


pub use client::RateLimitedHttpClient;

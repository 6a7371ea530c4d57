//! Fixed-window rate limiting for anonymous and login endpoints.
//!
//! Each rule owns an independent budget; attempts are counted per
//! `"{category}:{source}"` key so endpoints never share a counter.

mod config;
mod ports;
mod service;


pub use config::RateLimitRule;
pub use ports::{AttemptInfo, RateLimitRepository};
pub use service::RateLimitService;

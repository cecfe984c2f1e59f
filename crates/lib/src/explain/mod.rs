pub mod guard;
pub mod limiter;
pub mod upstream;

pub use limiter::ExplainRateLimiter;

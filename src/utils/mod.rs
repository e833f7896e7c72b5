pub mod http;
pub mod output;
pub mod pacing;

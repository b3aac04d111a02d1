pub mod archive;
pub mod engine;
pub mod http;

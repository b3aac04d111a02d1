pub mod archiver;
pub mod cipher_engine;
pub mod keystore;
pub mod pipeline;

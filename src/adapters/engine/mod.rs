pub mod gpg_engine;

#[cfg(test)]
pub(crate) mod memory_engine;

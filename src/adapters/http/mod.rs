pub mod link_resolver;

#[cfg(test)]
pub(crate) mod test_server;



#[cfg(test)]
pub mod query_mock;

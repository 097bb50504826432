pub mod date;
pub mod ddb;
pub mod http;
pub mod json;
pub mod logs;
#[cfg(test)]
pub(crate) mod testing;

pub mod form;
pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod questions;
pub mod sanitize;
pub mod service;
pub mod store;
pub mod validation;

#[cfg(test)]
pub mod test_support;

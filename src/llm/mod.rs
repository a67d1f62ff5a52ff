//! LLM provider integrations and the side-by-side bench

mod bench;
mod provider;

pub use bench::*;
pub use provider::*;

#[cfg(test)]
pub(crate) use bench::tests::FakeProvider;

//! Handler resolution and invocation.

mod executor;

pub use executor::VisitorExecutor;

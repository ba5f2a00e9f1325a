//! # Specport Core
//!
//! Ports minitest test files to RSpec at the syntax-tree level:
//! - S-expression tree model and its textual notation
//! - Class and call-chain views over minitest trees
//! - Mocha stub reading and rspec-mocks stub writing
//! - Rule-based tracer that rewrites a whole tree
//!
//! Parsing Ruby source and printing Ruby code are left to the caller; this
//! crate only transforms trees.

#![warn(clippy::all)]

pub mod config;
pub mod converter;
pub mod error;
pub mod model;
pub mod sexp;
pub mod stub;
pub mod tracer;

// Re-export commonly used types
pub use config::ConvertOptions;
pub use converter::{process, Converter};
pub use error::{ConvertError, TransformResult};
pub use model::{ClassView, CallView, TestBase};
pub use sexp::Sexp;
pub use stub::{MochaStub, RspecStub, StubModel};
pub use tracer::{SpecTracer, TransformationContext};

/// Specport version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing for specport components
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("specport_core=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/*!
# Minitest-to-RSpec Transformation Rules

Collection of transformation rules that port minitest test classes and mocha
stubs to their RSpec equivalents.
*/

pub mod klass;
pub mod mocha;

// Re-export commonly used rules
pub use klass::{resolve_metadata_tag, ClassDeclarationRule};
pub use mocha::MochaStubRule;

/*!
# Input Models

Read-only views over the minitest nodes the converter inspects.

- `ClassView`: a `class` declaration and its test-base lineage
- `CallView`: a call and the chain of receivers behind it
*/

pub mod call;
pub mod klass;

pub use call::CallView;
pub use klass::{ancestor_names, ClassView, TestBase};

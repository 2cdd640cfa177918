//! Dataset source abstraction.

mod query;
mod result;
mod traits;

pub use query::BatchQuery;
pub use result::BatchResult;
pub use traits::DatasetSource;

//! The bookkeeping model, shared with the storage backends.

pub use padibook_core::models::*;
pub use padibook_core::models::read::*;
pub use padibook_core::timestamp;

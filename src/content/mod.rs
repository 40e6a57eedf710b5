//! Read-only content collaborators of the lab page.
//!
//! - `curriculum` - Category/topic/example tree and its lookups
//! - `source` - The `/api/code` file endpoint
//! - `placeholder` - Stand-in text for guide files not written yet
//! - `markdown` - HTML rendering of fetched files

pub mod curriculum;
pub mod markdown;
pub mod placeholder;
pub mod source;

pub use curriculum::{Curriculum, LookupError};
pub use source::{ContentStore, SourceError, SourceFile};

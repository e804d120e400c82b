//! Content administration handlers.
//!
//! Every flag mutation passes through here so its before-state is captured
//! and audited in one place.

mod delete_content;
mod update_content_flags;

pub use delete_content::{DeleteContentCommand, DeleteContentHandler};
pub use update_content_flags::{
    UpdateContentFlagsCommand, UpdateContentFlagsHandler, UpdateContentFlagsResult,
};

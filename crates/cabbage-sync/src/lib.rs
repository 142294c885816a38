//! Keeps `<Cabbage>` document regions and widget records in step.
//!
//! - region: finding the region and decoding its content
//! - merge: channel-keyed merge of partial records
//! - format: compact and expanded region layouts
//! - highlight: locating a written record for reveal and highlight
//! - external: `#include` and sibling-file indirection
//! - layout: reordering by visual hierarchy
//! - clipboard: copy and paste with fresh channels
//! - engine: all-or-nothing document operations

mod error;
pub mod clipboard;
pub mod engine;
pub mod external;
pub mod format;
pub mod highlight;
pub mod layout;
pub mod merge;
pub mod region;
#[cfg(test)]
mod test_support;

pub use clipboard::{Clipboard, PASTE_OFFSET};
pub use engine::{
    DocumentEdit, LoadedRecords, RecordSource, Rejection, SyncEngine, SyncOptions, SyncOutcome,
};
pub use error::SyncError;
pub use external::{FileSystem, StdFileSystem};
pub use format::JsonFormat;
pub use highlight::{line_range, offset_to_position, LineCol, LineRange};
pub use merge::{merge_update, MergeOutcome};
pub use region::{Region, RegionContent, REGION_END, REGION_START};

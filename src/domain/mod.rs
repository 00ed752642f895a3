//! Domain logic - pure value types independent of files and git

pub mod commit;
pub mod tag;
pub mod version;

pub use commit::CommitRecord;
pub use tag::Tag;
pub use version::{Version, VersionBump};

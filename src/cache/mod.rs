//! Build cache entries on local storage
//!
//! Each configured mount is archived into one file under the cache root,
//! addressed by a key derived from the mount, the branch and the build
//! matrix. Pull-request builds only ever read entries.
//!
//! # Entry Lifecycle
//!
//! | Step | Who | Effect |
//! |------|-----|--------|
//! | Rebuild | push build, job succeeded | `<prefix>.<key>.<suffix>` written |
//! | Retention | after a rebuild | all but the current entry removed |
//! | Restore | job pending/running | entry extracted into the workspace |
//! | Cleanup | restore failed | every file for the key removed |

pub mod archive;
pub mod key;
pub mod store;

pub use archive::ArchiveFormat;
pub use key::CacheKey;
pub use store::{format_bytes, CacheEntry, CacheStore, PurgeReport};

//! Upload mediation: presign authorization and commit pipeline
//!
//! A client first asks for an [`UploadAuthorization`], uploads the file
//! straight to the store, then asks for a commit. Commit re-reads the raw
//! object, enforces the real size, sanitizes it twice (full size and
//! thumbnail), publishes both and retires the raw object.
//!
//! ```text
//! Retrieved -> Validated -> Sanitized -> Published -> CleanedUp (best-effort) -> Responded
//! ```
//!
//! Raw objects whose commit never happens are left for the bucket's
//! lifecycle policy to expire.

mod authorizer;
mod commit;
mod error;
pub mod keys;
pub mod policy;

pub use authorizer::{UploadAuthorization, UploadAuthorizer};
pub use commit::{CommitPipeline, CommitResult, COMMIT_STATUS_OK};
pub use error::{InvalidInput, UploadError, UploadResult};
pub use policy::ImageContentType;

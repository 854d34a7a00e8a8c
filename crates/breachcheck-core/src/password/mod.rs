//! Password exposure checking.
//!
//! The raw password goes only to the first-party endpoint. When that path
//! fails, the fallback sends just the first five hex characters of the
//! password's SHA-1 digest to a range service and matches the rest locally.

mod checker;
mod fingerprint;
mod range;

pub use checker::{ExposureResult, ExposureSource, PasswordChecker, PrimaryCheck, PrimaryResponse};
pub use fingerprint::{Fingerprint, PREFIX_LEN};
pub use range::{scan_range, RangeClient, RangeLookup};

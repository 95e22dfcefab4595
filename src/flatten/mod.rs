//! Record flattening module
//!
//! Maps nested API records onto flat records with a fixed field set.
//!
//! - [`flatten_ad`] resolves an ad's creative (link, carousel, or video) into
//!   the ad metadata columns
//! - [`project_insight`] aligns an already-flat insight row with its job's
//!   columns
//!
//! Both are pure functions. Missing optional structure never fails; only a
//! record that is not a JSON object is a [`crate::Error::ContractViolation`].

mod creative;
mod insights;
mod lookup;
mod record;

pub use creative::{flatten_ad, CreativeKind, LinkShape, StoryContent};
pub use insights::{coerce, project_insight};
pub use record::{FlatRecord, Scalar};

//! Review workflow
//!
//! - `DetailSelector` - join fetch of a call and its extracted info
//! - `ReviewDraft` - local edits to the extracted info
//! - `TransitionController` - status-gated approve/reject
//!
//! Only a call in `READY_FOR_REVIEW` can be approved or rejected; both
//! outcomes are terminal.

mod draft;
mod selector;
mod transition;

pub use draft::{DraftField, ReviewDraft, UnknownField, DEFAULT_REVIEW_NOTES};
pub use selector::{DetailSelector, SelectOutcome, Selection};
pub use transition::{TransitionController, TransitionError, TransitionReport};

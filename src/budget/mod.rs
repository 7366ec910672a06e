//! Category allocation and progress rules. Pure functions over a snapshot of
//! one user's categories; nothing here touches storage.

mod allocation;
mod draft;
mod progress;

pub(crate) use allocation::AllocationSummary;
pub(crate) use draft::CategoryDraft;
pub(crate) use progress::progress;

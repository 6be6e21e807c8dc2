//! Listing search: filter criteria, the filter engine, the quick-search
//! hand-off and the listings page controller.

pub mod criteria;
pub mod filter;
pub mod handoff;
pub mod listings;

pub use criteria::{CriteriaQuery, FilterCriteria, QuickSearch};
pub use handoff::{HandoffChannel, MemorySlot};
pub use listings::ListingsController;

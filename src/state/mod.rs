//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: The shared visited map, admission gate and completion barrier
//! - `PageState`: The state held for each normalized URL key
//! - `CompletionBarrier` / `WorkGuard`: Outstanding-work accounting for the driver

mod completion;
mod crawl_state;
mod page_state;

// Re-export main types
pub use completion::{CompletionBarrier, WorkGuard};
pub use crawl_state::{AdmissionSlot, CrawlState};
pub use page_state::PageState;

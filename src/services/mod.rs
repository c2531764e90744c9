//! Services for fetching, storing, aggregating and rendering coding time

pub mod aggregator;
pub mod date_selector;
pub mod document;
pub mod renderer;
pub mod store;
pub mod summaries;
pub mod sync;

pub use aggregator::Aggregator;
pub use date_selector::{is_scheduled_event, select_summary_date, DateReason};
pub use document::MarkerRegion;
pub use renderer::{format_duration, Renderer};
pub use store::StoreService;
pub use summaries::{SummarySource, WakaTimeClient};
pub use sync::{FetchPlan, SyncReport, SyncService};

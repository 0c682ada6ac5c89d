//! Derived views
//!
//! Pure functions from `(pets, records)` to view-ready shapes, plus the
//! transient view state. Nothing here mutates the store; callers recompute
//! after every change.
//!
//! - **chart**: date-aligned weight matrix, axis domain, reference band
//! - **history**: newest-first record rows with pet labels
//! - **dashboard**: latest weight and delta per pet
//! - **state**: current view and pet filter

pub mod chart;
pub mod dashboard;
pub mod history;
pub mod state;

pub use chart::{build_chart_series, value_domain, ChartRow, RangeStatus, ReferenceRange};
pub use dashboard::{
    format_delta, latest_and_delta, pet_cards, round_tenth, LatestAndDelta, PetCard, Trend,
};
pub use history::{build_history_rows, history_table, newest_first, HistoryRow};
pub use state::{PetFilter, ViewMode, ViewState};

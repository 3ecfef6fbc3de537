//! Text and JSON renderings of session snapshots.
//!
//! Everything here is a pure function of its input. The `show neighbor`
//! output sequences call into these one peer at a time.

mod duration;
mod extensive;
mod json;
mod summary;

pub use self::duration::format_timedelta;
pub use self::extensive::{extensive, extensive_row};
pub use self::json::{MessageTotals, NeighborRecord, SideView, render_json};
pub use self::summary::{SUMMARY_HEADER, summary_row};

/// Renders an optional value, or `n/a` when it is unknown.
pub(crate) fn or_na<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "n/a".to_owned(), |inner| inner.to_string())
}

/// Renders a capability or family flag.
pub(crate) fn enabled(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "enabled",
        Some(false) => "disabled",
        None => "n/a",
    }
}

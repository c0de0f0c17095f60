//! Plugins bundled with the editor

mod date;
mod find;

pub use date::{format_date_time, DatePlugin};
pub use find::{find_after_caret, FindPlugin};

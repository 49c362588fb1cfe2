//! Terminal output: progress bars and log tables.

pub mod progress;
mod table;

pub use table::{render_frame_rows, render_table};

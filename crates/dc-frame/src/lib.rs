//! dc-frame - In-memory tables for data-check
//!
//! A [`Frame`] is a list of named, typed columns of [`Cell`](dc_core::Cell)
//! values. This crate reads expectation files into frames, writes frames as
//! CSV, and compares two frames with an outer merge that tags each row with
//! the side it came from.

pub mod compare;
pub mod csv_io;
pub mod dates;
pub mod error;
pub mod excel;
pub mod frame;
pub mod infer;
pub mod render;

pub use compare::{compare, merge, Comparison, Provenance, MERGE_COLUMN};
pub use csv_io::{read_csv, read_csv_from, to_csv_string, write_csv, write_csv_to};
pub use error::{FrameError, FrameResult};
pub use excel::read_excel;
pub use frame::{Column, Frame};
pub use infer::{ColumnHint, ReadOptions};
pub use render::render_frame;

//! Test utilities for warfield development.
//!
//! - [`field_from_rows`]: build a field from digit strings.
//! - [`PlainCodec`]: a whitespace-separated text codec, easy to type in tests.
//! - [`sequential_names`]: a deterministic username collaborator.
//! - [`tcp_pair`] / [`LineClient`]: real loopback sockets for pump tests.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod codec;
mod net;

pub use codec::PlainCodec;
pub use net::{tcp_pair, LineClient};

use warfield_core::{CellCoord, CellValue};
use warfield_space::Field;

/// Build a field from rows of digits, top row first.
///
/// Panics on ragged rows or non-digit characters.
pub fn field_from_rows(rows: &[&str]) -> Field {
    let height = rows.len() as u32;
    let width = rows.first().map_or(0, |r| r.len()) as u32;
    assert!(
        rows.iter().all(|r| r.len() as u32 == width),
        "ragged rows: {rows:?}"
    );
    Field::from_fn(width, height, |at: CellCoord| {
        let ch = rows[at.y as usize].as_bytes()[at.x as usize];
        assert!(ch.is_ascii_digit(), "non-digit {:?} in rows", ch as char);
        CellValue::new(ch - b'0').expect("digits are valid cell values")
    })
    .expect("rows describe a non-empty grid")
}

/// A name source yielding `"{prefix}1"`, `"{prefix}2"`, ...
pub fn sequential_names(prefix: &str) -> impl FnMut() -> String + Send + 'static {
    let prefix = prefix.to_string();
    let mut n = 0u32;
    move || {
        n += 1;
        format!("{prefix}{n}")
    }
}

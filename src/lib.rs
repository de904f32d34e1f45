//! Plate addressing and index-barcode key resolution for ancient-DNA library preparation.
//!
//! Wells on a 96-well plate are numbered column-major (see [`well`]). Each well receives
//! p5/p7 barcodes from the Q-barcode pool table ([`pool`], [`assign`]) or double-stranded
//! index numbers, and plates may be turned 180° ([`rotate`]). After sequencing, the
//! `i5_i7_p5_p7` key of each demultiplexed library ([`key`]) is resolved back to the
//! declared sample through the sample sheet ([`sheet`], [`resolve`]).

#[macro_use]
extern crate log;

pub mod assign;
pub mod key;
pub mod layout;
pub mod occupancy;
pub mod pool;
pub mod report;
pub mod resolve;
pub mod rotate;
pub mod sheet;
pub mod well;

const fn extra_build_info() -> &'static str {
    match option_env!("CARGO_BUILD_DESC") {
        Some(e) => e,
        None => env!("CARGO_PKG_VERSION"),
    }
}
pub const VERSION: &str = extra_build_info();

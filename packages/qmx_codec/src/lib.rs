//! `qmx_codec` packs sequences of 32-bit unsigned integers into a compact
//! byte stream and unpacks them again, bit-exactly, optimised for the
//! postings-list workloads of inverted indexes.
//!
//! The format is a SIMD-friendly re-implementation of the QMX integer
//! codec: values are grouped into runs, each run is assigned one of 15
//! legal bit widths, and each run's values are interleaved into 16-byte
//! (or, for a handful of widths, paired 32-byte) blocks that a single
//! unaligned SIMD load can unpack. A one-byte *key* per block (or per run
//! of up to 16 identical-width blocks) drives decoding; keys are written to
//! the tail of the output in reverse order so the decoder can walk forward
//! through the payload and backward through the keys at the same time,
//! stopping exactly when the two cursors meet.
//!
//! # Entry points
//!
//! - [`Encoder`] classifies, plans and packs a sequence; it owns its
//!   scratch buffers so repeated calls don't reallocate.
//! - [`decode`] unpacks a previously encoded buffer in one call.
//! - [`decode_resumable`] does the same but threads [`DecodeCursors`]
//!   through the call, so decoding can stop after any number of keys and
//!   continue later into the same destination buffer.
//!
//! # Wire format
//!
//! ```text
//! +---------------------- encoded buffer (len bytes) ----------------------+
//! | payload bytes (growing ->)         | key bytes in REVERSE order (<- grown) |
//! +-------------------------------------+----------------------------------+
//! ^in                                                                 ^keys
//! ```
//!
//! There is no header, length field or magic number: callers must track the
//! original integer count and the encoded length themselves. Byte order is
//! little-endian throughout.
//!
//! # What this crate does not do
//!
//! This is not a general-purpose compressor: inputs must be unsigned values
//! that fit in 32 bits. There is no framing of multiple sequences into a
//! larger file, no CLI, and no attempt to beat the published QMX
//! compression ratios — the goal is a faithful, safe re-implementation of
//! the format and its decode-time performance characteristics.

#![forbid(unsafe_code)]
#![forbid(unsafe_op_in_unsafe_fn)]
#![forbid(rustdoc::broken_intra_doc_links)]
#![deny(missing_docs)]
#![deny(non_ascii_idents)]
#![deny(clippy::print_stdout)]
#![deny(clippy::unimplemented)]
#![warn(explicit_outlives_requirements)]
#![warn(noop_method_call)]
#![warn(unreachable_pub)]
#![warn(unused_import_braces)]
#![warn(unused_qualifications)]
#![warn(clippy::use_self)]
#![warn(clippy::used_underscore_binding)]
#![warn(clippy::redundant_feature_names)]

mod decoder;
mod encoder;
mod error;
mod pack;
mod planner;
mod settings;
mod width;

pub use decoder::{decode, decode_resumable, DecodeCursors};
pub use encoder::Encoder;
pub use error::{DecodeError, EncodeError};
pub use settings::DecodeMode;
pub use width::{entry_for_width, next_legal_width, BlockKind, SelectorEntry, SELECTORS};

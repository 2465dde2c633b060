//! The decoder: reads key bytes from the tail and dispatches through the
//! generated opcode table.

use log::trace;
use qmx_simd::{DefaultVector, Simd128};

use crate::error::DecodeError;
use crate::pack::{
	unpack_natural16, unpack_natural32, unpack_natural8, unpack_single, unpack_straddle,
	unpack_zero
};
use crate::settings::DecodeMode;
use crate::width::entry_for_selector;

include!(concat!(env!("OUT_DIR"), "/dispatch_table.rs"));

/// How many integers dispatching key byte `op` would write, without
/// actually dispatching it. `0` for the reserved selector 15, which writes
/// nothing (it only ever advances `in_pos`).
///
/// Used to bounds-check `dest` before dispatch runs: the generated dispatch
/// table calls a selector's unpack function `batch` times in a row with no
/// per-block counter (that's the whole point of the fall-through format),
/// so nothing inside it can stop partway through a key once started.
/// Corrupt or adversarial input — e.g. a run of width-0 keys, which consume
/// no payload bytes and so never advance `in_pos` — can otherwise claim far
/// more output than any real encode call would, running past the end of
/// `dest`.
fn required_output(op: u8) -> usize {
	let selector = op >> 4;
	let batch = 16 - (op & 0x0F) as usize;
	match entry_for_selector(selector) {
		Some(entry) => batch * entry.ints_per_block as usize,
		None => 0
	}
}

/// Cursor state for a decode that may be interrupted and resumed across
/// multiple calls to [`decode_resumable`]. A fresh decode starts from
/// `DecodeCursors::default()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeCursors {
	/// Byte offset of the forward-advancing payload cursor.
	pub payload_offset: usize,
	/// Number of key bytes already consumed from the tail.
	pub key_offset: usize,
	/// Number of integers already written to the destination buffer.
	pub destination_offset: usize
}

/// Decodes `encoded` into `dest`, returning the number of integers written.
///
/// `dest` must be at least as long as the number of integers originally
/// encoded, plus 256 integers of slack: the last key processed may unpack a
/// full block even if only some of its values are logically significant
/// (the caller is expected to know the true element count out of band and
/// only read that many of `dest`'s leading elements).
pub fn decode(encoded: &[u8], dest: &mut [u32], mode: DecodeMode) -> Result<usize, DecodeError> {
	let mut cursors = DecodeCursors::default();
	decode_resumable(encoded, dest, mode, &mut cursors)?;
	Ok(cursors.destination_offset)
}

/// Like [`decode`], but threads cursor state through `cursors` so decoding
/// can stop after any number of key bytes and resume later, continuing to
/// append into the same `dest` buffer.
///
/// On error, `cursors` still reflects progress made before the failing key
/// byte, so the caller can inspect how far decoding got.
pub fn decode_resumable(
	encoded: &[u8],
	dest: &mut [u32],
	mode: DecodeMode,
	cursors: &mut DecodeCursors
) -> Result<(), DecodeError> {
	let mut in_pos = cursors.payload_offset;
	let mut key_cursor = cursors.key_offset;
	let mut to_pos = cursors.destination_offset;

	let result = (|| -> Result<(), DecodeError> {
		while key_cursor < encoded.len() {
			let keys_pos = encoded.len() - 1 - key_cursor;
			if in_pos > keys_pos {
				break;
			}

			let op = encoded[keys_pos];

			let needed = required_output(op);
			if to_pos + needed > dest.len() {
				return Err(DecodeError::DestinationOverflow { needed, to_pos, dest_len: dest.len() });
			}

			key_cursor += 1;
			dispatch::<DefaultVector>(op, encoded, &mut in_pos, dest, &mut to_pos, mode)?;
		}
		Ok(())
	})();

	trace!("decode stopped at payload byte {in_pos}, {key_cursor} keys consumed, {to_pos} ints written");

	cursors.payload_offset = in_pos;
	cursors.key_offset = key_cursor;
	cursors.destination_offset = to_pos;

	result
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::Encoder;

	fn round_trip(values: &[u32]) -> Vec<u32> {
		let mut encoder = Encoder::new();
		let mut encoded = Vec::new();
		encoder.encode(values, &mut encoded).unwrap();

		let mut dest = vec![0u32; values.len() + 256];
		let count = decode(&encoded, &mut dest, DecodeMode::Strict).unwrap();
		assert!(count >= values.len());
		dest.truncate(values.len());
		dest
	}

	#[test]
	fn empty_sequence_round_trips() {
		assert_eq!(round_trip(&[]), Vec::<u32>::new());
	}

	#[test]
	fn scenario_256_zeros_round_trips() {
		let values = vec![0u32; 256];
		assert_eq!(round_trip(&values), values);
	}

	#[test]
	fn scenario_alternating_bits_round_trips() {
		let values: Vec<u32> = (0..128).map(|i| i % 2).collect();
		assert_eq!(round_trip(&values), values);
	}

	#[test]
	fn scenario_width_8_round_trips() {
		let values = vec![255u32; 16];
		assert_eq!(round_trip(&values), values);
	}

	#[test]
	fn scenario_width_21_round_trips() {
		let values = vec![1u32 << 20; 12];
		assert_eq!(round_trip(&values), values);
	}

	// Uses test-log so the trace/debug calls in `Encoder::encode` and
	// `decode_resumable` show up under `RUST_LOG=trace cargo test -- --nocapture`
	// for this test, the one that exercises the widest mix of selectors.
	#[test_log::test]
	fn mixed_widths_round_trip() {
		let mut values = Vec::new();
		values.extend(std::iter::repeat(0u32).take(300));
		values.extend(std::iter::repeat(3u32).take(64));
		values.extend((0..100).map(|i| i * 12345));
		values.extend(std::iter::repeat(u32::MAX).take(4));
		assert_eq!(round_trip(&values), values);
	}

	#[test]
	fn invalid_selector_is_rejected_in_strict_mode() {
		let encoded = [0xF5u8];
		let mut dest = vec![0u32; 256];
		let result = decode(&encoded, &mut dest, DecodeMode::Strict);
		assert!(matches!(result, Err(DecodeError::InvalidSelector { key: 0xF5 })));
	}

	#[test]
	fn invalid_selector_is_skipped_in_permissive_mode() {
		let encoded = [0xF5u8];
		let mut dest = vec![0u32; 256];
		let count = decode(&encoded, &mut dest, DecodeMode::Permissive).unwrap();
		assert_eq!(count, 0);
	}

	#[test]
	fn resumable_decode_can_be_split_across_calls() {
		let values = vec![7u32; 64 * 3]; // several width-3 blocks batched under one key
		let mut encoder = Encoder::new();
		let mut encoded = Vec::new();
		encoder.encode(&values, &mut encoded).unwrap();

		let mut dest = vec![0u32; values.len() + 256];
		let mut cursors = DecodeCursors::default();

		// Decode in several small steps by re-invoking on the same buffers;
		// since nothing here actually truncates the input, this mostly
		// exercises that repeated resumption converges to the same result
		// as a single call once the cursors stop advancing.
		decode_resumable(&encoded, &mut dest, DecodeMode::Strict, &mut cursors).unwrap();
		let first_pass = cursors;
		decode_resumable(&encoded, &mut dest, DecodeMode::Strict, &mut cursors).unwrap();

		assert_eq!(cursors.destination_offset, first_pass.destination_offset);
		assert_eq!(&dest[..values.len()], values.as_slice());
	}

	#[test]
	fn destination_overflow_is_rejected_instead_of_panicking() {
		// Two width-0 keys (0x00: selector 0, batch 16) each claim 16 * 256
		// = 4096 integers without consuming any payload bytes. A `dest` that
		// can't hold even one of them must error, not panic.
		let encoded = [0x00u8, 0x00u8];
		let mut dest = vec![0u32; 256];
		let result = decode(&encoded, &mut dest, DecodeMode::Strict);
		assert!(matches!(
			result,
			Err(DecodeError::DestinationOverflow { needed: 4096, to_pos: 0, dest_len: 256 })
		));
	}

	#[test]
	fn destination_overflow_is_caught_after_filling_available_space() {
		// One batch-of-1 width-0 key fits exactly (256 integers into a
		// 256-long dest); the next key of the same shape must not.
		let encoded = [0x0Fu8, 0x0Fu8];
		let mut dest = vec![0u32; 256];
		let result = decode(&encoded, &mut dest, DecodeMode::Strict);
		assert!(matches!(
			result,
			Err(DecodeError::DestinationOverflow { needed: 256, to_pos: 256, dest_len: 256 })
		));
	}
}

//! The top-level encoder: classifies, plans, packs and writes keys.

use log::{debug, trace};
use qmx_simd::DefaultVector;
use slice_group_by::GroupBy;
use tinyvec::TinyVec;

use crate::error::EncodeError;
use crate::pack::pack_block;
use crate::planner::classify_and_plan;
use crate::width::entry_for_width;

/// The largest `ints_per_block` in the selector table (width 0's 256), and
/// therefore the size the zero-padding scratch buffer needs.
const MAX_INTS_PER_BLOCK: usize = 256;

/// Inline capacity of the key buffer before it spills to the heap. One key
/// covers up to 16 blocks, so this comfortably covers runs up to ~1 million
/// equal-width values without allocating.
const INLINE_KEYS: usize = 64;

/// Encodes sequences of 32-bit integers into the QMX wire format.
///
/// An `Encoder` owns its scratch buffers (the per-integer width buffer and
/// the zero-padding buffer for a run's final, partially-populated block) so
/// that repeated calls to [`encode`](Self::encode) reuse their allocations
/// instead of reallocating on every call.
#[derive(Debug, Default)]
pub struct Encoder {
	widths: Vec<u8>,
	pad: [u32; MAX_INTS_PER_BLOCK],
	keys: TinyVec<[u8; INLINE_KEYS]>
}

impl Encoder {
	/// Creates an encoder with empty scratch buffers.
	pub fn new() -> Self {
		Self::default()
	}

	/// Encodes `values` into `out`, appending to any existing contents of
	/// `out`'s capacity but first truncating it to empty.
	///
	/// Returns the number of bytes written. `encode(&[])` writes nothing and
	/// returns `0`.
	pub fn encode(&mut self, values: &[u32], out: &mut Vec<u8>) -> Result<usize, EncodeError> {
		out.clear();
		self.keys.clear();

		if values.is_empty() {
			return Ok(0);
		}

		classify_and_plan(values, &mut self.widths);
		trace!("planned {} widths for {} values", self.widths.len(), values.len());

		// Width 0 is the table's own minimum and every value fits in 32
		// bits, so no real classifier can exceed the table: this guards
		// against scratch buffer corruption, not a reachable planner output.
		if let Some(&bad) = self.widths.iter().find(|&&w| w > 32) {
			return Err(EncodeError::FatalWidthOverflow { width: bad as u32 });
		}

		let widths = std::mem::take(&mut self.widths);
		let mut index = 0;
		for run in widths.linear_group() {
			let width = run[0];
			self.pack_run(width, &values[index..index + run.len()], out);
			index += run.len();
		}
		self.widths = widths;

		out.extend(self.keys.iter().rev());
		debug!("encoded {} values into {} bytes ({} keys)", values.len(), out.len(), self.keys.len());

		Ok(out.len())
	}

	/// Packs one run of `values`, all sharing `width`, emitting one key
	/// byte per batch of up to 16 blocks and the blocks themselves.
	fn pack_run(&mut self, width: u8, values: &[u32], out: &mut Vec<u8>) {
		let entry = entry_for_width(width);
		let ints_per_block = entry.ints_per_block as usize;
		let total = values.len();

		let mut offset = 0;
		let mut blocks_remaining = total.div_ceil(ints_per_block);

		while blocks_remaining > 0 {
			let batch = blocks_remaining.min(16);
			self.keys.push((entry.selector << 4) | ((16 - batch) as u8 & 0x0F));

			for _ in 0..batch {
				let available = total - offset;
				if available >= ints_per_block {
					pack_block::<DefaultVector>(entry, &values[offset..offset + ints_per_block], out);
				} else {
					self.pad[..available].copy_from_slice(&values[offset..]);
					self.pad[available..ints_per_block].fill(0);
					pack_block::<DefaultVector>(entry, &self.pad[..ints_per_block], out);
				}
				offset += ints_per_block;
			}

			blocks_remaining -= batch;
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn empty_input_encodes_to_empty_output() {
		let mut encoder = Encoder::new();
		let mut out = Vec::new();
		assert_eq!(encoder.encode(&[], &mut out).unwrap(), 0);
		assert!(out.is_empty());
	}

	#[test]
	fn scenario_256_zeros_is_one_key_no_payload() {
		let mut encoder = Encoder::new();
		let mut out = Vec::new();
		let values = vec![0u32; 256];
		encoder.encode(&values, &mut out).unwrap();
		// Selector 0, batch 1: (selector << 4) | (~(batch - 1) & 0x0F) = 0x0F.
		assert_eq!(out, vec![0x0F]);
	}

	#[test]
	fn scenario_128_ones_is_width_1_key() {
		let mut encoder = Encoder::new();
		let mut out = Vec::new();
		let values = vec![1u32; 128];
		encoder.encode(&values, &mut out).unwrap();

		assert_eq!(out.last(), Some(&0x1F));
		assert_eq!(out.len(), 16 + 1);
		// Width-1 packing interleaves 32 one-bit stripes per lane (§3's lane
		// scheme: stripe `i` of lane `i % 4` sits at bit offset `i / 4`), so
		// a value of 1 at every one of the 32 stripes ORs every bit of every
		// lane to 1, not a single low bit per lane.
		assert_eq!(&out[0..4], &[0xFF, 0xFF, 0xFF, 0xFF]);
	}

	#[test]
	fn scenario_16_max_bytes_is_width_8_key() {
		let mut encoder = Encoder::new();
		let mut out = Vec::new();
		let values = vec![255u32; 16];
		encoder.encode(&values, &mut out).unwrap();

		assert_eq!(out, {
			let mut expected = vec![0xFFu8; 16];
			expected.push(0x8F);
			expected
		});
	}

	#[test]
	fn scenario_21_bit_values_is_width_21_double_block_key() {
		let mut encoder = Encoder::new();
		let mut out = Vec::new();
		let values = vec![1u32 << 20; 12];
		encoder.encode(&values, &mut out).unwrap();

		assert_eq!(out.last(), Some(&0xDF));
		assert_eq!(out.len(), 32 + 1);
	}

	#[test]
	fn many_blocks_of_one_width_batch_into_groups_of_16() {
		let mut encoder = Encoder::new();
		let mut out = Vec::new();
		// 20 width-1 blocks: one key for a batch of 16, one for a batch of 4.
		// Keys are written to the tail in the order the decoder will read
		// them (first-produced key last in the buffer), so the final byte
		// is the batch-of-16 key and the second-to-last is the batch-of-4 one.
		let values = vec![1u32; 128 * 20];
		encoder.encode(&values, &mut out).unwrap();

		let keys = &out[out.len() - 2..];
		assert_eq!(keys, &[0x1C, 0x10]);
	}
}

//! Block-level packing and unpacking, generic over a [`Simd128`] backend.
//!
//! Every function here operates on exactly one repetition unit (one 16-byte
//! block for [`BlockKind::Single`]/[`BlockKind::Natural`], two for
//! [`BlockKind::Straddle`]), which is the granularity the decoder's
//! generated dispatch table calls into.

use qmx_simd::{ones_mask32, Simd128};

use crate::width::{BlockKind, SelectorEntry};

/// Packs one repetition unit's worth of values (`entry.ints_per_block` of
/// them, zero-padded by the caller if fewer are available) into `out`,
/// appending the unit's bytes.
pub(crate) fn pack_block<V: Simd128>(entry: &SelectorEntry, values: &[u32], out: &mut Vec<u8>) {
	debug_assert_eq!(values.len(), entry.ints_per_block as usize);

	match entry.kind {
		BlockKind::Zero => {}
		BlockKind::Single => pack_single::<V>(entry.width, values, out),
		BlockKind::Natural => pack_natural(entry.width, values, out),
		BlockKind::Straddle => pack_straddle::<V>(entry.width, values, out)
	}
}

fn pack_single<V: Simd128>(width: u8, values: &[u32], out: &mut Vec<u8>) {
	let stripes = values.len() / 4;
	let mut acc = V::zero();

	for stripe in 0..stripes {
		let lane = V::from_lanes([
			values[stripe * 4],
			values[stripe * 4 + 1],
			values[stripe * 4 + 2],
			values[stripe * 4 + 3]
		]);
		acc = acc.or(lane.shl32((stripe * width as usize) as u32));
	}

	let base = out.len();
	out.resize(base + 16, 0);
	acc.store(&mut out[base..base + 16]);
}

fn pack_natural(width: u8, values: &[u32], out: &mut Vec<u8>) {
	match width {
		8 => out.extend(values.iter().map(|&v| v as u8)),
		16 => out.extend(values.iter().flat_map(|&v| (v as u16).to_le_bytes())),
		32 => out.extend(values.iter().flat_map(|&v| v.to_le_bytes())),
		_ => unreachable!("natural packing is only defined for widths 8, 16 and 32")
	}
}

fn pack_straddle<V: Simd128>(width: u8, values: &[u32], out: &mut Vec<u8>) {
	let stripes = values.len() / 4;
	let mut lane_acc = [0u64; 4];

	for stripe in 0..stripes {
		let offset = (stripe * width as usize) as u32;
		for lane in 0..4 {
			lane_acc[lane] |= u64::from(values[stripe * 4 + lane]) << offset;
		}
	}

	let block_a = V::from_lanes(lane_acc.map(|acc| acc as u32));
	let block_b = V::from_lanes(lane_acc.map(|acc| (acc >> 32) as u32));

	let base = out.len();
	out.resize(base + 32, 0);
	block_a.store(&mut out[base..base + 16]);
	block_b.store(&mut out[base + 16..base + 32]);
}

/// Unpacks one width-0 repetition unit: 256 implicit zeros, no payload
/// bytes consumed.
pub(crate) fn unpack_zero(dest: &mut [u32], to_pos: &mut usize) {
	dest[*to_pos..*to_pos + 256].fill(0);
	*to_pos += 256;
}

/// Unpacks one single-block repetition unit of `width` bits, `count`
/// values, advancing `in_pos` by 16 and `to_pos` by `count`.
pub(crate) fn unpack_single<V: Simd128>(
	payload: &[u8],
	in_pos: &mut usize,
	width: u8,
	count: usize,
	dest: &mut [u32],
	to_pos: &mut usize
) {
	let block = V::load(&payload[*in_pos..*in_pos + 16]);
	let mask = V::from_lanes([ones_mask32(width); 4]);

	for stripe in 0..count / 4 {
		let offset = (stripe * width as usize) as u32;
		let lanes = block.shr32(offset).and(mask).to_lanes();
		dest[*to_pos + stripe * 4..*to_pos + stripe * 4 + 4].copy_from_slice(&lanes);
	}

	*in_pos += 16;
	*to_pos += count;
}

/// Unpacks one width-8 natural block (16 values), advancing `in_pos` by 16
/// and `to_pos` by 16.
pub(crate) fn unpack_natural8<V: Simd128>(
	payload: &[u8],
	in_pos: &mut usize,
	dest: &mut [u32],
	to_pos: &mut usize
) {
	let block = V::load(&payload[*in_pos..*in_pos + 16]);
	for group in block.widen8to32() {
		dest[*to_pos..*to_pos + 4].copy_from_slice(&group.to_lanes());
		*to_pos += 4;
	}
	*in_pos += 16;
}

/// Unpacks one width-16 natural block (8 values), advancing `in_pos` by 16
/// and `to_pos` by 8.
pub(crate) fn unpack_natural16<V: Simd128>(
	payload: &[u8],
	in_pos: &mut usize,
	dest: &mut [u32],
	to_pos: &mut usize
) {
	let block = V::load(&payload[*in_pos..*in_pos + 16]);
	for group in block.widen16to32() {
		dest[*to_pos..*to_pos + 4].copy_from_slice(&group.to_lanes());
		*to_pos += 4;
	}
	*in_pos += 16;
}

/// Unpacks one width-32 natural block (4 values), advancing `in_pos` by 16
/// and `to_pos` by 4.
pub(crate) fn unpack_natural32<V: Simd128>(
	payload: &[u8],
	in_pos: &mut usize,
	dest: &mut [u32],
	to_pos: &mut usize
) {
	let block = V::load(&payload[*in_pos..*in_pos + 16]);
	dest[*to_pos..*to_pos + 4].copy_from_slice(&block.to_lanes());
	*to_pos += 4;
	*in_pos += 16;
}

/// Unpacks one straddling double-block repetition unit of `width` bits,
/// `count` values, advancing `in_pos` by 32 and `to_pos` by `count`.
///
/// Each stripe's value lives in a 64-bit window formed by pairing block A's
/// lane (low 32 bits) with block B's lane (high 32 bits); a stripe whose
/// window falls entirely in A or B is a plain 32-bit shift-and-mask, and a
/// stripe that straddles the boundary combines the low bits shifted out of
/// A with the high bits shifted in from B. This reduces to the same
/// shift/mask arithmetic for every straddling width (7, 9, 12, 21) without
/// needing a different hand-written formula per width.
pub(crate) fn unpack_straddle<V: Simd128>(
	payload: &[u8],
	in_pos: &mut usize,
	width: u8,
	count: usize,
	dest: &mut [u32],
	to_pos: &mut usize
) {
	let block_a = V::load(&payload[*in_pos..*in_pos + 16]);
	let block_b = V::load(&payload[*in_pos + 16..*in_pos + 32]);
	let mask = V::from_lanes([ones_mask32(width); 4]);
	let width = width as u32;

	for stripe in 0..count / 4 {
		let offset = stripe as u32 * width;

		let lanes = if offset + width <= 32 {
			block_a.shr32(offset)
		} else if offset >= 32 {
			block_b.shr32(offset - 32)
		} else {
			block_a.shr32(offset).or(block_b.shl32(32 - offset))
		}
		.and(mask)
		.to_lanes();

		dest[*to_pos + stripe * 4..*to_pos + stripe * 4 + 4].copy_from_slice(&lanes);
	}

	*in_pos += 32;
	*to_pos += count;
}

#[cfg(test)]
mod test {
	use qmx_simd::scalar::ScalarVector;

	use super::*;
	use crate::width::entry_for_width;

	fn round_trip(width: u8, values: &[u32]) -> Vec<u32> {
		let entry = entry_for_width(width);
		let mut payload = Vec::new();
		pack_block::<ScalarVector>(entry, values, &mut payload);

		let mut dest = vec![0u32; entry.ints_per_block as usize];
		let mut in_pos = 0;
		let mut to_pos = 0;
		match entry.kind {
			BlockKind::Zero => unpack_zero(&mut dest, &mut to_pos),
			BlockKind::Single => unpack_single::<ScalarVector>(
				&payload,
				&mut in_pos,
				width,
				values.len(),
				&mut dest,
				&mut to_pos
			),
			BlockKind::Natural => match width {
				8 => unpack_natural8::<ScalarVector>(&payload, &mut in_pos, &mut dest, &mut to_pos),
				16 => {
					unpack_natural16::<ScalarVector>(&payload, &mut in_pos, &mut dest, &mut to_pos)
				}
				32 => {
					unpack_natural32::<ScalarVector>(&payload, &mut in_pos, &mut dest, &mut to_pos)
				}
				_ => unreachable!()
			},
			BlockKind::Straddle => unpack_straddle::<ScalarVector>(
				&payload,
				&mut in_pos,
				width,
				values.len(),
				&mut dest,
				&mut to_pos
			)
		}

		dest
	}

	#[test]
	fn single_block_widths_round_trip() {
		for &width in &[1u8, 2, 3, 4, 5, 6, 10] {
			let entry = entry_for_width(width);
			let mask = qmx_simd::ones_mask32(width);
			let values: Vec<u32> = (0..entry.ints_per_block as u32).map(|i| i & mask).collect();
			assert_eq!(round_trip(width, &values), values, "width {width}");
		}
	}

	#[test]
	fn natural_widths_round_trip() {
		for &width in &[8u8, 16, 32] {
			let entry = entry_for_width(width);
			let mask: u32 = if width == 32 {
				u32::MAX
			} else {
				qmx_simd::ones_mask32(width)
			};
			let values: Vec<u32> = (0..entry.ints_per_block as u32)
				.map(|i| i.wrapping_mul(2654435761) & mask)
				.collect();
			assert_eq!(round_trip(width, &values), values, "width {width}");
		}
	}

	#[test]
	fn straddling_widths_round_trip() {
		for &width in &[7u8, 9, 12, 21] {
			let entry = entry_for_width(width);
			let mask = qmx_simd::ones_mask32(width);
			let values: Vec<u32> = (0..entry.ints_per_block as u32)
				.map(|i| (i.wrapping_mul(2654435761)) & mask)
				.collect();
			assert_eq!(round_trip(width, &values), values, "width {width}");
		}
	}

	#[test]
	fn zero_width_unpacks_to_256_zeros() {
		let mut dest = vec![1u32; 256];
		let mut to_pos = 0;
		unpack_zero(&mut dest, &mut to_pos);
		assert_eq!(to_pos, 256);
		assert!(dest.iter().all(|&v| v == 0));
	}
}

//! NEON backend for [`Simd128`].
//!
//! NEON is part of the aarch64 baseline instruction set, so this backend
//! needs no additional target feature beyond the architecture itself.

use std::arch::aarch64::{
	uint8x16_t, uint32x4_t, vandq_u32, vdupq_n_s32, vdupq_n_s64, vget_high_u8, vget_high_u16,
	vget_low_u8, vget_low_u16, vld1q_u8, vmovl_u8, vmovl_u16, vorrq_u32, vreinterpretq_u32_u64,
	vreinterpretq_u64_u32, vreinterpretq_u32_u8, vshlq_u32, vshlq_u64, vst1q_u8
};

use crate::Simd128;

/// A 128-bit vector backed by a `uint32x4_t` NEON register.
#[derive(Clone, Copy)]
pub struct NeonVector(uint32x4_t);

impl NeonVector {
	fn from_bytes_vector(bytes: uint8x16_t) -> Self {
		// SAFETY: reinterpreting a 128-bit NEON register's lane width has no
		// preconditions.
		Self(unsafe { vreinterpretq_u32_u8(bytes) })
	}
}

impl Simd128 for NeonVector {
	fn load(bytes: &[u8]) -> Self {
		assert!(bytes.len() >= 16, "need at least 16 bytes to load a vector");

		// SAFETY: `vld1q_u8` accepts unaligned pointers, and the length
		// assertion above guarantees the 16-byte read is in bounds.
		Self::from_bytes_vector(unsafe { vld1q_u8(bytes.as_ptr()) })
	}

	fn store(self, bytes: &mut [u8]) {
		assert!(bytes.len() >= 16, "need at least 16 bytes to store a vector");

		// SAFETY: `vst1q_u8` accepts unaligned pointers, and the length
		// assertion above guarantees the 16-byte write is in bounds.
		unsafe { vst1q_u8(bytes.as_mut_ptr(), vreinterpretq_u32_u8(self.0)) }
	}

	fn and(self, rhs: Self) -> Self {
		// SAFETY: `vandq_u32` has no preconditions beyond valid operands.
		Self(unsafe { vandq_u32(self.0, rhs.0) })
	}

	fn or(self, rhs: Self) -> Self {
		// SAFETY: same as `and`.
		Self(unsafe { vorrq_u32(self.0, rhs.0) })
	}

	fn shl32(self, count: u32) -> Self {
		// SAFETY: `vshlq_u32`/`vdupq_n_s32` have no preconditions; a positive
		// per-lane shift amount shifts left, matching this method's contract.
		Self(unsafe { vshlq_u32(self.0, vdupq_n_s32(count as i32)) })
	}

	fn shr32(self, count: u32) -> Self {
		// SAFETY: a negative per-lane shift amount shifts right (logically,
		// since the operand is unsigned).
		Self(unsafe { vshlq_u32(self.0, vdupq_n_s32(-(count as i32))) })
	}

	fn shr64(self, count: u32) -> Self {
		// SAFETY: reinterpret to 64-bit lanes, shift right, reinterpret back;
		// none of these operations have additional preconditions.
		unsafe {
			let wide = vreinterpretq_u64_u32(self.0);
			let shifted = vshlq_u64(wide, vdupq_n_s64(-(count as i64)));
			Self(vreinterpretq_u32_u64(shifted))
		}
	}

	fn widen8to32(self) -> [Self; 4] {
		// SAFETY: `vmovl_u8`/`vmovl_u16`/`vget_{low,high}_*` zero-extend or
		// extract halves of a register; none have additional preconditions.
		unsafe {
			let as_bytes: uint8x16_t = std::mem::transmute(self.0);
			let low_half = vmovl_u8(vget_low_u8(as_bytes));
			let high_half = vmovl_u8(vget_high_u8(as_bytes));
			[
				Self(vmovl_u16(vget_low_u16(low_half))),
				Self(vmovl_u16(vget_high_u16(low_half))),
				Self(vmovl_u16(vget_low_u16(high_half))),
				Self(vmovl_u16(vget_high_u16(high_half)))
			]
		}
	}

	fn widen16to32(self) -> [Self; 2] {
		// SAFETY: see `widen8to32`.
		unsafe {
			let as_halfwords: std::arch::aarch64::uint16x8_t = std::mem::transmute(self.0);
			[
				Self(vmovl_u16(vget_low_u16(as_halfwords))),
				Self(vmovl_u16(vget_high_u16(as_halfwords)))
			]
		}
	}

	fn to_lanes(self) -> [u32; 4] {
		let mut bytes = [0u8; 16];
		self.store(&mut bytes);
		[
			u32::from_le_bytes(bytes[0..4].try_into().unwrap()),
			u32::from_le_bytes(bytes[4..8].try_into().unwrap()),
			u32::from_le_bytes(bytes[8..12].try_into().unwrap()),
			u32::from_le_bytes(bytes[12..16].try_into().unwrap())
		]
	}

	fn from_lanes(lanes: [u32; 4]) -> Self {
		let mut bytes = [0u8; 16];
		for (lane, chunk) in lanes.iter().zip(bytes.chunks_exact_mut(4)) {
			chunk.copy_from_slice(&lane.to_le_bytes());
		}
		Self::load(&bytes)
	}

	fn zero() -> Self {
		Self::from_lanes([0; 4])
	}
}

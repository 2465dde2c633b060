//! WebAssembly `simd128` backend for [`Simd128`].

use std::arch::wasm32::{
	u16x8_extend_high_u8x16, u16x8_extend_low_u8x16, u32x4, u32x4_extend_high_u16x8,
	u32x4_extend_low_u16x8, u32x4_shl, u32x4_shr, u64x2_shr, v128, v128_and, v128_load, v128_or,
	v128_store
};

use crate::Simd128;

/// A 128-bit vector backed by a WASM `v128` SIMD register.
#[derive(Clone, Copy)]
pub struct Wasm128Vector(v128);

impl Simd128 for Wasm128Vector {
	fn load(bytes: &[u8]) -> Self {
		assert!(bytes.len() >= 16, "need at least 16 bytes to load a vector");

		// SAFETY: `v128_load` performs an unaligned 16-byte load, and the
		// length assertion above guarantees that read is in bounds.
		Self(unsafe { v128_load(bytes.as_ptr().cast()) })
	}

	fn store(self, bytes: &mut [u8]) {
		assert!(bytes.len() >= 16, "need at least 16 bytes to store a vector");

		// SAFETY: `v128_store` performs an unaligned 16-byte store, and the
		// length assertion above guarantees that write is in bounds.
		unsafe { v128_store(bytes.as_mut_ptr().cast(), self.0) }
	}

	fn and(self, rhs: Self) -> Self {
		Self(v128_and(self.0, rhs.0))
	}

	fn or(self, rhs: Self) -> Self {
		Self(v128_or(self.0, rhs.0))
	}

	fn shl32(self, count: u32) -> Self {
		Self(u32x4_shl(self.0, count))
	}

	fn shr32(self, count: u32) -> Self {
		Self(u32x4_shr(self.0, count))
	}

	fn shr64(self, count: u32) -> Self {
		Self(u64x2_shr(self.0, count))
	}

	fn widen8to32(self) -> [Self; 4] {
		let low_halfwords = u16x8_extend_low_u8x16(self.0);
		let high_halfwords = u16x8_extend_high_u8x16(self.0);
		[
			Self(u32x4_extend_low_u16x8(low_halfwords)),
			Self(u32x4_extend_high_u16x8(low_halfwords)),
			Self(u32x4_extend_low_u16x8(high_halfwords)),
			Self(u32x4_extend_high_u16x8(high_halfwords))
		]
	}

	fn widen16to32(self) -> [Self; 2] {
		[
			Self(u32x4_extend_low_u16x8(self.0)),
			Self(u32x4_extend_high_u16x8(self.0))
		]
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
		Self(u32x4(lanes[0], lanes[1], lanes[2], lanes[3]))
	}

	fn zero() -> Self {
		Self::from_lanes([0; 4])
	}
}

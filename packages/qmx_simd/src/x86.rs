//! SSE4.1 backend for [`Simd128`].
//!
//! Requires the `sse4.1` target feature (for `_mm_mullo_epi32`'s ancestor,
//! the zero-extending widen instructions `pmovzxbd`/`pmovzxwd`) to be active
//! at compile time; see [`crate::DefaultVector`] for how that's selected.

use std::arch::x86_64::{
	__m128i, _mm_and_si128, _mm_cvtepu8_epi32, _mm_cvtepu16_epi32, _mm_loadu_si128, _mm_or_si128,
	_mm_setzero_si128, _mm_slli_epi32, _mm_srli_epi32, _mm_srli_epi64, _mm_srli_si128,
	_mm_storeu_si128
};

use crate::Simd128;

/// A 128-bit vector backed by an `__m128i` SSE register.
#[derive(Clone, Copy)]
pub struct Sse41Vector(__m128i);

impl Simd128 for Sse41Vector {
	fn load(bytes: &[u8]) -> Self {
		assert!(bytes.len() >= 16, "need at least 16 bytes to load a vector");

		// SAFETY: `_mm_loadu_si128` accepts unaligned pointers, and the length
		// assertion above guarantees the 16-byte read is in bounds.
		Self(unsafe { _mm_loadu_si128(bytes.as_ptr().cast::<__m128i>()) })
	}

	fn store(self, bytes: &mut [u8]) {
		assert!(bytes.len() >= 16, "need at least 16 bytes to store a vector");

		// SAFETY: `_mm_storeu_si128` accepts unaligned pointers, and the
		// length assertion above guarantees the 16-byte write is in bounds.
		unsafe { _mm_storeu_si128(bytes.as_mut_ptr().cast::<__m128i>(), self.0) }
	}

	fn and(self, rhs: Self) -> Self {
		// SAFETY: `_mm_and_si128` is always safe to call given valid `__m128i` values.
		Self(unsafe { _mm_and_si128(self.0, rhs.0) })
	}

	fn or(self, rhs: Self) -> Self {
		// SAFETY: same as `and`.
		Self(unsafe { _mm_or_si128(self.0, rhs.0) })
	}

	fn shl32(self, count: u32) -> Self {
		// SAFETY: `_mm_slli_epi32` is always safe; out-of-range counts yield
		// an all-zero result in hardware, matching this trait's contract.
		Self(unsafe { _mm_slli_epi32(self.0, count as i32) })
	}

	fn shr32(self, count: u32) -> Self {
		// SAFETY: see `shl32`.
		Self(unsafe { _mm_srli_epi32(self.0, count as i32) })
	}

	fn shr64(self, count: u32) -> Self {
		// SAFETY: see `shl32`.
		Self(unsafe { _mm_srli_epi64(self.0, count as i32) })
	}

	fn widen8to32(self) -> [Self; 4] {
		// SAFETY: `_mm_cvtepu8_epi32` zero-extends the low 4 bytes of the
		// register; `_mm_srli_si128` shifts whole bytes out of the register
		// to bring the next 4-byte group into the low position. Both are
		// always safe to call given a valid `__m128i`.
		unsafe {
			[
				Self(_mm_cvtepu8_epi32(self.0)),
				Self(_mm_cvtepu8_epi32(_mm_srli_si128(self.0, 4))),
				Self(_mm_cvtepu8_epi32(_mm_srli_si128(self.0, 8))),
				Self(_mm_cvtepu8_epi32(_mm_srli_si128(self.0, 12)))
			]
		}
	}

	fn widen16to32(self) -> [Self; 2] {
		// SAFETY: same reasoning as `widen8to32`, with 16-bit lanes.
		unsafe {
			[
				Self(_mm_cvtepu16_epi32(self.0)),
				Self(_mm_cvtepu16_epi32(_mm_srli_si128(self.0, 8)))
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
		// SAFETY: `_mm_setzero_si128` has no preconditions.
		Self(unsafe { _mm_setzero_si128() })
	}
}

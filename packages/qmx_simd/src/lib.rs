//! Portable 128-bit SIMD lane primitives for [`qmx_codec`](https://docs.rs/qmx_codec).
//!
//! # Overview
//!
//! The QMX packer and decoder operate on 16-byte blocks treated as four
//! 32-bit lanes. Every block operation the codec needs reduces to a small
//! set of primitives that essentially every 128-bit SIMD instruction set
//! offers: unaligned load/store, bitwise AND/OR, 32-bit lane shifts, and
//! 8-bit/16-bit zero-extending widening. This crate collects those
//! primitives behind the [`Simd128`] trait so the codec's packing and
//! unpacking logic can be written once, generically, and instantiated over
//! whichever backend is available for the compilation target.
//!
//! # Backends
//!
//! - [`scalar::ScalarVector`] — a portable, `#![forbid(unsafe_code)]`
//!   reference backend that represents a vector as four plain `u32` lanes.
//!   Always available, and the one [`DefaultVector`] resolves to unless a
//!   target-specific backend is both enabled (via its crate feature) and
//!   its target feature is active at compile time.
//! - `x86` (behind the `simd-x86` feature) — SSE4.1 / SSSE3 intrinsics.
//! - `aarch64` (behind the `simd-aarch64` feature) — NEON intrinsics.
//! - `wasm32` (behind the `simd-wasm32` feature) — `simd128` intrinsics.
//!
//! Target-specific backends are selected at **compile time** via `cfg`, not
//! runtime feature detection: this keeps the codec's generated decode table
//! (see `qmx_codec`'s `build.rs`) monomorphic over a single concrete vector
//! type per build, which is simpler to reason about than a dynamically
//! dispatched table. A deployment that needs to pick a backend at runtime
//! (e.g. a prebuilt binary distributed to heterogeneous x86_64 hosts) is
//! expected to build several copies of `qmx_codec` behind
//! `is_x86_feature_detected!`-style dispatch at the call site, the same way
//! `multiversion`-style crates do; that policy decision is deliberately left
//! to the caller.

#![forbid(unsafe_op_in_unsafe_fn)]
#![forbid(rustdoc::broken_intra_doc_links)]
#![deny(missing_docs)]

#[forbid(unsafe_code)]
pub mod scalar;

#[cfg(all(target_arch = "x86_64", feature = "simd-x86"))]
pub mod x86;

#[cfg(all(target_arch = "aarch64", feature = "simd-aarch64"))]
pub mod aarch64;

#[cfg(all(target_arch = "wasm32", feature = "simd-wasm32"))]
pub mod wasm32;


/// The 128-bit lane operations the QMX packer and decoder are built from.
///
/// A type implementing this trait represents one 16-byte SIMD register,
/// interpreted as four 32-bit lanes unless a method's documentation says
/// otherwise. All shift amounts are lane-uniform: every lane is shifted by
/// the same amount in one call, matching what real SIMD shift instructions
/// (`psrld`, `vshr.u32`, `i32x4.shr_u`, ...) provide.
///
/// Implementors should be cheap to copy (typically a newtype over `[u32; 4]`
/// or the platform's native vector type) and must not panic for any input
/// accepted by the method signatures below.
pub trait Simd128: Copy {
	/// Loads 16 bytes from `bytes` into a vector of four little-endian
	/// 32-bit lanes. The load is unaligned: `bytes` need not be 16-byte
	/// aligned.
	///
	/// # Panics
	///
	/// Panics if `bytes.len() < 16`.
	fn load(bytes: &[u8]) -> Self;

	/// Stores this vector's four 32-bit lanes to `bytes` as 16
	/// little-endian bytes. The store is unaligned.
	///
	/// # Panics
	///
	/// Panics if `bytes.len() < 16`.
	fn store(self, bytes: &mut [u8]);

	/// Lane-wise bitwise AND.
	fn and(self, rhs: Self) -> Self;

	/// Lane-wise bitwise OR.
	fn or(self, rhs: Self) -> Self;

	/// Lane-wise logical left shift of each 32-bit lane by `count` bits.
	///
	/// `count` must be in `0..32`; a shift of 32 or more is not a supported
	/// operation on any of the targeted instruction sets and implementors
	/// are free to return any value (matching the behavior of `pslld` with
	/// an out-of-range immediate, which is masked to 5 bits by hardware).
	fn shl32(self, count: u32) -> Self;

	/// Lane-wise logical right shift of each 32-bit lane by `count` bits.
	///
	/// Same `count` contract as [`shl32`](Self::shl32).
	fn shr32(self, count: u32) -> Self;

	/// Logical right shift of each of the two 64-bit lanes (formed by
	/// pairing 32-bit lanes 0-1 and 2-3, lane 0/2 holding the low 32 bits)
	/// by `count` bits, where `count` is in `0..64`.
	///
	/// This mirrors instructions such as `psrlq` / `vshrq_n_u64`, which
	/// operate on a 128-bit register as two 64-bit lanes rather than four
	/// 32-bit ones. The straddle-width unpacking described in the codec's
	/// specification can be expressed in terms of this 64-bit-lane
	/// factoring; the reference scalar/x86/NEON decode paths in `qmx_codec`
	/// use an equivalent 32-bit-lane formulation that avoids an extra
	/// lane-interleave step, but this method is kept available (and tested)
	/// for backends or future widths that prefer the 64-bit factoring.
	fn shr64(self, count: u32) -> Self;

	/// Zero-extends each of the 16 bytes of this vector to a 32-bit lane,
	/// returning four vectors of four lanes each, in ascending byte/lane
	/// order (the first returned vector holds bytes 0..4 widened, and so
	/// on).
	fn widen8to32(self) -> [Self; 4];

	/// Zero-extends each of the 8 little-endian 16-bit half-words of this
	/// vector to a 32-bit lane, returning two vectors of four lanes each,
	/// in ascending half-word order (the first returned vector holds
	/// half-words 0..4 widened).
	fn widen16to32(self) -> [Self; 2];

	/// Returns this vector's four 32-bit lanes as a plain array, least
	/// significant lane first.
	///
	/// This is not one of the primitives `spec.md` requires of a SIMD
	/// instruction set; it exists so `qmx_codec`'s packing code, which
	/// needs to read and write individual lane values while accumulating a
	/// block, doesn't have to round-trip through a byte buffer to do so.
	fn to_lanes(self) -> [u32; 4];

	/// Builds a vector from four 32-bit lanes, least significant lane
	/// first. See [`to_lanes`](Self::to_lanes) for why this exists.
	fn from_lanes(lanes: [u32; 4]) -> Self;

	/// A vector with all lanes set to zero.
	fn zero() -> Self;
}

#[cfg(all(target_arch = "x86_64", feature = "simd-x86", target_feature = "sse4.1"))]
/// The vector type `DefaultVector` resolves to on this build: SSE4.1.
pub type DefaultVector = x86::Sse41Vector;

#[cfg(all(
	target_arch = "aarch64",
	feature = "simd-aarch64",
	not(all(target_arch = "x86_64", feature = "simd-x86", target_feature = "sse4.1"))
))]
/// The vector type `DefaultVector` resolves to on this build: NEON.
pub type DefaultVector = aarch64::NeonVector;

#[cfg(all(
	target_arch = "wasm32",
	feature = "simd-wasm32",
	not(all(target_arch = "x86_64", feature = "simd-x86", target_feature = "sse4.1")),
	not(all(target_arch = "aarch64", feature = "simd-aarch64"))
))]
/// The vector type `DefaultVector` resolves to on this build: WASM SIMD128.
pub type DefaultVector = wasm32::Wasm128Vector;

#[cfg(not(any(
	all(target_arch = "x86_64", feature = "simd-x86", target_feature = "sse4.1"),
	all(target_arch = "aarch64", feature = "simd-aarch64"),
	all(target_arch = "wasm32", feature = "simd-wasm32")
)))]
/// The vector type `DefaultVector` resolves to on this build: the portable
/// scalar fallback, used whenever no target-specific backend is both
/// enabled and active for this compilation.
pub type DefaultVector = scalar::ScalarVector;

/// Returns a 32-bit mask with the `width` least significant bits set to
/// one, and the rest set to zero. `width` must be in `0..=32`.
pub const fn ones_mask32(width: u8) -> u32 {
	if width >= 32 {
		u32::MAX
	} else {
		(1u32 << width) - 1
	}
}

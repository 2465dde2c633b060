//! Error types returned by [`crate::Encoder`] and [`crate::decode`].

/// Failure modes of [`crate::Encoder::encode`].
///
/// `encode` writes into a growable `Vec<u8>` rather than a fixed-capacity
/// buffer, so there is no "ran out of output space" case to report here;
/// the only way this codec fails during encoding is the unreachable
/// classifier-corruption check below.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum EncodeError {
	/// The classifier produced a width greater than 32, which cannot happen
	/// for well-formed 32-bit input and indicates buffer corruption or a
	/// classifier bug.
	#[error("bit-width classifier produced an out-of-range width {width}")]
	FatalWidthOverflow {
		/// The offending (impossible) width.
		width: u32
	}
}

/// Failure modes of [`crate::decode`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
	/// A key byte selected the reserved selector index 15 (key byte in
	/// `0xF0..=0xFF`). Only returned when decoding in
	/// [`DecodeMode::Strict`](crate::DecodeMode::Strict).
	#[error("key byte 0x{key:02x} selects the reserved selector 15")]
	InvalidSelector {
		/// The offending key byte.
		key: u8
	},
	/// The next key byte would write past the end of the destination
	/// buffer. Returned instead of panicking when `dest` is too small (or
	/// malicious/corrupt input claims far more output than it should).
	#[error(
		"decoding the next key would write {needed} integers at offset {to_pos}, \
		 past the destination buffer's length of {dest_len}"
	)]
	DestinationOverflow {
		/// How many integers the next key's batch would write.
		needed: usize,
		/// How many integers had already been written.
		to_pos: usize,
		/// The destination buffer's total length.
		dest_len: usize
	}
}

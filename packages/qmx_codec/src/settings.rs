//! Decoder configuration.

/// How the decoder treats a key byte that selects the reserved selector 15
/// (key byte in `0xF0..=0xFF`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodeMode {
	/// Fail with [`DecodeError::InvalidSelector`](crate::DecodeError::InvalidSelector).
	/// The default: reserved selectors only ever appear in corrupt or
	/// adversarial input, and silently skipping bytes hides that.
	#[default]
	Strict,
	/// Skip one input byte and keep decoding, matching the upstream QMX
	/// decoder's behaviour for reserved selectors.
	Permissive
}

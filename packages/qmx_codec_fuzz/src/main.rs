use qmx_codec::{decode, DecodeMode};

// Decoding assumes a well-formed encoded buffer (see qmx_codec's crate docs
// on the wire format's caller contract: trailing slack past the last
// payload byte, a destination buffer big enough for one block of
// overshoot). Fuzzing with arbitrary bytes routinely violates that
// contract, so every input is padded generously before decoding; what this
// target is really checking is that corrupt *keys* within an
// otherwise-sized buffer never read or write out of the slices we actually
// gave it. A run of width-0 keys consumes no payload bytes and so can
// claim far more output than `dest` holds (`DEST_SLACK` bounds how much);
// `decode` is expected to reject that with `DecodeError::DestinationOverflow`
// rather than write past `dest`, which is why this only asserts "no panic",
// not "no error".
const PAYLOAD_SLACK: usize = 64;
const DEST_SLACK: usize = 1 << 16;

fn main() {
	afl::fuzz!(|data: &[u8]| {
		let mut encoded = data.to_vec();
		encoded.resize(encoded.len() + PAYLOAD_SLACK, 0);

		let mut dest = vec![0u32; DEST_SLACK];

		// Each fuzz run has to be pretty fast. Just check that no crashes happen.
		decode(&encoded, &mut dest, DecodeMode::Permissive).ok();
	})
}

//! Generates the decoder's 256-entry opcode dispatch table.
//!
//! The key byte format packs a 4-bit selector and a 4-bit batch count (1..16
//! blocks of that selector) into one byte. Rather than hand-write 256
//! match arms (16 batch sizes times 16 selector slots, 15 of them legal),
//! this script emits them: one match arm per key byte, whose body calls the
//! selector's unpack function `batch` times in a straight sequence. Writing
//! the calls out `batch` times instead of looping keeps the decoder's inner
//! dispatch free of any per-block counter, matching the fall-through
//! dispatch the format is built around.

use std::env;
use std::fmt::Write as _;
use std::path::Path;

/// Mirrors `crate::width::BlockKind`; duplicated here because build scripts
/// compile and run before the crate they're building, so they can't import
/// its types.
enum Kind {
	Zero,
	Single,
	Natural8,
	Natural16,
	Natural32,
	Straddle
}

struct Selector {
	index: u8,
	width: u8,
	ints_per_block: u16,
	kind: Kind
}

const SELECTORS: [Selector; 15] = [
	Selector { index: 0, width: 0, ints_per_block: 256, kind: Kind::Zero },
	Selector { index: 1, width: 1, ints_per_block: 128, kind: Kind::Single },
	Selector { index: 2, width: 2, ints_per_block: 64, kind: Kind::Single },
	Selector { index: 3, width: 3, ints_per_block: 40, kind: Kind::Single },
	Selector { index: 4, width: 4, ints_per_block: 32, kind: Kind::Single },
	Selector { index: 5, width: 5, ints_per_block: 24, kind: Kind::Single },
	Selector { index: 6, width: 6, ints_per_block: 20, kind: Kind::Single },
	Selector { index: 7, width: 7, ints_per_block: 36, kind: Kind::Straddle },
	Selector { index: 8, width: 8, ints_per_block: 16, kind: Kind::Natural8 },
	Selector { index: 9, width: 9, ints_per_block: 28, kind: Kind::Straddle },
	Selector { index: 10, width: 10, ints_per_block: 12, kind: Kind::Single },
	Selector { index: 11, width: 12, ints_per_block: 20, kind: Kind::Straddle },
	Selector { index: 12, width: 16, ints_per_block: 8, kind: Kind::Natural16 },
	Selector { index: 13, width: 21, ints_per_block: 12, kind: Kind::Straddle },
	Selector { index: 14, width: 32, ints_per_block: 4, kind: Kind::Natural32 }
];

fn call_expr(selector: &Selector) -> String {
	match selector.kind {
		Kind::Zero => "unpack_zero(dest, to_pos)".to_owned(),
		Kind::Single => format!(
			"unpack_single::<V>(payload, in_pos, {}, {}, dest, to_pos)",
			selector.width, selector.ints_per_block
		),
		Kind::Natural8 => "unpack_natural8::<V>(payload, in_pos, dest, to_pos)".to_owned(),
		Kind::Natural16 => "unpack_natural16::<V>(payload, in_pos, dest, to_pos)".to_owned(),
		Kind::Natural32 => "unpack_natural32::<V>(payload, in_pos, dest, to_pos)".to_owned(),
		Kind::Straddle => format!(
			"unpack_straddle::<V>(payload, in_pos, {}, {}, dest, to_pos)",
			selector.width, selector.ints_per_block
		)
	}
}

fn generate() -> String {
	let mut source = String::new();

	source.push_str(
		"/// Dispatches one key byte: unpacks the `batch` blocks it covers by\n\
		 /// calling the selector's unpack function `batch` times in a row, with\n\
		 /// no loop counter between calls.\n\
		 pub(crate) fn dispatch<V: Simd128>(\n\
		 \top: u8,\n\
		 \tpayload: &[u8],\n\
		 \tin_pos: &mut usize,\n\
		 \tdest: &mut [u32],\n\
		 \tto_pos: &mut usize,\n\
		 \tmode: DecodeMode\n\
		 ) -> Result<(), DecodeError> {\n\
		 \tmatch op {\n"
	);

	for selector in &SELECTORS {
		let call = call_expr(selector);
		for low_nibble in 0u8..16 {
			let op = (selector.index << 4) | low_nibble;
			let batch = 16 - low_nibble;
			writeln!(source, "\t\t0x{op:02X} => {{").unwrap();
			for _ in 0..batch {
				writeln!(source, "\t\t\t{call};").unwrap();
			}
			source.push_str("\t\t}\n");
		}
	}

	source.push_str(
		"\t\t0xF0..=0xFF => match mode {\n\
		 \t\t\tDecodeMode::Strict => return Err(DecodeError::InvalidSelector { key: op }),\n\
		 \t\t\tDecodeMode::Permissive => *in_pos += 1\n\
		 \t\t},\n"
	);
	source.push_str("\t}\n\tOk(())\n}\n");

	source
}

fn main() {
	let out_dir = env::var_os("OUT_DIR").expect("OUT_DIR is set by cargo");
	let dest = Path::new(&out_dir).join("dispatch_table.rs");
	std::fs::write(&dest, generate()).expect("failed to write generated dispatch table");

	println!("cargo::rerun-if-changed=build.rs");
}

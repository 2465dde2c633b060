//! Rewrites the classifier's per-integer widths into runs that satisfy the
//! selector table's lane-alignment and block-legality rules.

use crate::width::{classify, entry_for_width, max_value_for_width, next_legal_width};

/// Rewrites `widths` in place so that:
///
/// - every 4-aligned group of 4 shares one width (lane alignment);
/// - every run of `ints_per_block(w)` values at a block boundary fits width
///   `w`, promoting to the next legal width otherwise (run legality);
/// - short tails that fit a cheap natural width are flattened to it instead
///   of being promoted block-by-block (short-tail coalescing).
///
/// `values` is the original integer sequence `widths` was classified from;
/// the planner needs it to re-check fit when it considers promoting or
/// coalescing a window.
pub(crate) fn plan_widths(values: &[u32], widths: &mut [u8]) {
	debug_assert_eq!(values.len(), widths.len());

	align_lanes(widths);

	let len = widths.len();
	let mut position = 0;
	while position < len {
		if let Some(tail_width) = short_tail_width(values, position) {
			widths[position..].fill(tail_width);
			break;
		}

		let mut width = widths[position];
		loop {
			let entry = entry_for_width(width);
			let block_end = (position + entry.ints_per_block as usize).min(len);
			let window_max = widths[position..block_end]
				.iter()
				.copied()
				.max()
				.unwrap_or(width);

			if window_max > width {
				width = next_legal_width(width)
					.expect("classifier never yields a width past the table's last entry");
				continue;
			}

			widths[position..block_end].fill(width);
			position += entry.ints_per_block as usize;
			break;
		}
	}
}

/// (P1) For every 4-aligned group, set every width in the group to the
/// group's maximum, so a single selector can cover all four lanes.
fn align_lanes(widths: &mut [u8]) {
	for group in widths.chunks_mut(4) {
		let max = group.iter().copied().max().unwrap_or(0);
		group.fill(max);
	}
}

/// (P3) If fewer than 16/8/4 integers remain from `position` onward and they
/// all fit in 8/16/32 bits respectively, returns the natural width they
/// should all be flattened to.
fn short_tail_width(values: &[u32], position: usize) -> Option<u8> {
	let remaining = &values[position..];
	let len = remaining.len();

	let fits = |width: u8| {
		let limit = max_value_for_width(width);
		remaining.iter().all(|&value| u64::from(value) <= limit)
	};

	if len > 0 && len < 16 && fits(8) {
		Some(8)
	} else if len > 0 && len < 8 && fits(16) {
		Some(16)
	} else if len > 0 && len < 4 && fits(32) {
		Some(32)
	} else {
		None
	}
}

/// Runs the bit-width classifier over `values`, then plans the resulting
/// widths in place. Convenience wrapper combining [`classify`] and
/// [`plan_widths`].
pub(crate) fn classify_and_plan(values: &[u32], widths: &mut Vec<u8>) {
	widths.clear();
	widths.extend(values.iter().map(|&value| classify(value)));
	plan_widths(values, widths);
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn aligns_four_tuples_to_their_maximum() {
		let values = [0u32, 1, 3, 0];
		let mut widths: Vec<u8> = values.iter().map(|&v| classify(v)).collect();
		align_lanes(&mut widths);
		assert_eq!(widths, [2, 2, 2, 2]);
	}

	#[test]
	fn long_zero_run_keeps_width_zero() {
		let values = vec![0u32; 256];
		let mut widths = Vec::new();
		classify_and_plan(&values, &mut widths);
		assert!(widths.iter().all(|&w| w == 0));
	}

	#[test]
	fn short_zero_run_is_promoted_past_width_zero() {
		// Only 4 zeros: too short to justify a 256-wide width-0 block, and
		// the short-tail rule flattens it to width 8 (natural byte array).
		let values = vec![0u32; 4];
		let mut widths = Vec::new();
		classify_and_plan(&values, &mut widths);
		assert_eq!(widths, vec![8; 4]);
	}

	#[test]
	fn run_legality_promotes_only_the_window_that_sees_the_outlier() {
		// 64 values of width 2, but the last one needs width 4. The planner
		// only looks ints_per_block(w) values ahead when deciding whether to
		// promote, so the first 40 values (a whole width-3 block) never see
		// index 63 and settle at width 3; only the block that does contain
		// it promotes all the way to 4.
		let mut values = vec![3u32; 64];
		values[63] = 15;
		let mut widths = Vec::new();
		classify_and_plan(&values, &mut widths);

		assert_eq!(widths[..40], [3; 40]);
		assert_eq!(widths[40..], [4; 24]);

		for (position, &width) in widths.iter().enumerate() {
			assert!(u64::from(values[position]) <= max_value_for_width(width));
		}
	}

	#[test]
	fn widths_are_always_a_legal_selector_width() {
		use crate::width::SELECTORS;
		let legal: Vec<u8> = SELECTORS.iter().map(|e| e.width).collect();

		let values: Vec<u32> = (0..500).map(|i| (i * 2654435761u32) >> (i % 20)).collect();
		let mut widths = Vec::new();
		classify_and_plan(&values, &mut widths);

		assert!(widths.iter().all(|w| legal.contains(w)));
	}
}

// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The match driver: the anchored/unanchored outer loop around a single
//! backtracking attempt, plus the nested variant `RegVar` uses to try one
//! sub-pattern alternative against the remaining text.

use crate::backtrack;
use crate::bitstate::BitState;
use crate::flags::EmptyFlags;
use crate::input::Input;
use crate::prog::Program;
use crate::registry::VariableRegistry;

/// Runs a full search of `prog` over `input` starting no earlier than
/// `start`, honoring the program's anchoring and longest-match settings.
/// Returns the capture slots of the best match found, or `None`.
pub fn find(
    prog: &Program,
    registry: &mut VariableRegistry,
    input: &dyn Input,
    start: usize,
    ncap: usize,
) -> Option<Vec<isize>> {
    if prog.cond.is_impossible() {
        return None;
    }
    if prog.cond.contains(EmptyFlags::BEGIN_TEXT) && start != 0 {
        return None;
    }

    let end = input.len();
    let mut b = BitState::new();
    b.reset(prog, end, ncap);

    let matched = if prog.cond.contains(EmptyFlags::BEGIN_TEXT) {
        if !b.cap.is_empty() {
            b.cap[0] = start as isize;
        }
        backtrack::try_backtrack(prog, registry, input, &mut b, prog.entry_pc, start)
    } else {
        unanchored_search(prog, registry, input, &mut b, start, end)
    };

    let out = if matched { Some(b.matchcap.clone()) } else { None };
    b.finalize(registry);
    out
}

/// The nested driver a `RegVar` continuation uses to try one alternative
/// sub-pattern starting no earlier than `pos`. Unlike `find`,
/// the returned `BitState` is handed back to the caller instead of being
/// finalized — the VM keeps backtracking through it directly, resuming its
/// job stack on a later re-entry rather than re-running from scratch.
///
/// Takes the *same* `VariableRegistry` the outer match is using, not a
/// fresh one: a `RegVar` alternative sub-pattern can itself reference a
/// `${name}`/`@{name}` registered on the outer pattern, and it must resolve
/// against that registration exactly as the Go original's
/// `backtrackForRegVar` does (a method on `*Regexp` sharing `re.stringVar`/
/// `re.regVar`), not an isolated, empty table.
pub fn backtrack_for_regvar(
    prog: &Program,
    registry: &mut VariableRegistry,
    input: &dyn Input,
    pos: usize,
    end: usize,
    ncap: usize,
) -> Option<BitState> {
    if prog.cond.is_impossible() {
        return None;
    }

    let mut b = BitState::new();
    b.reset(prog, end, ncap);

    let matched = if prog.cond.contains(EmptyFlags::BEGIN_TEXT) {
        if !b.cap.is_empty() {
            b.cap[0] = pos as isize;
        }
        backtrack::try_backtrack(prog, registry, input, &mut b, prog.entry_pc, pos)
    } else {
        unanchored_search(prog, registry, input, &mut b, pos, end)
    };

    if matched {
        Some(b)
    } else {
        None
    }
}

fn unanchored_search(
    prog: &Program,
    registry: &mut VariableRegistry,
    input: &dyn Input,
    b: &mut BitState,
    start: usize,
    end: usize,
) -> bool {
    // Notice that we have to try the empty string at the end of the text,
    // so the loop condition is pos <= end, not pos < end. This looks
    // quadratic in the size of the text, but `b`'s visited bits are never
    // cleared between attempts, so no work is duplicated and it stays
    // linear.
    let mut pos = start;
    loop {
        if pos > end {
            return false;
        }
        match input.index(prog, pos) {
            None => return false,
            Some(advance) => pos += advance,
        }

        if !b.cap.is_empty() {
            b.cap[0] = pos as isize;
        }
        if backtrack::try_backtrack(prog, registry, input, b, prog.entry_pc, pos) {
            // Match must be leftmost; done.
            return true;
        }

        let (_, width) = input.step(pos);
        if width == 0 {
            return false;
        }
        pos += width;
    }
}

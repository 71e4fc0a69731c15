// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Hand-built `Program`s shared by the integration tests. Nothing in this
//! crate compiles pattern syntax, so every program exercised end-to-end has
//! to be assembled instruction by instruction; this module is that
//! assembly, factored out so `scenarios.rs` and `properties.rs` aren't each
//! repeating it.

#![allow(dead_code)]

use varregex::flags::EmptyFlags;
use varregex::inst::{
    Inst, InstAlt, InstCapture, InstEmptyWidth, InstRegVar, InstRune, InstRune1, InstRuneAnyNotNL, InstStringVar,
};
use varregex::prog::Program;

/// Appends instructions to a growing program body, letting callers wire up
/// forward jumps (an `Alt`'s `out` pointing at an instruction not yet built)
/// by reserving a slot with `alloc` and filling it in afterwards with `set`.
pub struct Builder {
    insts: Vec<Inst>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder { insts: Vec::new() }
    }

    pub fn alloc(&mut self) -> usize {
        let pc = self.insts.len();
        self.insts.push(Inst::Fail);
        pc
    }

    pub fn set(&mut self, pc: usize, inst: Inst) {
        self.insts[pc] = inst;
    }

    pub fn push(&mut self, inst: Inst) -> usize {
        let pc = self.insts.len();
        self.insts.push(inst);
        pc
    }
}

/// Wraps a pattern body (built backwards from `out`, the continuation after
/// the body matches) with the usual `Capture(0) .. body .. Capture(1)
/// Match` shell, and assembles the result into a `Program`.
pub fn wrap(cond: EmptyFlags, body: impl FnOnce(&mut Builder, usize) -> usize) -> Program {
    let mut b = Builder::new();
    let match_pc = b.push(Inst::Match);
    let cap1_pc = b.push(Inst::Capture(InstCapture { out: match_pc, slot: 1 }));
    let entry = body(&mut b, cap1_pc);
    let cap0_pc = b.push(Inst::Capture(InstCapture { out: entry, slot: 0 }));
    Program::new(b.insts, cap0_pc, cond, None, false, 2).unwrap()
}

/// Builds a chain of `Rune1` instructions matching `s` literally, continuing
/// to `out` once the whole literal has matched. Returns the chain's entry
/// pc (or `out` itself if `s` is empty).
pub fn literal(b: &mut Builder, s: &str, out: usize) -> usize {
    let chars: Vec<char> = s.chars().collect();
    if chars.is_empty() {
        return out;
    }
    let pcs: Vec<usize> = (0..chars.len()).map(|_| b.alloc()).collect();
    for (idx, &ch) in chars.iter().enumerate() {
        let next = if idx + 1 < chars.len() { pcs[idx + 1] } else { out };
        b.set(pcs[idx], Inst::Rune1(InstRune1 { out: next, rune: ch }));
    }
    pcs[0]
}

/// `x+`: one mandatory `Rune` over `class`, then a greedy backtracking
/// loop for any further repetitions, continuing to `out`.
pub fn rune_plus(b: &mut Builder, class: Vec<char>, out: usize) -> usize {
    let rune_pc = b.alloc();
    let alt_pc = b.alloc();
    b.set(rune_pc, Inst::Rune(InstRune { out: alt_pc, runes: class }));
    b.set(alt_pc, Inst::Alt(InstAlt { out: rune_pc, arg: out }));
    rune_pc
}

/// `x*`: a greedy backtracking loop over `class`, zero repetitions allowed,
/// continuing to `out`.
pub fn rune_star(b: &mut Builder, class: Vec<char>, out: usize) -> usize {
    let alt_pc = b.alloc();
    let rune_pc = b.alloc();
    b.set(rune_pc, Inst::Rune(InstRune { out: alt_pc, runes: class }));
    b.set(alt_pc, Inst::Alt(InstAlt { out: rune_pc, arg: out }));
    alt_pc
}

/// `.*` (not matching newline), continuing to `out`.
pub fn any_star(b: &mut Builder, out: usize) -> usize {
    let alt_pc = b.alloc();
    let rune_pc = b.alloc();
    b.set(rune_pc, Inst::RuneAnyNotNL(InstRuneAnyNotNL { out: alt_pc }));
    b.set(alt_pc, Inst::Alt(InstAlt { out: rune_pc, arg: out }));
    alt_pc
}

/// `${name}?`: try consuming a `StringVar`, falling back to `out` directly
/// if that fails (the greedy-optional shape scenario C's pattern needs).
pub fn optional_string_var(b: &mut Builder, name: &str, out: usize) -> usize {
    let sv_pc = b.alloc();
    let alt_pc = b.push(Inst::Alt(InstAlt { out: sv_pc, arg: out }));
    b.set(sv_pc, Inst::StringVar(InstStringVar { out, name: name.into() }));
    alt_pc
}

pub fn string_var(b: &mut Builder, name: &str, out: usize) -> usize {
    b.push(Inst::StringVar(InstStringVar { out, name: name.into() }))
}

pub fn reg_var(b: &mut Builder, name: &str, out: usize) -> usize {
    b.push(Inst::RegVar(InstRegVar { out, name: name.into() }))
}

/// `c?`: try consuming the literal character `c`, falling back to `out`
/// directly if that fails.
pub fn optional_char(b: &mut Builder, c: char, out: usize) -> usize {
    let rune_pc = b.alloc();
    let alt_pc = b.push(Inst::Alt(InstAlt { out: rune_pc, arg: out }));
    b.set(rune_pc, Inst::Rune1(InstRune1 { out, rune: c }));
    alt_pc
}

/// `(a?){n}a{n}`: the classic catastrophic-backtracking shape, used to
/// check that the visited-bit vector keeps matching linear rather than
/// exponential in `n`.
pub fn nested_optional_then_mandatory_program(n: usize) -> Program {
    wrap(EmptyFlags::empty(), |b, out| {
        let mut pc = out;
        for _ in 0..n {
            pc = literal(b, "a", pc);
        }
        for _ in 0..n {
            pc = optional_char(b, 'a', pc);
        }
        pc
    })
}

const DIGIT: fn() -> Vec<char> = || ('0'..='9').collect();
const LOWER: fn() -> Vec<char> = || ('a'..='z').collect();

/// `\d+`, anchored with a leading `^` (`EmptyWidth(BEGIN_TEXT)`) when
/// `anchored` is true.
pub fn digit_plus_program(anchored: bool) -> Program {
    if anchored {
        wrap(EmptyFlags::BEGIN_TEXT, |b, out| {
            let body = rune_plus(b, DIGIT(), out);
            b.push(Inst::EmptyWidth(InstEmptyWidth { out: body, look: EmptyFlags::BEGIN_TEXT }))
        })
    } else {
        wrap(EmptyFlags::empty(), |b, out| rune_plus(b, DIGIT(), out))
    }
}

/// `[a-z]*`.
pub fn lowercase_star_program() -> Program {
    wrap(EmptyFlags::empty(), |b, out| rune_star(b, LOWER(), out))
}

/// `num {op} \d+`, e.g. `num > \d+` or `num < \d+`.
pub fn bound_program(op: char) -> Program {
    wrap(EmptyFlags::empty(), |b, out| {
        let digits = rune_plus(b, DIGIT(), out);
        literal(b, &format!("num {} ", op), digits)
    })
}

/// Scenario A/B: `a\(${word}\)b\(${word}\)cd` (the parens are literal
/// characters, not capturing groups).
pub fn two_word_program() -> Program {
    wrap(EmptyFlags::empty(), |b, out| {
        let d = literal(b, "d", out);
        let c = literal(b, "c", d);
        let close2 = literal(b, ")", c);
        let sv2 = string_var(b, "word", close2);
        let open2 = literal(b, "(", sv2);
        let b_lit = literal(b, "b", open2);
        let close1 = literal(b, ")", b_lit);
        let sv1 = string_var(b, "word", close1);
        let open1 = literal(b, "(", sv1);
        literal(b, "a", open1)
    })
}

/// Scenario C: `a${word}?b${word}?c${word}?d${word}?e${word}?`.
pub fn bounded_optional_word_program() -> Program {
    wrap(EmptyFlags::empty(), |b, out| {
        let e_tail = optional_string_var(b, "word", out);
        let e = literal(b, "e", e_tail);
        let d_tail = optional_string_var(b, "word", e);
        let d = literal(b, "d", d_tail);
        let c_tail = optional_string_var(b, "word", d);
        let c = literal(b, "c", c_tail);
        let b_tail = optional_string_var(b, "word", c);
        let b_lit = literal(b, "b", b_tail);
        let a_tail = optional_string_var(b, "word", b_lit);
        literal(b, "a", a_tail)
    })
}

/// Scenario D/E: `a@{var}2b@{var}`.
pub fn two_regvar_program() -> Program {
    wrap(EmptyFlags::empty(), |b, out| {
        let rv2 = reg_var(b, "var", out);
        let b_lit = literal(b, "b", rv2);
        let two = literal(b, "2", b_lit);
        let rv1 = reg_var(b, "var", two);
        literal(b, "a", rv1)
    })
}

/// Scenario F: `where +@{board}.*@{board}.*`.
pub fn where_board_program() -> Program {
    wrap(EmptyFlags::empty(), |b, out| {
        let tail = any_star(b, out);
        let rv2 = reg_var(b, "board", tail);
        let mid = any_star(b, rv2);
        let rv1 = reg_var(b, "board", mid);
        let spaces = rune_plus(b, vec![' '], rv1);
        literal(b, "where", spaces)
    })
}

/// Matches exactly one occurrence of `c`, nothing else — used as a minimal
/// probe program for the driver-level property tests.
pub fn single_char_program(c: char) -> Program {
    wrap(EmptyFlags::empty(), |b, out| literal(b, &c.to_string(), out))
}

// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A backtracking regular-expression execution engine extended with two
//! variable-matching constructs:
//!
//! - `${name}` ("string variable"): matches any string from a registered,
//!   finite dictionary, optionally bounded by how many times a string from
//!   that dictionary may be consumed across one match.
//! - `@{name}` ("regex variable"): matches text accepted by any sub-regex
//!   from a registered, ordered list of alternatives, where each
//!   alternative is consumed (removed from the list) for the remainder of
//!   the current match attempt once used.
//!
//! This crate owns the backtracking virtual machine that executes an
//! already-compiled program against input text — parsing pattern syntax
//! and compiling it into a [`prog::Program`] is the job of an external
//! collaborator and is out of scope here. Callers assemble a `Program` by
//! hand (or with their own compiler), register variables against a
//! [`registry::VariableRegistry`], and drive matches either through the
//! low-level [`driver::find`] entry point or the thin [`Regex`] facade
//! below.

use std::error;
use std::fmt;
use std::rc::Rc;

pub mod backtrack;
pub mod bitstate;
pub mod char;
pub mod driver;
pub mod flags;
pub mod input;
pub mod inst;
pub mod list;
pub mod prog;
pub mod registry;
pub mod trie;

use input::StrInput;
use prog::Program;
use registry::VariableRegistry;

/// An error constructing a [`Program`] or [`Regex`].
///
/// Once a pattern is compiled into a `Program`, matching itself cannot
/// fail in this sense: a match either succeeds or does not. The only
/// failures this engine reports through `Result` happen at construction
/// time; failures discovered only while running a match (an unregistered
/// `${name}`/`@{name}`, or a malformed instruction) are programmer errors
/// and `panic!` rather than return an `Err`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The program's instruction count exceeds the backtracker's
    /// eligibility bound ([`prog::MAX_PROG_SIZE`]). This crate implements
    /// exactly one executor, so there is no fallback: the caller must
    /// either shrink the pattern or use a different executor of their own.
    ProgramTooLarge { len: usize, max: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::ProgramTooLarge { len, max } => {
                write!(f, "compiled program has {} instructions, exceeding the backtracker's limit of {}", len, max)
            }
        }
    }
}

impl error::Error for Error {}

/// A capture as a half-open byte range, or `None` if that slot was never
/// set during the match (the group did not participate).
pub type Span = Option<(usize, usize)>;

/// A thin convenience wrapper pairing a compiled [`Program`] with the
/// [`VariableRegistry`] its `StringVar`/`RegVar` opcodes resolve against,
/// exposing the `RegisterStringVar`/`RegisterRegVar`/`SetStringVarLimit`/
/// `SetRegVarLimit`/`FindString`/`FindAllStringSubmatch` surface,
/// composed from the primitive [`driver::find`] call.
///
/// Building the `Program` from pattern syntax is out of scope for this
/// crate; `Regex` is constructed from an already-compiled program.
pub struct Regex {
    prog: Program,
    vars: VariableRegistry,
}

impl Regex {
    /// Wraps an already-compiled program with a fresh, empty variable
    /// registry.
    pub fn new(prog: Program) -> Regex {
        Regex { prog, vars: VariableRegistry::new() }
    }

    /// `RegisterStringVar`: inserts each of `strs` into `name`'s dictionary
    /// with multiplicity 1.
    pub fn register_string_var<'a, I>(&mut self, name: &str, strs: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.vars.register_string_var(name, strs);
    }

    /// `RegisterRegVar`: appends each of `subs` to `name`'s alternatives
    /// list.
    pub fn register_reg_var<I>(&mut self, name: &str, subs: I)
    where
        I: IntoIterator<Item = Program>,
    {
        self.vars.register_reg_var(name, subs.into_iter().map(Rc::new));
    }

    /// `SetStringVarLimit`: sets the global lower/upper occurrence bounds
    /// for a registered string variable.
    pub fn set_string_var_limit(&mut self, name: &str, min: u32, max: u32) {
        self.vars.set_string_var_limit(name, min, max);
    }

    /// `SetRegVarLimit`: sets the global lower/upper occurrence bounds for
    /// a registered regex variable.
    pub fn set_reg_var_limit(&mut self, name: &str, min: u32, max: u32) {
        self.vars.set_reg_var_limit(name, min, max);
    }

    /// Reports whether `text` contains a match anywhere.
    pub fn is_match(&mut self, text: &str) -> bool {
        self.find(text).is_some()
    }

    /// `FindString`-equivalent: the leftmost match's whole-match span.
    pub fn find(&mut self, text: &str) -> Option<(usize, usize)> {
        self.captures(text).and_then(|caps| caps.get(0).copied().flatten())
    }

    /// `FindString`: the leftmost match's whole-match text.
    pub fn find_string<'t>(&mut self, text: &'t str) -> Option<&'t str> {
        self.find(text).map(|(s, e)| &text[s..e])
    }

    /// All capture group spans of the leftmost match, slot 0 being the
    /// whole match.
    pub fn captures(&mut self, text: &str) -> Option<Vec<Span>> {
        let input = StrInput::new(text);
        let ncap = self.prog.ncap;
        let caps = driver::find(&self.prog, &mut self.vars, &input, 0, ncap)?;
        Some(pair_captures(&caps))
    }

    /// `FindAllString`: every non-overlapping leftmost match's whole-match
    /// span, scanning left to right. Mirrors the usual `regex` crate
    /// `find_iter` advance rule: after a non-empty match, resume right
    /// after it; after an empty match, advance one codepoint to guarantee
    /// progress.
    pub fn find_all(&mut self, text: &str) -> Vec<(usize, usize)> {
        self.find_all_string_submatch(text)
            .into_iter()
            .filter_map(|caps| caps.get(0).copied().flatten())
            .collect()
    }

    /// `FindAllStringSubmatch`: every non-overlapping leftmost match's full
    /// capture spans, scanning left to right.
    ///
    /// Assumes `ncap >= 2`, i.e. the whole-match span occupies slots 0/1 —
    /// the one case this can't determine an advance position from is
    /// `ncap == 0`'s short-circuit "matched, no captures at all" result,
    /// which `FindAllStringSubmatch` has no well-defined meaning for anyway.
    pub fn find_all_string_submatch(&mut self, text: &str) -> Vec<Vec<Span>> {
        let input = StrInput::new(text);
        let ncap = self.prog.ncap;
        let mut out = Vec::new();
        let mut start = 0usize;
        while start <= text.len() {
            let caps = match driver::find(&self.prog, &mut self.vars, &input, start, ncap) {
                None => break,
                Some(caps) => caps,
            };
            let (s, e) = (caps[0] as usize, caps[1] as usize);
            start = if e > s { e } else { next_char_boundary(text, e) };
            out.push(pair_captures(&caps));
        }
        out
    }
}

/// Groups a flat capture-slot array into `(start, end)` pairs, `None` for
/// any slot pair that never participated (either half still `-1`).
fn pair_captures(caps: &[isize]) -> Vec<Span> {
    caps.chunks(2)
        .map(|pair| match pair {
            [s, e] if *s >= 0 && *e >= 0 => Some((*s as usize, *e as usize)),
            _ => None,
        })
        .collect()
}

/// Advances `pos` by one codepoint, or by one byte if `pos` is already at
/// or past the end of `text` — used to guarantee `FindAllString` makes
/// progress past a zero-width match.
fn next_char_boundary(text: &str, pos: usize) -> usize {
    match text[pos.min(text.len())..].chars().next() {
        Some(c) => pos + c.len_utf8(),
        None => pos + 1,
    }
}

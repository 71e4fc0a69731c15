// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The backtracking VM's job-stack dispatch loop, plus the `RegVar`
//! re-entry continuation. This is a search with submatch
//! tracking for small programs and texts: it never explores the same
//! `(instruction, position)` pair twice, which bounds it to work linear in
//! `len(prog) * len(text)`.

use crate::bitstate::{Aux, BitState, NodeRef, ResearchReg, UndoKind, VarName};
use crate::driver;
use crate::inst::Inst;
use crate::input::Input;
use crate::prog::Program;
use crate::registry::VariableRegistry;

/// Pushes the entry job and runs the dispatch loop to completion.
pub fn try_backtrack(
    prog: &Program,
    registry: &mut VariableRegistry,
    input: &dyn Input,
    b: &mut BitState,
    pc: usize,
    pos: usize,
) -> bool {
    b.push(&prog.insts, pc, pos, false);
    run(prog, registry, input, b)
}

/// Drains `b`'s job stack, dispatching instruction jobs and applying undo
/// jobs as they're popped, until either a `Match` succeeds outright or the
/// stack empties.
///
/// Undo jobs fire here as part of ordinary backtracking, not only at the
/// very end: every job pushed alongside a registered-variable mutation is
/// popped and applied in the same LIFO order whether the search as a whole
/// eventually succeeds or fails.
pub fn run(prog: &Program, registry: &mut VariableRegistry, input: &dyn Input, b: &mut BitState) -> bool {
    while let Some(job) = b.jobs.pop() {
        match job {
            crate::bitstate::Job::Undo(undo) => undo.apply(registry),
            crate::bitstate::Job::Inst { pc, pos, arg, aux } => {
                if step(prog, registry, input, b, pc, pos, arg, aux) {
                    return true;
                }
            }
        }
    }
    prog.longest && b.matchcap.len() > 1 && b.matchcap[1] >= 0
}

/// Dispatches a single popped job, looping in place (rather than pushing
/// and immediately re-popping) whenever an instruction transitions without
/// consuming the stack — the same `goto CheckAndLoop` optimization the
/// source this is ported from relies on.
fn step(
    prog: &Program,
    registry: &mut VariableRegistry,
    input: &dyn Input,
    b: &mut BitState,
    mut pc: usize,
    mut pos: usize,
    mut arg: bool,
    mut aux: Aux,
) -> bool {
    'dispatch: loop {
        match &prog.insts[pc] {
            Inst::Fail => panic!("reached Fail instruction"),

            Inst::Nop(i) => {
                pc = i.out;
            }

            Inst::Alt(i) => {
                if arg {
                    // Finished inst.out; try inst.arg.
                    arg = false;
                    pc = i.arg;
                } else {
                    // Re-push with arg==true as a reminder to try inst.arg
                    // later, once inst.out's subtree has been fully
                    // explored by some other path too.
                    b.push(&prog.insts, pc, pos, true);
                    pc = i.out;
                }
            }

            Inst::AltMatch(i) => {
                if prog.insts[i.out].consumes_rune() {
                    b.push(&prog.insts, i.arg, pos, false);
                    pc = i.arg;
                    pos = b.end;
                } else {
                    b.push(&prog.insts, i.out, b.end, false);
                    pc = i.out;
                }
            }

            Inst::Rune(i) => {
                let (c, width) = input.step(pos);
                match c.as_char() {
                    Some(ch) if i.matches(ch) => {
                        pos += width;
                        pc = i.out;
                    }
                    _ => return false,
                }
            }

            Inst::Rune1(i) => {
                let (c, width) = input.step(pos);
                match c.as_char() {
                    Some(ch) if ch == i.rune => {
                        pos += width;
                        pc = i.out;
                    }
                    _ => return false,
                }
            }

            Inst::RuneAnyNotNL(i) => {
                let (c, width) = input.step(pos);
                if c.is_none() || c == '\n' {
                    return false;
                }
                pos += width;
                pc = i.out;
            }

            Inst::RuneAny(i) => {
                let (c, width) = input.step(pos);
                if c.is_none() {
                    return false;
                }
                pos += width;
                pc = i.out;
            }

            Inst::Capture(i) => {
                if arg {
                    // Finished inst.out; restore the old value. This job's
                    // own `pos` field is reused to carry that old value
                    // across the continuation visit, rather than a
                    // separate aux slot.
                    b.cap[i.slot] = pos as isize;
                    return false;
                } else {
                    if i.slot < b.cap.len() {
                        // Capture pos to the register, but come back once
                        // this subtree is exhausted to restore the old
                        // value.
                        b.push(&prog.insts, pc, b.cap[i.slot] as usize, true);
                        b.cap[i.slot] = pos as isize;
                    }
                    pc = i.out;
                }
            }

            Inst::EmptyWidth(i) => {
                if !input.context(pos).satisfies(i.look) {
                    return false;
                }
                pc = i.out;
            }

            Inst::Match => {
                if !registry.all_minimums_met() {
                    return false;
                }
                if b.cap.is_empty() {
                    return true;
                }
                if b.cap.len() > 1 {
                    b.cap[1] = pos as isize;
                }
                let old = b.matchcap[1];
                if old == -1 || (prog.longest && pos > 0 && pos as isize > old) {
                    b.matchcap.copy_from_slice(&b.cap);
                }
                if !prog.longest {
                    return true;
                }
                if pos == b.end {
                    return true;
                }
                return false;
            }

            Inst::StringVar(i) => {
                if arg {
                    arg = false;
                    let mut node = match aux {
                        Aux::Trie(n) => n,
                        _ => unreachable!("StringVar continuation without a trie node"),
                    };
                    loop {
                        let (c, width) = input.step(pos);
                        let ch = match c.as_char() {
                            Some(ch) => ch,
                            None => return false,
                        };
                        node = match node.child(ch) {
                            Some(n) => n,
                            None => return false,
                        };
                        pos += width;
                        if node.count() > 0 {
                            node.dec_count();
                            b.push_aux(&prog.insts, pc, pos, true, Aux::Trie(node));
                            b.push_undo(UndoKind::IncTrieCount(node));
                            pc = i.out;
                            if !b.should_visit(pc, pos) {
                                return false;
                            }
                            arg = false;
                            continue 'dispatch;
                        }
                    }
                } else {
                    let root = {
                        let entry = registry
                            .string_var_mut(&i.name)
                            .unwrap_or_else(|| panic!("string var {} is unregistered", i.name));
                        if entry.count >= entry.max {
                            return false;
                        }
                        entry.count += 1;
                        NodeRef::new(entry.trie.root_mut())
                    };
                    b.push_undo(UndoKind::DecVarCount(VarName::String(i.name.clone())));
                    b.push_aux(&prog.insts, pc, pos, true, Aux::Trie(root));
                    return false;
                }
            }

            Inst::RegVar(i) => {
                if arg {
                    arg = false;
                    match aux {
                        Aux::AltElement(start) => {
                            let mut cur = start;
                            loop {
                                let id = match cur {
                                    Some(id) => id,
                                    None => return false,
                                };
                                let sub = registry.reg_var(&i.name).unwrap().alternatives.value(id).clone();
                                match driver::backtrack_for_regvar(&sub, registry, input, pos, b.end, 2) {
                                    None => {
                                        cur = registry.reg_var(&i.name).unwrap().alternatives.next(id);
                                    }
                                    Some(nested) => {
                                        let next_id = registry.reg_var(&i.name).unwrap().alternatives.next(id);
                                        let prev_id = registry.reg_var(&i.name).unwrap().alternatives.prev(id);

                                        b.push_aux(&prog.insts, pc, pos, true, Aux::AltElement(next_id));

                                        let undo = match prev_id {
                                            Some(p) => UndoKind::ReinsertAfter { var: i.name.clone(), anchor: p, id },
                                            None => match next_id {
                                                Some(n) => {
                                                    UndoKind::ReinsertBefore { var: i.name.clone(), anchor: n, id }
                                                }
                                                None => UndoKind::ReinsertAfter {
                                                    var: i.name.clone(),
                                                    anchor: crate::list::AltList::sentinel(),
                                                    id,
                                                },
                                            },
                                        };
                                        b.push_undo(undo);

                                        let non_empty = nested.cap[0] != nested.cap[1];
                                        let new_pos = nested.matchcap[1] as usize;
                                        if non_empty {
                                            let max_search_end = nested.matchcap[1] as usize;
                                            b.push_aux(
                                                &prog.insts,
                                                pc,
                                                pos,
                                                true,
                                                Aux::ResearchReg(Box::new(ResearchReg {
                                                    sub: sub.clone(),
                                                    nested,
                                                    max_search_end,
                                                })),
                                            );
                                        }

                                        registry.reg_var_mut(&i.name).unwrap().alternatives.remove_self(id);

                                        pc = i.out;
                                        pos = new_pos;
                                        if !b.should_visit(pc, pos) {
                                            return false;
                                        }
                                        arg = false;
                                        continue 'dispatch;
                                    }
                                }
                            }
                        }
                        Aux::ResearchReg(research) => {
                            let ResearchReg { sub, mut nested, mut max_search_end } = *research;
                            if !run(&sub, registry, input, &mut nested) {
                                let mut j = max_search_end;
                                let mut found = None;
                                while j < b.end {
                                    if let Some(bs) = driver::backtrack_for_regvar(&sub, registry, input, j, b.end, 2) {
                                        found = Some(bs);
                                        break;
                                    }
                                    j += 1;
                                }
                                match found {
                                    Some(bs) => nested = bs,
                                    None => return false,
                                }
                            }

                            if nested.cap[1] > max_search_end as isize {
                                max_search_end = nested.cap[1] as usize;
                            }
                            if nested.cap[0] == nested.cap[1] {
                                max_search_end += 1;
                            }
                            let new_pos = nested.cap[1] as usize;

                            b.push_aux(
                                &prog.insts,
                                pc,
                                pos,
                                true,
                                Aux::ResearchReg(Box::new(ResearchReg { sub, nested, max_search_end })),
                            );

                            pc = i.out;
                            pos = new_pos;
                            if !b.should_visit(pc, pos) {
                                return false;
                            }
                            arg = false;
                            continue 'dispatch;
                        }
                        _ => unreachable!("RegVar continuation without an element or research record"),
                    }
                } else {
                    let front = {
                        let entry = registry
                            .reg_var_mut(&i.name)
                            .unwrap_or_else(|| panic!("reg var {} is unregistered", i.name));
                        if entry.count >= entry.max {
                            return false;
                        }
                        entry.count += 1;
                        entry.alternatives.front()
                    };
                    b.push_undo(UndoKind::DecVarCount(VarName::Reg(i.name.clone())));
                    b.push_aux(&prog.insts, pc, pos, true, Aux::AltElement(front));
                    return false;
                }
            }
        }

        if !b.should_visit(pc, pos) {
            return false;
        }
    }
}

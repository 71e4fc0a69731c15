// Copyright 2014-2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! An intrusive doubly-linked list of regex alternatives, arena-backed so
//! it can be expressed without raw cyclic pointers. Slot 0 is a sentinel
//! playing the role of the original's circular-list root: `prev`/`next`
//! pointing at the sentinel are reported as "none" to callers, exactly as
//! `Element::Prev`/`Element::Next` do in the source this is ported from.

use std::rc::Rc;

use crate::prog::Program;

/// A stable handle to a node in an `AltList`. `AltId(0)` is reserved for
/// the sentinel and is never returned to callers as a real element.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct AltId(usize);

const SENTINEL: AltId = AltId(0);

struct AltNode {
    prev: AltId,
    next: AltId,
    /// `None` only for the sentinel slot.
    value: Option<Rc<Program>>,
}

/// A mutable list of sub-regexes, supporting O(1) removal and reinsertion
/// at an arbitrary position — the shape `RegVar` needs to "consume" an
/// alternative for the rest of a match attempt and restore it on backtrack.
pub struct AltList {
    nodes: Vec<AltNode>,
}

impl AltList {
    pub fn new() -> AltList {
        AltList {
            nodes: vec![AltNode { prev: SENTINEL, next: SENTINEL, value: None }],
        }
    }

    /// The list's sentinel handle: passing it as an anchor to
    /// `insert_existing_after`/`insert_existing_before` means "at the
    /// front"/"at the back" of an otherwise-empty list.
    pub fn sentinel() -> AltId {
        SENTINEL
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[SENTINEL.0].next == SENTINEL
    }

    pub fn front(&self) -> Option<AltId> {
        let id = self.nodes[SENTINEL.0].next;
        if id == SENTINEL {
            None
        } else {
            Some(id)
        }
    }

    pub fn back(&self) -> Option<AltId> {
        let id = self.nodes[SENTINEL.0].prev;
        if id == SENTINEL {
            None
        } else {
            Some(id)
        }
    }

    pub fn next(&self, id: AltId) -> Option<AltId> {
        let n = self.nodes[id.0].next;
        if n == SENTINEL {
            None
        } else {
            Some(n)
        }
    }

    pub fn prev(&self, id: AltId) -> Option<AltId> {
        let p = self.nodes[id.0].prev;
        if p == SENTINEL {
            None
        } else {
            Some(p)
        }
    }

    pub fn value(&self, id: AltId) -> &Rc<Program> {
        self.nodes[id.0].value.as_ref().expect("sentinel has no value")
    }

    pub fn push_back(&mut self, value: Rc<Program>) -> AltId {
        self.insert_new_before(SENTINEL, value)
    }

    pub fn push_front(&mut self, value: Rc<Program>) -> AltId {
        self.insert_new_after(SENTINEL, value)
    }

    fn insert_new_after(&mut self, anchor: AltId, value: Rc<Program>) -> AltId {
        let id = AltId(self.nodes.len());
        self.nodes.push(AltNode { prev: anchor, next: self.nodes[anchor.0].next, value: Some(value) });
        self.link_after(anchor, id);
        id
    }

    fn insert_new_before(&mut self, anchor: AltId, value: Rc<Program>) -> AltId {
        let id = AltId(self.nodes.len());
        self.nodes.push(AltNode { prev: self.nodes[anchor.0].prev, next: anchor, value: Some(value) });
        self.link_before(anchor, id);
        id
    }

    /// Removes `id` from the list. `id`'s own `prev`/`next` fields are left
    /// stale; the element is expected to be reinserted via
    /// `insert_existing_after`/`insert_existing_before` using the neighbour
    /// handles recorded at removal time, never traversed in its orphaned
    /// state.
    pub fn remove_self(&mut self, id: AltId) {
        let (p, n) = (self.nodes[id.0].prev, self.nodes[id.0].next);
        self.nodes[p.0].next = n;
        self.nodes[n.0].prev = p;
    }

    /// Reinserts a previously-removed element `id` immediately after
    /// `anchor` (where `anchor` may be the sentinel, meaning "at the
    /// front").
    pub fn insert_existing_after(&mut self, anchor: AltId, id: AltId) {
        self.link_after(anchor, id);
    }

    /// Reinserts a previously-removed element `id` immediately before
    /// `anchor` (where `anchor` may be the sentinel, meaning "at the
    /// back").
    pub fn insert_existing_before(&mut self, anchor: AltId, id: AltId) {
        self.link_before(anchor, id);
    }

    fn link_after(&mut self, anchor: AltId, id: AltId) {
        let after = self.nodes[anchor.0].next;
        self.nodes[id.0].prev = anchor;
        self.nodes[id.0].next = after;
        self.nodes[anchor.0].next = id;
        self.nodes[after.0].prev = id;
    }

    fn link_before(&mut self, anchor: AltId, id: AltId) {
        let before = self.nodes[anchor.0].prev;
        self.nodes[id.0].prev = before;
        self.nodes[id.0].next = anchor;
        self.nodes[anchor.0].prev = id;
        self.nodes[before.0].next = id;
    }

    /// Collects the list's current element order, for tests (property 6:
    /// list-position stability).
    pub fn collect(&self) -> Vec<AltId> {
        let mut out = Vec::new();
        let mut cur = self.front();
        while let Some(id) = cur {
            out.push(id);
            cur = self.next(id);
        }
        out
    }
}

impl Default for AltList {
    fn default() -> AltList {
        AltList::new()
    }
}

//! # Position Mapping
//!
//! Every step records a [`StepMap`] describing which range it replaced and how
//! large the replacement was. A [`Mapping`] chains step maps so positions
//! computed against an older document can be re-targeted to a newer one.

use serde::{Deserialize, Serialize};

/// Which side of an insertion point a position sticks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Assoc {
    Before,
    After,
}

/// Mapped position plus whether the content around it was removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapResult {
    pub pos: usize,
    pub deleted: bool,
}

/// Position map of a single step: `old_size` positions at `start` became `new_size`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepMap {
    pub start: usize,
    pub old_size: usize,
    pub new_size: usize,
}

impl StepMap {
    pub fn new(start: usize, old_size: usize, new_size: usize) -> Self {
        Self {
            start,
            old_size,
            new_size,
        }
    }

    /// Map that leaves every position where it is
    pub fn identity() -> Self {
        Self::new(0, 0, 0)
    }

    pub fn end(&self) -> usize {
        self.start + self.old_size
    }

    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.map_result(pos, assoc).pos
    }

    pub fn map_result(&self, pos: usize, assoc: Assoc) -> MapResult {
        let end = self.end();
        if pos < self.start {
            return MapResult { pos, deleted: false };
        }
        if pos > end {
            return MapResult {
                pos: pos - self.old_size + self.new_size,
                deleted: false,
            };
        }

        // Size-preserving rewrites (e.g. retagging cells) keep interior positions
        if self.old_size == self.new_size && pos > self.start && pos < end {
            return MapResult { pos, deleted: false };
        }

        let side = if self.old_size == 0 {
            assoc
        } else if pos == self.start {
            Assoc::Before
        } else if pos == end {
            Assoc::After
        } else {
            assoc
        };

        let mapped = match side {
            Assoc::Before => self.start,
            Assoc::After => self.start + self.new_size,
        };

        MapResult {
            pos: mapped,
            deleted: pos > self.start && pos < end,
        }
    }
}

/// Ordered chain of step maps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    maps: Vec<StepMap>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, map: StepMap) {
        self.maps.push(map);
    }

    /// Append another mapping whose positions start where this one ends
    pub fn append(&mut self, other: &Mapping) {
        self.maps.extend_from_slice(&other.maps);
    }

    pub fn maps(&self) -> &[StepMap] {
        &self.maps
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.map_result(pos, assoc).pos
    }

    pub fn map_result(&self, pos: usize, assoc: Assoc) -> MapResult {
        let mut deleted = false;
        let mut pos = pos;
        for map in &self.maps {
            let result = map.map_result(pos, assoc);
            deleted |= result.deleted;
            pos = result.pos;
        }
        MapResult { pos, deleted }
    }

    /// Map the span of a whole node, or `None` if some step removed it entirely
    ///
    /// Insertions touching the node's edges stay outside it: the start sticks
    /// after an insertion and the end sticks before one.
    pub fn map_span(&self, from: usize, to: usize) -> Option<(usize, usize)> {
        let (mut from, mut to) = (from, to);
        for map in &self.maps {
            if map.old_size > 0 && map.start <= from && map.end() >= to {
                return None;
            }
            from = map.map(from, Assoc::After);
            to = map.map(to, Assoc::Before);
        }
        Some((from, to))
    }
}

//! Priority queue and path reconstruction shared by the grid searches.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use ordered_float::OrderedFloat;

use crate::common::{Cell, Path};

#[derive(Debug, Clone, Copy)]
struct QueueEntry {
    priority: OrderedFloat<f64>,
    counter: u64,
    cell: Cell,
}

impl Eq for QueueEntry {}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.counter == other.counter
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior; equal priorities pop in push order
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.counter.cmp(&self.counter))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-priority queue of cells with FIFO tie-breaking.
///
/// Each push is stamped with a monotonically increasing counter, so among
/// entries of equal priority the earliest pushed is popped first.
#[derive(Debug, Default)]
pub struct OpenSet {
    heap: BinaryHeap<QueueEntry>,
    counter: u64,
}

impl OpenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, priority: f64, cell: Cell) {
        self.heap.push(QueueEntry {
            priority: OrderedFloat(priority),
            counter: self.counter,
            cell,
        });
        self.counter += 1;
    }

    pub fn pop(&mut self) -> Option<Cell> {
        self.heap.pop().map(|entry| entry.cell)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// Walk parent pointers back from `goal` (the start maps to `None`) and
/// return the path in start-to-goal order
pub fn reconstruct_path(came_from: &HashMap<Cell, Option<Cell>>, goal: Cell) -> Path {
    let mut cells = Vec::new();
    let mut current = Some(goal);

    while let Some(cell) = current {
        cells.push(cell);
        current = came_from.get(&cell).copied().flatten();
    }

    cells.reverse();
    Path::from_cells(cells)
}

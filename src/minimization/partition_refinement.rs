//! Hopcroft's partition refinement over dense state ids.
//!
//! The refiner keeps the current partition as intrusive lists: one list per block holding its
//! states, and for every symbol `a` one list per block holding `B_cap(a, block)`, the states of
//! the block that have at least one predecessor under `a`. A splitter `(a, block)` is processed
//! by collecting the preimage `P` of `B_cap(a, block)` under `a` and splitting every block `B`
//! with `0 < |P ∩ B| < |B|`, always relocating the smaller of the two halves.

use itertools::Itertools;
use tracing::{debug, trace};

use super::{lists::IntrusiveLists, reverse::ReverseIndex};
use crate::{math::Partition, prelude::*};

/// Index of a block of the partition. Blocks are allocated densely and never become empty, so
/// at most `size` of them exist.
pub(crate) type BlockId = u32;

/// Pending splitters `(symbol, block)`, kept as one stack per symbol. The flag matrix `pending`
/// mirrors stack membership and `active` holds exactly the symbols whose stack is non-empty.
#[derive(Debug, Clone)]
struct Worklist {
    capacity: usize,
    stacks: Vec<Vec<BlockId>>,
    pending: Vec<bool>,
    active: Vec<Symbol>,
}

impl Worklist {
    fn new(alphabet_size: usize, capacity: usize) -> Self {
        Self {
            capacity,
            stacks: vec![Vec::new(); alphabet_size],
            pending: vec![false; alphabet_size * capacity],
            active: Vec::new(),
        }
    }

    #[inline]
    fn slot(&self, symbol: Symbol, block: BlockId) -> usize {
        symbol as usize * self.capacity + block as usize
    }

    fn contains(&self, symbol: Symbol, block: BlockId) -> bool {
        self.pending[self.slot(symbol, block)]
    }

    /// Schedules `(symbol, block)` unless it is already pending. Returns whether it was added.
    fn push(&mut self, symbol: Symbol, block: BlockId) -> bool {
        let slot = self.slot(symbol, block);
        if self.pending[slot] {
            return false;
        }
        self.pending[slot] = true;
        let stack = &mut self.stacks[symbol as usize];
        if stack.is_empty() {
            self.active.push(symbol);
        }
        stack.push(block);
        true
    }

    fn pop(&mut self) -> Option<(Symbol, BlockId)> {
        let &symbol = self.active.last()?;
        let stack = &mut self.stacks[symbol as usize];
        let block = stack.pop()?;
        if stack.is_empty() {
            self.active.pop();
        }
        let slot = self.slot(symbol, block);
        self.pending[slot] = false;
        Some((symbol, block))
    }

    fn clear(&mut self) {
        while self.pop().is_some() {}
    }

    fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// How a block that is hit by a preimage gets divided.
#[derive(Debug, Clone, Copy)]
struct Split {
    block: BlockId,
    fresh: BlockId,
    moves_preimage: bool,
}

/// The refinement engine for one minimization run. It borrows the automaton and its reverse
/// index and owns all partition bookkeeping.
#[derive(Debug, Clone)]
pub(crate) struct PartitionRefiner<'a> {
    dfa: &'a Dfa,
    reverse: &'a ReverseIndex,
    block_of: Vec<BlockId>,
    blocks: IntrusiveLists,
    caps: Vec<IntrusiveLists>,
    block_count: u32,
    worklist: Worklist,

    in_preimage: Vec<bool>,
    preimage: Vec<StateId>,
    hits: Vec<u32>,
    touched: Vec<BlockId>,
    relocate_to: Vec<BlockId>,
    splits: Vec<Split>,

    iterations: usize,
    split_count: usize,
}

impl<'a> PartitionRefiner<'a> {
    /// Sets up the initial partition into accepting and rejecting states, fills the `B_cap`
    /// lists from the reverse index and schedules one of the two blocks per symbol, namely the
    /// one with the smaller `B_cap` (ties go to block 0).
    ///
    /// If all states agree on acceptance there is only one block and nothing is scheduled.
    pub fn seed(dfa: &'a Dfa, reverse: &'a ReverseIndex) -> Self {
        let size = dfa.size();
        let alphabet_size = dfa.alphabet_size();
        debug_assert_eq!(reverse.size(), size);
        debug_assert_eq!(reverse.alphabet_size(), alphabet_size);

        let has_accepting = dfa.acceptance().iter().any(|&acc| acc);
        let has_rejecting = dfa.acceptance().iter().any(|&acc| !acc);
        let (accepting_block, rejecting_block, block_count) = match (has_accepting, has_rejecting) {
            (true, true) => (0, 1, 2),
            _ => (0, 0, 1),
        };

        let mut block_of = vec![0; size];
        let mut blocks = IntrusiveLists::new(size, size);
        for state in dfa.states().rev() {
            let block = if dfa.is_accepting(state) {
                accepting_block
            } else {
                rejecting_block
            };
            block_of[state as usize] = block;
            blocks.push_front(block, state);
        }

        let mut caps = Vec::with_capacity(alphabet_size);
        for symbol in dfa.symbols() {
            let mut cap = IntrusiveLists::new(size, size);
            for state in dfa.states().rev() {
                if reverse.has_predecessors(symbol, state) {
                    cap.push_front(block_of[state as usize], state);
                }
            }
            caps.push(cap);
        }

        let mut worklist = Worklist::new(alphabet_size, size);
        if block_count == 2 {
            for (symbol, cap) in dfa.symbols().zip(&caps) {
                let block = if cap.len(0) <= cap.len(1) { 0 } else { 1 };
                worklist.push(symbol, block);
            }
        }

        trace!("seeded partition with {block_count} blocks over {size} states");

        Self {
            dfa,
            reverse,
            block_of,
            blocks,
            caps,
            block_count,
            worklist,
            in_preimage: vec![false; size],
            preimage: Vec::new(),
            hits: vec![0; size],
            touched: Vec::new(),
            relocate_to: vec![EMPTY_STATE; size],
            splits: Vec::new(),
            iterations: 0,
            split_count: 0,
        }
    }

    /// Processes one splitter. Returns `false` once the partition is stable, i.e. when the
    /// worklist is exhausted or every block is a singleton.
    pub fn step(&mut self) -> bool {
        if self.block_count as usize == self.dfa.size() {
            self.worklist.clear();
            return false;
        }
        let Some((symbol, splitter)) = self.worklist.pop() else {
            return false;
        };
        self.iterations += 1;

        self.collect_preimage(symbol, splitter);
        self.plan_splits();
        self.apply_splits();
        self.schedule_splits();

        for &state in &self.preimage {
            self.in_preimage[state as usize] = false;
        }
        true
    }

    /// Runs [`PartitionRefiner::step`] until the partition is stable.
    pub fn refine(&mut self) {
        while self.step() {}
        debug_assert!(self.worklist.is_empty());
        debug!(
            "partition refinement stabilized with {} blocks after {} iterations and {} splits",
            self.block_count, self.iterations, self.split_count
        );
    }

    /// Collects the states whose `symbol`-successor lies in `B_cap(symbol, splitter)` and counts
    /// them per block.
    fn collect_preimage(&mut self, symbol: Symbol, splitter: BlockId) {
        self.preimage.clear();
        for target in self.caps[symbol as usize].iter(splitter) {
            self.preimage.extend_from_slice(self.reverse.predecessors(symbol, target));
        }
        for &state in &self.preimage {
            self.in_preimage[state as usize] = true;
            let block = self.block_of[state as usize] as usize;
            if self.hits[block] == 0 {
                self.touched.push(block as BlockId);
            }
            self.hits[block] += 1;
        }
    }

    /// Decides for every touched block whether it splits and which half moves into a fresh
    /// block. Resets the hit counters.
    fn plan_splits(&mut self) {
        self.splits.clear();
        for block in self.touched.drain(..) {
            let hits = std::mem::take(&mut self.hits[block as usize]);
            let block_size = self.blocks.len(block);
            if hits == block_size {
                continue;
            }
            let fresh = self.block_count;
            self.block_count += 1;
            let moves_preimage = 2 * hits <= block_size;
            if moves_preimage {
                self.relocate_to[block as usize] = fresh;
            }
            self.splits.push(Split {
                block,
                fresh,
                moves_preimage,
            });
        }
    }

    fn apply_splits(&mut self) {
        for index in 0..self.preimage.len() {
            let state = self.preimage[index];
            let block = self.block_of[state as usize];
            let fresh = self.relocate_to[block as usize];
            if fresh != EMPTY_STATE {
                self.relocate(state, fresh);
            }
        }

        for index in 0..self.splits.len() {
            let Split {
                block,
                fresh,
                moves_preimage,
            } = self.splits[index];
            if moves_preimage {
                self.relocate_to[block as usize] = EMPTY_STATE;
                continue;
            }
            let mut current = self.blocks.head(block);
            while current != EMPTY_STATE {
                let next = self.blocks.next(current);
                if !self.in_preimage[current as usize] {
                    self.relocate(current, fresh);
                }
                current = next;
            }
        }

        self.split_count += self.splits.len();
        if !self.splits.is_empty() {
            trace!(
                "split {} blocks, now {} blocks",
                self.splits.len(),
                self.block_count
            );
        }
    }

    /// Moves `state` into `to`, keeping the block list and every `B_cap` list it belongs to in
    /// sync.
    fn relocate(&mut self, state: StateId, to: BlockId) {
        let from = self.block_of[state as usize];
        debug_assert_ne!(from, to);
        self.blocks.unlink(from, state);
        self.blocks.push_front(to, state);
        for (symbol, cap) in self.caps.iter_mut().enumerate() {
            if self.reverse.has_predecessors(symbol as Symbol, state) {
                cap.unlink(from, state);
                cap.push_front(to, state);
            }
        }
        self.block_of[state as usize] = to;
    }

    fn schedule_splits(&mut self) {
        for &Split { block, fresh, .. } in &self.splits {
            for (symbol, cap) in self.dfa.symbols().zip(&self.caps) {
                if self.worklist.contains(symbol, block) || cap.len(fresh) < cap.len(block) {
                    self.worklist.push(symbol, fresh);
                } else {
                    self.worklist.push(symbol, block);
                }
            }
        }
    }

    /// Returns the number of blocks.
    pub fn block_count(&self) -> usize {
        self.block_count as usize
    }

    /// Returns the block that currently contains `state`.
    pub fn block_of(&self, state: StateId) -> BlockId {
        self.block_of[state as usize]
    }

    /// Returns the head of the member list of `block`.
    pub fn representative(&self, block: BlockId) -> StateId {
        self.blocks.head(block)
    }

    /// Returns the number of splitters processed so far.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Returns the number of block splits performed so far.
    pub fn splits(&self) -> usize {
        self.split_count
    }

    /// Returns the current partition with one class per block.
    pub fn classes(&self) -> Partition<StateId> {
        Partition::new((0..self.block_count).map(|block| self.blocks.iter(block)))
    }

    /// Emits the blocks and the `B_cap` lists at trace level.
    pub fn trace_classes(&self) {
        for block in 0..self.block_count {
            trace!(
                "block {block}: [{}]",
                self.blocks.iter(block).sorted().join(", ")
            );
            for (symbol, cap) in self.dfa.symbols().zip(&self.caps) {
                if cap.len(block) > 0 {
                    trace!(
                        "  B_cap({symbol}, {block}): [{}]",
                        cap.iter(block).sorted().join(", ")
                    );
                }
            }
        }
    }
}

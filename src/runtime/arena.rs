use tracing::trace;

use crate::error::{Result, RuntimeError};

/// A growable stack of values stored in fixed-capacity blocks.
///
/// Values are addressed by a flat slot index, `block * block_size + offset`. Pushing bumps a
/// cursor into the current block and moves on to the next block once it is full, allocating
/// it only if it was never allocated before. Blocks are never freed, so a stack that shrinks
/// and grows again reuses its blocks.
///
/// Removal is by swap-compaction: [`BlockStack::swap_remove`] moves the top value into the
/// freed slot and reports the move, so that the owner can retarget whatever referred to the
/// top value's old slot. The stack is always densely packed.
///
/// Each slot has a generation counter which is bumped whenever its occupant leaves, so that
/// owners can detect stale references.
pub struct BlockStack<T> {
    name: &'static str,
    blocks: Vec<Block<T>>,
    current: usize,
    block_size: usize,
    max_blocks: Option<usize>,
}

struct Block<T> {
    values: Vec<T>,
    generations: Vec<u32>,
}

/// A value taken out of a [`BlockStack`], and the slot of the value that was moved into
/// its place, if any.
#[derive(Debug)]
pub struct Removed<T> {
    pub value: T,
    pub moved_from: Option<usize>,
}

impl<T> BlockStack<T> {
    pub fn new(name: &'static str, block_size: usize, max_blocks: Option<usize>) -> Self {
        Self {
            name,
            blocks: Vec::new(),
            current: 0,
            block_size: block_size.max(1),
            max_blocks,
        }
    }

    pub fn len(&self) -> usize {
        match self.blocks.get(self.current) {
            Some(block) => self.current * self.block_size + block.values.len(),
            None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Blocks allocated so far, including the ones above the cursor.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn capacity(&self) -> usize {
        self.blocks.len() * self.block_size
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn push(&mut self, value: T) -> Result<usize> {
        let full = match self.blocks.get(self.current) {
            Some(block) => block.values.len() == self.block_size,
            None => true,
        };
        if full {
            let next = if self.blocks.is_empty() {
                0
            } else {
                self.current + 1
            };
            if next == self.blocks.len() {
                self.grow()?;
            }
            self.current = next;
        }
        let block = &mut self.blocks[self.current];
        block.values.push(value);
        Ok(self.current * self.block_size + block.values.len() - 1)
    }

    pub fn pop(&mut self) -> Option<T> {
        if self.current > 0 && self.blocks[self.current].values.is_empty() {
            self.current -= 1;
        }
        let block = self.blocks.get_mut(self.current)?;
        let value = block.values.pop()?;
        let offset = block.values.len();
        block.generations[offset] = block.generations[offset].wrapping_add(1);
        Some(value)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len() {
            return None;
        }
        let (block, offset) = self.locate(index);
        self.blocks[block].values.get(offset)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len() {
            return None;
        }
        let (block, offset) = self.locate(index);
        self.blocks[block].values.get_mut(offset)
    }

    /// Current generation of a slot, live or not.
    pub fn generation(&self, index: usize) -> Option<u32> {
        let (block, offset) = self.locate(index);
        self.blocks.get(block)?.generations.get(offset).copied()
    }

    /// Removes the value at `index`, filling the hole with the top of the stack.
    pub fn swap_remove(&mut self, index: usize) -> Option<Removed<T>> {
        let top = self.len().checked_sub(1)?;
        if index > top {
            return None;
        }
        let last = self.pop()?;
        if index == top {
            return Some(Removed {
                value: last,
                moved_from: None,
            });
        }
        let (block, offset) = self.locate(index);
        let block = &mut self.blocks[block];
        let value = std::mem::replace(&mut block.values[offset], last);
        block.generations[offset] = block.generations[offset].wrapping_add(1);
        trace!(arena = self.name, from = top, to = index, "compacted");
        Some(Removed {
            value,
            moved_from: Some(top),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.blocks[..self.blocks.len().min(self.current + 1)]
            .iter()
            .flat_map(|block| block.values.iter())
            .enumerate()
    }

    fn locate(&self, index: usize) -> (usize, usize) {
        (index / self.block_size, index % self.block_size)
    }

    fn grow(&mut self) -> Result<()> {
        let out_of_memory = || RuntimeError::OutOfMemory {
            arena: self.name,
            blocks: self.blocks.len(),
        };
        if self
            .max_blocks
            .is_some_and(|max| self.blocks.len() >= max)
        {
            return Err(out_of_memory());
        }
        let mut values = Vec::new();
        values
            .try_reserve_exact(self.block_size)
            .map_err(|_| out_of_memory())?;
        let mut generations = Vec::new();
        generations
            .try_reserve_exact(self.block_size)
            .map_err(|_| out_of_memory())?;
        generations.resize(self.block_size, 0);
        self.blocks.push(Block {
            values,
            generations,
        });
        trace!(arena = self.name, blocks = self.blocks.len(), "grew");
        Ok(())
    }
}

//! Block records — derived state over the container buffer.
//!
//! A [`Block`] stores byte *ranges* into the container plus recovered
//! metadata; it never owns payload bytes.  Blocks are rebuilt wholesale
//! from the buffer on load and after every mutation, never patched
//! incrementally.

use serde::Serialize;

use crate::name::{extract_name, UNKNOWN_NAME};
use crate::signature::{scan_signatures, SIG_PREFIX_LEN};

#[derive(Debug, Clone)]
pub struct Block {
    /// Absolute offset of the 4-byte signature in the container.
    pub offset: usize,
    /// Absolute end of this block (exclusive) — the next block's offset,
    /// or the container length for the last block.
    pub end: usize,
    /// The byte following `SHPI`.  Preserved verbatim, never interpreted;
    /// zero sentinel when the block is too short to have one.
    pub sig_byte: u8,
    /// Recovered name, or the `UNKNOWN` sentinel.
    pub name: String,
    /// Offset within the block of the name's null terminator, if found.
    pub name_end: Option<usize>,
}

impl Block {
    /// Full block bytes, signature to end, borrowed from the container.
    pub fn raw<'a>(&self, container: &'a [u8]) -> &'a [u8] {
        &container[self.offset..self.end]
    }

    /// Bytes after the name terminator, up to the next block.  Carried
    /// over verbatim on replacement.  Empty when no terminator was found.
    pub fn padding<'a>(&self, container: &'a [u8]) -> &'a [u8] {
        match self.name_end {
            Some(t) => &container[self.offset + t + 1..self.end],
            None => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.offset
    }

    pub fn padding_len(&self) -> usize {
        match self.name_end {
            Some(t) => self.len() - t - 1,
            None => 0,
        }
    }
}

/// Flat listing row for one block — what `list` renders and `--json` emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockSummary {
    pub index: usize,
    pub name: String,
    pub offset: usize,
    pub length: usize,
    pub padding_len: usize,
    pub sig_byte: u8,
}

impl BlockSummary {
    pub fn new(index: usize, block: &Block) -> Self {
        BlockSummary {
            index,
            name: block.name.clone(),
            offset: block.offset,
            length: block.len(),
            padding_len: block.padding_len(),
            sig_byte: block.sig_byte,
        }
    }

    /// True when the name heuristic failed for this block.
    pub fn name_unknown(&self) -> bool {
        self.name == UNKNOWN_NAME
    }
}

/// Partition `container` into blocks: scan signatures, slice between
/// consecutive offsets, run the name heuristic on each slice.
///
/// The blocks tile the buffer exactly from the first signature to the end;
/// concatenating their raw ranges reconstructs `container[first..]`.
pub fn assemble(container: &[u8]) -> Vec<Block> {
    let offsets = scan_signatures(container);
    let mut blocks = Vec::with_capacity(offsets.len());
    for (i, &start) in offsets.iter().enumerate() {
        let end = offsets.get(i + 1).copied().unwrap_or(container.len());
        let raw = &container[start..end];
        let sig_byte = if raw.len() > SIG_PREFIX_LEN { raw[SIG_PREFIX_LEN] } else { 0 };
        let hit = extract_name(raw);
        blocks.push(Block {
            offset: start,
            end,
            sig_byte,
            name: hit.name,
            name_end: hit.name_end,
        });
    }
    blocks
}

//! High-level [`Container`] API — the primary embedding surface.
//!
//! A `Container` is a caller-owned session value: the raw `.str` buffer
//! plus the block index derived from it.  The buffer is always the source
//! of truth; the index is recomputed wholesale after every mutation and is
//! never persisted.
//!
//! ```no_run
//! use fshtool::container::{Container, ImportPolicy};
//!
//! let mut c = Container::open("pets.str")?;
//! for s in c.summaries() {
//!     println!("{}: {} ({} bytes)", s.index, s.name, s.length);
//! }
//!
//! let fsh = c.export_trimmed(0)?.to_vec();
//! c.import_replace(0, &fsh, ImportPolicy::Strict)?;
//! c.save("pets.str")?;
//! # Ok::<(), fshtool::container::ContainerError>(())
//! ```

use std::io;
use std::path::Path;

use thiserror::Error;

use crate::block::{assemble, Block, BlockSummary};
use crate::signature::SIG_PREFIX;

// ── Errors ───────────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum ContainerError {
    /// The caller referenced a block that does not exist (typically a stale
    /// index held across a mutation).  Never silently clamped.
    #[error("block index {index} out of range ({count} block(s))")]
    OutOfRange { index: usize, count: usize },
    /// Import bytes do not begin with `SHPI` under the strict policy.
    #[error("import data does not begin with the 'SHPI' signature")]
    FormatMismatch,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

// ── Import policy ────────────────────────────────────────────────────────────

/// What to do when import bytes do not start with the `SHPI` literal.
///
/// The original tool asked the user interactively; here the decision is an
/// explicit input so it is testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPolicy {
    /// Fail with [`ContainerError::FormatMismatch`], container untouched.
    Strict,
    /// Proceed regardless; the outcome carries `signature_ok: false`.
    Lenient,
}

/// Result of a successful [`Container::import_replace`].
#[derive(Debug, Clone, Copy)]
pub struct ImportOutcome {
    /// False when the new bytes lacked the `SHPI` prefix and the lenient
    /// policy let the replacement through anyway.
    pub signature_ok: bool,
    /// Length of the replaced block's raw range.
    pub old_len: usize,
    /// Length written: the new bytes plus the old block's carried padding.
    pub new_len: usize,
}

// ── Container ────────────────────────────────────────────────────────────────

pub struct Container {
    bytes: Vec<u8>,
    blocks: Vec<Block>,
}

impl Container {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Build a session from an in-memory buffer.
    ///
    /// Never fails: a buffer with no `SHPI` signature yields an empty block
    /// index, which callers must handle like any other listing.
    pub fn load(bytes: Vec<u8>) -> Self {
        let blocks = assemble(&bytes);
        Container { bytes, blocks }
    }

    /// Read a `.str` file whole and parse it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ContainerError> {
        Ok(Self::load(std::fs::read(path)?))
    }

    // ── Listing ──────────────────────────────────────────────────────────────

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Listing rows in canonical (ascending offset) order.
    pub fn summaries(&self) -> Vec<BlockSummary> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(i, b)| BlockSummary::new(i, b))
            .collect()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn block(&self, index: usize) -> Result<&Block, ContainerError> {
        self.blocks.get(index).ok_or(ContainerError::OutOfRange {
            index,
            count: self.blocks.len(),
        })
    }

    // ── Export ───────────────────────────────────────────────────────────────

    /// Block bytes up to and including the *last* null byte — strips the
    /// cross-block padding/garbage the greedy "up to next signature"
    /// boundary captures.  Whole raw range if the block has no null byte.
    pub fn export_trimmed(&self, index: usize) -> Result<&[u8], ContainerError> {
        let raw = self.export_raw(index)?;
        match raw.iter().rposition(|&b| b == 0) {
            Some(last_null) => Ok(&raw[..last_null + 1]),
            None => Ok(raw),
        }
    }

    /// Block bytes verbatim, untrimmed.
    pub fn export_raw(&self, index: usize) -> Result<&[u8], ContainerError> {
        Ok(self.block(index)?.raw(&self.bytes))
    }

    // ── Import ───────────────────────────────────────────────────────────────

    /// Replace block `index` with `new_bytes`, carrying the old block's
    /// padding over verbatim, then re-derive the whole block index.
    ///
    /// The new data's own signature byte (offset 4) is deliberately not
    /// checked against the old block's — only the 4-byte prefix matters,
    /// and only under [`ImportPolicy::Strict`].
    pub fn import_replace(
        &mut self,
        index: usize,
        new_bytes: &[u8],
        policy: ImportPolicy,
    ) -> Result<ImportOutcome, ContainerError> {
        let old = self.block(index)?;
        let signature_ok = new_bytes.starts_with(SIG_PREFIX);
        if !signature_ok && policy == ImportPolicy::Strict {
            return Err(ContainerError::FormatMismatch);
        }

        let (start, end, old_len) = (old.offset, old.end, old.len());
        let mut replacement = Vec::with_capacity(new_bytes.len() + old.padding_len());
        replacement.extend_from_slice(new_bytes);
        replacement.extend_from_slice(old.padding(&self.bytes));
        let new_len = replacement.len();

        self.bytes.splice(start..end, replacement);
        self.reparse();

        Ok(ImportOutcome { signature_ok, old_len, new_len })
    }

    fn reparse(&mut self) {
        self.blocks = assemble(&self.bytes);
    }

    // ── Persistence ──────────────────────────────────────────────────────────

    /// Write the buffer verbatim.  Single attempt; IO errors surface as-is.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ContainerError> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }

    /// Concatenate every block's raw range in order.
    ///
    /// Equivalent to the buffer (from the first signature on) whenever no
    /// edit is pending — a consistency check, not the persisted form.
    /// [`Container::save`] always writes the buffer itself.
    pub fn rebuild_from_blocks(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.bytes.len());
        for b in &self.blocks {
            out.extend_from_slice(b.raw(&self.bytes));
        }
        out
    }

    /// Bytes before the first signature — unreachable through any block and
    /// therefore absent from [`Container::rebuild_from_blocks`].
    pub fn leading_len(&self) -> usize {
        self.blocks.first().map_or(self.bytes.len(), |b| b.offset)
    }

    /// Verify the block index still tiles the buffer exactly.
    pub fn is_consistent(&self) -> bool {
        self.rebuild_from_blocks().as_slice() == &self.bytes[self.leading_len()..]
    }
}

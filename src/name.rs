//! Name recovery heuristic — the hard part of the format.
//!
//! # How it works
//!
//! There is no fixed-offset header.  What the format reliably embeds is a
//! 4-byte little-endian size field immediately before a printable,
//! null-terminated name somewhere in the last 2 KiB of the block.  Neither
//! the field's position nor the name's length is fixed, so the only
//! discriminator available is bounds-checking the size value against the
//! block length.
//!
//! The scan walks null bytes in the tail window from the latest backward.
//! For each null terminator `T` it tries candidate name starts `S`
//! ascending from `T - 128`, so on ambiguous input the longest printable
//! run wins.  A candidate validates when `raw[S..T]` is non-empty printable
//! ASCII and the u32 at `raw[S-4..S]` is a plausible size (at most the
//! block length).  The first validated pair is accepted.
//!
//! If nothing validates, the fallback takes the last null byte and collects
//! up to 128 printable bytes walking backward from it.  A block with no
//! null in the tail window gets the `UNKNOWN` sentinel and no terminator.
//!
//! This is a pure function over a byte slice — no state, no I/O — so it can
//! be fuzzed against synthetic containers with known ground truth.

use byteorder::{ByteOrder, LittleEndian};

/// How far back from the end of a block the name is searched for.
pub const TAIL_SCAN: usize = 2048;
/// Upper bound on recovered name length.
pub const MAX_NAME_LEN: usize = 128;
/// Sentinel when no name could be recovered.
pub const UNKNOWN_NAME: &str = "UNKNOWN";

/// Result of the name heuristic for one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameHit {
    /// Recovered name, or [`UNKNOWN_NAME`].
    pub name: String,
    /// Offset within the block of the name's null terminator.
    /// `None` when the tail window held no null byte at all.
    /// Padding is everything after this offset: `raw[end + 1..]`.
    pub name_end: Option<usize>,
}

impl NameHit {
    fn unknown() -> Self {
        NameHit { name: UNKNOWN_NAME.to_owned(), name_end: None }
    }

    /// True when the heuristic produced a real name, not the sentinel.
    pub fn is_known(&self) -> bool {
        self.name != UNKNOWN_NAME
    }
}

#[inline]
fn is_printable(b: u8) -> bool {
    (0x20..=0x7E).contains(&b)
}

/// Recover `(name, terminator offset)` from one block's raw bytes.
pub fn extract_name(raw: &[u8]) -> NameHit {
    let scan_len = raw.len().min(TAIL_SCAN);
    let tail_base = raw.len() - scan_len;

    // Null terminator candidates in the tail window, in buffer order.
    let nulls: Vec<usize> = raw[tail_base..]
        .iter()
        .enumerate()
        .filter(|(_, &b)| b == 0)
        .map(|(i, _)| tail_base + i)
        .collect();

    // Primary pass: latest null first, earliest candidate start first.
    for &term in nulls.iter().rev() {
        for start in term.saturating_sub(MAX_NAME_LEN)..term {
            // Candidate is non-empty by construction (start < term).
            let segment = &raw[start..term];
            if !segment.iter().copied().all(is_printable) {
                continue;
            }
            // The 4 bytes before the name must hold a size value no larger
            // than the block itself.
            if start < 4 {
                continue;
            }
            let size_val = LittleEndian::read_u32(&raw[start - 4..start]);
            if size_val as usize <= raw.len() {
                // Printable ASCII by construction; cannot fail.
                let name = String::from_utf8_lossy(segment).into_owned();
                return NameHit { name, name_end: Some(term) };
            }
        }
    }

    // Fallback: printable run immediately before the last null.
    if let Some(&term) = nulls.last() {
        let mut collected: Vec<u8> = Vec::new();
        let mut k = term;
        while k > 0 && collected.len() < MAX_NAME_LEN {
            let b = raw[k - 1];
            if !is_printable(b) {
                break;
            }
            collected.push(b);
            k -= 1;
        }
        collected.reverse();
        let name = if collected.is_empty() {
            UNKNOWN_NAME.to_owned()
        } else {
            String::from_utf8_lossy(&collected).into_owned()
        };
        return NameHit { name, name_end: Some(term) };
    }

    NameHit::unknown()
}

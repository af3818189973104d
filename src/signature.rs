//! Signature scan — locate every block start in a raw container buffer.
//!
//! `.str` containers carry no header table.  The only block delimiter is the
//! ASCII literal `SHPI` followed by one arbitrary byte (some blocks use
//! `SHPI@`, others `SHPI ` — the fifth byte is preserved but never
//! interpreted).  A block runs from its signature to the byte before the
//! next signature, or to end of buffer.

/// The 4-byte ASCII prefix that opens every block.
pub const SIG_PREFIX: &[u8; 4] = b"SHPI";
pub const SIG_PREFIX_LEN: usize = 4;

/// Find every block-start offset in `data`, ascending.
///
/// A match at offset `i` counts only if at least one byte follows the
/// 4-byte literal (`i + 4 < data.len()`) — that byte is the signature byte
/// the block header requires.  A bare `SHPI` at the very end of the buffer
/// is ignored entirely.  The search cursor advances past the matched
/// literal, not past the signature byte.
///
/// An empty result means "no blocks", not an error.
pub fn scan_signatures(data: &[u8]) -> Vec<usize> {
    let mut offsets = Vec::new();
    let mut pos = 0;
    while let Some(idx) = find_prefix(data, pos) {
        if idx + SIG_PREFIX_LEN >= data.len() {
            break;
        }
        offsets.push(idx);
        pos = idx + SIG_PREFIX_LEN;
    }
    offsets
}

fn find_prefix(data: &[u8], from: usize) -> Option<usize> {
    if from >= data.len() {
        return None;
    }
    data[from..]
        .windows(SIG_PREFIX_LEN)
        .position(|w| w == SIG_PREFIX)
        .map(|rel| from + rel)
}

use fshtool::container::{Container, ContainerError, ImportPolicy};
use fshtool::name::UNKNOWN_NAME;
use proptest::prelude::*;
use tempfile::NamedTempFile;

/// One well-formed block: signature, signature byte, filler, LE size field,
/// null-terminated name, trailing padding.
fn valid_block(sig_byte: u8, name: &str, padding: &[u8]) -> Vec<u8> {
    let mut b = b"SHPI".to_vec();
    b.push(sig_byte);
    b.extend_from_slice(&[0u8; 10]);
    b.extend_from_slice(&20u32.to_le_bytes());
    b.extend_from_slice(name.as_bytes());
    b.push(0);
    b.extend_from_slice(padding);
    b
}

#[test]
fn scenario_a_single_block() {
    let buf = valid_block(0x40, "NAME1", b"\xFF\xFF");
    let c = Container::load(buf.clone());

    let summaries = c.summaries();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].name, "NAME1");
    assert_eq!(summaries[0].offset, 0);
    assert_eq!(summaries[0].length, buf.len());
    assert_eq!(summaries[0].padding_len, 2);
    assert_eq!(summaries[0].sig_byte, 0x40);
}

#[test]
fn scenario_b_two_blocks() {
    let block_a = valid_block(0x40, "NAME1", b"\xFF\xFF");
    let block_b = valid_block(0x20, "NAME2", b"");
    let mut buf = block_a.clone();
    buf.extend_from_slice(&block_b);

    let c = Container::load(buf);
    let blocks = c.blocks();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].offset, 0);
    assert_eq!(blocks[1].offset, block_a.len());
    assert_eq!(blocks[0].name, "NAME1");
    assert_eq!(blocks[1].name, "NAME2");
}

#[test]
fn scenario_c_trailing_bare_signature() {
    let mut buf = valid_block(0x40, "NAME1", b"");
    buf.extend_from_slice(b"SHPI"); // last 4 bytes, no signature byte

    let c = Container::load(buf.clone());
    assert_eq!(c.blocks().len(), 1);
    // The bare trailing prefix is swallowed into the previous block's range.
    assert_eq!(c.blocks()[0].end, buf.len());
}

#[test]
fn scenario_d_strict_import_rejects_bad_signature() {
    let buf = valid_block(0x40, "NAME1", b"\xFF\xFF");
    let mut c = Container::load(buf.clone());

    let err = c
        .import_replace(0, b"not a block", ImportPolicy::Strict)
        .unwrap_err();
    assert!(matches!(err, ContainerError::FormatMismatch));
    // Container untouched.
    assert_eq!(c.bytes(), buf.as_slice());
    assert_eq!(c.summaries().len(), 1);
}

#[test]
fn round_trip_identity() {
    let mut buf = valid_block(0x40, "ALPHA", b"\x01\x02\x03");
    buf.extend_from_slice(&valid_block(0x21, "BETA", b""));
    buf.extend_from_slice(&valid_block(0x7E, "GAMMA", &[0xAB; 40]));

    let c = Container::load(buf.clone());
    assert_eq!(c.rebuild_from_blocks(), buf);
    assert!(c.is_consistent());
}

#[test]
fn idempotent_reparse() {
    let mut buf = valid_block(0x40, "ALPHA", b"\xFF");
    buf.extend_from_slice(&valid_block(0x20, "BETA", b"\x00\x00"));

    let first = Container::load(buf);
    let second = Container::load(first.rebuild_from_blocks());
    assert_eq!(first.summaries(), second.summaries());
}

#[test]
fn replace_size_length_invariant() {
    let mut buf = valid_block(0x40, "ALPHA", b"\xEE\xEE\xEE");
    buf.extend_from_slice(&valid_block(0x20, "BETA", b""));
    let mut c = Container::load(buf);

    let old_len = c.blocks()[0].len();
    let old_pad = c.blocks()[0].padding_len();
    let total_before = c.len();

    let new_bytes = valid_block(0x40, "REPLACED", b"");
    let outcome = c.import_replace(0, &new_bytes, ImportPolicy::Lenient).unwrap();

    assert!(outcome.signature_ok);
    assert_eq!(outcome.old_len, old_len);
    assert_eq!(outcome.new_len, new_bytes.len() + old_pad);
    assert_eq!(c.len(), total_before - old_len + new_bytes.len() + old_pad);
}

#[test]
fn replace_preserves_old_padding_verbatim() {
    let padding: &[u8] = b"\xDE\xAD\xBE\xEF";
    let mut buf = valid_block(0x40, "ALPHA", padding);
    buf.extend_from_slice(&valid_block(0x20, "BETA", b""));
    let mut c = Container::load(buf);

    let new_bytes = valid_block(0x55, "FRESH", b"");
    c.import_replace(0, &new_bytes, ImportPolicy::Lenient).unwrap();

    // The bytes immediately after the new content are the old padding.
    assert_eq!(&c.bytes()[new_bytes.len()..new_bytes.len() + padding.len()], padding);
    // Later blocks shifted but survived.
    assert_eq!(c.blocks().len(), 2);
    assert_eq!(c.blocks()[1].name, "BETA");
    assert_eq!(c.blocks()[1].offset, new_bytes.len() + padding.len());
}

#[test]
fn lenient_import_flags_missing_signature() {
    let buf = valid_block(0x40, "ALPHA", b"\xFF\xFF");
    let mut c = Container::load(buf);

    let outcome = c.import_replace(0, b"raw payload", ImportPolicy::Lenient).unwrap();
    assert!(!outcome.signature_ok);
    assert!(c.bytes().starts_with(b"raw payload"));
}

#[test]
fn replacement_signature_byte_may_differ() {
    // The old block used 0x40; the replacement declares 0x7C. Allowed
    // silently, and the reparsed index reports the new byte.
    let buf = valid_block(0x40, "ALPHA", b"");
    let mut c = Container::load(buf);

    let new_bytes = valid_block(0x7C, "ALPHA", b"");
    let outcome = c.import_replace(0, &new_bytes, ImportPolicy::Strict).unwrap();
    assert!(outcome.signature_ok);
    assert_eq!(c.blocks()[0].sig_byte, 0x7C);
}

#[test]
fn export_trimmed_ends_at_last_null() {
    let buf = valid_block(0x40, "NAME1", b"\xFF\xFF\xFF");
    let c = Container::load(buf);

    let trimmed = c.export_trimmed(0).unwrap();
    let raw = c.export_raw(0).unwrap();
    assert!(trimmed.len() <= raw.len());
    assert_eq!(trimmed.last(), Some(&0u8));
    assert_eq!(raw.len() - trimmed.len(), 3);
}

#[test]
fn export_trimmed_without_nulls_returns_raw() {
    // 'SHPI' + sig byte + printable tail, no null anywhere.
    let buf = b"SHPI@ABCDEFGH".to_vec();
    let c = Container::load(buf.clone());
    assert_eq!(c.export_trimmed(0).unwrap(), buf.as_slice());
    assert_eq!(c.blocks()[0].name, UNKNOWN_NAME);
}

#[test]
fn out_of_range_index_is_an_error() {
    let c = Container::load(valid_block(0x40, "NAME1", b""));
    assert!(matches!(
        c.export_raw(5),
        Err(ContainerError::OutOfRange { index: 5, count: 1 })
    ));
    assert!(matches!(c.export_trimmed(1), Err(ContainerError::OutOfRange { .. })));

    let mut c = c;
    assert!(matches!(
        c.import_replace(9, b"SHPI@", ImportPolicy::Strict),
        Err(ContainerError::OutOfRange { .. })
    ));
}

#[test]
fn no_signature_yields_empty_index() {
    let c = Container::load(b"this buffer holds no blocks at all".to_vec());
    assert!(c.blocks().is_empty());
    assert!(c.summaries().is_empty());
    assert!(c.rebuild_from_blocks().is_empty());
}

#[test]
fn save_and_reopen_round_trips() {
    let mut buf = valid_block(0x40, "ALPHA", b"\xFF");
    buf.extend_from_slice(&valid_block(0x20, "BETA", b""));
    let c = Container::load(buf.clone());

    let tmp = NamedTempFile::new().unwrap();
    c.save(tmp.path()).unwrap();

    let reopened = Container::open(tmp.path()).unwrap();
    assert_eq!(reopened.bytes(), buf.as_slice());
    assert_eq!(reopened.summaries(), c.summaries());
}

#[test]
fn edit_then_save_persists_the_edit() {
    let buf = valid_block(0x40, "ALPHA", b"\xAA\xBB");
    let mut c = Container::load(buf);
    let new_bytes = valid_block(0x40, "EDITED", b"");
    c.import_replace(0, &new_bytes, ImportPolicy::Strict).unwrap();

    let tmp = NamedTempFile::new().unwrap();
    c.save(tmp.path()).unwrap();

    let reopened = Container::open(tmp.path()).unwrap();
    assert_eq!(reopened.blocks()[0].name, "EDITED");
    assert_eq!(reopened.bytes(), c.bytes());
}

// ── Fuzz: the heuristics must be total and the index must tile the buffer ────

proptest! {
    #[test]
    fn blocks_always_tile_the_buffer(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
        let c = Container::load(data.clone());
        // Offsets strictly ascending, ranges adjacent, last range ends at EOF.
        let blocks = c.blocks();
        for pair in blocks.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].offset);
            prop_assert!(pair[0].offset < pair[1].offset);
        }
        if let Some(last) = blocks.last() {
            prop_assert_eq!(last.end, data.len());
        }
        prop_assert!(c.is_consistent());
    }

    #[test]
    fn extraction_never_fails_a_parse(data in proptest::collection::vec(any::<u8>(), 0..2048)) {
        // Name recovery may return the sentinel but must never abort the
        // parse or produce a terminator outside the block.
        let c = Container::load(data);
        for b in c.blocks() {
            if let Some(t) = b.name_end {
                prop_assert!(t < b.len());
                prop_assert_eq!(b.raw(c.bytes())[t], 0);
            }
            prop_assert!(!b.name.is_empty());
        }
    }

    #[test]
    fn reparse_after_lenient_replace_is_stable(
        payload in proptest::collection::vec(any::<u8>(), 0..256),
    ) {
        let mut buf = valid_block(0x40, "ALPHA", b"\x10\x20");
        buf.extend_from_slice(&valid_block(0x20, "BETA", b""));
        let mut c = Container::load(buf);
        let before = c.len();
        let old_len = c.blocks()[0].len();

        let outcome = c.import_replace(0, &payload, ImportPolicy::Lenient).unwrap();
        prop_assert_eq!(c.len(), before - old_len + payload.len() + 2);
        prop_assert_eq!(outcome.new_len, payload.len() + 2);
        // The derived index always matches the buffer it came from.
        prop_assert!(c.is_consistent());
    }
}

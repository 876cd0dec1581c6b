//! Tests for WAL record encoding
//!
//! These tests verify:
//! - Header layout
//! - CRC32 corruption detection
//! - Rejection of undecodable payloads

use cellstore::wal::{WalEntry, HEADER_SIZE};
use cellstore::StoreError;

use super::sample_cell;

fn split(record: &[u8]) -> (u64, u32, u32, &[u8]) {
    let lsn = u64::from_le_bytes(record[0..8].try_into().unwrap());
    let crc = u32::from_le_bytes(record[8..12].try_into().unwrap());
    let len = u32::from_le_bytes(record[12..16].try_into().unwrap());
    (lsn, crc, len, &record[HEADER_SIZE..])
}

#[test]
fn test_header_layout() {
    let record = WalEntry::new(42, sample_cell(3)).encode().unwrap();
    let (lsn, _crc, len, payload) = split(&record);

    assert_eq!(lsn, 42);
    assert_eq!(len as usize, payload.len());
    assert_eq!(record.len(), HEADER_SIZE + payload.len());
}

#[test]
fn test_decode_recovers_stamped_cell() {
    let cell = sample_cell(7);
    let record = WalEntry::new(9, cell.clone()).encode().unwrap();
    let (lsn, crc, _len, payload) = split(&record);

    let entry = WalEntry::decode(lsn, crc, payload).unwrap();
    assert_eq!(entry.lsn, 9);
    assert_eq!(entry.cell, cell);
    assert_eq!(entry.cell.added, 1_007);
}

#[test]
fn test_flipped_payload_byte_fails_crc() {
    let mut record = WalEntry::new(1, sample_cell(1)).encode().unwrap();
    let last = record.len() - 1;
    record[last] ^= 0xFF;
    let (lsn, crc, _len, payload) = split(&record);

    let err = WalEntry::decode(lsn, crc, payload).unwrap_err();
    assert!(matches!(err, StoreError::WalCorruption(_)));
}

#[test]
fn test_garbage_with_matching_crc_is_corruption() {
    let payload = [0xFFu8; 3];
    let crc = cellstore::wal::compute_crc(&payload);
    let err = WalEntry::decode(1, crc, &payload).unwrap_err();
    assert!(matches!(err, StoreError::WalCorruption(_)));
}

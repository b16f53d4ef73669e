//! Hub memory operations against a simulated device.
//!
//! These tests cover splitting into atomic transactions, the 65535 → 0 wrap,
//! string layout rules, integer encoding and alignment, single-transaction
//! requests, and the device's restricted address ranges.

mod common;

use common::{client, SimDevice};
use peekpoke::protocol::{DeviceStatus, DeviceStatusError};
use peekpoke::{
    Alignment, ByteOrder, ClientConfig, Error, IntOptions, MemoryAccess, PeekPoke, StrOptions,
    TextEncoding,
};

/// True if no read or write command sent so far crosses the top of the hub.
fn no_command_wraps(sim: &SimDevice) -> bool {
    sim.memory_commands()
        .iter()
        .all(|&(_, address, count)| address as usize + count as usize <= 65536)
}

fn write_commands(sim: &SimDevice) -> Vec<(u16, u16)> {
    sim.memory_commands()
        .into_iter()
        .filter(|&(code, _, _)| code == 2)
        .map(|(_, address, count)| (address, count))
        .collect()
}

// ============================================================================
// Bytes
// ============================================================================

#[test]
fn test_read_bytes_returns_hub_contents() {
    let mut sim = SimDevice::new();
    sim.hub[0x100..0x108].copy_from_slice(b"peekpoke");

    let mut pp = client(&mut sim);
    assert_eq!(pp.read_bytes(0x100, 8).unwrap(), b"peekpoke");
}

#[test]
fn test_write_then_read_across_wrap() {
    let mut sim = SimDevice::new();
    let data: Vec<u8> = (0..20).collect();

    let mut pp = client(&mut sim);
    pp.write_bytes(65530, &data).unwrap();
    assert_eq!(pp.read_bytes(65530, 20).unwrap(), data);
    drop(pp);

    assert_eq!(&sim.hub[65530..], &data[..6]);
    assert_eq!(&sim.hub[..14], &data[6..]);
    assert!(no_command_wraps(&sim));
    assert_eq!(write_commands(&sim), vec![(65530, 6), (0, 14)]);
}

#[test]
fn test_read_entire_hub() {
    let mut sim = SimDevice::new();
    for (i, byte) in sim.hub.iter_mut().enumerate() {
        *byte = (i % 251) as u8;
    }
    let expected = sim.hub.clone();

    let mut pp = client(&mut sim);
    let data = pp.read_bytes(0x8000, 65536).unwrap();
    drop(pp);

    let mut rotated = expected[0x8000..].to_vec();
    rotated.extend_from_slice(&expected[..0x8000]);
    assert_eq!(data, rotated);
    assert!(no_command_wraps(&sim));
    assert!(sim.memory_commands().iter().all(|&(_, _, count)| count <= 260));
}

#[test]
fn test_large_write_respects_configured_limit() {
    let mut sim = SimDevice::new();
    let mut config = ClientConfig::default();
    config.protocol.max_atomic_write = 16;
    let data: Vec<u8> = (0..100u8).collect();

    let mut pp = PeekPoke::new(&mut sim, config).unwrap();
    pp.write_bytes(0x2000, &data).unwrap();
    drop(pp);

    assert_eq!(&sim.hub[0x2000..0x2000 + 100], &data[..]);
    let writes = write_commands(&sim);
    assert_eq!(writes.len(), 7);
    assert!(writes.iter().all(|&(_, count)| count <= 16));
    assert_eq!(writes[6], (0x2000 + 96, 4));
}

#[test]
fn test_zero_length_requests_send_nothing() {
    let mut sim = SimDevice::new();
    let mut pp = client(&mut sim);
    assert!(pp.read_bytes(0x10, 0).unwrap().is_empty());
    pp.write_bytes(0x10, &[]).unwrap();
    drop(pp);
    assert!(sim.sent.is_empty());
}

#[test]
fn test_out_of_range_arguments_send_nothing() {
    let mut sim = SimDevice::new();
    let mut pp = client(&mut sim);

    assert!(matches!(pp.read_bytes(65536, 1), Err(Error::Range(_))));
    assert!(matches!(pp.read_bytes(0, 65537), Err(Error::Range(_))));
    assert!(matches!(pp.write_bytes(70000, &[1]), Err(Error::Range(_))));
    assert!(matches!(pp.atomic_read_bytes(0, 261), Err(Error::Range(_))));
    assert!(matches!(pp.atomic_read_bytes(65535, 2), Err(Error::Range(_))));
    assert!(matches!(pp.atomic_write_bytes(0, &[0; 257]), Err(Error::Range(_))));
    drop(pp);

    assert!(sim.sent.is_empty());
}

#[test]
fn test_atomic_read_at_top_of_hub() {
    let mut sim = SimDevice::new();
    sim.hub[65535] = 0x5a;
    let mut pp = client(&mut sim);
    assert_eq!(pp.atomic_read_bytes(65535, 1).unwrap(), vec![0x5a]);
}

// ============================================================================
// Fill
// ============================================================================

#[test]
fn test_fill_repeats_and_cuts_pattern() {
    let pattern = b"abc";
    for count in [0usize, 1, 2, 3, 4, 1000] {
        let mut sim = SimDevice::new();
        sim.hub[0x400 + count] = 0xee;

        let mut pp = client(&mut sim);
        pp.fill_bytes(0x400, count, pattern).unwrap();
        drop(pp);

        let expected: Vec<u8> = pattern.iter().copied().cycle().take(count).collect();
        assert_eq!(&sim.hub[0x400..0x400 + count], &expected[..], "count {}", count);
        assert_eq!(sim.hub[0x400 + count], 0xee, "count {} wrote past the end", count);
        assert_eq!(sim.hub[0x3ff], 0);
    }
}

#[test]
fn test_fill_across_wrap() {
    let mut sim = SimDevice::new();
    let mut pp = client(&mut sim);
    pp.fill_bytes(65534, 4, &[0xaa]).unwrap();
    drop(pp);

    assert_eq!(&sim.hub[65534..], &[0xaa, 0xaa]);
    assert_eq!(&sim.hub[..2], &[0xaa, 0xaa]);
    assert!(no_command_wraps(&sim));
}

#[test]
fn test_fill_with_pattern_longer_than_hub() {
    let pattern: Vec<u8> = (0..70_000u32).map(|i| (i % 251) as u8 + 1).collect();
    let mut sim = SimDevice::new();
    let mut pp = client(&mut sim);
    pp.fill_bytes(0x400, 4, &pattern).unwrap();
    drop(pp);

    assert_eq!(&sim.hub[0x400..0x404], &pattern[..4]);
    assert_eq!(sim.hub[0x404], 0);
    assert_eq!(write_commands(&sim), vec![(0x400, 4)]);
}

#[test]
fn test_fill_rejects_empty_pattern() {
    let mut sim = SimDevice::new();
    let mut pp = client(&mut sim);
    assert!(matches!(pp.fill_bytes(0x400, 4, &[]), Err(Error::Range(_))));
    drop(pp);
    assert!(sim.sent.is_empty());
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_read_str_stops_at_nul() {
    let mut sim = SimDevice::new();
    sim.hub[0x100..0x107].copy_from_slice(b"cat\0xyz");

    let mut pp = client(&mut sim);
    assert_eq!(pp.read_str(0x100, 8, StrOptions::default()).unwrap(), "cat");
    assert_eq!(pp.read_str(0x100, 2, StrOptions::default()).unwrap(), "ca");
    assert_eq!(pp.read_str(0x100, 8, StrOptions::unterminated()).unwrap(), "cat\0xyz\0");
}

#[test]
fn test_read_long_terminated_string() {
    let mut sim = SimDevice::new();
    let text = "a".repeat(300);
    sim.hub[0x1000..0x1000 + 300].copy_from_slice(text.as_bytes());

    let mut pp = client(&mut sim);
    assert_eq!(pp.read_str(0x1000, 400, StrOptions::default()).unwrap(), text);
    drop(pp);

    // One full chunk without a terminator, then one that finds it.
    let reads: Vec<_> = sim.memory_commands().into_iter().filter(|c| c.0 == 3).collect();
    assert_eq!(reads, vec![(3, 0x1000, 260), (3, 0x1000 + 260, 140)]);
}

#[test]
fn test_read_str_without_nul_returns_max_bytes() {
    let mut sim = SimDevice::new();
    sim.hub[0x100..0x110].copy_from_slice(b"0123456789abcdef");

    let mut pp = client(&mut sim);
    assert_eq!(pp.read_str(0x100, 10, StrOptions::default()).unwrap(), "0123456789");
}

#[test]
fn test_string_across_wrap() {
    let mut sim = SimDevice::new();
    let mut pp = client(&mut sim);
    pp.write_str(65533, 10, "hello", StrOptions::default()).unwrap();
    assert_eq!(pp.read_str(65533, 10, StrOptions::default()).unwrap(), "hello");
    drop(pp);

    assert_eq!(&sim.hub[65533..], b"hel");
    assert_eq!(&sim.hub[..3], b"lo\0");
    assert!(no_command_wraps(&sim));
}

#[test]
fn test_write_str_terminator_counts_toward_limit() {
    let mut sim = SimDevice::new();
    let mut pp = client(&mut sim);
    let terminated = StrOptions::default();
    let truncating = StrOptions::default().with_truncate(true);

    assert!(matches!(pp.write_str(0x100, 1, "a", terminated), Err(Error::Range(_))));

    pp.write_str(0x100, 1, "a", truncating).unwrap();
    assert_eq!(pp.read_str(0x100, 10, terminated).unwrap(), "");

    pp.write_str(0x200, 3, "cat", truncating).unwrap();
    assert_eq!(pp.read_str(0x200, 10, terminated).unwrap(), "ca");

    pp.write_str(0x300, 4, "cat", terminated).unwrap();
    assert_eq!(pp.read_str(0x300, 10, terminated).unwrap(), "cat");
    drop(pp);

    assert_eq!(&sim.hub[0x300..0x304], b"cat\0");
}

#[test]
fn test_write_str_zero_bytes_terminated_is_range_error() {
    let mut sim = SimDevice::new();
    let mut pp = client(&mut sim);
    assert!(matches!(
        pp.write_str(0x100, 0, "", StrOptions::default().with_truncate(true)),
        Err(Error::Range(_))
    ));
    drop(pp);
    assert!(sim.sent.is_empty());
}

#[test]
fn test_unterminated_strings() {
    let mut sim = SimDevice::new();
    sim.hub[0x100..0x103].copy_from_slice(b"---");
    sim.hub[0x200..0x208].copy_from_slice(b"library\0");

    let mut pp = client(&mut sim);
    let fixed = StrOptions::unterminated();

    assert!(matches!(pp.write_str(0x100, 2, "dog", fixed), Err(Error::Range(_))));
    pp.write_str(0x100, 2, "dog", fixed.with_truncate(true)).unwrap();
    assert_eq!(pp.read_str(0x100, 3, fixed).unwrap(), "do-");

    pp.write_str(0x200, 3, "cat", fixed).unwrap();
    assert_eq!(pp.read_str(0x200, 8, StrOptions::default()).unwrap(), "catrary");
}

#[test]
fn test_empty_strings() {
    let mut sim = SimDevice::new();
    sim.hub[0x100] = b'x';

    let mut pp = client(&mut sim);
    pp.write_str(0x100, 4, "", StrOptions::unterminated()).unwrap();
    assert!(pp.transport().sent.is_empty());

    pp.write_str(0x100, 4, "", StrOptions::default()).unwrap();
    drop(pp);

    assert_eq!(sim.hub[0x100], 0);
    assert_eq!(write_commands(&sim), vec![(0x100, 1)]);
}

#[test]
fn test_string_encodings() {
    let mut sim = SimDevice::new();
    let mut pp = client(&mut sim);
    let utf8 = StrOptions::default().with_encoding(TextEncoding::Utf8);

    pp.write_str(0x100, 16, "héllo", utf8).unwrap();
    assert_eq!(pp.read_str(0x100, 16, utf8).unwrap(), "héllo");
    assert_eq!(pp.read_str(0x100, 16, StrOptions::default()).unwrap(), "hÃ©llo");

    pp.write_str(0x200, 16, "héllo", StrOptions::default()).unwrap();
    assert_eq!(pp.read_str(0x200, 16, StrOptions::default()).unwrap(), "héllo");
    drop(pp);

    assert_eq!(&sim.hub[0x100..0x107], "héllo\0".as_bytes());
    assert_eq!(&sim.hub[0x200..0x206], b"h\xe9llo\0");
}

#[test]
fn test_encoding_errors() {
    let mut sim = SimDevice::new();
    sim.hub[0x100..0x102].copy_from_slice(&[0xff, 0x00]);

    let mut pp = client(&mut sim);
    let sent_before = pp.transport().sent.len();
    assert!(matches!(
        pp.write_str(0x200, 16, "€", StrOptions::default()),
        Err(Error::Encoding(_))
    ));
    assert_eq!(pp.transport().sent.len(), sent_before);

    let utf8 = StrOptions::default().with_encoding(TextEncoding::Utf8);
    assert!(matches!(pp.read_str(0x100, 4, utf8), Err(Error::Encoding(_))));
}

// ============================================================================
// Integers
// ============================================================================

#[test]
fn test_int_byte_order_and_sign() {
    let mut sim = SimDevice::new();
    let mut pp = client(&mut sim);

    pp.write_int(0x200, 4, 0x1234_5678, IntOptions::default()).unwrap();
    assert_eq!(pp.read_int(0x200, 4, IntOptions::default()).unwrap(), 0x1234_5678);
    let big = IntOptions::default().with_byte_order(ByteOrder::Big);
    assert_eq!(pp.read_int(0x200, 4, big).unwrap(), 0x7856_3412);

    pp.write_int(0x210, 2, -2, IntOptions::signed()).unwrap();
    assert_eq!(pp.read_int(0x210, 2, IntOptions::default()).unwrap(), 65534);
    assert_eq!(pp.read_int(0x210, 2, IntOptions::signed()).unwrap(), -2);

    pp.write_int(0x218, 8, i64::MIN as i128, IntOptions::signed()).unwrap();
    assert_eq!(pp.read_int(0x218, 8, IntOptions::signed()).unwrap(), i64::MIN as i128);
    drop(pp);

    assert_eq!(&sim.hub[0x200..0x204], &[0x78, 0x56, 0x34, 0x12]);
    assert_eq!(&sim.hub[0x210..0x212], &[0xfe, 0xff]);
}

#[test]
fn test_int_value_out_of_range() {
    let mut sim = SimDevice::new();
    let mut pp = client(&mut sim);

    assert!(matches!(pp.write_int(0x200, 1, 256, IntOptions::default()), Err(Error::Range(_))));
    assert!(matches!(pp.write_int(0x200, 1, -1, IntOptions::default()), Err(Error::Range(_))));
    assert!(matches!(pp.write_int(0x200, 1, 128, IntOptions::signed()), Err(Error::Range(_))));
    assert!(matches!(pp.read_int(0x200, 3, IntOptions::default()), Err(Error::Range(_))));
    drop(pp);

    assert!(sim.sent.is_empty());
}

#[test]
fn test_int_alignment() {
    let mut sim = SimDevice::new();
    let mut pp = client(&mut sim);

    assert!(matches!(pp.read_int(0x201, 4, IntOptions::default()), Err(Error::Alignment(_))));
    assert!(matches!(pp.read_int(0x202, 4, IntOptions::default()), Err(Error::Alignment(_))));

    let word = IntOptions::default().with_alignment(Alignment::Word);
    assert!(pp.read_int(0x202, 4, word).is_ok());
    assert!(matches!(pp.read_int(0x201, 2, word), Err(Error::Alignment(_))));

    let long = IntOptions::default().with_alignment(Alignment::Long);
    assert!(matches!(pp.write_int(0x202, 2, 1, long), Err(Error::Alignment(_))));
    assert!(pp.write_int(0x204, 2, 1, long).is_ok());

    let byte = IntOptions::default().with_alignment(Alignment::Byte);
    pp.write_int(0x301, 4, 0xdead_beef, byte).unwrap();
    assert_eq!(pp.read_int(0x301, 4, byte).unwrap(), 0xdead_beef);
}

#[test]
fn test_int_lists() {
    let mut sim = SimDevice::new();
    let mut pp = client(&mut sim);

    let values = [1i128, -2, 300, -32768];
    pp.write_ints(0x400, 2, &values, IntOptions::signed()).unwrap();
    assert_eq!(pp.read_ints(0x400, 2, 4, IntOptions::signed()).unwrap(), values);
    assert!(pp.read_ints(0x400, 2, 0, IntOptions::default()).unwrap().is_empty());

    // Every element must be aligned, not only the first.
    let long = IntOptions::default().with_alignment(Alignment::Long);
    assert!(matches!(pp.read_ints(0x400, 2, 2, long), Err(Error::Alignment(_))));

    assert!(matches!(pp.read_ints(0, 1, 65537, IntOptions::default()), Err(Error::Range(_))));
    assert!(matches!(
        pp.write_ints(0x400, 1, &[1, 2, 256], IntOptions::default()),
        Err(Error::Range(_))
    ));
}

#[test]
fn test_int_list_across_wrap() {
    let mut sim = SimDevice::new();
    let mut pp = client(&mut sim);
    pp.write_ints(65532, 4, &[0x0a0b_0c0d, 0x0102_0304], IntOptions::default()).unwrap();
    assert_eq!(
        pp.read_ints(65532, 4, 2, IntOptions::default()).unwrap(),
        vec![0x0a0b_0c0d, 0x0102_0304]
    );
    drop(pp);

    assert_eq!(&sim.hub[65532..], &[0x0d, 0x0c, 0x0b, 0x0a]);
    assert_eq!(&sim.hub[..4], &[0x04, 0x03, 0x02, 0x01]);
}

// ============================================================================
// Single-Transaction Requests
// ============================================================================

#[test]
fn test_atomic_int_lists_at_limit() {
    let mut sim = SimDevice::new();
    let mut pp = client(&mut sim);
    let atomic = IntOptions::default().with_atomic(true);

    // 64 longs fill max_atomic_write, 65 longs fill max_atomic_read.
    let values: Vec<i128> = (0..64).map(|i| i * 0x0101).collect();
    pp.write_ints(0x400, 4, &values, atomic).unwrap();
    let read = pp.read_ints(0x400, 4, 65, atomic).unwrap();
    assert_eq!(&read[..64], &values[..]);
    assert_eq!(read[64], 0);
    drop(pp);

    assert_eq!(sim.memory_commands(), vec![(2, 0x400, 256), (1, 0x400, 260)]);
}

#[test]
fn test_atomic_int_lists_over_limit_send_nothing() {
    let mut sim = SimDevice::new();
    let mut pp = client(&mut sim);
    let atomic = IntOptions::default().with_atomic(true);

    match pp.write_ints(0x400, 4, &[0; 65], atomic) {
        Err(Error::Range(e)) => assert_eq!((e.value, e.max), (260, 256)),
        other => panic!("expected a range error, got {:?}", other),
    }
    match pp.read_ints(0x400, 2, 131, atomic) {
        Err(Error::Range(e)) => assert_eq!((e.value, e.max), (262, 260)),
        other => panic!("expected a range error, got {:?}", other),
    }
    assert!(matches!(pp.read_int(0x400, 8, atomic), Ok(0)));
    drop(pp);

    assert_eq!(sim.memory_commands(), vec![(1, 0x400, 8)]);
}

#[test]
fn test_atomic_request_may_not_wrap() {
    let mut sim = SimDevice::new();
    let mut pp = client(&mut sim);
    let atomic = IntOptions::default().with_atomic(true);

    assert!(matches!(pp.write_ints(65534, 2, &[1, 2], atomic), Err(Error::Range(_))));
    assert!(pp.transport().sent.is_empty());
    pp.write_ints(65534, 2, &[1, 2], IntOptions::default()).unwrap();
    assert_eq!(pp.transport().memory_commands().len(), 2);
}

#[test]
fn test_atomic_strings_at_limit() {
    let mut sim = SimDevice::new();
    let mut pp = client(&mut sim);
    let atomic = StrOptions::default().with_atomic(true);

    // 255 characters and the terminator fill max_atomic_write.
    let s = "x".repeat(255);
    pp.write_str(0x500, 256, &s, atomic).unwrap();
    assert_eq!(pp.read_str(0x500, 260, atomic).unwrap(), s);

    let fixed = StrOptions::unterminated().with_atomic(true);
    pp.write_str(0x700, 4, "abcd", fixed).unwrap();
    assert_eq!(pp.read_str(0x700, 4, fixed).unwrap(), "abcd");
    drop(pp);

    assert_eq!(
        sim.memory_commands(),
        vec![(2, 0x500, 256), (3, 0x500, 260), (2, 0x700, 4), (1, 0x700, 4)]
    );
}

#[test]
fn test_atomic_strings_over_limit_send_nothing() {
    let mut sim = SimDevice::new();
    let mut pp = client(&mut sim);
    let atomic = StrOptions::default().with_atomic(true);

    let s = "x".repeat(256);
    assert!(matches!(pp.write_str(0x500, 300, &s, atomic), Err(Error::Range(_))));
    assert!(matches!(pp.read_str(0x500, 261, atomic), Err(Error::Range(_))));
    assert!(matches!(
        pp.read_str(0x500, 261, StrOptions::unterminated().with_atomic(true)),
        Err(Error::Range(_))
    ));
    drop(pp);

    assert!(sim.sent.is_empty());

    // Without the flag the same requests are split.
    let mut pp = client(&mut sim);
    pp.write_str(0x500, 300, &s, StrOptions::default()).unwrap();
    assert_eq!(pp.read_str(0x500, 261, StrOptions::default()).unwrap(), s);
    drop(pp);
    assert_eq!(write_commands(&sim), vec![(0x500, 256), (0x600, 1)]);
}

// ============================================================================
// Restricted Ranges
// ============================================================================

/// A device that allows reads in 0x0100..=0x7fff and writes in 0x4000..=0x4fff.
fn restricted_sim() -> SimDevice {
    let mut sim = SimDevice::new();
    if let Some(details) = sim.info.details.as_mut() {
        details.min_read_address = 0x0100;
        details.max_read_address = 0x7fff;
        details.min_write_address = 0x4000;
        details.max_write_address = 0x4fff;
    }
    sim
}

fn checking_client(sim: &mut SimDevice) -> PeekPoke<&mut SimDevice> {
    let config = ClientConfig {
        check_restricted_ranges: true,
        ..Default::default()
    };
    PeekPoke::new(sim, config).unwrap()
}

#[test]
fn test_restricted_ranges_rejected_before_sending() {
    let mut sim = restricted_sim();
    let mut pp = checking_client(&mut sim);

    match pp.write_bytes(0x3ff0, &[1; 32]) {
        Err(Error::Restricted(e)) => {
            assert_eq!(e.access, MemoryAccess::Write);
            assert_eq!((e.address, e.count, e.min, e.max), (0x3ff0, 32, 0x4000, 0x4fff));
        }
        other => panic!("expected a restricted address error, got {:?}", other),
    }
    let err = pp.read_bytes(0x0080, 16).unwrap_err();
    assert_eq!(err.kind(), "restricted");
    assert!(matches!(pp.read_str(0x7ff0, 32, StrOptions::default()), Err(Error::Restricted(_))));
    assert!(matches!(pp.atomic_read_str(0x7ff0, 32), Err(Error::Restricted(_))));
    assert!(matches!(pp.write_int(0x5000, 4, 1, IntOptions::default()), Err(Error::Restricted(_))));
    assert!(matches!(pp.fill_bytes(0x4ff0, 17, &[0xaa]), Err(Error::Restricted(_))));
    // A wrapping read covers 0xffff and 0, both outside the read range.
    assert!(matches!(pp.read_bytes(0xfff0, 32), Err(Error::Restricted(_))));

    // One info request, then nothing else reached the device.
    assert_eq!(pp.transport().sent.len(), 1);
    assert!(pp.transport().memory_commands().is_empty());
}

#[test]
fn test_restricted_ranges_allow_accesses_inside() {
    let mut sim = restricted_sim();
    let mut pp = checking_client(&mut sim);

    pp.write_bytes(0x4000, &[7; 600]).unwrap();
    assert_eq!(pp.read_bytes(0x4000, 600).unwrap(), vec![7; 600]);
    pp.fill_bytes(0x4ff0, 16, &[0xaa]).unwrap();
    assert_eq!(pp.read_int(0x4ffc, 4, IntOptions::default()).unwrap(), 0xaaaa_aaaa);
    assert_eq!(pp.read_bytes(0x0100, 0).unwrap(), Vec::<u8>::new());
}

#[test]
fn test_restricted_ranges_unchecked_by_default() {
    let mut sim = restricted_sim();
    let mut pp = client(&mut sim);

    // The device itself refuses the write.
    assert!(matches!(
        pp.write_bytes(0x3ff0, &[1; 32]),
        Err(Error::DeviceStatus(DeviceStatusError {
            code: 2,
            status: DeviceStatus::MalformedParameters
        }))
    ));
    drop(pp);

    assert_eq!(sim.memory_commands(), vec![(2, 0x3ff0, 32)]);
}

// ============================================================================
// Property Tests
// ============================================================================

mod prop {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_write_read_anywhere(
            address in 0u32..65536,
            data in proptest::collection::vec(any::<u8>(), 0..700),
        ) {
            let mut sim = SimDevice::new();
            let mut pp = client(&mut sim);
            pp.write_bytes(address, &data).unwrap();
            prop_assert_eq!(pp.read_bytes(address, data.len()).unwrap(), data);
            drop(pp);
            prop_assert!(no_command_wraps(&sim));
        }
    }
}

use crate::layout::Segment;
use crate::CleanError;

/// The value erased flash reads as
pub const ERASED: u8 = 0xFF;

fn validate(dump_len: usize, target_size: usize, segment: &Segment) -> Result<(), CleanError> {
    let Segment { start, end } = *segment;

    if end > dump_len || start > end {
        return Err(CleanError::SegmentOutOfBounds {
            start,
            end,
            dump_len,
        });
    }

    if end > target_size {
        return Err(CleanError::SegmentExceedsTarget {
            start,
            end,
            target_size,
        });
    }

    Ok(())
}

/// Copy `segments` of `dump` into an otherwise erased image.
///
/// The image is `total_size` bytes long, or as long as the dump when `None`.
/// Every segment is checked before anything is allocated; on error no image
/// is produced. Overlapping segments are copied in order, so the later one
/// wins.
pub fn build_clean_image(
    dump: &[u8],
    segments: &[Segment],
    total_size: Option<usize>,
) -> Result<Vec<u8>, CleanError> {
    let size = total_size.unwrap_or(dump.len());

    for (i, segment) in segments.iter().enumerate() {
        validate(dump.len(), size, segment)?;

        for earlier in &segments[..i] {
            if earlier.overlaps(segment) {
                log::warn!("segment {} overlaps {}; the later one wins", segment, earlier);
            }
        }
    }

    let mut cleaned = vec![ERASED; size];

    for segment in segments {
        log::debug!("copying {} ({:#x} bytes)", segment, segment.len());
        cleaned[segment.range()].copy_from_slice(&dump[segment.range()]);
    }

    Ok(cleaned)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::layout::FlashLayout;

    /// Every byte is derived from its address, so misplaced copies show up
    fn patterned_dump(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i ^ (i >> 8) ^ (i >> 16)) as u8).collect()
    }

    #[test]
    fn uncovered_bytes_are_erased() {
        let dump = vec![0x00; 0x100];
        let segments = [Segment::new(0x10, 0x20), Segment::new(0x80, 0x90)];

        let cleaned = build_clean_image(&dump, &segments, None).unwrap();

        assert_eq!(cleaned.len(), 0x100);
        for (address, byte) in cleaned.iter().enumerate() {
            let covered = segments.iter().any(|s| s.range().contains(&address));
            assert_eq!(*byte, if covered { 0x00 } else { ERASED }, "at {:#x}", address);
        }
    }

    #[test]
    fn segments_are_reproduced() {
        let dump = patterned_dump(0x80000);
        let segments = FlashLayout::default().segments(0x1_2345);

        let cleaned = build_clean_image(&dump, &segments, None).unwrap();

        assert_eq!(cleaned.len(), dump.len());
        for segment in &segments {
            assert_eq!(cleaned[segment.range()], dump[segment.range()]);
        }
        assert!(cleaned[0x23000 + 0x1_2345..0x73000].iter().all(|b| *b == ERASED));
    }

    #[test]
    fn source_too_short() {
        let dump = vec![0u8; 0x100];

        assert_eq!(
            build_clean_image(&dump, &[Segment::new(0x80, 0x101)], None),
            Err(CleanError::SegmentOutOfBounds {
                start: 0x80,
                end: 0x101,
                dump_len: 0x100,
            })
        );
    }

    #[test]
    fn target_too_small() {
        let dump = vec![0u8; 0x100];

        assert_eq!(
            build_clean_image(&dump, &[Segment::new(0x0, 0x40), Segment::new(0x40, 0x80)], Some(0x60)),
            Err(CleanError::SegmentExceedsTarget {
                start: 0x40,
                end: 0x80,
                target_size: 0x60,
            })
        );
    }

    #[test]
    fn source_is_checked_before_target() {
        let dump = vec![0u8; 0x100];

        assert!(matches!(
            build_clean_image(&dump, &[Segment::new(0x0, 0x200)], Some(0x10)),
            Err(CleanError::SegmentOutOfBounds { .. })
        ));
    }

    #[test]
    fn larger_target_is_padded() {
        let dump = vec![0x5A; 0x40];

        let cleaned = build_clean_image(&dump, &[Segment::new(0x0, 0x40)], Some(0x100)).unwrap();

        assert_eq!(cleaned[..0x40], [0x5A; 0x40]);
        assert!(cleaned[0x40..].iter().all(|b| *b == ERASED));
    }

    #[test]
    fn later_segment_wins_on_overlap() {
        let dump = patterned_dump(0x100);

        let cleaned =
            build_clean_image(&dump, &[Segment::new(0x0, 0x80), Segment::new(0x40, 0xC0)], None)
                .unwrap();

        assert_eq!(cleaned[..0xC0], dump[..0xC0]);
        assert!(cleaned[0xC0..].iter().all(|b| *b == ERASED));
    }

    #[test]
    fn reversed_segment_is_rejected() {
        let dump = vec![0u8; 0x100];

        assert!(matches!(
            build_clean_image(&dump, &[Segment::new(0x80, 0x40)], None),
            Err(CleanError::SegmentOutOfBounds { .. })
        ));
    }

    #[test]
    fn empty_segment_list() {
        let dump = vec![0u8; 0x20];

        assert_eq!(build_clean_image(&dump, &[], None).unwrap(), vec![ERASED; 0x20]);
    }
}

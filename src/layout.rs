use core::ops::Range;

/// A half-open byte range `[start, end)` in the flash address space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// A segment of `length` bytes starting at `start`
    pub const fn with_length(start: usize, length: usize) -> Self {
        Self {
            start,
            end: start.saturating_add(length),
        }
    }

    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn overlaps(&self, other: &Segment) -> bool {
        !self.is_empty() && !other.is_empty() && self.start < other.end && other.start < self.end
    }
}

impl From<Range<usize>> for Segment {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl core::fmt::Display for Segment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:#07x}-{:#07x}", self.start, self.end)
    }
}

/// Where the static regions and the DFU settings live in flash.
///
/// The default is the nRF52 SoftDevice S132 / secure bootloader layout:
///
/// ```text
/// 0x00000 .. 0x23000   softdevice
/// 0x23000 .. +app_size application
/// 0x73000 .. 0x80000   bootloader (DFU settings page at 0x7F000)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashLayout {
    pub softdevice: Segment,
    pub app_start: usize,
    pub bootloader: Segment,
    pub settings_offset: usize,
    pub settings_size: usize,
    /// offsets of the bank records, relative to `settings_offset`
    pub bank_offsets: [usize; 2],
}

impl Default for FlashLayout {
    fn default() -> Self {
        Self {
            softdevice: Segment::new(crate::SOFTDEVICE_START, crate::SOFTDEVICE_END),
            app_start: crate::APP_START,
            bootloader: Segment::new(crate::BOOTLOADER_START, crate::BOOTLOADER_END),
            settings_offset: crate::SETTINGS_OFFSET,
            settings_size: crate::SETTINGS_SIZE,
            bank_offsets: [crate::BANK0_OFFSET, crate::BANK1_OFFSET],
        }
    }
}

impl FlashLayout {
    /// First byte past the DFU settings block
    pub fn settings_end(&self) -> usize {
        self.settings_offset + self.settings_size
    }

    pub fn application(&self, app_size: u32) -> Segment {
        Segment::with_length(self.app_start, app_size as usize)
    }

    /// The static regions in copy order: softdevice, application, bootloader
    pub fn segments(&self, app_size: u32) -> [Segment; 3] {
        [self.softdevice, self.application(app_size), self.bootloader]
    }
}

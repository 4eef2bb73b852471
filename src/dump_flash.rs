use core::ops::Range;
use embedded_storage::nor_flash::{ErrorType, NorFlashError, NorFlashErrorKind, ReadNorFlash};

/// Read-only flash backed by a raw memory dump.
///
/// Byte `n` of the dump is flash address `n`.
pub struct DumpFlash<'a> {
    bytes: &'a [u8],
}

impl<'a> DumpFlash<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    fn validate_read_operation(&self, offset: u32, length: usize) -> Result<Range<usize>, DumpFlashError> {
        let offset = offset as usize;
        match offset.checked_add(length) {
            Some(end) if end <= self.bytes.len() => Ok(offset..end),
            _ => Err(DumpFlashError::OutOfBounds),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DumpFlashError {
    OutOfBounds,
}

impl NorFlashError for DumpFlashError {
    fn kind(&self) -> NorFlashErrorKind {
        match self {
            DumpFlashError::OutOfBounds => NorFlashErrorKind::OutOfBounds,
        }
    }
}

impl ErrorType for DumpFlash<'_> {
    type Error = DumpFlashError;
}

impl ReadNorFlash for DumpFlash<'_> {
    const READ_SIZE: usize = 1;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let range = self.validate_read_operation(offset, bytes.len())?;

        bytes.copy_from_slice(&self.bytes[range]);

        Ok(())
    }

    fn capacity(&self) -> usize {
        self.bytes.len()
    }
}

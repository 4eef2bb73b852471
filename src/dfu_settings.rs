//! Bank records of the nRF secure bootloader's DFU settings page.
//!
//! The settings block starts with a crc, version words and the application /
//! bootloader versions; the two bank descriptors follow at offsets 24 and 36.
//! Each descriptor is three little-endian words: image size, image crc and
//! bank code.

use embedded_storage::nor_flash::{NorFlashError, ReadNorFlash};

use crate::dump_flash::DumpFlash;
use crate::layout::FlashLayout;
use crate::CleanError;

/// The bank holds a valid application image
pub const BANK_VALID_APP: u32 = 0x0000_0001;

pub const BANK_RECORD_SIZE: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BankRecord {
    pub image_size: u32,
    pub image_crc: u32,
    pub bank_code: u32,
}

impl BankRecord {
    pub fn from_le_bytes(bytes: [u8; BANK_RECORD_SIZE]) -> Self {
        let word = |i: usize| u32::from_le_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);

        Self {
            image_size: word(0),
            image_crc: word(4),
            bank_code: word(8),
        }
    }

    pub fn to_le_bytes(&self) -> [u8; BANK_RECORD_SIZE] {
        let mut bytes = [0; BANK_RECORD_SIZE];
        bytes[0..4].copy_from_slice(&self.image_size.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.image_crc.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.bank_code.to_le_bytes());
        bytes
    }

    pub fn is_valid_app(&self) -> bool {
        self.image_size != 0 && (self.bank_code & BANK_VALID_APP) != 0
    }
}

/// The bank the application size was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedBank {
    pub index: usize,
    pub record: BankRecord,
    /// No bank had the valid-app bit set; this is merely the first nonzero size
    pub fallback: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DfuSettings {
    pub banks: [BankRecord; 2],
}

impl DfuSettings {
    pub fn read<F: ReadNorFlash>(flash: &mut F, layout: &FlashLayout) -> Result<Self, CleanError> {
        let required = layout.settings_end();
        let available = flash.capacity();

        if available < required {
            return Err(CleanError::InputTooShort {
                available,
                required,
            });
        }

        let mut banks = [BankRecord::default(); 2];
        for (bank, offset) in banks.iter_mut().zip(layout.bank_offsets) {
            let mut bytes = [0; BANK_RECORD_SIZE];
            flash
                .read((layout.settings_offset + offset) as u32, &mut bytes)
                .map_err(|e| CleanError::Flash(e.kind()))?;

            *bank = BankRecord::from_le_bytes(bytes);
        }

        log::debug!("bank0: {:x?}", banks[0]);
        log::debug!("bank1: {:x?}", banks[1]);

        Ok(Self { banks })
    }

    /// Pick the bank that describes the installed application.
    ///
    /// A bank with a nonzero size and the valid-app bit wins; otherwise the
    /// first bank with a nonzero size is used.
    pub fn app_bank(&self) -> Result<SelectedBank, CleanError> {
        let flagged = self
            .banks
            .iter()
            .enumerate()
            .find(|(_, bank)| bank.is_valid_app())
            .map(|(index, record)| SelectedBank {
                index,
                record: *record,
                fallback: false,
            });

        let selected = flagged.or_else(|| {
            self.banks
                .iter()
                .enumerate()
                .find(|(_, bank)| bank.image_size != 0)
                .map(|(index, record)| SelectedBank {
                    index,
                    record: *record,
                    fallback: true,
                })
        });

        selected.ok_or(CleanError::NoValidAppSize)
    }

    pub fn app_size(&self) -> Result<u32, CleanError> {
        self.app_bank().map(|bank| bank.record.image_size)
    }
}

/// Derive the application size from the DFU settings stored in `dump`
pub fn detect_app_size(dump: &[u8]) -> Result<u32, CleanError> {
    detect_app_size_with_layout(dump, &FlashLayout::default())
}

pub fn detect_app_size_with_layout(dump: &[u8], layout: &FlashLayout) -> Result<u32, CleanError> {
    let mut flash = DumpFlash::new(dump);
    let settings = DfuSettings::read(&mut flash, layout)?;
    let bank = settings.app_bank()?;

    if bank.fallback {
        log::warn!(
            "no bank is flagged as a valid app; falling back to bank{} (size {:#x})",
            bank.index,
            bank.record.image_size
        );
    } else {
        log::info!(
            "application size {:#x} from bank{}",
            bank.record.image_size,
            bank.index
        );
    }

    Ok(bank.record.image_size)
}

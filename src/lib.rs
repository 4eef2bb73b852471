//! Rebuild a flash image that only contains the static regions of a raw
//! nRF52 flash dump: softdevice, application and bootloader. Everything else
//! (application data pages, DFU settings, swap areas) reads as erased flash.

use std::path::{Path, PathBuf};

pub mod compose;
pub mod dfu_settings;
pub mod dump_flash;
mod error;
pub mod layout;

pub use compose::build_clean_image;
pub use dfu_settings::{detect_app_size, BankRecord, DfuSettings};
pub use error::CleanError;
pub use layout::{FlashLayout, Segment};

// from the bootloader's memory.x
// SOFTDEVICE : ORIGIN = 0x00000000, LENGTH = 140K
// FLASH      : ORIGIN = 0x00023000
// BOOTLOADER : ORIGIN = 0x00073000, LENGTH = 52K (settings page at 0x0007F000)
pub const SOFTDEVICE_START: usize = 0x00000;
pub const SOFTDEVICE_END: usize = 0x23000;
pub const APP_START: usize = 0x23000;
pub const BOOTLOADER_START: usize = 0x73000;
pub const BOOTLOADER_END: usize = 0x80000;

pub const SETTINGS_OFFSET: usize = 0x7F000;
/// `sizeof(nrf_dfu_settings_t)`
pub const SETTINGS_SIZE: usize = 0x164;
pub const BANK0_OFFSET: usize = 24;
pub const BANK1_OFFSET: usize = 36;

#[derive(Debug, Clone, Default)]
pub struct CleanOptions {
    /// Use this application size instead of reading the DFU settings
    pub app_size: Option<u32>,
    /// Size of the cleaned image; the dump's length when `None`
    pub total_size: Option<usize>,
    pub layout: FlashLayout,
}

#[derive(Debug)]
pub struct CleanReport {
    pub image: Vec<u8>,
    pub app_size: u32,
    pub segments: [Segment; 3],
}

/// The explicit size if one was given, otherwise the size recorded in the
/// DFU settings of `dump`
pub fn resolve_app_size(
    dump: &[u8],
    app_size: Option<u32>,
    layout: &FlashLayout,
) -> Result<u32, CleanError> {
    match app_size {
        Some(size) => {
            log::info!("using application size {:#x} from the command line", size);
            Ok(size)
        }
        None => dfu_settings::detect_app_size_with_layout(dump, layout),
    }
}

pub fn clean_dump(dump: &[u8], options: &CleanOptions) -> Result<CleanReport, CleanError> {
    let app_size = resolve_app_size(dump, options.app_size, &options.layout)?;
    let segments = options.layout.segments(app_size);

    let image = build_clean_image(dump, &segments, options.total_size)?;

    Ok(CleanReport {
        image,
        app_size,
        segments,
    })
}

/// `dump.bin` becomes `dump_cleaned.bin`, `dump` becomes `dump_cleaned`
pub fn default_output_path(dump_path: &Path) -> PathBuf {
    let mut name = dump_path.file_stem().unwrap_or_default().to_os_string();
    name.push("_cleaned");

    if let Some(extension) = dump_path.extension() {
        name.push(".");
        name.push(extension);
    }

    dump_path.with_file_name(name)
}

/// Parse an integer the way a C literal would be read: `0x` hex, `0o` octal,
/// `0b` binary or plain decimal. Underscores between digits are ignored.
pub fn parse_length(value: &str) -> Result<u32, CleanError> {
    let invalid = || CleanError::InvalidLengthArgument {
        value: value.to_string(),
    };

    let text = value.trim();
    let (radix, digits) = match text.get(..2) {
        Some("0x" | "0X") => (16, &text[2..]),
        Some("0o" | "0O") => (8, &text[2..]),
        Some("0b" | "0B") => (2, &text[2..]),
        _ => (10, text),
    };

    if digits.is_empty()
        || digits.starts_with('_')
        || digits.ends_with('_')
        || digits.contains("__")
        || digits.starts_with('+')
    {
        return Err(invalid());
    }

    let digits = digits.replace('_', "");
    u32::from_str_radix(&digits, radix).map_err(|_| invalid())
}

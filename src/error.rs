use embedded_storage::nor_flash::NorFlashErrorKind;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CleanError {
    /// The dump does not reach the end of the DFU settings block
    #[error("dump ends at {available:#07x}; need up to {required:#07x} for DFU settings")]
    InputTooShort { available: usize, required: usize },

    /// Neither bank record has a nonzero image size
    #[error("could not derive app length from DFU settings: both banks report size 0")]
    NoValidAppSize,

    /// A requested slice reaches past the end of the source dump
    #[error("requested slice {start:#07x}-{end:#07x}, but dump stops at {dump_len:#07x}")]
    SegmentOutOfBounds {
        start: usize,
        end: usize,
        dump_len: usize,
    },

    /// A requested slice does not fit in the cleaned image
    #[error("clean target smaller than slice {start:#07x}-{end:#07x} (size {target_size:#07x})")]
    SegmentExceedsTarget {
        start: usize,
        end: usize,
        target_size: usize,
    },

    /// A length given on the command line is not an integer
    #[error("invalid length '{value}'")]
    InvalidLengthArgument { value: String },

    /// Reading the settings block from flash failed
    #[error("flash read failed: {0:?}")]
    Flash(NorFlashErrorKind),
}

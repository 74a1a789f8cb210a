//! Notepad operations over a cover image set.
//!
//! Composes the payload codec, the image bit stream, and the chunk table into
//! the three user-facing operations (save, load, clean) plus the session
//! state a front end keeps between them.

mod arguments;
mod capacity;
mod cleaner;
mod decoder;
mod encoder;
mod session;

pub use arguments::{
    form_cli_arguments, normalize_args, parse_cli_arguments, redact_password,
    storage_cli_arguments, StorageArgs,
};
pub use capacity::{capacity_report, CapacityReport};
pub use cleaner::clean_images;
pub use decoder::decode_text;
pub use encoder::encode_text;
pub use session::{
    display_name, CoverImage, PendingOperation, Session, SettingsModel, SwapDirection,
};

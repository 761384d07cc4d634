pub mod file_type;
pub mod load;
pub mod types;

pub use file_type::{DEFAULT_VIDEO_EXTENSIONS, FileTypeTable};
pub use types::{ClipSettings, Config, MANIFEST_FILE_NAME, SETTINGS_FILE_NAME};

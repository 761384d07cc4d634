mod ffprobe_info;
mod path_validator;
mod process_runner;
mod video_scanner;

pub use ffprobe_info::{VideoDimensions, dimension_probe_args, parse_dimensions};
pub use path_validator::{remove_file_if_exists, reset_directory, validate_directory_exists};
pub use process_runner::{ProcessError, ProcessOutput, RunOptions, run_command};
pub use video_scanner::scan_video_files;

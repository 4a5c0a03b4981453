//! Built-in save nodes

mod audio_save;
mod image_save;
mod video_save;
mod workflow_save;

pub use audio_save::XAudioSave;
pub use image_save::{XImageSave, DEFAULT_COMPRESSION_LEVEL, MAX_COMPRESSION_LEVEL};
pub use video_save::XVideoSave;
pub use workflow_save::XWorkflowSave;

/// Default filename template shared by every save node
pub const DEFAULT_FILENAME_PREFIX: &str = "ComfyUI_%Y%-%m%-%d%_%H%-%M%-%S%";

pub(crate) const FILE_PROCESSING_CATEGORY: &str = "♾️ Xz3r0/File-Processing";
pub(crate) const VIDEO_CATEGORY: &str = "♾️ Xz3r0/Video";
pub(crate) const IMAGE_CATEGORY: &str = "♾️ Xz3r0/Image";

pub(crate) const PREFIX_TOOLTIP: &str =
    "Filename prefix, supports datetime placeholders: %Y%, %m%, %d%, %H%, %M%, %S%";
pub(crate) const SUBFOLDER_TOOLTIP: &str =
    "Subfolder name (no path separators allowed), supports datetime placeholders";

mod audio;
mod ids;
mod image;
mod saved_file;
mod video;
mod workflow;

pub use audio::{AudioBuffer, MAX_CHANNELS};
pub use ids::SessionId;
pub use image::{ImageBatch, IMAGE_CHANNELS};
pub use saved_file::SavedFileDescriptor;
pub use video::VideoFrames;
pub use workflow::WorkflowMetadata;

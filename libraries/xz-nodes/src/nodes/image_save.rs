use super::{DEFAULT_FILENAME_PREFIX, IMAGE_CATEGORY, PREFIX_TOOLTIP, SUBFOLDER_TOOLTIP};
use crate::cache::WorkflowCache;
use crate::context::ExecutionContext;
use crate::error::{NodeError, Result};
use crate::io::{NodeInputs, NodeOutputs};
use crate::node::Node;
use crate::schema::{InputSpec, NodeSchema, OutputSpec};
use crate::value::PortType;
use async_trait::async_trait;
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use xz_core::{ImageBatch, WorkflowMetadata};
use xz_output::{OutputGuard, OutputResolver};

pub const DEFAULT_COMPRESSION_LEVEL: i64 = 5;
pub const MAX_COMPRESSION_LEVEL: i64 = 9;

/// Saves every image of a batch as PNG with the workflow embedded as text chunks
pub struct XImageSave {
    workflow_cache: Arc<WorkflowCache>,
}

impl XImageSave {
    pub fn new(workflow_cache: Arc<WorkflowCache>) -> Self {
        Self { workflow_cache }
    }
}

#[async_trait]
impl Node for XImageSave {
    fn schema(&self) -> NodeSchema {
        NodeSchema {
            id: "XImageSave",
            display_name: "XImageSave",
            category: IMAGE_CATEGORY,
            description: "Saves images as PNG to the output directory with workflow metadata.",
            inputs: vec![
                InputSpec::image("images").tooltip("Image batch (B, H, W, C)"),
                InputSpec::string("filename_prefix", DEFAULT_FILENAME_PREFIX)
                    .tooltip(PREFIX_TOOLTIP),
                InputSpec::string("subfolder", "Images").tooltip(SUBFOLDER_TOOLTIP),
                InputSpec::int(
                    "compression_level",
                    DEFAULT_COMPRESSION_LEVEL,
                    0,
                    MAX_COMPRESSION_LEVEL,
                )
                .tooltip("PNG compression level (0 = fastest, 9 = smallest)"),
            ],
            outputs: vec![
                OutputSpec::new("images", PortType::Image, "The input images, unchanged"),
                OutputSpec::new(
                    "save_path",
                    PortType::String,
                    "Paths relative to the output root, separated by ';'",
                ),
            ],
            output_node: true,
        }
    }

    async fn execute(&self, ctx: &ExecutionContext, inputs: NodeInputs) -> Result<NodeOutputs> {
        let images = inputs.image("images")?;
        let compression = compression_for_level(inputs.int("compression_level")?);
        let metadata = ctx.resolved_metadata(&self.workflow_cache).await;
        let chunks = text_chunks(&metadata);

        let resolver = OutputResolver::new(ctx.output_root())?;
        let subfolder = inputs.string("subfolder")?;
        let prefix = inputs.string("filename_prefix")?;

        let mut outputs = NodeOutputs::new();
        let mut paths = Vec::with_capacity(images.len());
        // each file lands before the next name is resolved, so numbers run on
        for index in 0..images.len() {
            let target = resolver.resolve(subfolder, prefix, ".png")?;
            let frame = PngFrame::from_batch(images, index)?;
            let path = target.absolute_path.clone();
            let chunks = chunks.clone();
            tokio::task::spawn_blocking(move || write_png(&path, &frame, compression, &chunks))
                .await
                .map_err(|e| NodeError::Io(io::Error::other(e)))??;

            debug!(path = %target.display_path(), index, "Wrote image");
            paths.push(target.display_path());
            outputs = outputs.with_saved_file(target);
        }

        info!(count = paths.len(), compression = ?compression, "Saved images");
        Ok(outputs
            .with("images", images.clone())
            .with("save_path", paths.join(";")))
    }
}

/// png exposes three deflate presets, levels map onto them in thirds
fn compression_for_level(level: i64) -> png::Compression {
    match level {
        ..=3 => png::Compression::Fast,
        4..=6 => png::Compression::Default,
        _ => png::Compression::Best,
    }
}

/// `prompt` and `workflow` as JSON text, in that order
fn text_chunks(metadata: &WorkflowMetadata) -> Vec<(String, String)> {
    metadata
        .tags()
        .into_iter()
        .map(|(key, text)| (key.to_string(), text))
        .collect()
}

/// One quantized image ready for the encoder
struct PngFrame {
    width: u32,
    height: u32,
    color: png::ColorType,
    data: Vec<u8>,
}

impl PngFrame {
    fn from_batch(images: &ImageBatch, index: usize) -> Result<Self> {
        let color = match images.channels() {
            1 => png::ColorType::Grayscale,
            3 => png::ColorType::Rgb,
            _ => png::ColorType::Rgba,
        };
        let data = images.to_rgb8(index).ok_or_else(|| {
            NodeError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("image {} is outside a batch of {}", index, images.len()),
            ))
        })?;
        Ok(Self {
            width: images.width(),
            height: images.height(),
            color,
            data,
        })
    }
}

/// Encode `frame` into a new file at `path`, removing it again on failure
fn write_png(
    path: &Path,
    frame: &PngFrame,
    compression: png::Compression,
    chunks: &[(String, String)],
) -> Result<()> {
    let file = OpenOptions::new().write(true).create_new(true).open(path)?;
    let guard = OutputGuard::new(path);
    let mut out = BufWriter::new(file);
    encode(&mut out, frame, compression, chunks)?;
    out.flush()?;
    guard.disarm();
    Ok(())
}

fn encode<W: Write>(
    out: W,
    frame: &PngFrame,
    compression: png::Compression,
    chunks: &[(String, String)],
) -> Result<()> {
    let mut encoder = png::Encoder::new(out, frame.width, frame.height);
    encoder.set_color(frame.color);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(compression);
    for (keyword, text) in chunks {
        // tEXt is Latin-1 only, anything wider goes into iTXt
        if text.chars().all(|c| u32::from(c) <= 0xFF) {
            encoder.add_text_chunk(keyword.clone(), text.clone())?;
        } else {
            encoder.add_itxt_chunk(keyword.clone(), text.clone())?;
        }
    }

    let mut writer = encoder.write_header()?;
    writer.write_image_data(&frame.data)?;
    writer.finish()?;
    Ok(())
}

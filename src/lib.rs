use std::time::Instant;

use log::info;

use crate::config::RenderConfig;
use crate::error::Result;
use crate::image::Encoder;
use crate::mandel_image::make_mandel_image;
use crate::storage::Storage;

pub mod colorings;
pub mod config;
pub mod error;
pub mod image;
pub mod mandel_image;
pub mod producer;
pub mod storage;

pub struct RenderReq {
    config: RenderConfig,
}

pub struct RenderReply {
    result: Result<usize>,
}

/// Render the image described by `cfg`, encode it and store it under
/// `cfg.file_name`. Returns the size of the stored file.
///
/// Each stage runs only when the previous one succeeded: nothing is encoded
/// after a failed render and nothing is written after a failed encode.
pub fn write_png(
    cfg: &RenderConfig,
    encoder: &dyn Encoder,
    storage: &mut dyn Storage,
) -> Result<usize> {
    let start = Instant::now();
    let img = make_mandel_image(cfg)?;
    info!("generation time {} ms", start.elapsed().as_millis());

    let start = Instant::now();
    let encoded = img.encode(encoder)?;
    drop(img);
    info!("compression time {} ms", start.elapsed().as_millis());

    let start = Instant::now();
    let written = storage.write(&cfg.file_name, &encoded)?;
    info!(
        "wrote {}. write time {} ms",
        cfg.file_name,
        start.elapsed().as_millis()
    );
    Ok(written)
}

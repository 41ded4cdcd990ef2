use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use indicatif::ProgressBar;
use log::info;

use crate::batch;
use crate::binaries::Binaries;
use crate::error::{ConversionError, Error};
use crate::pack::StickerId;

/// Turns a frame-sequence image into a looping GIF with a flattened
/// background, written next to the source as `<stem>.gif`.
///
/// The source file is left alone; removing it is up to the caller.
#[async_trait]
pub trait GifConverter: Debug + Send + Sync {
    async fn convert_to_looping_gif(&self, png: &Path) -> Result<(), ConversionError>;
}

/// Converts by shelling out to `apng2gif` and then ImageMagick.
#[derive(Debug, Clone)]
pub struct ExternalGifConverter {
    bin: Binaries,
}

impl ExternalGifConverter {
    pub fn new(bin: Binaries) -> Self {
        info!(
            "converting with `{}` and `{}`",
            bin.apng2gif.path().display(),
            bin.magick.path().display()
        );
        Self { bin }
    }
}

#[async_trait]
impl GifConverter for ExternalGifConverter {
    async fn convert_to_looping_gif(&self, png: &Path) -> Result<(), ConversionError> {
        let dir = png.parent().unwrap_or_else(|| Path::new("."));
        let png_name = png.file_name().unwrap_or(png.as_os_str());
        let gif_name = Path::new(png_name).with_extension("gif");

        self.bin.apng2gif.to_gif(dir, png_name).await?;
        self.bin.magick.loop_on_white(dir, &gif_name).await?;
        Ok(())
    }
}

async fn convert_sticker(
    converter: Arc<dyn GifConverter>,
    png: PathBuf,
    sticker_id: StickerId,
    progress: ProgressBar,
) -> Result<(), Error> {
    let result = async {
        converter.convert_to_looping_gif(&png).await?;
        tokio::fs::remove_file(&png).await?;
        Ok::<_, ConversionError>(())
    }
    .await;

    match result {
        Ok(()) => {
            progress.suspend(|| info!("   >> converted `{sticker_id}`"));
            Ok(())
        }
        Err(source) => Err(Error::Conversion { sticker_id, source }),
    }
}

/// Convert every `<id>.png` in `pack_dir` to `<id>.gif` and remove the png.
/// Stickers are processed concurrently; the first failure fails the batch.
pub async fn convert_pack(
    converter: Arc<dyn GifConverter>,
    pack_dir: &Path,
    sticker_ids: &[StickerId],
) -> Result<(), Error> {
    info!("converting {} APNGs to GIF", sticker_ids.len());

    let progress = batch::progress_bar(sticker_ids.len(), "converting");
    let tasks = sticker_ids.iter().map(|id| {
        convert_sticker(
            converter.clone(),
            pack_dir.join(id.png_file_name()),
            id.clone(),
            progress.clone(),
        )
    });
    batch::run_all(tasks, &progress).await?;
    Ok(())
}

use std::path::PathBuf;
use std::sync::Arc;

use derive_builder::Builder;
use log::{debug, info};

use crate::convert::{self, GifConverter};
use crate::download;
use crate::endpoints::Endpoints;
use crate::error::Error;
use crate::metadata;
use crate::pack::{PackId, PackMetadata};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    AwaitInput,
    ParseUrl,
    FetchMetadata,
    Download,
    Convert,
    Skip,
    Done,
    Failed,
}

impl Stage {
    /// Where to go once every sticker is on disk.
    pub fn after_download(has_animation: bool, download_only: bool) -> Stage {
        if has_animation && !download_only {
            Stage::Convert
        } else {
            Stage::Skip
        }
    }
}

#[derive(Debug)]
pub struct Outcome {
    pub metadata: PackMetadata,
    pub pack_dir: PathBuf,
    pub converted: bool,
}

/// Fetch, download and (for animated packs) convert one sticker pack.
#[derive(Debug, Builder)]
#[builder(pattern = "owned")]
pub struct Pipeline {
    client: reqwest::Client,
    #[builder(default)]
    endpoints: Endpoints,
    #[builder(setter(into))]
    download_root: PathBuf,
    converter: Arc<dyn GifConverter>,
    #[builder(default)]
    download_only: bool,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    fn enter(&self, stage: Stage) {
        debug!("entering stage {stage:?}");
    }

    pub async fn run(&self, url: &str) -> Result<Outcome, Error> {
        let result = self.run_stages(url).await;
        match &result {
            Ok(_) => self.enter(Stage::Done),
            Err(_) => self.enter(Stage::Failed),
        }
        result
    }

    async fn run_stages(&self, url: &str) -> Result<Outcome, Error> {
        self.enter(Stage::ParseUrl);
        let pack_id = PackId::from_url(url)?;

        self.enter(Stage::FetchMetadata);
        let metadata = metadata::fetch(&self.client, &self.endpoints, &pack_id).await?;
        info!("Loaded pack: \"{}\".", metadata.title);

        self.enter(Stage::Download);
        let pack_dir = download::download_pack(
            &self.client,
            &self.endpoints,
            &self.download_root,
            &metadata,
        )
        .await?;

        let next = Stage::after_download(metadata.has_animation, self.download_only);
        self.enter(next);
        let converted = match next {
            Stage::Convert => {
                convert::convert_pack(self.converter.clone(), &pack_dir, &metadata.sticker_ids)
                    .await?;
                true
            }
            _ => false,
        };

        self.summarize(&pack_dir).await;
        Ok(Outcome {
            metadata,
            pack_dir,
            converted,
        })
    }

    async fn summarize(&self, pack_dir: &std::path::Path) {
        for ext in ["png", "gif"] {
            match crate::fs::files_with_ext(pack_dir, ext).await {
                Ok(files) if !files.is_empty() => {
                    info!("{} {ext} files in `{}`", files.len(), pack_dir.display())
                }
                Ok(_) => {}
                Err(err) => debug!("couldn't list {ext} files: {err}"),
            }
        }
    }
}

use log::debug;
use serde::Deserialize;

use crate::download::fetch_bytes;
use crate::endpoints::Endpoints;
use crate::error::{Error, FetchError};
use crate::pack::{PackId, PackMetadata, StickerId};

#[derive(Debug, Deserialize)]
struct Title {
    en: String,
}

#[derive(Debug, Deserialize)]
struct StickerEntry {
    id: StickerId,
}

/// Shape of `productInfo.meta`. Only the fields we use are listed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductInfo {
    title: Title,
    stickers: Vec<StickerEntry>,
    has_animation: bool,
}

impl ProductInfo {
    fn into_metadata(self, pack_id: PackId) -> PackMetadata {
        PackMetadata {
            pack_id,
            title: self.title.en,
            sticker_ids: self.stickers.into_iter().map(|s| s.id).collect(),
            has_animation: self.has_animation,
        }
    }
}

pub fn parse(pack_id: PackId, body: &[u8]) -> Result<PackMetadata, FetchError> {
    let info: ProductInfo = serde_json::from_slice(body)?;
    Ok(info.into_metadata(pack_id))
}

async fn fetch_product_info(
    client: &reqwest::Client,
    url: &str,
    pack_id: &PackId,
) -> Result<PackMetadata, FetchError> {
    let body = fetch_bytes(client, url).await?;
    parse(pack_id.clone(), &body)
}

pub async fn fetch(
    client: &reqwest::Client,
    endpoints: &Endpoints,
    pack_id: &PackId,
) -> Result<PackMetadata, Error> {
    let url = endpoints.metadata_url(pack_id);
    debug!("fetching metadata from `{url}`");

    let metadata = fetch_product_info(client, &url, pack_id)
        .await
        .map_err(|source| Error::MetadataFetch {
            pack_id: pack_id.clone(),
            source,
        })?;

    debug!(
        "pack `{pack_id}` has {} stickers, animated: {}",
        metadata.sticker_ids.len(),
        metadata.has_animation
    );
    Ok(metadata)
}

use std::path::{Path, PathBuf};

use futures::StreamExt;
use indicatif::ProgressBar;
use log::{info, warn};
use tokio::io::AsyncWriteExt;

use crate::batch;
use crate::endpoints::Endpoints;
use crate::error::{Error, FetchError};
use crate::pack::{PackMetadata, StickerId};

const USER_AGENT: &str = "\
    Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) \
    Chrome/110.0.0.0 Safari/537.36";

pub fn client() -> reqwest::Result<reqwest::Client> {
    reqwest::ClientBuilder::new().user_agent(USER_AGENT).build()
}

/// Where a single sticker comes from and where it goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub sticker_id: StickerId,
    pub url: String,
    pub path: PathBuf,
}

impl DownloadTarget {
    pub fn for_pack(
        endpoints: &Endpoints,
        metadata: &PackMetadata,
        pack_dir: &Path,
    ) -> Vec<DownloadTarget> {
        metadata
            .sticker_ids
            .iter()
            .map(|id| DownloadTarget {
                sticker_id: id.clone(),
                url: endpoints.sticker_url(&metadata.pack_id, id, metadata.has_animation),
                path: pack_dir.join(id.png_file_name()),
            })
            .collect()
    }
}

pub async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, FetchError> {
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}

/// Stream the body at `url` into a new file at `path`, returning the number
/// of bytes written.
pub async fn download_to_file(
    client: &reqwest::Client,
    url: &str,
    path: impl AsRef<Path>,
) -> Result<u64, FetchError> {
    let response = client.get(url).send().await?.error_for_status()?;
    let mut file = tokio::fs::File::create(path.as_ref()).await?;
    let mut stream = response.bytes_stream();
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}

async fn download_sticker(
    client: reqwest::Client,
    target: DownloadTarget,
    progress: ProgressBar,
) -> Result<(), Error> {
    let DownloadTarget {
        sticker_id,
        url,
        path,
    } = target;

    match download_to_file(&client, &url, &path).await {
        Ok(len) => {
            progress.suspend(|| info!("   >> sticker `{sticker_id}` ({len} bytes)"));
            Ok(())
        }
        Err(source) => {
            progress.suspend(|| warn!("couldn't download sticker `{sticker_id}` from `{url}`"));
            Err(Error::Download { sticker_id, source })
        }
    }
}

/// Recreate the pack directory and download every sticker of the pack into
/// it, all at once. Returns the pack directory.
pub async fn download_pack(
    client: &reqwest::Client,
    endpoints: &Endpoints,
    download_root: impl AsRef<Path>,
    metadata: &PackMetadata,
) -> Result<PathBuf, Error> {
    let pack_dir = metadata.pack_dir(download_root);
    crate::fs::empty_dir(&pack_dir)
        .await
        .map_err(|source| Error::PackDirectory {
            path: pack_dir.clone(),
            source,
        })?;
    info!("downloading to `{}`", pack_dir.display());

    let targets = DownloadTarget::for_pack(endpoints, metadata, &pack_dir);
    let progress = batch::progress_bar(targets.len(), "downloading");
    let tasks = targets
        .into_iter()
        .map(|target| download_sticker(client.clone(), target, progress.clone()));
    batch::run_all(tasks, &progress).await?;

    Ok(pack_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::pack::PackId;

    fn metadata(ids: &[&str], has_animation: bool) -> PackMetadata {
        PackMetadata {
            pack_id: PackId::from_url("product/12345").unwrap(),
            title: "Brown & Friends!".to_string(),
            sticker_ids: ids.iter().map(|id| StickerId::new(*id)).collect(),
            has_animation,
        }
    }

    #[test]
    fn targets_follow_animation_flag() {
        let endpoints = Endpoints::single_host("http://cdn");
        let dir = Path::new("/dl/pack");

        let animated = DownloadTarget::for_pack(&endpoints, &metadata(&["1", "2"], true), dir);
        assert_eq!(animated.len(), 2);
        assert_eq!(
            animated[0].url,
            "http://cdn/products/0/0/1/12345/android/animation/1.png"
        );
        assert_eq!(animated[1].path, PathBuf::from("/dl/pack/2.png"));

        let still = DownloadTarget::for_pack(&endpoints, &metadata(&["1"], false), dir);
        assert_eq!(
            still[0].url,
            "http://cdn/stickershop/v1/sticker/1/android/sticker.png"
        );
        assert_eq!(still[0].path, PathBuf::from("/dl/pack/1.png"));
    }

    #[tokio::test]
    async fn downloads_one_file_per_sticker() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/stickershop/v1/sticker/\d+/android/sticker\.png$"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\x89PNG fake".to_vec()))
            .expect(4)
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let client = reqwest::Client::new();
        let endpoints = Endpoints::single_host(server.uri());
        let meta = metadata(&["10", "20", "30", "40"], false);

        let pack_dir = download_pack(&client, &endpoints, tmp.path(), &meta)
            .await
            .unwrap();

        assert_eq!(pack_dir, tmp.path().join("Brown  Friends"));
        let files = crate::fs::files_with_ext(&pack_dir, "png").await.unwrap();
        assert_eq!(files.len(), 4);
        for id in ["10", "20", "30", "40"] {
            let body = std::fs::read(pack_dir.join(format!("{id}.png"))).unwrap();
            assert_eq!(body, b"\x89PNG fake");
        }
    }

    #[tokio::test]
    async fn redownload_replaces_previous_run() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"new".to_vec()))
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let stale_dir = tmp.path().join("Brown  Friends");
        std::fs::create_dir_all(&stale_dir).unwrap();
        std::fs::write(stale_dir.join("999.gif"), b"old").unwrap();

        let client = reqwest::Client::new();
        let endpoints = Endpoints::single_host(server.uri());
        let pack_dir = download_pack(&client, &endpoints, tmp.path(), &metadata(&["1"], true))
            .await
            .unwrap();

        assert!(!pack_dir.join("999.gif").exists());
        assert_eq!(std::fs::read(pack_dir.join("1.png")).unwrap(), b"new");
    }

    #[tokio::test]
    async fn one_failing_sticker_fails_the_batch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products/0/0/1/12345/android/animation/222.png"))
            .respond_with(ResponseTemplate::new(500))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let client = reqwest::Client::new();
        let endpoints = Endpoints::single_host(server.uri());
        let meta = metadata(&["111", "222", "333"], true);

        let err = download_pack(&client, &endpoints, tmp.path(), &meta)
            .await
            .unwrap_err();
        match err {
            Error::Download { sticker_id, source } => {
                assert_eq!(sticker_id, StickerId::new("222"));
                assert!(matches!(source, FetchError::Http(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn untitled_pack_leaves_sibling_packs_alone() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"png".to_vec()))
            .mount(&server)
            .await;

        let tmp = tempfile::tempdir().unwrap();
        let other = tmp.path().join("Other Pack");
        std::fs::create_dir_all(&other).unwrap();
        std::fs::write(other.join("1.gif"), b"keep me").unwrap();

        let mut meta = metadata(&["1"], false);
        meta.title = "ブラウン！".to_string();
        let client = reqwest::Client::new();
        let endpoints = Endpoints::single_host(server.uri());
        let pack_dir = download_pack(&client, &endpoints, tmp.path(), &meta)
            .await
            .unwrap();

        assert_eq!(pack_dir, tmp.path().join("12345"));
        assert!(pack_dir.join("1.png").is_file());
        assert_eq!(std::fs::read(other.join("1.gif")).unwrap(), b"keep me");
    }

    #[tokio::test]
    async fn unwritable_pack_dir_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("Brown  Friends"), b"file in the way").unwrap();

        let client = reqwest::Client::new();
        let endpoints = Endpoints::single_host("http://127.0.0.1:1");
        let err = download_pack(&client, &endpoints, tmp.path(), &metadata(&["1"], false))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PackDirectory { .. }));
    }
}

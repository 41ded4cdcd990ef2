use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::pack::{PackId, StickerId};

/// Failure of a single HTTP fetch, either for metadata or a sticker image.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed")]
    Http(#[from] reqwest::Error),
    #[error("couldn't write file")]
    Io(#[from] std::io::Error),
    #[error("malformed metadata")]
    Json(#[from] serde_json::Error),
}

/// Failure of one step in the APNG to GIF chain.
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("couldn't run `{program}`")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("`{program}` exited with {status}: {stderr}")]
    Status {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("`{program}` reported an error: {stderr}")]
    Stderr { program: String, stderr: String },
    #[error("file operation failed")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid sticker pack URL `{0}`")]
    MalformedInput(String),
    #[error("couldn't fetch metadata for pack `{pack_id}`")]
    MetadataFetch {
        pack_id: PackId,
        #[source]
        source: FetchError,
    },
    #[error("couldn't prepare pack directory `{}`", path.display())]
    PackDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("couldn't download sticker `{sticker_id}`")]
    Download {
        sticker_id: StickerId,
        #[source]
        source: FetchError,
    },
    #[error("couldn't convert sticker `{sticker_id}`")]
    Conversion {
        sticker_id: StickerId,
        #[source]
        source: ConversionError,
    },
    #[error("batch task died")]
    Task(#[from] tokio::task::JoinError),
}

use std::path::PathBuf;

use structopt::StructOpt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DirPathParseError {
    #[error("couldn't create directory: {0}")]
    Create(std::io::Error),
    #[error("exists, but is not a directory")]
    InvalidType,
}

fn valid_dir_path<P>(src: P) -> Result<PathBuf, DirPathParseError>
where
    P: AsRef<str>,
{
    let path = PathBuf::from(src.as_ref());
    match path.metadata() {
        Ok(meta) if meta.is_dir() => Ok(path),
        Ok(_) => Err(DirPathParseError::InvalidType),
        Err(_) => std::fs::create_dir_all(&path)
            .map(|_| path)
            .map_err(DirPathParseError::Create),
    }
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "stickergrab",
    about = "Download LINE sticker packs, converting animated ones to GIF."
)]
pub struct Opt {
    /// Sticker pack URL, e.g. https://store.line.me/stickershop/product/12345/en
    ///
    /// Asked for interactively when omitted.
    pub url: Option<String>,

    /// Where to save downloaded packs [default: ../downloaded]
    #[structopt(long = "dl-dir", parse(try_from_str = valid_dir_path))]
    pub download_dir: Option<PathBuf>,

    /// Only download the stickers, don't convert animated ones
    #[structopt(long)]
    pub download_only: bool,

    /// Log more, repeat for even more
    #[structopt(short, long, parse(from_occurrences))]
    pub verbose: u8,
}

impl Opt {
    /// `--dl-dir`, or `downloaded` next to the current directory.
    pub fn download_root(&self) -> std::io::Result<PathBuf> {
        if let Some(dir) = &self.download_dir {
            return Ok(dir.clone());
        }
        let cwd = std::env::current_dir()?;
        Ok(cwd.parent().unwrap_or(&cwd).join("downloaded"))
    }
}

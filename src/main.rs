mod batch;
mod binaries;
mod convert;
mod download;
mod endpoints;
mod error;
mod fs;
mod logging;
mod metadata;
mod opt;
mod pack;
mod pipeline;
mod prompt;

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, error, info};
use structopt::StructOpt;

use binaries::Binaries;
use convert::ExternalGifConverter;
use opt::Opt;
use pipeline::{Pipeline, Stage};

async fn run(opt: Opt) -> Result<()> {
    debug!("entering stage {:?}", Stage::AwaitInput);
    let url = match &opt.url {
        Some(url) => url.clone(),
        None => prompt::pack_url().await?,
    };

    let binaries = Binaries::from_env().context("couldn't resolve converter binaries")?;
    let pipeline = Pipeline::builder()
        .client(download::client()?)
        .download_root(opt.download_root()?)
        .converter(Arc::new(ExternalGifConverter::new(binaries)))
        .download_only(opt.download_only)
        .build()?;

    let outcome = pipeline.run(&url).await?;
    info!(
        "saved {} {} stickers of \"{}\" to `{}`",
        outcome.metadata.sticker_ids.len(),
        if outcome.converted { "GIF" } else { "PNG" },
        outcome.metadata.title,
        outcome.pack_dir.display()
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let opt = Opt::from_args();
    let logger_ready = match logging::init(opt.verbose) {
        Ok(()) => true,
        Err(err) => {
            eprintln!("couldn't set up logging: {err}");
            false
        }
    };

    match run(opt).await {
        Ok(()) => {
            println!("Done!");
            std::process::exit(0);
        }
        Err(err) if logger_ready => {
            error!("{err:#}");
            std::process::exit(1);
        }
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(1);
        }
    }
}

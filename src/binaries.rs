use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Output;

use log::debug;
use tokio::process::Command;

use crate::error::ConversionError;

/// Make typing key-value-pair arguments a bit nicer
trait ArgExt {
    fn arg_pair(&mut self, first: impl AsRef<OsStr>, second: impl AsRef<OsStr>) -> &mut Self;
}
impl ArgExt for Command {
    fn arg_pair(&mut self, first: impl AsRef<OsStr>, second: impl AsRef<OsStr>) -> &mut Self {
        self.arg(first).arg(second)
    }
}

fn program_name(binary: &Path) -> String {
    binary
        .file_name()
        .unwrap_or(binary.as_os_str())
        .to_string_lossy()
        .into_owned()
}

/// A run only counts as successful if it exits cleanly *and* stays quiet on
/// stderr.
fn check_output(binary: &Path, out: Output) -> Result<(), ConversionError> {
    let program = program_name(binary);
    let stderr = String::from_utf8_lossy(&out.stderr).into_owned();
    if !out.status.success() {
        debug!("`{program}` failed with {}: {stderr}", out.status);
        Err(ConversionError::Status {
            program,
            status: out.status,
            stderr,
        })
    } else if !stderr.is_empty() {
        debug!("`{program}` wrote to stderr: {stderr}");
        Err(ConversionError::Stderr { program, stderr })
    } else {
        Ok(())
    }
}

async fn run(binary: &Path, cmd: &mut Command) -> Result<(), ConversionError> {
    debug!("running {cmd:?}");
    let out = cmd
        .output()
        .await
        .map_err(|source| ConversionError::Spawn {
            program: program_name(binary),
            source,
        })?;
    check_output(binary, out)
}

/// Relative paths with more than one component are resolved against the
/// current directory, since commands run inside the pack directory.
fn resolve(binary: PathBuf) -> std::io::Result<PathBuf> {
    if binary.is_relative() && binary.components().count() > 1 {
        Ok(std::env::current_dir()?.join(binary))
    } else {
        Ok(binary)
    }
}

/// APNG to multi-frame GIF converter.
#[derive(Debug, Clone)]
pub struct Apng2Gif(PathBuf);

impl Apng2Gif {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }
    pub fn path(&self) -> &Path {
        &self.0
    }
    /// `<apng2gif> <name>.png -b 255 255 255`, producing `<name>.gif` next to it.
    pub async fn to_gif(
        &self,
        dir: &Path,
        png_name: impl AsRef<OsStr>,
    ) -> Result<(), ConversionError> {
        let mut cmd = Command::new(&self.0);
        cmd.current_dir(dir)
            .arg(png_name.as_ref())
            .args(["-b", "255", "255", "255"]);
        run(&self.0, &mut cmd).await
    }
}

/// ImageMagick
#[derive(Debug, Clone)]
pub struct Magick(PathBuf);

impl Magick {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }
    pub fn path(&self) -> &Path {
        &self.0
    }
    /// Force infinite looping and flatten transparency onto white, in place.
    pub async fn loop_on_white(
        &self,
        dir: &Path,
        gif_name: impl AsRef<OsStr>,
    ) -> Result<(), ConversionError> {
        let mut cmd = Command::new(&self.0);
        cmd.current_dir(dir)
            .arg("convert")
            .arg(gif_name.as_ref())
            .arg_pair("-loop", "0")
            .arg("-coalesce")
            .arg_pair("-background", "white")
            .arg_pair("-alpha", "remove")
            .arg(gif_name.as_ref());
        run(&self.0, &mut cmd).await
    }
}

#[derive(Debug, Clone)]
pub struct Binaries {
    pub apng2gif: Apng2Gif,
    pub magick: Magick,
}

impl Binaries {
    pub fn default_apng2gif() -> PathBuf {
        let name = if cfg!(windows) {
            "apng2gif.exe"
        } else {
            "apng2gif"
        };
        Path::new("..").join("utils").join(name)
    }

    /// Read `APNG2GIF_BIN` and `MAGICK_BIN` from the environment or `.env`,
    /// falling back to the bundled converter and `magick` from `PATH`.
    pub fn from_env() -> std::io::Result<Self> {
        let apng2gif = dotenv::var("APNG2GIF_BIN")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_apng2gif());
        let magick = dotenv::var("MAGICK_BIN")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("magick"));

        let binaries = Self {
            apng2gif: Apng2Gif::new(resolve(apng2gif)?),
            magick: Magick::new(resolve(magick)?),
        };
        debug!("using {binaries:?}");
        Ok(binaries)
    }
}

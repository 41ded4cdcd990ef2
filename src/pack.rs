use std::fmt::{Debug, Display};
use std::path::{Path, PathBuf};

use lazy_regex::{regex, regex_captures};
use serde::Deserialize;

use crate::error::Error;

/// Numeric id of a sticker pack, as found in a store product URL.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PackId(String);

impl PackId {
    /// Extract the id from anything containing `product/<digits>`,
    /// e.g. `https://store.line.me/stickershop/product/12345/en`.
    pub fn from_url(input: &str) -> Result<Self, Error> {
        let (_, digits) = regex_captures!(r"product/(\d+)", input)
            .ok_or_else(|| Error::MalformedInput(input.to_string()))?;
        Ok(Self(digits.to_string()))
    }
}

impl Display for PackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
impl Debug for PackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PackId").field(&self.0).finish()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawStickerId {
    Number(u64),
    Text(String),
}

impl From<RawStickerId> for StickerId {
    fn from(raw: RawStickerId) -> Self {
        match raw {
            RawStickerId::Number(n) => StickerId::new(n.to_string()),
            RawStickerId::Text(s) => StickerId::new(s),
        }
    }
}

/// Identifies one image within a pack. The CDN hands these out as numbers,
/// but they are only ever used as path and URL segments.
#[derive(Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "RawStickerId")]
pub struct StickerId(String);

impl StickerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
    pub fn png_file_name(&self) -> PathBuf {
        PathBuf::from(format!("{self}.png"))
    }
}

impl Display for StickerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
impl Debug for StickerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("StickerId").field(&self.0).finish()
    }
}

/// Remove every character that isn't an ASCII word character, whitespace,
/// a parenthesis or a hyphen.
pub fn sanitize_title(title: &str) -> String {
    regex!(r"[^A-Za-z0-9_\s()-]").replace_all(title, "").into_owned()
}

#[derive(Debug, Clone)]
pub struct PackMetadata {
    pub pack_id: PackId,
    pub title: String,
    pub sticker_ids: Vec<StickerId>,
    pub has_animation: bool,
}

impl PackMetadata {
    pub fn sanitized_title(&self) -> String {
        sanitize_title(&self.title)
    }
    /// Name of the pack's own directory. Titles with nothing left after
    /// sanitizing fall back to the pack id, so the directory is never the
    /// download root itself.
    pub fn dir_name(&self) -> String {
        let title = self.sanitized_title();
        if title.trim().is_empty() {
            self.pack_id.to_string()
        } else {
            title
        }
    }
    pub fn pack_dir(&self, download_root: impl AsRef<Path>) -> PathBuf {
        download_root.as_ref().join(self.dir_name())
    }
}

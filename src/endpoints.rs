use crate::pack::{PackId, StickerId};

const META_BASE: &str = "http://dl.stickershop.line.naver.jp";
const ANIMATION_BASE: &str = "https://sdl-stickershop.line.naver.jp";
const STATIC_BASE: &str = "http://dl.stickershop.line.naver.jp";

/// Hosts serving pack metadata and sticker images.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub meta_base: String,
    pub animation_base: String,
    pub static_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            meta_base: META_BASE.to_string(),
            animation_base: ANIMATION_BASE.to_string(),
            static_base: STATIC_BASE.to_string(),
        }
    }
}

impl Endpoints {
    /// Serve everything from one host, e.g. a local mock.
    #[cfg(test)]
    pub fn single_host(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            meta_base: base.clone(),
            animation_base: base.clone(),
            static_base: base,
        }
    }

    pub fn metadata_url(&self, pack_id: &PackId) -> String {
        format!(
            "{}/products/0/0/1/{pack_id}/android/productInfo.meta",
            self.meta_base
        )
    }
    pub fn animated_sticker_url(&self, pack_id: &PackId, sticker_id: &StickerId) -> String {
        format!(
            "{}/products/0/0/1/{pack_id}/android/animation/{sticker_id}.png",
            self.animation_base
        )
    }
    pub fn static_sticker_url(&self, sticker_id: &StickerId) -> String {
        format!(
            "{}/stickershop/v1/sticker/{sticker_id}/android/sticker.png",
            self.static_base
        )
    }
    pub fn sticker_url(
        &self,
        pack_id: &PackId,
        sticker_id: &StickerId,
        has_animation: bool,
    ) -> String {
        if has_animation {
            self.animated_sticker_url(pack_id, sticker_id)
        } else {
            self.static_sticker_url(sticker_id)
        }
    }
}

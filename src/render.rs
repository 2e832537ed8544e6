use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Result};

use crate::types::{GalleryItem, MediaKind};

const IMAGE_ICON: &str = "M4 16l4.586-4.586a2 2 0 012.828 0L16 16m-2-2l1.586-1.586a2 2 0 012.828 0L20 14m-6-6h.01M6 20h12a2 2 0 002-2V6a2 2 0 00-2-2H6a2 2 0 00-2 2v12a2 2 0 002 2z";
const VIDEO_ICON: &str = "M14.752 11.168l-3.197-2.132A1 1 0 0010 9.87v4.263a1 1 0 001.555.832l3.197-2.132a1 1 0 000-1.664z M21 12a9 9 0 11-18 0 9 9 0 0118 0z";

const TILE_CLASSES: &str = "aspect-square bg-gray-200 rounded-xl overflow-hidden group cursor-pointer transition-opacity duration-500";

/// Shared hidden/visible flag of a rendered element. Clones observe the same
/// flag, so a timer can reveal an element after the container took ownership.
#[derive(Debug, Clone, Default)]
pub struct Visibility(Arc<AtomicBool>);

impl Visibility {
    pub fn is_visible(&self) -> bool { self.0.load(Ordering::Acquire) }
    pub fn reveal(&self) { self.0.store(true, Ordering::Release) }
}

/// Placeholder tile for one gallery item. Starts hidden.
#[derive(Debug, Clone)]
pub struct RenderedElement {
    pub item_id: u64,
    pub kind: MediaKind,
    icon: &'static str,
    visibility: Visibility,
}

impl RenderedElement {
    pub fn visibility(&self) -> Visibility { self.visibility.clone() }
    pub fn is_visible(&self) -> bool { self.visibility.is_visible() }

    pub fn to_html(&self) -> String {
        let opacity = if self.is_visible() { "opacity-100" } else { "opacity-0" };
        format!(
            concat!(
                "<div class=\"{classes} {opacity}\" data-kind=\"{kind}\" data-id=\"{id}\">",
                "<div class=\"w-full h-full flex items-center justify-center text-gray-400 group-hover:bg-gray-300 transition-colors\">",
                "<svg class=\"w-12 h-12\" fill=\"none\" stroke=\"currentColor\" viewBox=\"0 0 24 24\">",
                "<path stroke-linecap=\"round\" stroke-linejoin=\"round\" stroke-width=\"1.5\" d=\"{icon}\"></path>",
                "</svg></div></div>"
            ),
            classes = TILE_CLASSES,
            opacity = opacity,
            kind = self.kind,
            id = self.item_id,
            icon = self.icon,
        )
    }
}

/// Map an item to its placeholder tile. Unknown kinds are a per-item fault.
pub fn render(item: &GalleryItem) -> Result<RenderedElement> {
    let icon = match &item.kind {
        MediaKind::Image => IMAGE_ICON,
        MediaKind::Video => VIDEO_ICON,
        MediaKind::Other(kind) => bail!("cannot render item {} of unknown kind {kind:?}", item.id),
    };
    Ok(RenderedElement { item_id: item.id, kind: item.kind.clone(), icon, visibility: Visibility::default() })
}

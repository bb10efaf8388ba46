//! # Backgrounds
//!
//! What a page is drawn on: flat paper, a placed bitmap, or a page of a PDF. Rasters and filenames are shared
//! between copies, see [`Background::duplicate`].

use std::rc::Rc;

use crate::{color::Rgba, refstring::RefString, renderer::VisualID};

#[derive(
    strum::AsRefStr,
    strum::EnumIter,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Default,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum Ruling {
    /// Plain paper.
    None,
    /// Horizontal lines.
    #[default]
    Lined,
    /// Horizontal lines with a left margin line.
    Ruled,
    /// Square grid.
    Graph,
}

/// Where a raster background's file lives, relative to the document.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum FileDomain {
    /// `filename` is an absolute path.
    Absolute,
    /// `filename` is relative to the document file.
    Attach,
    /// Copy of another page's background, `filename` names nothing on its own.
    Clone,
}

/// A bitmap backing a background, along with where it came from.
#[derive(Clone, PartialEq)]
pub struct Raster {
    /// Decoded pixels. Absent for a PDF page that hasn't been rendered yet.
    pub image: Option<Rc<image::RgbaImage>>,
    pub filename: RefString,
    pub domain: FileDomain,
    /// Size of `image` in device pixels.
    pub pixel_width: u32,
    pub pixel_height: u32,
    /// Zoom the current `image` was rendered at. Zero if never rendered.
    pub scale: f64,
}
impl Raster {
    #[must_use]
    pub fn from_image(image: Rc<image::RgbaImage>, filename: RefString, domain: FileDomain) -> Self {
        let (pixel_width, pixel_height) = image.dimensions();
        Self {
            image: Some(image),
            filename,
            domain,
            pixel_width,
            pixel_height,
            scale: 0.0,
        }
    }
    /// A raster waiting to be rendered.
    #[must_use]
    pub fn pending(filename: RefString, domain: FileDomain) -> Self {
        Self {
            image: None,
            filename,
            domain,
            pixel_width: 0,
            pixel_height: 0,
            scale: 0.0,
        }
    }
    /// Swap in freshly rendered pixels.
    pub fn set_image(&mut self, image: Rc<image::RgbaImage>, scale: f64) {
        (self.pixel_width, self.pixel_height) = image.dimensions();
        self.image = Some(image);
        self.scale = scale;
    }
}
impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("loaded", &self.image.is_some())
            .field("filename", &self.filename.as_str())
            .field("domain", &self.domain)
            .field("pixels", &[self.pixel_width, self.pixel_height])
            .field("scale", &self.scale)
            .finish()
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum BackgroundKind {
    Solid { color: Rgba },
    Pixmap(Raster),
    Pdf {
        raster: Raster,
        /// One-based page number within the PDF.
        page_seq: u32,
    },
}

pub struct Background {
    pub kind: BackgroundKind,
    pub ruling: Ruling,
    pub ruling_color: Rgba,
    pub(crate) visual: Option<VisualID>,
}
impl Background {
    #[must_use]
    pub fn solid(color: Rgba, ruling: Ruling) -> Self {
        Self {
            kind: BackgroundKind::Solid { color },
            ruling,
            ruling_color: Rgba::RULING,
            visual: None,
        }
    }
    #[must_use]
    pub fn pixmap(raster: Raster) -> Self {
        Self {
            kind: BackgroundKind::Pixmap(raster),
            ruling: Ruling::None,
            ruling_color: Rgba::RULING,
            visual: None,
        }
    }
    #[must_use]
    pub fn pdf(raster: Raster, page_seq: u32) -> Self {
        Self {
            kind: BackgroundKind::Pdf { raster, page_seq },
            ruling: Ruling::None,
            ruling_color: Rgba::RULING,
            visual: None,
        }
    }
    /// Copy of this background with no visual. Images and filenames are shared, not copied.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            ruling: self.ruling,
            ruling_color: self.ruling_color,
            visual: None,
        }
    }
    #[must_use]
    pub fn visual(&self) -> Option<VisualID> {
        self.visual
    }
    #[must_use]
    pub fn is_solid(&self) -> bool {
        matches!(self.kind, BackgroundKind::Solid { .. })
    }
    /// Paper color, for solid backgrounds.
    #[must_use]
    pub fn color(&self) -> Option<Rgba> {
        match self.kind {
            BackgroundKind::Solid { color } => Some(color),
            _ => None,
        }
    }
    #[must_use]
    pub fn raster(&self) -> Option<&Raster> {
        match &self.kind {
            BackgroundKind::Solid { .. } => None,
            BackgroundKind::Pixmap(raster) | BackgroundKind::Pdf { raster, .. } => Some(raster),
        }
    }
    pub fn raster_mut(&mut self) -> Option<&mut Raster> {
        match &mut self.kind {
            BackgroundKind::Solid { .. } => None,
            BackgroundKind::Pixmap(raster) | BackgroundKind::Pdf { raster, .. } => Some(raster),
        }
    }
}
impl Default for Background {
    fn default() -> Self {
        Self::solid(Rgba::WHITE, Ruling::default())
    }
}
impl PartialEq for Background {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.ruling == other.ruling
            && self.ruling_color == other.ruling_color
    }
}
impl std::fmt::Debug for Background {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Background")
            .field("kind", &self.kind)
            .field("ruling", &self.ruling)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    pub(crate) fn pixmap_background() -> Background {
        let image = Rc::new(image::RgbaImage::new(4, 2));
        Background::pixmap(Raster::from_image(
            image,
            RefString::new(Some("/tmp/scan.png")),
            FileDomain::Absolute,
        ))
    }

    #[test]
    fn duplicate_shares_payloads() {
        let original = pixmap_background();
        let copy = original.duplicate();
        let (a, b) = (original.raster().unwrap(), copy.raster().unwrap());
        assert!(a.filename.same_payload(&b.filename));
        assert_eq!(a.filename.ref_count(), 2);
        assert_eq!(Rc::strong_count(a.image.as_ref().unwrap()), 2);
        assert_eq!(original, copy);
        drop(copy);
        assert_eq!(original.raster().unwrap().filename.ref_count(), 1);
    }
    #[test]
    fn raster_records_dimensions() {
        let bg = pixmap_background();
        let raster = bg.raster().unwrap();
        assert_eq!((raster.pixel_width, raster.pixel_height), (4, 2));
        assert_eq!(bg.color(), None);
        assert_eq!(Background::default().color(), Some(Rgba::WHITE));
    }
}

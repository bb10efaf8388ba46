//! # Layout
//!
//! Where pages sit on the canvas, which of them the viewer can see, and keeping PDF backgrounds rendered at a
//! resolution matching the zoom.

use std::rc::Rc;

use super::{
    background::BackgroundKind,
    journal::Journal,
    page::{Page, PageID},
};
use crate::{config::ViewPreferences, renderer::Renderer};

/// Vertical gap between pages in continuous mode, in document units.
pub const VIEW_CONTINUOUS_SKIP: f64 = 20.0;

#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Layout {
    /// Every page, stacked top to bottom with `gap` between them.
    Continuous { gap: f64 },
    /// Only the current page.
    Single,
}
impl Default for Layout {
    fn default() -> Self {
        Self::Continuous {
            gap: VIEW_CONTINUOUS_SKIP,
        }
    }
}

/// The viewer's window onto the canvas.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct View {
    pub layout: Layout,
    /// Index of the page being worked on.
    pub current: usize,
    /// Visible vertical span, in document units.
    pub top: f64,
    pub bottom: f64,
    /// Device pixels per document unit.
    pub zoom: f64,
}
impl View {
    #[must_use]
    pub fn from_preferences(preferences: &ViewPreferences) -> Self {
        Self {
            layout: if preferences.continuous {
                Layout::Continuous {
                    gap: preferences.page_gap,
                }
            } else {
                Layout::Single
            },
            ..Self::default()
        }
    }
    /// Re-anchor the current page after the pointer wandered to `y`, relative to the current page's top.
    ///
    /// In continuous mode, walks up or down while `y` lies beyond the current page (and the gap below it),
    /// stopping at either end of the journal. Returns `y` relative to the new current page.
    pub fn set_current_page(&mut self, journal: &Journal, mut y: f64) -> f64 {
        let Layout::Continuous { gap } = self.layout else {
            return y;
        };
        let pages = journal.pages();
        self.current = self.current.min(pages.len().saturating_sub(1));
        while y < -gap && self.current > 0 {
            self.current -= 1;
            y += pages[self.current].height() + gap;
        }
        while y > pages[self.current].height() + gap && self.current + 1 < pages.len() {
            y -= pages[self.current].height() + gap;
            self.current += 1;
        }
        y
    }
}
impl Default for View {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            current: 0,
            top: 0.0,
            bottom: 0.0,
            zoom: 1.0,
        }
    }
}

/// Position every page on the canvas, returning the canvas size.
///
/// Continuous: pages are stacked at the left edge. Single: the current page is placed at the origin and the others
/// are left where they were.
pub fn layout_pages(journal: &mut Journal, view: &View) -> [f64; 2] {
    match view.layout {
        Layout::Continuous { gap } => {
            let mut voffset = 0.0;
            let mut max_width = 0.0_f64;
            for index in 0..journal.len() {
                let Some(page) = journal.page_at_mut(index) else {
                    break;
                };
                page.hoffset = 0.0;
                page.voffset = voffset;
                voffset += page.height() + gap;
                max_width = max_width.max(page.width());
            }
            [max_width, voffset - gap]
        }
        Layout::Single => match journal.page_at_mut(view.current) {
            Some(page) => {
                page.hoffset = 0.0;
                page.voffset = 0.0;
                page.size()
            }
            None => [0.0, 0.0],
        },
    }
}

/// Whether any of `page` is within the view. `index` is the page's position in the journal.
#[must_use]
pub fn is_visible(page: &Page, index: usize, view: &View) -> bool {
    match view.layout {
        Layout::Single => index == view.current,
        Layout::Continuous { .. } => {
            view.top.max(page.voffset) < view.bottom.min(page.voffset + page.height())
        }
    }
}

/// Ask for a PDF page to be rendered at `scale`.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct RenderRequest {
    pub page: PageID,
    /// One-based page number within the PDF.
    pub page_seq: u32,
    pub scale: f64,
}

/// Find PDF backgrounds rendered at the wrong scale for the current zoom, and ask for better ones.
///
/// The scale asked for is capped at `max_render_dpi`. Each page is marked as wanting the new scale right away,
/// so asking again before the render lands emits nothing. With progressive rendering, only visible pages are
/// considered. Pixmap backgrounds forget their scale, so the renderer resamples them.
#[allow(clippy::float_cmp)]
pub fn schedule_background_renders(
    journal: &mut Journal,
    view: &View,
    preferences: &ViewPreferences,
) -> Vec<RenderRequest> {
    let wanted = view.zoom.min(preferences.max_render_dpi / 72.0);
    let mut requests = Vec::new();
    for index in 0..journal.len() {
        let Some(page) = journal.page_at_mut(index) else {
            break;
        };
        if preferences.progressive_backgrounds && !is_visible(page, index, view) {
            continue;
        }
        let id = page.id();
        let background = page.background_mut();
        let materialized = background.visual.is_some();
        match &mut background.kind {
            BackgroundKind::Pixmap(raster) if materialized => raster.scale = 0.0,
            BackgroundKind::Pdf { raster, page_seq } if raster.scale != wanted => {
                log::trace!("requesting page {page_seq} at {wanted}x for {id}");
                raster.scale = wanted;
                requests.push(RenderRequest {
                    page: id,
                    page_seq: *page_seq,
                    scale: wanted,
                });
            }
            _ => (),
        }
    }
    requests
}

/// Install a finished render. Ignored (returning `false`) if the page is gone, no longer shows that PDF page, or has
/// since asked for a different scale.
#[allow(clippy::float_cmp)]
pub fn apply_rendered(
    journal: &mut Journal,
    request: &RenderRequest,
    image: Rc<image::RgbaImage>,
    renderer: &mut dyn Renderer,
) -> bool {
    let Some(page) = journal.page_mut(request.page) else {
        log::debug!("dropping render for vanished {}", request.page);
        return false;
    };
    let background = page.background_mut();
    let BackgroundKind::Pdf { raster, page_seq } = &mut background.kind else {
        return false;
    };
    if *page_seq != request.page_seq || raster.scale != request.scale {
        log::debug!("dropping stale render of page {}", request.page_seq);
        return false;
    }
    raster.set_image(image, request.scale);
    if let Some(visual) = background.visual {
        renderer.invalidate(visual);
    }
    true
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        refstring::RefString,
        renderer::NullRenderer,
        state::background::{Background, FileDomain, Raster},
    };

    fn journal(heights: &[f64]) -> Journal {
        let pages = heights
            .iter()
            .map(|&height| Page::from_background(Background::default(), 100.0, height).unwrap())
            .collect();
        Journal::from_pages(pages).unwrap()
    }
    fn pdf_journal() -> Journal {
        let pages = (1..=3)
            .map(|seq| {
                let raster = Raster::pending(RefString::new(Some("notes.pdf")), FileDomain::Absolute);
                Page::from_background(Background::pdf(raster, seq), 100.0, 100.0).unwrap()
            })
            .collect();
        Journal::from_pages(pages).unwrap()
    }

    #[test]
    fn continuous_stacking() {
        let mut journal = journal(&[100.0, 50.0, 200.0]);
        let bounds = layout_pages(&mut journal, &View::default());
        let offsets: Vec<_> = journal.pages().iter().map(|page| page.voffset).collect();
        assert_eq!(offsets, [0.0, 120.0, 190.0]);
        assert_eq!(bounds, [100.0, 390.0]);
    }
    #[test]
    fn visibility() {
        let mut journal = journal(&[100.0, 100.0]);
        let mut view = View {
            top: 90.0,
            bottom: 110.0,
            ..View::default()
        };
        layout_pages(&mut journal, &view);
        assert!(is_visible(&journal.pages()[0], 0, &view));
        // The view ends inside the gap.
        assert!(!is_visible(&journal.pages()[1], 1, &view));
        view.layout = Layout::Single;
        view.current = 1;
        assert!(is_visible(&journal.pages()[1], 1, &view));
        assert!(!is_visible(&journal.pages()[0], 0, &view));
    }
    #[test]
    fn walks_current_page() {
        let journal = journal(&[100.0, 100.0, 100.0]);
        let mut view = View::default();
        let y = view.set_current_page(&journal, 250.0);
        assert_eq!(view.current, 2);
        assert_eq!(y, 10.0);
        let y = view.set_current_page(&journal, -30.0);
        assert_eq!(view.current, 1);
        assert_eq!(y, 90.0);
        // Past the end, clamps.
        let y = view.set_current_page(&journal, 1000.0);
        assert_eq!(view.current, 2);
        assert_eq!(y, 880.0);
    }
    #[test]
    fn render_requests_are_capped_and_deduplicated() {
        let mut journal = pdf_journal();
        let preferences = ViewPreferences {
            progressive_backgrounds: false,
            ..ViewPreferences::default()
        };
        let view = View {
            zoom: 20.0,
            ..View::default()
        };
        let requests = schedule_background_renders(&mut journal, &view, &preferences);
        assert_eq!(requests.len(), 3);
        assert!(requests.iter().all(|request| request.scale == 10.0));
        assert_eq!(requests[2].page_seq, 3);
        assert!(schedule_background_renders(&mut journal, &view, &preferences).is_empty());
    }
    #[test]
    fn progressive_only_visible() {
        let mut journal = pdf_journal();
        let view = View {
            top: 0.0,
            bottom: 50.0,
            zoom: 1.5,
            ..View::default()
        };
        layout_pages(&mut journal, &view);
        let requests =
            schedule_background_renders(&mut journal, &view, &ViewPreferences::default());
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].page, journal.pages()[0].id());
    }
    #[test]
    fn stale_renders_dropped() {
        let mut journal = pdf_journal();
        let preferences = ViewPreferences {
            progressive_backgrounds: false,
            ..ViewPreferences::default()
        };
        let mut view = View::default();
        let first = schedule_background_renders(&mut journal, &view, &preferences);
        view.zoom = 2.0;
        let second = schedule_background_renders(&mut journal, &view, &preferences);
        let image = Rc::new(image::RgbaImage::new(2, 2));
        assert!(!apply_rendered(&mut journal, &first[0], image.clone(), &mut NullRenderer));
        assert!(apply_rendered(&mut journal, &second[0], image, &mut NullRenderer));
        let raster = journal.pages()[0].background().raster().unwrap();
        assert!(raster.image.is_some());
        assert_eq!(raster.pixel_width, 2);
    }
}

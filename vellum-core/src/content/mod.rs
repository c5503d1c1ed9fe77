//! Frame content sources
//!
//! Before every refresh the driver asks its content source to draw into the
//! frame buffer. A source is either a single writer callback or a set of
//! pages (one writer per page, one page shown at a time). The two are
//! mutually exclusive.

use heapless::Vec;

use crate::config::{ConfigError, ContentConfig, MAX_PAGES};
use crate::framebuffer::FrameBuffer;

/// Something that draws a frame
pub trait Writer {
    fn write(&mut self, fb: &mut FrameBuffer<'_>);
}

impl<F> Writer for F
where
    F: FnMut(&mut FrameBuffer<'_>),
{
    fn write(&mut self, fb: &mut FrameBuffer<'_>) {
        self(fb)
    }
}

/// Declarative page set with a current page
pub struct Pages<'w> {
    pages: Vec<&'w mut dyn Writer, MAX_PAGES>,
    current: usize,
}

impl<'w> Pages<'w> {
    pub const fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: 0,
        }
    }

    /// Append a page, the first page added is shown first
    pub fn push(&mut self, page: &'w mut dyn Writer) -> Result<usize, ConfigError> {
        self.pages
            .push(page)
            .map_err(|_| ConfigError::TooManyPages)?;
        Ok(self.pages.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Index of the page being shown
    pub fn current(&self) -> usize {
        self.current
    }

    /// Switch to page `index`; out-of-range indices are ignored
    pub fn show(&mut self, index: usize) -> bool {
        if index < self.pages.len() {
            self.current = index;
            true
        } else {
            false
        }
    }

    /// Advance to the next page, wrapping to the first
    pub fn next(&mut self) {
        if !self.pages.is_empty() {
            self.current = (self.current + 1) % self.pages.len();
        }
    }

    /// Go back one page, wrapping to the last
    pub fn previous(&mut self) {
        if !self.pages.is_empty() {
            self.current = (self.current + self.pages.len() - 1) % self.pages.len();
        }
    }

    fn write(&mut self, fb: &mut FrameBuffer<'_>) {
        if let Some(page) = self.pages.get_mut(self.current) {
            page.write(fb);
        }
    }
}

impl Default for Pages<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Content source of a display
#[derive(Default)]
pub enum Content<'w> {
    /// Frame buffer is left as the caller drew it
    #[default]
    Empty,
    Writer(&'w mut dyn Writer),
    Pages(Pages<'w>),
}

impl<'w> Content<'w> {
    /// Shape of this source, for validation
    pub fn config(&self) -> ContentConfig {
        match self {
            Content::Empty => ContentConfig::default(),
            Content::Writer(_) => ContentConfig {
                has_writer: true,
                page_count: 0,
            },
            Content::Pages(pages) => ContentConfig {
                has_writer: false,
                page_count: pages.len(),
            },
        }
    }

    /// Install a writer callback
    ///
    /// Fails with [`ConfigError::ConflictingContent`] when pages are
    /// configured. Replaces a previous writer.
    pub fn set_writer(&mut self, writer: &'w mut dyn Writer) -> Result<(), ConfigError> {
        if let Content::Pages(pages) = self {
            if !pages.is_empty() {
                return Err(ConfigError::ConflictingContent);
            }
        }
        *self = Content::Writer(writer);
        Ok(())
    }

    /// Install a page set
    ///
    /// Fails with [`ConfigError::ConflictingContent`] when a writer is
    /// configured.
    pub fn set_pages(&mut self, pages: Pages<'w>) -> Result<(), ConfigError> {
        let candidate = ContentConfig {
            has_writer: matches!(self, Content::Writer(_)),
            page_count: pages.len(),
        };
        candidate.validate()?;
        *self = Content::Pages(pages);
        Ok(())
    }

    pub fn pages(&self) -> Option<&Pages<'w>> {
        match self {
            Content::Pages(pages) => Some(pages),
            _ => None,
        }
    }

    pub fn pages_mut(&mut self) -> Option<&mut Pages<'w>> {
        match self {
            Content::Pages(pages) => Some(pages),
            _ => None,
        }
    }

    /// Draw the current frame
    pub fn render(&mut self, fb: &mut FrameBuffer<'_>) {
        match self {
            Content::Empty => {}
            Content::Writer(writer) => writer.write(fb),
            Content::Pages(pages) => pages.write(fb),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PanelGeometry, PixelDepth};

    const GEOMETRY: PanelGeometry = PanelGeometry::new(4, 1);

    fn draw_level(level: u8) -> impl FnMut(&mut FrameBuffer<'_>) {
        move |fb: &mut FrameBuffer<'_>| fb.set_pixel(0, 0, level)
    }

    #[test]
    fn test_writer_runs_on_render() {
        let mut storage = [0u8; 1];
        let mut fb = FrameBuffer::new(&mut storage, GEOMETRY, PixelDepth::Greyscale).unwrap();

        let mut calls = 0;
        let mut writer = |fb: &mut FrameBuffer<'_>| {
            calls += 1;
            fb.set_pixel(1, 0, 2);
        };

        let mut content = Content::default();
        content.set_writer(&mut writer).unwrap();
        content.render(&mut fb);
        content.render(&mut fb);
        drop(content);

        assert_eq!(calls, 2);
        assert_eq!(fb.pixel(1, 0), Some(2));
    }

    #[test]
    fn test_writer_and_pages_conflict() {
        let mut writer = draw_level(1);
        let mut page = draw_level(2);

        let mut pages = Pages::new();
        pages.push(&mut page).unwrap();

        let mut content = Content::default();
        content.set_pages(pages).unwrap();
        assert_eq!(
            content.set_writer(&mut writer),
            Err(ConfigError::ConflictingContent)
        );
        assert!(content.config().validate().is_ok());
    }

    #[test]
    fn test_pages_after_writer_conflict() {
        let mut writer = draw_level(1);
        let mut page = draw_level(2);

        let mut content = Content::default();
        content.set_writer(&mut writer).unwrap();

        let mut pages = Pages::new();
        pages.push(&mut page).unwrap();
        assert_eq!(
            content.set_pages(pages),
            Err(ConfigError::ConflictingContent)
        );
    }

    #[test]
    fn test_page_navigation() {
        let mut storage = [0u8; 1];
        let mut fb = FrameBuffer::new(&mut storage, GEOMETRY, PixelDepth::Greyscale).unwrap();

        let mut a = draw_level(1);
        let mut b = draw_level(2);
        let mut c = draw_level(3);

        let mut pages = Pages::new();
        assert_eq!(pages.push(&mut a), Ok(0));
        assert_eq!(pages.push(&mut b), Ok(1));
        assert_eq!(pages.push(&mut c), Ok(2));

        let mut content = Content::default();
        content.set_pages(pages).unwrap();

        content.render(&mut fb);
        assert_eq!(fb.pixel(0, 0), Some(1));

        let pages = content.pages_mut().unwrap();
        pages.previous();
        assert_eq!(pages.current(), 2);
        pages.next();
        assert_eq!(pages.current(), 0);
        pages.next();
        assert_eq!(pages.current(), 1);
        assert!(!pages.show(3));
        assert_eq!(pages.current(), 1);

        content.render(&mut fb);
        assert_eq!(fb.pixel(0, 0), Some(2));
    }

    #[test]
    fn test_page_table_full() {
        let mut writers: [fn(&mut FrameBuffer<'_>); MAX_PAGES + 1] = [|_| {}; MAX_PAGES + 1];
        let (last, rest) = writers.split_last_mut().unwrap();

        let mut pages = Pages::new();
        for writer in rest.iter_mut() {
            pages.push(writer).unwrap();
        }
        assert_eq!(pages.push(last), Err(ConfigError::TooManyPages));
    }

    #[test]
    fn test_empty_navigation_is_noop() {
        let mut pages = Pages::new();
        pages.next();
        pages.previous();
        assert_eq!(pages.current(), 0);
        assert!(pages.is_empty());
    }
}

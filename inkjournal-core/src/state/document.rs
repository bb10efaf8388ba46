use super::{journal::Journal, page::PageTemplate};

/// Everything history entries act upon: the pages, and the template new pages are made from.
#[derive(Debug, PartialEq)]
pub struct DocumentState {
    pub(crate) journal: Journal,
    pub(crate) default_page: PageTemplate,
}
impl DocumentState {
    /// A one-page document.
    #[must_use]
    pub fn new(default_page: PageTemplate) -> Self {
        Self {
            journal: Journal::new(default_page.instantiate()),
            default_page,
        }
    }
    #[must_use]
    pub fn from_journal(journal: Journal, default_page: PageTemplate) -> Self {
        Self {
            journal,
            default_page,
        }
    }
    #[must_use]
    pub fn journal(&self) -> &Journal {
        &self.journal
    }
    /// Template for pages added without a more specific one.
    #[must_use]
    pub fn default_page(&self) -> &PageTemplate {
        &self.default_page
    }
}

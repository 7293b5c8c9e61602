//! Competitor news bulletins from an external news feed.
//!
//! The feed groups short news lines by section and company. Sections that map
//! to a [`Category`] are shown in category order; any others follow by name.

use crate::Category;

/// One company's news line within a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsEntry {
    pub company: String,
    pub text: String,
    /// Source link, when the feed supplied one.
    pub url: Option<String>,
}

/// A named group of news lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsSection {
    /// Section name as the feed spells it ("Fund Raise", "GTM").
    pub name: String,
    pub entries: Vec<NewsEntry>,
}

impl NewsSection {
    /// The category this section corresponds to, if any.
    pub fn category(&self) -> Option<Category> {
        Category::parse_label(&self.name)
    }
}

/// A full bulletin, sections in display order, none of them empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompetitorNews {
    sections: Vec<NewsSection>,
}

impl CompetitorNews {
    pub fn new(sections: Vec<NewsSection>) -> Self {
        let mut sections: Vec<NewsSection> = sections
            .into_iter()
            .filter(|s| !s.entries.is_empty())
            .collect();
        sections.sort_by(|a, b| display_key(a).cmp(&display_key(b)));
        Self { sections }
    }

    pub fn sections(&self) -> &[NewsSection] {
        &self.sections
    }

    /// Number of news lines across all sections.
    pub fn entry_count(&self) -> usize {
        self.sections.iter().map(|s| s.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

fn display_key(section: &NewsSection) -> (bool, Option<Category>, &str) {
    let category = section.category();
    (category.is_none(), category, section.name.as_str())
}

//! Records and pages of the remote collection.

use std::borrow::Cow;

use serde::Deserialize;

/// A displayable column of the collection table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Column {
    /// Field name in the remote record.
    pub field: &'static str,
    /// Human-readable header.
    pub header: &'static str,
}

/// A single record of the remote collection.
///
/// Items are immutable value objects; `id` is unique within the collection.
/// Fields other than the ones below are ignored when decoding, and absent or
/// `null` attributes decode as `None`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Item {
    /// Remote identifier, unique within the collection.
    pub id: u64,
    pub title: Option<String>,
    pub place_of_origin: Option<String>,
    /// Free text transcribed from the object; often absent.
    pub inscriptions: Option<String>,
    /// Artist name with nationality and life dates, as one display string.
    pub artist_display: Option<String>,
    /// Earliest year of creation. Negative years are BCE.
    pub date_start: Option<i32>,
    /// Latest year of creation.
    pub date_end: Option<i32>,
}

impl Item {
    /// The columns a table renders, in display order.
    pub const COLUMNS: [Column; 6] = [
        Column { field: "title", header: "Title" },
        Column { field: "place_of_origin", header: "Place of origin" },
        Column { field: "inscriptions", header: "Inscriptions" },
        Column { field: "artist_display", header: "Artist display" },
        Column { field: "date_start", header: "Date start" },
        Column { field: "date_end", header: "Date end" },
    ];

    /// Create an item with only an id set.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            title: None,
            place_of_origin: None,
            inscriptions: None,
            artist_display: None,
            date_start: None,
            date_end: None,
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Render a column as display text.
    ///
    /// Returns `None` for an unknown field name; a known field with no value
    /// renders as an empty string.
    pub fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        fn text(value: &Option<String>) -> Cow<'_, str> {
            Cow::Borrowed(value.as_deref().unwrap_or(""))
        }
        fn year(value: Option<i32>) -> Cow<'static, str> {
            value.map_or(Cow::Borrowed(""), |y| Cow::Owned(y.to_string()))
        }

        let value = match name {
            "id" => Cow::Owned(self.id.to_string()),
            "title" => text(&self.title),
            "place_of_origin" => text(&self.place_of_origin),
            "inscriptions" => text(&self.inscriptions),
            "artist_display" => text(&self.artist_display),
            "date_start" => year(self.date_start),
            "date_end" => year(self.date_end),
            _ => return None,
        };
        Some(value)
    }
}

/// One page of the remote collection as returned by a
/// [`PageSource`](crate::PageSource).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    /// 1-based page index this page was fetched for.
    pub number: u32,
    /// Total number of pages reported by the remote; always at least 1.
    pub total_pages: u32,
    /// Items in remote order; at most one page size long.
    pub items: Vec<Item>,
}

impl Page {
    /// Create a page, clamping `total_pages` to at least 1.
    ///
    /// An empty collection reports zero pages; it is still displayed as one
    /// empty page.
    pub fn new(number: u32, total_pages: u32, items: Vec<Item>) -> Self {
        Self {
            number,
            total_pages: total_pages.max(1),
            items,
        }
    }
}

/// Pagination metadata of the displayed page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageInfo {
    /// 1-based index of the displayed page.
    pub number: u32,
    /// Total number of pages.
    pub total_pages: u32,
    /// Fixed number of items per remote page.
    pub page_size: usize,
}

impl PageInfo {
    /// 0-based offset of the displayed page's first row in the whole collection.
    pub fn first_row(&self) -> usize {
        (self.number.saturating_sub(1) as usize).saturating_mul(self.page_size)
    }

    /// Whether a later page exists.
    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    /// Whether an earlier page exists.
    pub fn has_previous(&self) -> bool {
        self.number > 1
    }
}

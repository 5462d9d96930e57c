use serde::Deserialize;

/// Events shown per page in the event list
pub const EVENTS_PER_PAGE: usize = 8;

/// Page sizes offered for donation tables
pub const PAGE_SIZE_CHOICES: [u32; 3] = [5, 10, 50];

/// A list endpoint returns either a bare array or a `{results, count}` page
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Bare(Vec<T>),
    Page {
        #[serde(default = "Vec::new")]
        results: Vec<T>,
        #[serde(default)]
        count: Option<u64>,
    },
}

impl<T> Listing<T> {
    /// Total number of matching rows on the server, falling back to the
    /// number of rows received
    pub fn total(&self) -> u64 {
        match self {
            Listing::Bare(items) => items.len() as u64,
            Listing::Page { results, count } => count.unwrap_or(results.len() as u64),
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Bare(items) | Listing::Page { results: items, .. } => items,
        }
    }
}

/// Requested page size for server-side pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    Count(u32),
    All,
}

impl Default for PageSize {
    fn default() -> Self {
        PageSize::Count(10)
    }
}

impl std::fmt::Display for PageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageSize::Count(n) => write!(f, "{}", n),
            PageSize::All => write!(f, "all"),
        }
    }
}

impl std::str::FromStr for PageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(PageSize::All);
        }
        match s.parse::<u32>() {
            Ok(n) if n > 0 => Ok(PageSize::Count(n)),
            _ => Err(format!("invalid page size '{}', expected a positive number or 'all'", s)),
        }
    }
}

impl PageSize {
    /// Number of pages needed for `total` rows. Showing everything is one page.
    pub fn total_pages(&self, total: u64) -> u64 {
        match self {
            PageSize::All => 1,
            PageSize::Count(n) => total.div_ceil(u64::from(*n)),
        }
    }

    /// One-based row number of the `index`-th row on `page`
    pub fn row_number(&self, page: u32, index: usize, total: u64) -> u64 {
        let per_page = match self {
            PageSize::All => total,
            PageSize::Count(n) => u64::from(*n),
        };
        u64::from(page.saturating_sub(1)) * per_page + index as u64 + 1
    }
}

/// Client-side pagination over an already loaded list
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    per_page: usize,
}

impl Paginator {
    pub fn new(per_page: usize) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    pub fn total_pages(&self, len: usize) -> usize {
        len.div_ceil(self.per_page)
    }

    /// Items on the one-based `page`; out of range pages are empty
    pub fn page<'a, T>(&self, items: &'a [T], page: usize) -> &'a [T] {
        let start = page.saturating_sub(1).saturating_mul(self.per_page);
        if start >= items.len() {
            return &[];
        }
        let end = (start + self.per_page).min(items.len());
        &items[start..end]
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(EVENTS_PER_PAGE)
    }
}

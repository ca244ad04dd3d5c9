use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("Unknown sort direction '{other}'")),
        }
    }
}

/// Columns a user listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    Email,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Email => "email",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "id" => Ok(Self::Id),
            "name" => Ok(Self::Name),
            "email" => Ok(Self::Email),
            "createdAt" | "created_at" => Ok(Self::CreatedAt),
            "updatedAt" | "updated_at" => Ok(Self::UpdatedAt),
            other => Err(format!("Cannot sort by unknown property '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: Direction,
}

/// Parses `property` or `property,direction`.
impl FromStr for Sort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match s.split_once(',') {
            Some((field, direction)) => (field, direction.parse()?),
            None => (s, Direction::default()),
        };
        Ok(Self { field: field.parse()?, direction })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    size: u32,
    sort: Option<Sort>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequestError {
    NegativePage,
    PageOutOfRange,
    NonPositiveSize,
}

impl fmt::Display for PageRequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativePage => f.write_str("Page index must not be less than zero"),
            Self::PageOutOfRange => write!(f, "Page index must not be greater than {}", u32::MAX),
            Self::NonPositiveSize => f.write_str("Page size must be greater than zero"),
        }
    }
}

impl PageRequest {
    /// Builds a page request, rejecting a negative index or an empty page.
    ///
    /// # Errors
    /// Returns `PageRequestError` if `page` is negative or beyond `u32::MAX`, or if `size <= 0`.
    pub fn new(page: i64, size: i64, sort: Option<Sort>) -> Result<Self, PageRequestError> {
        if page < 0 {
            return Err(PageRequestError::NegativePage);
        }
        let page = u32::try_from(page).map_err(|_| PageRequestError::PageOutOfRange)?;
        let size = u32::try_from(size).ok().filter(|s| *s > 0).ok_or(PageRequestError::NonPositiveSize)?;
        Ok(Self { page, size, sort })
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    #[must_use]
    pub const fn sort(&self) -> Option<Sort> {
        self.sort
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

/// A bounded slice of a larger result set plus navigation metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page_number: u32,
    pub page_size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
    pub is_first: bool,
    pub is_last: bool,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        let page_number = request.page();
        let page_size = request.size();
        let total_pages = total_elements.div_ceil(u64::from(page_size));
        let has_next = u64::from(page_number) + 1 < total_pages;
        let has_previous = page_number > 0;

        Self {
            content,
            page_number,
            page_size,
            total_elements,
            total_pages,
            is_first: !has_previous,
            is_last: !has_next,
            has_next,
            has_previous,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            is_first: self.is_first,
            is_last: self.is_last,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(page: i64, size: i64) -> PageRequest {
        PageRequest::new(page, size, None).unwrap()
    }

    #[test]
    fn test_page_request_bounds() {
        assert_eq!(PageRequest::new(-1, 10, None), Err(PageRequestError::NegativePage));
        assert_eq!(PageRequest::new(i64::from(u32::MAX) + 1, 10, None), Err(PageRequestError::PageOutOfRange));
        assert_eq!(PageRequest::new(i64::from(u32::MAX), 10, None).unwrap().page(), u32::MAX);
        assert_eq!(PageRequest::new(0, 0, None), Err(PageRequestError::NonPositiveSize));
        assert_eq!(PageRequest::new(0, -5, None), Err(PageRequestError::NonPositiveSize));
        assert_eq!(request(3, 25).offset(), 75);
    }

    #[test]
    fn test_empty_page_is_first_and_last() {
        let page: Page<u8> = Page::new(vec![], &request(0, 10), 0);
        assert_eq!(page.total_pages, 0);
        assert!(page.is_first);
        assert!(page.is_last);
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }

    #[test]
    fn test_middle_page_navigation() {
        let page = Page::new(vec![1, 2], &request(1, 2), 5);
        assert_eq!(page.total_pages, 3);
        assert!(!page.is_first);
        assert!(!page.is_last);
        assert!(page.has_next);
        assert!(page.has_previous);
    }

    #[test]
    fn test_last_page_navigation() {
        let page = Page::new(vec![5], &request(2, 2), 5);
        assert!(page.is_last);
        assert!(!page.has_next);
        assert!(page.has_previous);
    }

    #[test]
    fn test_map_preserves_metadata() {
        let page = Page::new(vec![1, 2], &request(0, 2), 4).map(|n| n * 10);
        assert_eq!(page.content, vec![10, 20]);
        assert_eq!(page.total_elements, 4);
        assert!(page.has_next);
    }

    #[test]
    fn test_sort_parsing() {
        let sort: Sort = "name,desc".parse().unwrap();
        assert_eq!(sort.field, SortField::Name);
        assert_eq!(sort.direction, Direction::Desc);

        let sort: Sort = "createdAt".parse().unwrap();
        assert_eq!(sort.field, SortField::CreatedAt);
        assert_eq!(sort.direction, Direction::Asc);

        assert!("password".parse::<Sort>().is_err());
        assert!("name,sideways".parse::<Sort>().is_err());
    }
}

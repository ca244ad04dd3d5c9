use crate::config::PaginationConfig;
use crate::domain::pagination::{Page, PageRequest, PageRequestError, Sort};
use crate::error::{AppError, FieldErrors, Result};
use serde::{Deserialize, Serialize};

/// `?page=&size=&sort=field[,asc|desc]`; a listing is paged as soon as any of them is present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub sort: Option<String>,
}

impl PageParams {
    #[must_use]
    pub const fn is_paged(&self) -> bool {
        self.page.is_some() || self.size.is_some() || self.sort.is_some()
    }

    /// Resolves defaults and limits into a domain page request.
    ///
    /// # Errors
    /// Returns `AppError::Validation` keyed by parameter name if the index, size or sort is invalid.
    pub fn to_page_request(&self, config: &PaginationConfig) -> Result<PageRequest> {
        let mut errors = FieldErrors::new();

        let sort = match self.sort.as_deref().map(str::parse::<Sort>).transpose() {
            Ok(sort) => sort,
            Err(message) => {
                errors.insert("sort".into(), message);
                None
            }
        };

        let page = self.page.unwrap_or(0);
        let size = self.size.unwrap_or_else(|| i64::from(config.default_page_size)).min(i64::from(config.max_page_size));

        match PageRequest::new(page, size, sort) {
            Ok(request) if errors.is_empty() => Ok(request),
            Ok(_) => Err(AppError::Validation(errors)),
            Err(e) => {
                let field = match e {
                    PageRequestError::NegativePage | PageRequestError::PageOutOfRange => "page",
                    PageRequestError::NonPositiveSize => "size",
                };
                errors.insert(field.into(), e.to_string());
                Err(AppError::Validation(errors))
            }
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
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

impl<T> From<Page<T>> for PageResponse<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            content: page.content,
            page_number: page.page_number,
            page_size: page.page_size,
            total_elements: page.total_elements,
            total_pages: page.total_pages,
            is_first: page.is_first,
            is_last: page.is_last,
            has_next: page.has_next,
            has_previous: page.has_previous,
        }
    }
}

/// Sort direction accepted by list and search endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Options for offset-paginated list endpoints
#[derive(Debug, Clone, Default)]
pub struct PaginationOptions {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl PaginationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn with_sort(mut self, sort_by: impl Into<String>, sort_order: SortOrder) -> Self {
        self.sort_by = Some(sort_by.into());
        self.sort_order = Some(sort_order);
        self
    }

    /// List parameters with the service defaults filled in: first page,
    /// 100 per page, newest first.
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        vec![
            ("page".to_string(), self.page.unwrap_or(1).to_string()),
            (
                "per_page".to_string(),
                self.per_page.unwrap_or(100).to_string(),
            ),
            (
                "sort_by".to_string(),
                self.sort_by.clone().unwrap_or_else(|| "created_at".to_string()),
            ),
            (
                "sort_order".to_string(),
                self.sort_order.unwrap_or(SortOrder::Desc).as_str().to_string(),
            ),
        ]
    }
}

/// Options for cursor-paginated list endpoints
#[derive(Debug, Clone, Default)]
pub struct CursorPaginationOptions {
    pub page_size: Option<u32>,
    pub cursor: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl CursorPaginationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    pub fn with_sort(mut self, sort_by: impl Into<String>, sort_order: SortOrder) -> Self {
        self.sort_by = Some(sort_by.into());
        self.sort_order = Some(sort_order);
        self
    }

    pub fn to_query_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            (
                "page[size]".to_string(),
                self.page_size.unwrap_or(100).to_string(),
            ),
            (
                "sort_by".to_string(),
                self.sort_by.clone().unwrap_or_else(|| "created_at".to_string()),
            ),
            (
                "sort_order".to_string(),
                self.sort_order.unwrap_or(SortOrder::Desc).as_str().to_string(),
            ),
        ];

        if let Some(ref cursor) = self.cursor {
            params.push(("page[after]".to_string(), cursor.clone()));
        }

        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults() {
        let params = PaginationOptions::new().to_query_params();

        assert!(params.contains(&("page".to_string(), "1".to_string())));
        assert!(params.contains(&("per_page".to_string(), "100".to_string())));
        assert!(params.contains(&("sort_by".to_string(), "created_at".to_string())));
        assert!(params.contains(&("sort_order".to_string(), "desc".to_string())));
    }

    #[test]
    fn cursor_params_include_cursor_only_when_set() {
        let without = CursorPaginationOptions::new().to_query_params();
        assert!(!without.iter().any(|(k, _)| k == "page[after]"));

        let with = CursorPaginationOptions::new()
            .with_cursor("abc123")
            .to_query_params();
        assert!(with.contains(&("page[after]".to_string(), "abc123".to_string())));
    }
}

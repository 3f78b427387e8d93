//! Typed list queries
//!
//! This module provides the `(page, page_size, search, filters, sort)` tuple
//! the list endpoints are queried with.

use std::collections::BTreeMap;

use crate::value::ParamValue;

pub const PAGE_PARAM: &str = "page";
pub const PAGE_SIZE_PARAM: &str = "page_size";
pub const SEARCH_PARAM: &str = "search";
pub const SORT_PARAM: &str = "sort";

/// Pagination configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pagination {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl Pagination {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Sort field and direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(field: &str, order: SortOrder) -> Self {
        Self {
            field: field.to_string(),
            order,
        }
    }

    pub fn to_param(&self) -> String {
        format!("{}:{}", self.field, self.order.as_str())
    }
}

/// List query sent to a paginated endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub pagination: Pagination,
    pub search: Option<String>,
    pub filters: BTreeMap<String, ParamValue>,
    pub sort: Option<SortSpec>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.pagination.page = Some(page);
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.pagination.page_size = Some(page_size);
        self
    }

    pub fn search(mut self, term: &str) -> Self {
        self.search = Some(term.to_string());
        self
    }

    pub fn filter<V: Into<ParamValue>>(mut self, name: &str, value: V) -> Self {
        self.filters.insert(name.to_string(), value.into());
        self
    }

    pub fn sort(mut self, field: &str, order: SortOrder) -> Self {
        self.sort = Some(SortSpec::new(field, order));
        self
    }

    /// Flatten into named parameters.
    ///
    /// A filter reusing one of the reserved names produces a duplicate
    /// parameter, which key building rejects.
    pub fn to_params(&self) -> Vec<(String, ParamValue)> {
        let mut params = Vec::with_capacity(self.filters.len() + 4);

        if let Some(page) = self.pagination.page {
            params.push((PAGE_PARAM.to_string(), page.into()));
        }
        if let Some(page_size) = self.pagination.page_size {
            params.push((PAGE_SIZE_PARAM.to_string(), page_size.into()));
        }
        if let Some(search) = &self.search {
            params.push((SEARCH_PARAM.to_string(), search.into()));
        }
        if let Some(sort) = &self.sort {
            params.push((SORT_PARAM.to_string(), sort.to_param().into()));
        }
        for (name, value) in &self.filters {
            params.push((name.clone(), value.clone()));
        }

        params
    }
}

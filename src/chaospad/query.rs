//! Query string for the paginated list endpoint.

use crate::state::Pagination;
use url::form_urlencoded;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterQuery {
    pub limit: usize,
    pub offset: usize,
    pub sort_by: String,
    pub descending: bool,
    /// `None` when the search box is empty; the parameter is then omitted.
    pub search: Option<String>,
}

impl FilterQuery {
    pub fn new(pagination: &Pagination, search: &str) -> Self {
        Self {
            limit: pagination.page_size,
            offset: pagination.offset(),
            sort_by: pagination.sort.field.clone(),
            descending: pagination.sort.descending,
            search: (!search.is_empty()).then(|| search.to_string()),
        }
    }

    pub fn direction(&self) -> &'static str {
        if self.descending {
            "desc"
        } else {
            "asc"
        }
    }

    pub fn to_query_string(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query
            .append_pair("limit", &self.limit.to_string())
            .append_pair("offset", &self.offset.to_string())
            .append_pair("sortby", &self.sort_by)
            .append_pair("direction", self.direction());
        if let Some(search) = &self.search {
            query.append_pair("search", search);
        }
        query.finish()
    }

    /// Inverse of [`to_query_string`](Self::to_query_string); missing or
    /// malformed values fall back to the table defaults.
    pub fn parse(raw: &str) -> Self {
        let mut query = Self::new(&Pagination::default(), "");
        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                "limit" => query.limit = value.parse().unwrap_or(query.limit),
                "offset" => query.offset = value.parse().unwrap_or(query.offset),
                "sortby" => query.sort_by = value.into_owned(),
                "direction" => query.descending = value.eq_ignore_ascii_case("desc"),
                "search" if !value.is_empty() => query.search = Some(value.into_owned()),
                _ => {}
            }
        }
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Pagination, Sort};

    #[test]
    fn default_table_query() {
        let query = FilterQuery::new(&Pagination::default(), "");
        assert_eq!(
            query.to_query_string(),
            "limit=10&offset=0&sortby=updated_at&direction=desc"
        );
    }

    #[test]
    fn search_is_appended_and_encoded() {
        let pagination = Pagination {
            page: 2,
            page_size: 5,
            sort: Sort {
                field: "name".into(),
                descending: false,
            },
            ..Pagination::default()
        };
        let query = FilterQuery::new(&pagination, "shopping list");
        assert_eq!(
            query.to_query_string(),
            "limit=5&offset=5&sortby=name&direction=asc&search=shopping+list"
        );
    }

    #[test]
    fn parse_reads_back_parameters() {
        let parsed = FilterQuery::parse("limit=5&offset=15&sortby=name&direction=asc&search=a%26b");
        assert_eq!(parsed.limit, 5);
        assert_eq!(parsed.offset, 15);
        assert_eq!(parsed.sort_by, "name");
        assert!(!parsed.descending);
        assert_eq!(parsed.search.as_deref(), Some("a&b"));
    }

    #[test]
    fn parse_ignores_empty_search() {
        let parsed = FilterQuery::parse("search=");
        assert_eq!(parsed.search, None);
    }
}

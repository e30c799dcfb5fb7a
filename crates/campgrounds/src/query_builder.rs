use serde::Serialize;

use crate::sanitizer::sanitize_for_pattern_match;
use crate::types::ListingParams;

/// Sort mode for the highest rated campgrounds first. The spelling is part of the
/// public query-string contract.
pub const SORT_HIGHEST_RATED: &str = "higestRated";
/// Sort mode for the cheapest campgrounds first
pub const SORT_LOWEST_PRICE: &str = "lowestPrice";
/// Sort mode for the most expensive campgrounds first
pub const SORT_HIGHEST_PRICE: &str = "highestPrice";
/// Sort mode that clears any sorting
pub const SORT_CLEAR: &str = "clear";

/// Which campgrounds a query selects
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CampgroundFilter {
    /// Every campground
    All,
    /// Campgrounds whose title or location matches `pattern`, ignoring case
    TextSearch {
        /// Escaped pattern, safe to hand to a regex engine
        pattern: String,
    },
    /// Campgrounds whose tag is one of `tags`
    TagIn {
        /// Accepted tag labels
        tags: Vec<String>,
    },
}

/// Campground field a query can sort on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// Aggregate rating
    Rating,
    /// Nightly price
    Price,
}

/// Direction of a sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    /// Smallest first
    Ascending,
    /// Largest first
    Descending,
}

/// Sort applied to a query's results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    /// Field to sort on
    pub field: SortField,
    /// Sort direction
    pub direction: SortDirection,
}

/// Store-independent description of a campground query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryDescriptor {
    /// Selection criteria
    pub filter: CampgroundFilter,
    /// Optional ordering; the store's natural order when absent
    pub sort: Option<SortSpec>,
}

impl QueryDescriptor {
    /// Selects every campground in natural order
    pub fn match_all() -> Self {
        Self {
            filter: CampgroundFilter::All,
            sort: None,
        }
    }

    /// Selects every campground, sorted
    pub fn sorted(field: SortField, direction: SortDirection) -> Self {
        Self {
            filter: CampgroundFilter::All,
            sort: Some(SortSpec { field, direction }),
        }
    }

    /// Whether this query came from a free-text search
    pub fn is_search(&self) -> bool {
        matches!(self.filter, CampgroundFilter::TextSearch { .. })
    }
}

/// Builds the query for a listing request.
///
/// The first matching rule wins: a non-empty search, then the sort modes, then a
/// cleared or absent sort, and finally any other `sortby` value as a tag label.
pub fn build_listing_query(params: &ListingParams) -> QueryDescriptor {
    if let Some(search) = params.search.as_deref().filter(|s| !s.is_empty()) {
        return QueryDescriptor {
            filter: CampgroundFilter::TextSearch {
                pattern: sanitize_for_pattern_match(search),
            },
            sort: None,
        };
    }

    match params.sort_by.as_deref() {
        Some(SORT_HIGHEST_RATED) => {
            QueryDescriptor::sorted(SortField::Rating, SortDirection::Descending)
        }
        Some(SORT_LOWEST_PRICE) => QueryDescriptor::sorted(SortField::Price, SortDirection::Ascending),
        Some(SORT_HIGHEST_PRICE) => {
            QueryDescriptor::sorted(SortField::Price, SortDirection::Descending)
        }
        None | Some("") | Some(SORT_CLEAR) => QueryDescriptor::match_all(),
        Some(tag) => QueryDescriptor {
            filter: CampgroundFilter::TagIn {
                tags: vec![tag.to_string()],
            },
            sort: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(search: Option<&str>, sort_by: Option<&str>) -> ListingParams {
        ListingParams {
            search: search.map(str::to_string),
            sort_by: sort_by.map(str::to_string),
        }
    }

    #[test]
    fn test_search_matches_title_or_location() {
        let query = build_listing_query(&params(Some("big lake"), None));

        assert_eq!(
            query.filter,
            CampgroundFilter::TextSearch {
                pattern: "big\\ lake".to_string()
            }
        );
        assert_eq!(query.sort, None);
        assert!(query.is_search());
    }

    #[test]
    fn test_search_takes_precedence_over_sort() {
        let query = build_listing_query(&params(Some("lake"), Some("lowestPrice")));

        assert!(query.is_search());
        assert_eq!(query.sort, None);
    }

    #[test]
    fn test_empty_search_falls_through_to_sort() {
        let query = build_listing_query(&params(Some(""), Some("lowestPrice")));

        assert!(!query.is_search());
        assert_eq!(
            query,
            QueryDescriptor::sorted(SortField::Price, SortDirection::Ascending)
        );
    }

    #[test]
    fn test_sort_modes() {
        assert_eq!(
            build_listing_query(&params(None, Some("higestRated"))),
            QueryDescriptor::sorted(SortField::Rating, SortDirection::Descending)
        );
        assert_eq!(
            build_listing_query(&params(None, Some("lowestPrice"))),
            QueryDescriptor::sorted(SortField::Price, SortDirection::Ascending)
        );
        assert_eq!(
            build_listing_query(&params(None, Some("highestPrice"))),
            QueryDescriptor::sorted(SortField::Price, SortDirection::Descending)
        );
    }

    #[test]
    fn test_clear_absent_and_empty_sort_match_everything() {
        for query in [
            build_listing_query(&params(None, Some("clear"))),
            build_listing_query(&params(None, None)),
            build_listing_query(&params(None, Some(""))),
            build_listing_query(&ListingParams::default()),
        ] {
            assert_eq!(query, QueryDescriptor::match_all());
        }
    }

    #[test]
    fn test_unknown_sort_is_a_tag_filter() {
        let query = build_listing_query(&params(None, Some("Lakeside")));

        assert_eq!(
            query.filter,
            CampgroundFilter::TagIn {
                tags: vec!["Lakeside".to_string()]
            }
        );
        assert_eq!(query.sort, None);
        assert!(!query.is_search());
    }

    #[test]
    fn test_correctly_spelled_rating_sort_is_treated_as_tag() {
        let query = build_listing_query(&params(None, Some("highestRated")));

        assert_eq!(
            query.filter,
            CampgroundFilter::TagIn {
                tags: vec!["highestRated".to_string()]
            }
        );
    }
}

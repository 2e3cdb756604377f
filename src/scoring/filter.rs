use super::config::HardFilters;
use crate::listing::Listing;

/// Check one listing against the hard constraints.
///
/// Unset constraints and empty allow-lists pass everything, and a constraint
/// only rejects when the listing actually has the attribute it compares.
pub fn passes_filters(listing: &Listing, filters: Option<&HardFilters>) -> bool {
    let Some(filters) = filters else {
        return true;
    };

    if !allowed(&filters.age_categories_allowed, listing.age_category.as_deref()) {
        return false;
    }

    if let Some(year) = listing.year {
        if filters.min_year.is_some_and(|min| year < min) {
            return false;
        }
        if filters.max_year.is_some_and(|max| year > max) {
            return false;
        }
    }

    if let Some(price) = listing.price {
        if filters.min_price.is_some_and(|min| price < min) {
            return false;
        }
        if filters.max_price.is_some_and(|max| price > max) {
            return false;
        }
    }

    if let (Some(max), Some(miles)) = (filters.max_miles, listing.miles) {
        if miles > max {
            return false;
        }
    }

    if let (Some(required), Some(rows)) = (filters.required_rows, listing.rows) {
        if rows < required {
            return false;
        }
    }

    allowed(&filters.required_drivetrains, listing.drivetrain.as_deref())
        && allowed(&filters.allowed_makes, listing.make.as_deref())
        && allowed(&filters.allowed_models, listing.model.as_deref())
        && allowed(&filters.allowed_trims, listing.trim.as_deref())
}

/// Keep only the listings that pass every constraint, preserving order.
pub fn filter_listings<'a>(listings: &'a [Listing], filters: Option<&HardFilters>) -> Vec<&'a Listing> {
    listings
        .iter()
        .filter(|l| passes_filters(l, filters))
        .collect()
}

fn allowed(list: &Option<Vec<String>>, value: Option<&str>) -> bool {
    match (list, value) {
        (Some(list), Some(value)) if !list.is_empty() => list
            .iter()
            .any(|candidate| candidate.trim().eq_ignore_ascii_case(value.trim())),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_listing(id: &str) -> Listing {
        Listing {
            year: Some(2017),
            rows: Some(3),
            drivetrain: Some("AWD".to_string()),
            make: Some("Honda".to_string()),
            model: Some("Pilot".to_string()),
            trim: Some("EX-L".to_string()),
            age_category: Some("used".to_string()),
            price: Some(15_000),
            miles: Some(80_000),
            ..Listing::new(id)
        }
    }

    #[test]
    fn test_no_filters_passes_everything() {
        assert!(passes_filters(&create_test_listing("a"), None));
        assert!(passes_filters(
            &create_test_listing("a"),
            Some(&HardFilters::default())
        ));
    }

    #[test]
    fn test_year_range() {
        let filters = HardFilters {
            min_year: Some(2018),
            ..HardFilters::default()
        };
        assert!(!passes_filters(&create_test_listing("a"), Some(&filters)));

        let filters = HardFilters {
            min_year: Some(2015),
            max_year: Some(2017),
            ..HardFilters::default()
        };
        assert!(passes_filters(&create_test_listing("a"), Some(&filters)));

        let filters = HardFilters {
            max_year: Some(2016),
            ..HardFilters::default()
        };
        assert!(!passes_filters(&create_test_listing("a"), Some(&filters)));
    }

    #[test]
    fn test_required_rows() {
        let filters = HardFilters {
            required_rows: Some(3),
            ..HardFilters::default()
        };
        let mut two_rows = create_test_listing("two");
        two_rows.rows = Some(2);

        assert!(passes_filters(&create_test_listing("three"), Some(&filters)));
        assert!(!passes_filters(&two_rows, Some(&filters)));
    }

    #[test]
    fn test_missing_attribute_never_rejects() {
        let filters = HardFilters {
            min_year: Some(2020),
            required_rows: Some(3),
            required_drivetrains: Some(vec!["AWD".to_string()]),
            allowed_makes: Some(vec!["Toyota".to_string()]),
            max_miles: Some(10),
            ..HardFilters::default()
        };
        assert!(passes_filters(&Listing::new("bare"), Some(&filters)));
    }

    #[test]
    fn test_text_filters_case_insensitive() {
        let filters = HardFilters {
            required_drivetrains: Some(vec!["awd".to_string(), "4x4".to_string()]),
            allowed_makes: Some(vec!["HONDA".to_string()]),
            allowed_models: Some(vec![" pilot ".to_string()]),
            allowed_trims: Some(vec!["ex-l".to_string()]),
            age_categories_allowed: Some(vec!["USED".to_string()]),
            ..HardFilters::default()
        };
        assert!(passes_filters(&create_test_listing("a"), Some(&filters)));
    }

    #[test]
    fn test_allow_list_rejects_other_values() {
        let filters = HardFilters {
            allowed_makes: Some(vec!["Toyota".to_string()]),
            ..HardFilters::default()
        };
        assert!(!passes_filters(&create_test_listing("a"), Some(&filters)));
    }

    #[test]
    fn test_empty_allow_list_is_unset() {
        let filters = HardFilters {
            allowed_makes: Some(vec![]),
            ..HardFilters::default()
        };
        assert!(passes_filters(&create_test_listing("a"), Some(&filters)));
    }

    #[test]
    fn test_price_and_miles() {
        let filters = HardFilters {
            max_price: Some(14_000),
            ..HardFilters::default()
        };
        assert!(!passes_filters(&create_test_listing("a"), Some(&filters)));

        let filters = HardFilters {
            min_price: Some(10_000),
            max_miles: Some(90_000),
            ..HardFilters::default()
        };
        assert!(passes_filters(&create_test_listing("a"), Some(&filters)));

        let filters = HardFilters {
            max_miles: Some(50_000),
            ..HardFilters::default()
        };
        assert!(!passes_filters(&create_test_listing("a"), Some(&filters)));
    }

    #[test]
    fn test_filter_listings_preserves_order() {
        let mut old = create_test_listing("old");
        old.year = Some(2010);
        let listings = vec![
            create_test_listing("a"),
            old,
            create_test_listing("b"),
        ];
        let filters = HardFilters {
            min_year: Some(2015),
            ..HardFilters::default()
        };

        let kept = filter_listings(&listings, Some(&filters));
        let ids: Vec<&str> = kept.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}

use super::config::MatchConfig;

/// Validate matching configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_matching(config: &MatchConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(ref groups) = config.importance.groups {
        for (group, importance) in groups {
            check_importance(
                &mut errors,
                &format!("matching.importance.groups.{}", group),
                *importance,
            );
        }
    }

    if let Some(ref subcriteria) = config.importance.subcriteria {
        for (group, entries) in subcriteria {
            for (sub, importance) in entries {
                let path = format!("matching.importance.subcriteria.{}.{}", group, sub);
                if sub.group() != *group {
                    errors.push(format!(
                        "{}: '{}' belongs to group '{}', not '{}'",
                        path,
                        sub,
                        sub.group(),
                        group
                    ));
                }
                check_importance(&mut errors, &path, *importance);
            }
        }
    }

    for (name, weight) in config.flat_weights.entries() {
        if !(0..=5).contains(&weight) {
            errors.push(format!(
                "matching.flat_weights.{}: must be between 0 and 5, got {}",
                name, weight
            ));
        }
    }

    if let Some(ref filters) = config.filters {
        if let (Some(min), Some(max)) = (filters.min_year, filters.max_year) {
            if min > max {
                errors.push(format!(
                    "matching.filters.min_year: {} is greater than max_year {}",
                    min, max
                ));
            }
        }

        if let (Some(min), Some(max)) = (filters.min_price, filters.max_price) {
            if min > max {
                errors.push(format!(
                    "matching.filters.min_price: {} is greater than max_price {}",
                    min, max
                ));
            }
        }

        if filters.required_rows == Some(0) {
            errors.push("matching.filters.required_rows: must be at least 1".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_importance(errors: &mut Vec<String>, path: &str, importance: i32) {
    if !(1..=5).contains(&importance) {
        errors.push(format!(
            "{}: must be between 1 and 5, got {}",
            path, importance
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{FlatWeights, Group, HardFilters, ImportanceConfig, Subcriterion};
    use std::collections::BTreeMap;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_matching(&MatchConfig::default()).is_ok());
    }

    #[test]
    fn test_group_importance_out_of_range() {
        let config = MatchConfig {
            importance: ImportanceConfig {
                groups: Some(BTreeMap::from([(Group::Fit, 7), (Group::Risk, 0)])),
                subcriteria: None,
            },
            ..MatchConfig::default()
        };
        let errors = validate_matching(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .any(|e| e == "matching.importance.groups.fit: must be between 1 and 5, got 7"));
        assert!(errors.iter().any(|e| e.contains("groups.risk")));
    }

    #[test]
    fn test_subcriterion_in_wrong_group() {
        let config = MatchConfig {
            importance: ImportanceConfig {
                groups: None,
                subcriteria: Some(BTreeMap::from([(
                    Group::Economic,
                    BTreeMap::from([(Subcriterion::Miles, 4)]),
                )])),
            },
            ..MatchConfig::default()
        };
        let errors = validate_matching(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("matching.importance.subcriteria.economic.miles"));
        assert!(errors[0].contains("belongs to group 'condition'"));
    }

    #[test]
    fn test_flat_weight_out_of_range() {
        let config = MatchConfig {
            flat_weights: FlatWeights {
                awd: 6,
                price: -1,
                ..FlatWeights::default()
            },
            ..MatchConfig::default()
        };
        let errors = validate_matching(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.contains("matching.flat_weights.awd")));
        assert!(errors.iter().any(|e| e.contains("matching.flat_weights.price")));
    }

    #[test]
    fn test_inverted_ranges() {
        let config = MatchConfig {
            filters: Some(HardFilters {
                min_year: Some(2020),
                max_year: Some(2015),
                min_price: Some(30_000),
                max_price: Some(10_000),
                required_rows: Some(0),
                ..HardFilters::default()
            }),
            ..MatchConfig::default()
        };
        let errors = validate_matching(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("min_year"));
        assert!(errors[1].contains("min_price"));
        assert!(errors[2].contains("required_rows"));
    }

    #[test]
    fn test_equal_bounds_are_valid() {
        let config = MatchConfig {
            filters: Some(HardFilters {
                min_year: Some(2018),
                max_year: Some(2018),
                ..HardFilters::default()
            }),
            ..MatchConfig::default()
        };
        assert!(validate_matching(&config).is_ok());
    }
}

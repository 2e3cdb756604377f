use std::collections::BTreeMap;

use super::config::ImportanceConfig;
use super::criteria::{hierarchy, Group, Subcriterion};
use super::error::ScoringError;

/// Saaty-like scale indexed by importance 1..=5.
/// Higher importances are deliberately spread further apart.
pub const IMPORTANCE_SCALE: [f64; 5] = [1.0, 2.0, 4.0, 6.0, 9.0];

/// Importance assumed for any criterion the buyer did not mention.
pub const DEFAULT_IMPORTANCE: i32 = 3;

/// Map an importance level to its raw weight. Out-of-range levels are
/// clamped to 1..=5 first.
pub fn scale_weight(importance: i32) -> f64 {
    let idx = (importance.clamp(1, 5) - 1) as usize;
    IMPORTANCE_SCALE[idx]
}

/// Normalize raw non-negative weights so they sum to 1.
///
/// When every raw weight is zero or negative the mass is spread uniformly.
/// An empty map has no valid normalization and is a configuration error.
pub fn normalize_raw<K: Ord + Clone>(
    raw: &BTreeMap<K, f64>,
    level: &str,
) -> Result<BTreeMap<K, f64>, ScoringError> {
    if raw.is_empty() {
        return Err(ScoringError::EmptyImportance {
            level: level.to_string(),
        });
    }

    let clamped: BTreeMap<K, f64> = raw
        .iter()
        .map(|(k, v)| (k.clone(), v.max(0.0)))
        .collect();
    let total: f64 = clamped.values().sum();

    if total <= 0.0 {
        let n = clamped.len() as f64;
        return Ok(clamped.into_keys().map(|k| (k, 1.0 / n)).collect());
    }

    Ok(clamped.into_iter().map(|(k, v)| (k, v / total)).collect())
}

/// Convert importance levels (1..=5) into weights that sum to 1.
pub fn normalize_importance<K: Ord + Clone>(
    importance: &BTreeMap<K, i32>,
    level: &str,
) -> Result<BTreeMap<K, f64>, ScoringError> {
    let raw: BTreeMap<K, f64> = importance
        .iter()
        .map(|(k, imp)| (k.clone(), scale_weight(*imp)))
        .collect();
    normalize_raw(&raw, level)
}

/// Weights for both levels of the hierarchy plus the derived global weights.
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchicalWeights {
    pub groups: BTreeMap<Group, f64>,
    pub local: BTreeMap<Group, BTreeMap<Subcriterion, f64>>,
    pub global: BTreeMap<Subcriterion, f64>,
}

impl HierarchicalWeights {
    /// Derive weights for the built-in criteria hierarchy.
    pub fn derive(importance: &ImportanceConfig) -> Result<Self, ScoringError> {
        Self::derive_for(hierarchy(), importance)
    }

    /// Derive weights for an arbitrary hierarchy. Used directly by tests to
    /// exercise the degenerate cases.
    pub fn derive_for<I>(criteria: I, importance: &ImportanceConfig) -> Result<Self, ScoringError>
    where
        I: IntoIterator<Item = (Group, &'static [Subcriterion])>,
    {
        let criteria: Vec<(Group, &'static [Subcriterion])> = criteria.into_iter().collect();
        if criteria.is_empty() {
            return Err(ScoringError::EmptyHierarchy);
        }

        let group_importance: BTreeMap<Group, i32> = criteria
            .iter()
            .map(|(group, _)| (*group, importance.group_importance(*group)))
            .collect();
        let groups = normalize_importance(&group_importance, "groups")?;

        let mut local = BTreeMap::new();
        let mut global = BTreeMap::new();
        for (group, subs) in &criteria {
            let sub_importance: BTreeMap<Subcriterion, i32> = subs
                .iter()
                .map(|sub| (*sub, importance.sub_importance(*group, *sub)))
                .collect();
            let weights = normalize_importance(&sub_importance, group.as_str())?;

            let group_weight = groups.get(group).copied().unwrap_or(0.0);
            for (sub, w_local) in &weights {
                global.insert(*sub, group_weight * w_local);
            }
            local.insert(*group, weights);
        }

        Ok(Self {
            groups,
            local,
            global,
        })
    }

    pub fn global_weight(&self, sub: Subcriterion) -> f64 {
        self.global.get(&sub).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum(map: &BTreeMap<impl Ord, f64>) -> f64 {
        map.values().sum()
    }

    #[test]
    fn test_scale_weight_table() {
        assert_eq!(scale_weight(1), 1.0);
        assert_eq!(scale_weight(2), 2.0);
        assert_eq!(scale_weight(3), 4.0);
        assert_eq!(scale_weight(4), 6.0);
        assert_eq!(scale_weight(5), 9.0);
    }

    #[test]
    fn test_scale_weight_clamps() {
        assert_eq!(scale_weight(0), 1.0);
        assert_eq!(scale_weight(-7), 1.0);
        assert_eq!(scale_weight(12), 9.0);
    }

    #[test]
    fn test_normalize_importance_sums_to_one() {
        let importance = BTreeMap::from([("a", 5), ("b", 3), ("c", 1)]);
        let weights = normalize_importance(&importance, "test").unwrap();
        assert!((sum(&weights) - 1.0).abs() < 1e-12);
        // 9 / (9 + 4 + 1)
        assert!((weights["a"] - 9.0 / 14.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_empty_is_error() {
        let importance: BTreeMap<&str, i32> = BTreeMap::new();
        let err = normalize_importance(&importance, "groups").unwrap_err();
        assert_eq!(
            err,
            ScoringError::EmptyImportance {
                level: "groups".to_string()
            }
        );
    }

    #[test]
    fn test_normalize_raw_all_zero_is_uniform() {
        let raw = BTreeMap::from([("a", 0.0), ("b", -2.0), ("c", 0.0), ("d", 0.0)]);
        let weights = normalize_raw(&raw, "test").unwrap();
        for w in weights.values() {
            assert_eq!(*w, 0.25);
        }
    }

    #[test]
    fn test_default_group_weights() {
        let weights = HierarchicalWeights::derive(&ImportanceConfig::default()).unwrap();
        // defaults 5/4/5/4 -> 9/6/9/6 over 30
        assert!((weights.groups[&Group::Economic] - 0.3).abs() < 1e-12);
        assert!((weights.groups[&Group::Condition] - 0.2).abs() < 1e-12);
        assert!((weights.groups[&Group::Risk] - 0.3).abs() < 1e-12);
        assert!((weights.groups[&Group::Fit] - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_all_levels_sum_to_one() {
        let importance = ImportanceConfig {
            groups: Some(BTreeMap::from([(Group::Economic, 1), (Group::Fit, 5)])),
            subcriteria: Some(BTreeMap::from([(
                Group::Risk,
                BTreeMap::from([(Subcriterion::TitleCondition, 2)]),
            )])),
        };
        let weights = HierarchicalWeights::derive(&importance).unwrap();

        assert!((sum(&weights.groups) - 1.0).abs() < 1e-9);
        for local in weights.local.values() {
            assert!((sum(local) - 1.0).abs() < 1e-9);
        }
        assert!((sum(&weights.global) - 1.0).abs() < 1e-9);
        assert_eq!(weights.global.len(), 14);
    }

    #[test]
    fn test_global_is_group_times_local() {
        let weights = HierarchicalWeights::derive(&ImportanceConfig::default()).unwrap();
        let group = weights.groups[&Group::Economic];
        let local = weights.local[&Group::Economic][&Subcriterion::Price];
        assert!((weights.global_weight(Subcriterion::Price) - group * local).abs() < 1e-15);
    }

    #[test]
    fn test_empty_hierarchy_is_error() {
        let err =
            HierarchicalWeights::derive_for(Vec::new(), &ImportanceConfig::default()).unwrap_err();
        assert_eq!(err, ScoringError::EmptyHierarchy);
    }

    #[test]
    fn test_group_without_subcriteria_is_error() {
        let criteria: Vec<(Group, &'static [Subcriterion])> = vec![
            (Group::Economic, &[Subcriterion::Price]),
            (Group::Fit, &[]),
        ];
        let err =
            HierarchicalWeights::derive_for(criteria, &ImportanceConfig::default()).unwrap_err();
        assert!(matches!(err, ScoringError::EmptyImportance { level } if level == "fit"));
    }
}

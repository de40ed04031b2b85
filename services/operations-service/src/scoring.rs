use ooh_common::env_or;

use crate::models::{Geography, Mounter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoringConfig {
    pub zone_weight: i64,
    pub sub_zone_weight: i64,
    pub area_weight: i64,
    pub workload_penalty: i64,
    pub over_capacity_penalty: i64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            zone_weight: 100,
            sub_zone_weight: 50,
            area_weight: 25,
            workload_penalty: 10,
            over_capacity_penalty: 1000,
        }
    }
}

impl ScoringConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            zone_weight: env_or("SCORING_ZONE_WEIGHT", defaults.zone_weight),
            sub_zone_weight: env_or("SCORING_SUB_ZONE_WEIGHT", defaults.sub_zone_weight),
            area_weight: env_or("SCORING_AREA_WEIGHT", defaults.area_weight),
            workload_penalty: env_or("SCORING_WORKLOAD_PENALTY", defaults.workload_penalty),
            over_capacity_penalty: env_or(
                "SCORING_OVER_CAPACITY_PENALTY",
                defaults.over_capacity_penalty,
            ),
        }
    }
}

/// Ranks a mounter for one site. Higher is better; the planner only compares
/// scores, so any scale works.
pub trait AffinityScorer: Send + Sync {
    fn compute_affinity_score(&self, mounter: &Mounter, site: &Geography, workload: i64) -> i64;
}

/// Prefers mounters based close to the site and with few open tasks.
#[derive(Clone)]
pub struct GeographicScorer {
    config: ScoringConfig,
}

impl GeographicScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }
}

impl AffinityScorer for GeographicScorer {
    fn compute_affinity_score(&self, mounter: &Mounter, site: &Geography, workload: i64) -> i64 {
        let home = &mounter.home;
        let mut score: i64 = 0;

        // Weights come from the environment; saturate instead of overflowing.
        if same_place(&home.zone, &site.zone) {
            score = score.saturating_add(self.config.zone_weight);
        }
        if same_place(&home.sub_zone, &site.sub_zone) {
            score = score.saturating_add(self.config.sub_zone_weight);
        }
        if same_place(&home.area, &site.area) {
            score = score.saturating_add(self.config.area_weight);
        }

        score = score.saturating_sub(self.config.workload_penalty.saturating_mul(workload));

        if workload >= i64::from(mounter.daily_capacity) {
            score = score.saturating_sub(self.config.over_capacity_penalty);
        }

        score
    }
}

// Exact, case-sensitive; a missing value on either side never matches.
fn same_place(left: &Option<String>, right: &Option<String>) -> bool {
    matches!((left, right), (Some(left), Some(right)) if left == right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn mounter(zone: Option<&str>, sub_zone: Option<&str>, area: Option<&str>) -> Mounter {
        Mounter {
            id: Uuid::new_v4(),
            name: "crew".to_string(),
            home: Geography {
                zone: zone.map(str::to_string),
                sub_zone: sub_zone.map(str::to_string),
                area: area.map(str::to_string),
            },
            daily_capacity: 5,
            is_active: true,
        }
    }

    fn site(zone: &str, sub_zone: &str, area: &str) -> Geography {
        Geography {
            zone: Some(zone.to_string()),
            sub_zone: Some(sub_zone.to_string()),
            area: Some(area.to_string()),
        }
    }

    #[test]
    fn full_match_adds_all_weights() {
        let scorer = GeographicScorer::new(ScoringConfig::default());
        let crew = mounter(Some("North"), Some("N1"), Some("Airport"));
        let score = scorer.compute_affinity_score(&crew, &site("North", "N1", "Airport"), 0);
        assert_eq!(score, 175);
    }

    #[test]
    fn match_is_case_sensitive_and_ignores_missing() {
        let scorer = GeographicScorer::new(ScoringConfig::default());
        let crew = mounter(Some("north"), None, Some("Airport"));
        let score = scorer.compute_affinity_score(&crew, &site("North", "N1", "Airport"), 0);
        assert_eq!(score, 25);

        let blank_site = Geography::default();
        let crew = mounter(None, None, None);
        assert_eq!(scorer.compute_affinity_score(&crew, &blank_site, 0), 0);
    }

    #[test]
    fn workload_and_capacity_penalties() {
        let scorer = GeographicScorer::new(ScoringConfig::default());
        let crew = mounter(Some("North"), None, None);
        let target = site("North", "N1", "Airport");

        assert_eq!(scorer.compute_affinity_score(&crew, &target, 3), 70);
        // capacity is 5: at capacity the soft exclusion kicks in
        assert_eq!(scorer.compute_affinity_score(&crew, &target, 5), 100 - 50 - 1000);
    }

    #[test]
    fn huge_configured_penalties_saturate() {
        let config = ScoringConfig {
            zone_weight: i64::MAX,
            sub_zone_weight: i64::MAX,
            area_weight: 0,
            workload_penalty: i64::MAX,
            over_capacity_penalty: i64::MAX,
        };
        let scorer = GeographicScorer::new(config);
        let crew = mounter(Some("North"), Some("N1"), None);
        let target = site("North", "N1", "Airport");

        assert_eq!(scorer.compute_affinity_score(&crew, &target, 0), i64::MAX);
        assert_eq!(scorer.compute_affinity_score(&crew, &target, 3), 0);
        assert_eq!(scorer.compute_affinity_score(&crew, &target, 9), i64::MIN + 1);
    }

    #[test]
    fn weights_come_from_config() {
        let config = ScoringConfig {
            zone_weight: 7,
            sub_zone_weight: 0,
            area_weight: 0,
            workload_penalty: 1,
            over_capacity_penalty: 0,
        };
        let scorer = GeographicScorer::new(config.clone());
        let crew = mounter(Some("North"), Some("N1"), None);
        assert_eq!(
            scorer.compute_affinity_score(&crew, &site("North", "N1", "Airport"), 2),
            5
        );
        assert_eq!(scorer.config(), &config);
    }
}

use crate::models::{FeatureSet, Owner, PlaybookItem};

pub fn build_playbook(features: &FeatureSet, risk_score: i32) -> Vec<PlaybookItem> {
    let mut items = Vec::new();

    if risk_score > 70 {
        items.push(PlaybookItem {
            owner: Owner::Csm,
            action: "Schedule immediate health check call".to_string(),
            eta_days: 2,
        });
        items.push(PlaybookItem {
            owner: Owner::Support,
            action: "Review and prioritize outstanding tickets".to_string(),
            eta_days: 1,
        });
    } else if risk_score > 50 {
        items.push(PlaybookItem {
            owner: Owner::Csm,
            action: "Conduct quarterly business review".to_string(),
            eta_days: 7,
        });
    }

    // Expansion is orthogonal to retention; appended regardless of risk tier.
    if features.license_utilization > 0.85 {
        items.push(PlaybookItem {
            owner: Owner::Sales,
            action: "Present seat expansion proposal".to_string(),
            eta_days: 14,
        });
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(utilization: f64) -> FeatureSet {
        FeatureSet {
            dau_trend_mom: 0.0,
            license_utilization: utilization,
            sev1_last_14d: 0,
        }
    }

    #[test]
    fn high_risk_gets_both_escalation_items() {
        let items = build_playbook(&features(0.7), 80);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].owner, Owner::Csm);
        assert_eq!(items[0].eta_days, 2);
        assert_eq!(items[1].owner, Owner::Support);
        assert_eq!(items[1].eta_days, 1);
    }

    #[test]
    fn medium_risk_gets_the_business_review() {
        let items = build_playbook(&features(0.7), 65);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].owner, Owner::Csm);
        assert_eq!(items[0].action, "Conduct quarterly business review");
        assert_eq!(items[0].eta_days, 7);
    }

    #[test]
    fn low_risk_low_utilization_is_empty() {
        assert!(build_playbook(&features(0.7), 50).is_empty());
    }

    #[test]
    fn seat_expansion_appends_for_any_risk_tier() {
        let low = build_playbook(&features(0.9), 40);
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].owner, Owner::Sales);
        assert_eq!(low[0].eta_days, 14);

        let high = build_playbook(&features(0.9), 90);
        assert_eq!(high.len(), 3);
        assert_eq!(high[2].owner, Owner::Sales);
    }
}

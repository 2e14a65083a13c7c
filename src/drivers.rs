use crate::models::{FeatureSet, Opportunity, RiskDriver};

/// Check order is fixed (DAU, utilization, tickets); the list is never
/// re-sorted by weight.
pub fn risk_drivers(features: &FeatureSet) -> Vec<RiskDriver> {
    let mut drivers = Vec::new();

    if features.dau_trend_mom < -0.05 {
        drivers.push(RiskDriver {
            signal: "Declining DAU".to_string(),
            weight: 0.8,
            explanation: format!(
                "Daily active users fell {:.1}% month over month",
                features.dau_trend_mom.abs() * 100.0
            ),
        });
    }

    if features.license_utilization < 0.60 {
        drivers.push(RiskDriver {
            signal: "Low License Utilization".to_string(),
            weight: 0.6,
            explanation: format!(
                "Only {:.1}% of licensed seats are in use",
                features.license_utilization * 100.0
            ),
        });
    }

    if features.sev1_last_14d > 0 {
        drivers.push(RiskDriver {
            signal: "Critical Support Issues".to_string(),
            weight: 0.7,
            explanation: format!(
                "{} severity-1 ticket(s) opened in the last 14 days",
                features.sev1_last_14d
            ),
        });
    }

    drivers
}

pub fn opportunities(features: &FeatureSet, snippets: &[String]) -> Vec<Opportunity> {
    let mut opportunities = Vec::new();

    if features.license_utilization > 0.85 {
        opportunities.push(Opportunity {
            opportunity: "Seat Expansion".to_string(),
            description: format!(
                "License utilization at {:.1}%; the account is close to its seat cap",
                features.license_utilization * 100.0
            ),
        });
    }

    let text = snippets.join(" ").to_lowercase();
    if text.contains("team") {
        opportunities.push(Opportunity {
            opportunity: "Teams Feature".to_string(),
            description: "Notes mention team workflows; demo the Teams feature".to_string(),
        });
    }
    if text.contains("api") {
        opportunities.push(Opportunity {
            opportunity: "API Tier Upgrade".to_string(),
            description: "Notes mention API usage; propose a higher API tier".to_string(),
        });
    }

    opportunities
}

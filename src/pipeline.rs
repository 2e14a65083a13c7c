use chrono::NaiveDate;

use crate::comms::build_comms;
use crate::drivers::{opportunities, risk_drivers};
use crate::features::compute_features;
use crate::models::{AnalysisResult, TicketRecord, UsageRecord};
use crate::playbook::build_playbook;
use crate::redact::Redactor;
use crate::scoring::score;

/// First two non-blank lines of the redacted notes; they feed keyword
/// opportunities and the email draft.
pub fn snippets(notes: &str) -> Vec<String> {
    notes
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(2)
        .map(str::to_string)
        .collect()
}

/// Straight-line composition of the scoring pipeline. Every step is total,
/// so a single invocation cannot partially fail.
pub fn run(
    account_id: &str,
    usage: &[UsageRecord],
    tickets: &[TicketRecord],
    notes: &str,
    redactor: &dyn Redactor,
    now: NaiveDate,
) -> AnalysisResult {
    let redacted = redactor.redact(notes);
    let snippets = snippets(&redacted);
    let features = compute_features(usage, tickets, now);
    let risk_score = score(&features);
    let risk_drivers = risk_drivers(&features);
    let expansion_ops = opportunities(&features, &snippets);
    let playbook = build_playbook(&features, risk_score);
    let comms = build_comms(account_id, risk_score, &snippets);

    AnalysisResult {
        account_id: account_id.to_string(),
        risk_score,
        risk_drivers,
        expansion_ops,
        playbook,
        comms,
        metrics: features,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Owner;
    use crate::redact::Passthrough;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 6).unwrap()
    }

    fn daily_usage(dau: &[f64], used_seats: f64, licensed_seats: f64) -> Vec<UsageRecord> {
        dau.iter()
            .enumerate()
            .map(|(i, &value)| UsageRecord {
                date: (today() - Duration::days((dau.len() - 1 - i) as i64)).to_string(),
                dau: value,
                used_seats,
                licensed_seats,
            })
            .collect()
    }

    fn sev1_ticket(created_at: &str) -> TicketRecord {
        TicketRecord {
            ticket_id: Some("T-001".to_string()),
            severity: 1,
            created_at: created_at.to_string(),
        }
    }

    #[test]
    fn snippets_take_first_two_non_blank_trimmed_lines() {
        let notes = "\n\n  first line  \n\nsecond line\nthird line\n";
        assert_eq!(snippets(notes), vec!["first line", "second line"]);
        assert!(snippets("").is_empty());
        assert!(snippets("\n \n\t\n").is_empty());
    }

    #[test]
    fn flat_usage_scores_the_neutral_baseline() {
        let usage = daily_usage(&[100.0; 14], 50.0, 100.0);
        let result = run("ACME_CORP", &usage, &[], "", &Passthrough, today());

        assert_eq!(result.risk_score, 50);
        assert_eq!(result.metrics.dau_trend_mom, 0.0);
        assert_eq!(result.metrics.license_utilization, 0.5);
        assert_eq!(result.metrics.sev1_last_14d, 0);
        assert!(result.playbook.is_empty());
        assert!(result.expansion_ops.is_empty());
        // 50% seat usage still reads as underutilization.
        let signals: Vec<&str> = result.risk_drivers.iter().map(|d| d.signal.as_str()).collect();
        assert_eq!(signals, vec!["Low License Utilization"]);
    }

    #[test]
    fn single_sev1_ticket_moves_an_account_to_medium_risk() {
        let usage = vec![UsageRecord {
            date: today().to_string(),
            dau: 10.0,
            used_seats: 50.0,
            licensed_seats: 60.0,
        }];
        let tickets = vec![sev1_ticket(&today().to_string())];
        let result = run("ACME_CORP", &usage, &tickets, "", &Passthrough, today());

        assert_eq!(result.metrics.sev1_last_14d, 1);
        assert_eq!(result.metrics.license_utilization, 0.8333);
        assert_eq!(result.risk_score, 65);
        let signals: Vec<&str> = result.risk_drivers.iter().map(|d| d.signal.as_str()).collect();
        assert_eq!(signals, vec!["Critical Support Issues"]);
        assert!(result.expansion_ops.is_empty());
        assert_eq!(result.playbook.len(), 1);
        assert_eq!(result.playbook[0].action, "Conduct quarterly business review");
    }

    #[test]
    fn steep_dau_decline_escalates_to_high_risk() {
        let mut dau = vec![100.0; 7];
        dau.extend(vec![50.0; 7]);
        let usage = daily_usage(&dau, 70.0, 100.0);
        let result = run("ACME_CORP", &usage, &[], "", &Passthrough, today());

        assert_eq!(result.metrics.dau_trend_mom, -0.5);
        assert_eq!(result.risk_score, 80);
        assert_eq!(result.playbook.len(), 2);
        assert_eq!(result.playbook[0].owner, Owner::Csm);
        assert_eq!(result.playbook[1].owner, Owner::Support);
        let dau_driver = &result.risk_drivers[0];
        assert_eq!(dau_driver.signal, "Declining DAU");
        assert!(dau_driver.explanation.contains("50.0%"));
    }

    #[test]
    fn api_mention_in_notes_surfaces_an_expansion_opportunity() {
        let usage = daily_usage(&[100.0; 14], 70.0, 100.0);
        let notes = "Engineering asked about raising API rate limits.";
        let result = run("ACME_CORP", &usage, &[], notes, &Passthrough, today());

        let names: Vec<&str> = result
            .expansion_ops
            .iter()
            .map(|op| op.opportunity.as_str())
            .collect();
        assert_eq!(names, vec!["API Tier Upgrade"]);
        assert!(result.comms.client_email.contains("raising API rate limits"));
    }

    #[test]
    fn identical_inputs_and_now_yield_identical_results() {
        let mut dau = vec![100.0; 7];
        dau.extend(vec![80.0; 7]);
        let usage = daily_usage(&dau, 90.0, 100.0);
        let tickets = vec![sev1_ticket("2026-08-01"), sev1_ticket("bad date")];
        let notes = "Team keeps asking for the api.\nSecond note.";

        let first = run("ACME_CORP", &usage, &tickets, notes, &Passthrough, today());
        let second = run("ACME_CORP", &usage, &tickets, notes, &Passthrough, today());
        assert_eq!(first, second);
    }

    #[test]
    fn metrics_echo_the_feature_set() {
        let usage = daily_usage(&[100.0; 14], 95.0, 100.0);
        let result = run("ACME_CORP", &usage, &[], "", &Passthrough, today());
        assert_eq!(
            result.metrics,
            compute_features(&usage, &[], today())
        );
    }
}

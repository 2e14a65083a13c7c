use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::AnalysisResult;

pub fn build_report(result: &AnalysisResult, generated_on: NaiveDate) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Renewal Risk Report: {}", result.account_id);
    let _ = writeln!(
        output,
        "Generated on {} (risk score {}/100)",
        generated_on, result.risk_score
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Metrics");
    let _ = writeln!(
        output,
        "- DAU trend month over month: {:+.1}%",
        result.metrics.dau_trend_mom * 100.0
    );
    let _ = writeln!(
        output,
        "- License utilization: {:.1}%",
        result.metrics.license_utilization * 100.0
    );
    let _ = writeln!(
        output,
        "- Severity-1 tickets in the last 14 days: {}",
        result.metrics.sev1_last_14d
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Risk Drivers");

    if result.risk_drivers.is_empty() {
        let _ = writeln!(output, "No risk drivers detected.");
    } else {
        for driver in result.risk_drivers.iter() {
            let _ = writeln!(
                output,
                "- {} (weight {:.1}): {}",
                driver.signal, driver.weight, driver.explanation
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Expansion Opportunities");

    if result.expansion_ops.is_empty() {
        let _ = writeln!(output, "No expansion signals in this window.");
    } else {
        for opportunity in result.expansion_ops.iter() {
            let _ = writeln!(
                output,
                "- {}: {}",
                opportunity.opportunity, opportunity.description
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Playbook");

    if result.playbook.is_empty() {
        let _ = writeln!(output, "No actions recommended.");
    } else {
        for item in result.playbook.iter() {
            let _ = writeln!(
                output,
                "- [{}] {} (within {} days)",
                item.owner.as_str(),
                item.action,
                item.eta_days
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Suggested Comms");
    let _ = writeln!(output);
    let _ = writeln!(output, "Internal:");
    let _ = writeln!(output);
    let _ = writeln!(output, "> {}", result.comms.internal_slack);
    let _ = writeln!(output);
    let _ = writeln!(output, "Client email draft:");
    let _ = writeln!(output);
    let _ = writeln!(output, "```");
    let _ = writeln!(output, "{}", result.comms.client_email.trim_end());
    let _ = writeln!(output, "```");

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline;
    use crate::redact::Passthrough;
    use crate::models::UsageRecord;
    use chrono::Duration;

    fn sample_result(now: NaiveDate) -> AnalysisResult {
        let usage: Vec<UsageRecord> = (0..14)
            .map(|i| UsageRecord {
                date: (now - Duration::days(13 - i)).to_string(),
                dau: if i < 7 { 120.0 } else { 60.0 },
                used_seats: 40.0,
                licensed_seats: 100.0,
            })
            .collect();
        pipeline::run("ACME_CORP", &usage, &[], "Ask about api tier.", &Passthrough, now)
    }

    #[test]
    fn report_renders_every_section() {
        let now = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let report = build_report(&sample_result(now), now);

        assert!(report.starts_with("# Renewal Risk Report: ACME_CORP"));
        for section in [
            "## Metrics",
            "## Risk Drivers",
            "## Expansion Opportunities",
            "## Playbook",
            "## Suggested Comms",
        ] {
            assert!(report.contains(section), "missing section {section}");
        }
        assert!(report.contains("Declining DAU"));
        assert!(report.contains("API Tier Upgrade"));
        assert!(report.contains("{{champion_name}}"));
    }

    #[test]
    fn empty_sections_fall_back_to_placeholders() {
        let now = NaiveDate::from_ymd_opt(2026, 8, 6).unwrap();
        let usage: Vec<UsageRecord> = (0..14)
            .map(|i| UsageRecord {
                date: (now - Duration::days(13 - i)).to_string(),
                dau: 100.0,
                used_seats: 70.0,
                licensed_seats: 100.0,
            })
            .collect();
        let result = pipeline::run("QUIET_CO", &usage, &[], "", &Passthrough, now);
        let report = build_report(&result, now);

        assert!(report.contains("No risk drivers detected."));
        assert!(report.contains("No expansion signals in this window."));
        assert!(report.contains("No actions recommended."));
    }
}

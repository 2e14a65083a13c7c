use crate::models::Comms;

/// Templated outreach drafts. Placeholder tokens are left unresolved for a
/// human to fill before anything is sent.
pub fn build_comms(account_id: &str, risk_score: i32, snippets: &[String]) -> Comms {
    let (internal_slack, subject) = if risk_score > 70 {
        (
            format!(
                ":rotating_light: {account_id} renewal risk at {risk_score}/100. \
                 Health check call needed within 48h."
            ),
            "Partnering on your team's success",
        )
    } else if risk_score > 50 {
        (
            format!(
                ":warning: {account_id} renewal risk at {risk_score}/100. \
                 Recommend scheduling a business review."
            ),
            "Checking in ahead of your renewal",
        )
    } else {
        (
            format!(
                ":white_check_mark: {account_id} renewal risk at {risk_score}/100. \
                 No immediate action needed."
            ),
            "A quick update from your account team",
        )
    };

    let mut client_email = format!(
        "Subject: {subject}\n\n\
         Hi {{{{champion_name}}}},\n\n\
         I wanted to check in on how your team is getting on with \
         {{{{product_name}}}} and make sure you have everything you need \
         ahead of your renewal.\n"
    );
    if let Some(first) = snippets.first() {
        client_email.push_str(&format!(
            "\nWe also noted on our side: \"{first}\" - happy to dig into that together.\n"
        ));
    }
    client_email.push_str("\nBest,\n{{sender_name}}\n");

    Comms {
        internal_slack,
        client_email,
    }
}

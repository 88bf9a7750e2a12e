// Rule selection
// Picks the most specific stored rule for a request user agent

use crate::entities::RuleRecord;

/// Longest matching user-agent matcher wins; equal lengths go to the lowest id.
pub fn select_user_agent_rule<'a>(
    rules: &'a [RuleRecord],
    user_agent: &str,
) -> Option<&'a RuleRecord> {
    rules
        .iter()
        .filter(|rule| rule.matches_user_agent(user_agent))
        .max_by(|a, b| {
            a.matcher_len()
                .cmp(&b.matcher_len())
                .then_with(|| b.id.cmp(&a.id))
        })
}

pub fn select_publisher_default(rules: &[RuleRecord]) -> Option<&RuleRecord> {
    rules
        .iter()
        .filter(|rule| rule.is_publisher_default())
        .min_by_key(|rule| rule.id)
}

pub fn select_rule<'a>(rules: &'a [RuleRecord], user_agent: &str) -> Option<&'a RuleRecord> {
    select_user_agent_rule(rules, user_agent).or_else(|| select_publisher_default(rules))
}

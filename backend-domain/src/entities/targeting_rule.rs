// Targeting rule entity
// A publisher rule, optionally scoped to a user-agent substring

use serde::{Deserialize, Serialize};

use crate::entities::PublisherConfig;
use crate::value_objects::LinkTarget;

pub const DEFAULT_SERP_TEMPLATE: &str = "SerpTemplate1.html";
pub const DEFAULT_KEYWORD_TEMPLATE: &str = "KeywordTemplate1.html";
pub const DEFAULT_COUNTRY_CODE: &str = "US";
pub const DEFAULT_RULE_NAME: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleAction {
    #[serde(default)]
    pub serp_template_id: String,
    #[serde(default)]
    pub keyword_template_id: String,
    #[serde(default)]
    pub block: bool,
    #[serde(default)]
    pub open_in_new_tab: bool,
}

impl Default for RuleAction {
    fn default() -> Self {
        Self {
            serp_template_id: DEFAULT_SERP_TEMPLATE.to_string(),
            keyword_template_id: DEFAULT_KEYWORD_TEMPLATE.to_string(),
            block: false,
            open_in_new_tab: false,
        }
    }
}

impl RuleAction {
    pub fn link_target(&self) -> LinkTarget {
        LinkTarget::from_new_tab_flag(self.open_in_new_tab)
    }
}

/// Resolved rule handed to the decision engine. Always an owned copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetingRule {
    pub id: i64,
    pub rule_name: String,
    pub publisher_id: i64,
    pub user_agent: String,
    pub country_code: String,
    pub action: RuleAction,
}

impl TargetingRule {
    pub fn default_rule() -> Self {
        Self {
            id: 0,
            rule_name: DEFAULT_RULE_NAME.to_string(),
            publisher_id: 0,
            user_agent: String::new(),
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
            action: RuleAction::default(),
        }
    }

    /// The built-in rule served when the publisher has no usable stored rule.
    pub fn is_builtin_default(&self) -> bool {
        self.id == 0
    }

    /// Keyword template for this request: the rule's own template, else the
    /// publisher's configured one, else the global default.
    pub fn keyword_template<'a>(&'a self, publisher: &'a PublisherConfig) -> &'a str {
        self.pick_template(
            &self.action.keyword_template_id,
            &publisher.keyword_template,
            DEFAULT_KEYWORD_TEMPLATE,
        )
    }

    /// Results-page template, resolved like [`TargetingRule::keyword_template`].
    pub fn serp_template<'a>(&'a self, publisher: &'a PublisherConfig) -> &'a str {
        self.pick_template(
            &self.action.serp_template_id,
            &publisher.serp_template,
            DEFAULT_SERP_TEMPLATE,
        )
    }

    fn pick_template<'a>(
        &self,
        from_rule: &'a str,
        from_publisher: &'a str,
        fallback: &'static str,
    ) -> &'a str {
        let from_rule = from_rule.trim();
        if !self.is_builtin_default() && !from_rule.is_empty() {
            return from_rule;
        }
        let from_publisher = from_publisher.trim();
        if from_publisher.is_empty() {
            fallback
        } else {
            from_publisher
        }
    }
}

/// Stored form of a rule. The action stays serialized until resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRecord {
    #[serde(default)]
    pub id: i64,
    pub rule_name: String,
    pub publisher_id: i64,
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub country_code: String,
    pub action: String,
}

impl RuleRecord {
    pub fn is_publisher_default(&self) -> bool {
        self.user_agent.trim().is_empty()
    }

    /// Case-insensitive substring match of the stored matcher against a request user agent.
    pub fn matches_user_agent(&self, user_agent: &str) -> bool {
        let matcher = self.user_agent.trim();
        if matcher.is_empty() {
            return false;
        }
        user_agent
            .to_ascii_lowercase()
            .contains(&matcher.to_ascii_lowercase())
    }

    pub fn matcher_len(&self) -> usize {
        self.user_agent.trim().chars().count()
    }

    pub fn decode_action(&self) -> Result<RuleAction, serde_json::Error> {
        serde_json::from_str(&self.action)
    }

    pub fn into_rule(self, action: RuleAction) -> TargetingRule {
        TargetingRule {
            id: self.id,
            rule_name: self.rule_name,
            publisher_id: self.publisher_id,
            user_agent: self.user_agent.trim().to_string(),
            country_code: self.country_code.trim().to_uppercase(),
            action,
        }
    }
}

/// Admin payload for creating or replacing a rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleUpsert {
    pub rule_name: String,
    pub publisher_id: i64,
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub country_code: String,
    #[serde(default)]
    pub action: RuleAction,
}

impl RuleUpsert {
    pub fn normalized(&self) -> Self {
        Self {
            rule_name: self.rule_name.trim().to_string(),
            publisher_id: self.publisher_id,
            user_agent: self.user_agent.trim().to_string(),
            country_code: self.country_code.trim().to_uppercase(),
            action: RuleAction {
                serp_template_id: self.action.serp_template_id.trim().to_string(),
                keyword_template_id: self.action.keyword_template_id.trim().to_string(),
                block: self.action.block,
                open_in_new_tab: self.action.open_in_new_tab,
            },
        }
    }

    pub fn to_record(&self) -> Result<RuleRecord, serde_json::Error> {
        Ok(RuleRecord {
            id: 0,
            rule_name: self.rule_name.clone(),
            publisher_id: self.publisher_id,
            user_agent: self.user_agent.clone(),
            country_code: self.country_code.clone(),
            action: serde_json::to_string(&self.action)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user_agent: &str, action: &str) -> RuleRecord {
        RuleRecord {
            id: 1,
            rule_name: "r".to_string(),
            publisher_id: 100,
            user_agent: user_agent.to_string(),
            country_code: "us".to_string(),
            action: action.to_string(),
        }
    }

    fn publisher(keyword_template: &str, serp_template: &str) -> PublisherConfig {
        PublisherConfig {
            publisher_id: 200,
            keyword_template: keyword_template.to_string(),
            serp_template: serp_template.to_string(),
            ..PublisherConfig::default()
        }
    }

    #[test]
    fn blank_rule_templates_defer_to_publisher_then_default() {
        let action = RuleAction {
            serp_template_id: " ".to_string(),
            keyword_template_id: String::new(),
            block: false,
            open_in_new_tab: true,
        };
        let rule = record("", "{}").into_rule(action);
        let configured = publisher("KeywordTemplate4.html", "SerpTemplate2.html");
        assert_eq!(rule.keyword_template(&configured), "KeywordTemplate4.html");
        assert_eq!(rule.serp_template(&configured), "SerpTemplate2.html");

        let unconfigured = publisher("", " ");
        assert_eq!(rule.keyword_template(&unconfigured), DEFAULT_KEYWORD_TEMPLATE);
        assert_eq!(rule.serp_template(&unconfigured), DEFAULT_SERP_TEMPLATE);
        assert_eq!(rule.action.link_target(), LinkTarget::NewTab);
    }

    #[test]
    fn builtin_default_rule_uses_publisher_templates() {
        let rule = TargetingRule::default_rule();
        assert!(rule.is_builtin_default());
        let configured = publisher("KeywordTemplate4.html", "SerpTemplate2.html");
        assert_eq!(rule.keyword_template(&configured), "KeywordTemplate4.html");
        assert_eq!(rule.serp_template(&configured), "SerpTemplate2.html");
        assert_eq!(
            rule.keyword_template(&PublisherConfig::default()),
            DEFAULT_KEYWORD_TEMPLATE
        );
    }

    #[test]
    fn stored_rule_template_wins_over_publisher() {
        let rule = record("", r#"{"keyword_template_id":"KeywordTemplate3.html"}"#);
        let action = rule.decode_action().expect("decode action");
        let rule = rule.into_rule(action);
        let configured = publisher("KeywordTemplate4.html", "SerpTemplate2.html");
        assert_eq!(rule.keyword_template(&configured), "KeywordTemplate3.html");
        assert_eq!(rule.serp_template(&configured), "SerpTemplate2.html");
    }

    #[test]
    fn user_agent_match_ignores_case_and_blank_matchers() {
        assert!(record("android", "{}").matches_user_agent("Mozilla/5.0 (Linux; Android 14)"));
        assert!(!record("iPhone", "{}").matches_user_agent("Mozilla/5.0 (Linux; Android 14)"));
        assert!(!record("  ", "{}").matches_user_agent("anything"));
    }

    #[test]
    fn partial_action_json_keeps_missing_flags_false() {
        let action = record("", r#"{"keyword_template_id":"KeywordTemplate3.html","block":true}"#)
            .decode_action()
            .expect("decode action");
        assert!(action.block);
        assert!(!action.open_in_new_tab);
        assert!(action.serp_template_id.is_empty());
        assert_eq!(action.keyword_template_id, "KeywordTemplate3.html");
    }

    #[test]
    fn into_rule_uppercases_country() {
        let rule = record("Android", "{}").into_rule(RuleAction::default());
        assert_eq!(rule.country_code, "US");
        assert_eq!(rule.user_agent, "Android");
    }

    #[test]
    fn upsert_round_trips_action_into_record() {
        let payload = RuleUpsert {
            rule_name: " android ".to_string(),
            publisher_id: 100,
            user_agent: " Android ".to_string(),
            country_code: "in".to_string(),
            action: RuleAction {
                open_in_new_tab: true,
                ..RuleAction::default()
            },
        }
        .normalized();
        let stored = payload.to_record().expect("record");
        assert_eq!(stored.rule_name, "android");
        assert_eq!(stored.country_code, "IN");
        assert!(stored.decode_action().expect("action").open_in_new_tab);
    }
}

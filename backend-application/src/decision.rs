use backend_domain::services::{count_slots, is_bot_user_agent};
use backend_domain::{
    AdListing, AdRequest, Decision, DecisionResult, Fetched, InventoryItem, KeywordFetchParams,
    KeywordRequest, PublisherConfig, TargetingRule, TemplateKind, DEFAULT_KEYWORD_TEMPLATE,
    DEFAULT_SERP_TEMPLATE,
};
use tracing::{debug, info, warn};

use crate::{AppError, AppState};

/// Slot budget for one template after the zero-capacity policy was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateCapacity {
    pub template: String,
    pub capacity: usize,
    pub fell_back: bool,
}

pub async fn decide_keywords(
    state: &AppState,
    request: &KeywordRequest,
) -> Result<Decision<InventoryItem>, AppError> {
    if is_bot_user_agent(&request.user_agent) {
        state.metrics.record_bot_rejection();
        info!(
            publisher_id = request.publisher_id,
            slot = request.slot.trim(),
            "bot user agent refused keyword delivery"
        );
        return Err(AppError::BotTraffic);
    }
    let slot = require_slot(&request.slot)?;

    let rule = state
        .rule_resolver
        .resolve(
            request.publisher_id,
            &request.user_agent,
            request.country_code.as_deref(),
        )
        .await;
    if rule.action.block {
        return Ok(blocked(state, rule, slot));
    }
    let publisher = state.publisher_configs.resolve(request.publisher_id).await;

    let capacity = template_capacity(
        state,
        rule.keyword_template(&publisher),
        TemplateKind::Keyword,
    )
    .await;

    let params = KeywordFetchParams {
        country_code: non_blank(request.country_code.as_deref())
            .map(str::to_uppercase)
            .unwrap_or_else(|| rule.country_code.clone()),
        layout_id: request
            .layout_id
            .filter(|value| *value > 0)
            .unwrap_or(publisher.layout_id),
        template_size: non_blank(request.template_size.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| publisher.template_size.clone()),
        domain: owned_non_blank(request.domain.as_deref()),
        referrer_url: owned_non_blank(request.referrer_url.as_deref()),
        page_title: owned_non_blank(request.page_title.as_deref()),
        keyword_ref: owned_non_blank(request.keyword_ref.as_deref()),
        max_results: capacity.capacity,
    };

    let fetched = state.keyword_fetcher.fetch_keywords(&params).await;
    let result = package(fetched, capacity, &rule, publisher, false);
    state.metrics.record_keyword_decision(result.source);
    debug!(
        publisher_id = request.publisher_id,
        slot,
        rule = %result.rule.rule_name,
        template = %result.template,
        capacity = result.capacity,
        delivered = result.items.len(),
        source = result.source.as_str(),
        "keyword decision"
    );
    Ok(Decision::Delivered(result))
}

pub async fn decide_ads(
    state: &AppState,
    request: &AdRequest,
) -> Result<Decision<AdListing>, AppError> {
    let slot = require_slot(&request.slot)?;
    let is_bot = is_bot_user_agent(&request.user_agent);

    let rule = state
        .rule_resolver
        .resolve(
            request.publisher_id,
            &request.user_agent,
            request.country_code.as_deref(),
        )
        .await;
    if rule.action.block {
        return Ok(blocked(state, rule, slot));
    }
    let publisher = state.publisher_configs.resolve(request.publisher_id).await;

    let mut capacity =
        template_capacity(state, rule.serp_template(&publisher), TemplateKind::Serp).await;
    if let Some(max_ads) = request.max_ads {
        if max_ads > 0 && max_ads < capacity.capacity {
            capacity.capacity = max_ads;
        }
    }

    let fetched = state.ad_fetcher.fetch_ads().await;
    let result = package(fetched, capacity, &rule, publisher, is_bot);
    state.metrics.record_ad_decision(result.source);
    debug!(
        publisher_id = request.publisher_id,
        slot,
        rule = %result.rule.rule_name,
        template = %result.template,
        capacity = result.capacity,
        delivered = result.items.len(),
        source = result.source.as_str(),
        is_bot,
        "ad decision"
    );
    Ok(Decision::Delivered(result))
}

/// Reads the template and counts its slots. Unreadable or marker-free templates
/// switch to the default template with the configured minimum.
pub async fn template_capacity(
    state: &AppState,
    template: &str,
    kind: TemplateKind,
) -> TemplateCapacity {
    let counted = match state.template_repo.read_template(template).await {
        Ok(markup) => count_slots(&markup, kind),
        Err(err) => {
            warn!(template, error = %err, "template unreadable");
            0
        }
    };
    if counted > 0 {
        return TemplateCapacity {
            template: template.to_string(),
            capacity: counted,
            fell_back: false,
        };
    }

    let (default_template, minimum) = match kind {
        TemplateKind::Keyword => (DEFAULT_KEYWORD_TEMPLATE, state.config.min_keyword_slots),
        TemplateKind::Serp => (DEFAULT_SERP_TEMPLATE, state.config.min_ad_slots),
    };
    warn!(
        template,
        fallback_template = default_template,
        capacity = minimum,
        kind = kind.as_str(),
        "template has no slots, using minimum capacity"
    );
    state.metrics.record_capacity_fallback();
    TemplateCapacity {
        template: default_template.to_string(),
        capacity: minimum.max(1),
        fell_back: true,
    }
}

/// Slot count of a template for display hints. Unlike [`template_capacity`] it
/// neither logs nor counts a fallback; unreadable or marker-free templates give
/// the configured minimum.
pub async fn capacity_hint(state: &AppState, template: &str, kind: TemplateKind) -> usize {
    let counted = match state.template_repo.read_template(template).await {
        Ok(markup) => count_slots(&markup, kind),
        Err(_) => 0,
    };
    if counted > 0 {
        return counted;
    }
    match kind {
        TemplateKind::Keyword => state.config.min_keyword_slots.max(1),
        TemplateKind::Serp => state.config.min_ad_slots.max(1),
    }
}

fn require_slot(slot: &str) -> Result<&str, AppError> {
    let slot = slot.trim();
    if slot.is_empty() {
        return Err(AppError::MissingSlot);
    }
    Ok(slot)
}

fn blocked<T>(state: &AppState, rule: TargetingRule, slot: &str) -> Decision<T> {
    state.metrics.record_blocked();
    info!(
        publisher_id = rule.publisher_id,
        rule_id = rule.id,
        rule = %rule.rule_name,
        slot,
        "delivery blocked by rule"
    );
    Decision::Blocked { rule }
}

fn package<T>(
    fetched: Fetched<T>,
    capacity: TemplateCapacity,
    rule: &TargetingRule,
    publisher: PublisherConfig,
    is_bot: bool,
) -> DecisionResult<T> {
    let mut items = fetched.items;
    items.truncate(capacity.capacity);
    DecisionResult {
        items,
        capacity: capacity.capacity,
        template: capacity.template,
        link_target: rule.action.link_target(),
        source: fetched.source,
        is_bot,
        rule: rule.clone(),
        publisher,
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn owned_non_blank(value: Option<&str>) -> Option<String> {
    non_blank(value).map(str::to_string)
}

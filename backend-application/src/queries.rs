pub mod click_stat_queries;
pub mod publisher_config_queries;
pub mod rule_queries;

pub mod publisher_config_resolver;
pub mod rule_resolver;

pub use publisher_config_resolver::PublisherConfigResolver;
pub use rule_resolver::RuleResolver;

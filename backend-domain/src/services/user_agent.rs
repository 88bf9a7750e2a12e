// User agent classification

pub fn is_bot_user_agent(user_agent: &str) -> bool {
    user_agent.to_ascii_lowercase().contains("bot")
}

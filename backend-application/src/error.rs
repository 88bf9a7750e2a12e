use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("slot is required")]
    MissingSlot,
    #[error("bot traffic is not served")]
    BotTraffic,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

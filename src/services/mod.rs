pub mod ai_service; // Model backend abstraction
pub mod carbon_estimator;
pub mod openrouter; // OpenRouter chat-completion backend

pub use carbon_estimator::CarbonEstimator;
pub use openrouter::OpenRouterService;

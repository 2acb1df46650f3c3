use serde_json::Value;
use std::sync::Arc;

use super::ai_service::{ModelBackend, ModelRequest};
use crate::error::{EstimateError, Result};
use crate::models::{EstimateResult, Ingredient};

pub const UNKNOWN_DISH: &str = "Unknown Dish";

const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 1000;

const FALLBACK_INGREDIENTS: [(&str, f64); 4] = [
    ("Mixed vegetables", 0.8),
    ("Grains/Rice", 1.2),
    ("Protein source", 2.1),
    ("Seasonings", 0.1),
];

/// Turns a dish name or a food photo into an [`EstimateResult`].
///
/// Both operations are total: any backend or parsing failure is logged and
/// replaced by [`fallback_estimate`]. Callers cannot tell a fallback from a
/// real estimate.
pub struct CarbonEstimator {
    backend: Arc<dyn ModelBackend>,
}

impl CarbonEstimator {
    pub fn new(backend: Arc<dyn ModelBackend>) -> Self {
        Self { backend }
    }

    pub async fn estimate_from_text(&self, dish_name: &str) -> EstimateResult {
        let request = ModelRequest {
            prompt: dish_prompt(dish_name),
            image_url: None,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        self.try_estimate(request).await.unwrap_or_else(|e| {
            log::warn!("⚠️ Estimating '{}' failed, using fallback: {}", dish_name, e);
            fallback_estimate(dish_name)
        })
    }

    /// `image_url` may be a remote URL or a `data:<mime>;base64,...` URI.
    pub async fn estimate_from_image(&self, image_url: &str) -> EstimateResult {
        let request = ModelRequest {
            prompt: image_prompt(),
            image_url: Some(image_url.to_string()),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        self.try_estimate(request).await.unwrap_or_else(|e| {
            log::warn!("⚠️ Estimating from image failed, using fallback: {}", e);
            fallback_estimate(UNKNOWN_DISH)
        })
    }

    async fn try_estimate(&self, request: ModelRequest) -> Result<EstimateResult> {
        let content = self.backend.complete(request).await?;
        log::debug!("💬 Model reply: {}", content);
        parse_estimate(&content)
    }
}

fn dish_prompt(dish_name: &str) -> String {
    format!(
        "Analyze the dish \"{dish_name}\" and estimate its carbon footprint.\n\
         \n\
         Please respond with ONLY a valid JSON object in this exact format:\n\
         {{\n  \
           \"dish\": \"{dish_name}\",\n  \
           \"estimated_carbon_kg\": <total_carbon_in_kg>,\n  \
           \"ingredients\": [\n    \
             {{\"name\": \"ingredient_name\", \"carbon_kg\": <carbon_value>}}\n  \
           ]\n\
         }}\n\
         \n\
         Consider typical ingredients, portion sizes, and carbon emissions from agriculture, \
         transport, and preparation. Include 3-6 main ingredients."
    )
}

fn image_prompt() -> String {
    "Analyze this food image and identify the dish and its ingredients. \
     Then estimate the carbon footprint.\n\
     \n\
     Please respond with ONLY a valid JSON object in this exact format:\n\
     {\n  \
       \"dish\": \"identified_dish_name\",\n  \
       \"estimated_carbon_kg\": <total_carbon_in_kg>,\n  \
       \"ingredients\": [\n    \
         {\"name\": \"ingredient_name\", \"carbon_kg\": <carbon_value>}\n  \
       ]\n\
     }\n\
     \n\
     Consider visible ingredients, estimated portion sizes, and carbon emissions from \
     agriculture, transport, and preparation."
        .to_string()
}

/// Greedy match from the first `{` to the last `}`.
///
/// Breaks on replies with several JSON blocks; swap in a real scanner here if
/// that starts happening.
fn extract_json_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (end > start).then(|| &content[start..=end])
}

fn parse_estimate(content: &str) -> Result<EstimateResult> {
    let json = extract_json_object(content).ok_or(EstimateError::NoJsonObject)?;
    let value: Value = serde_json::from_str(json).map_err(EstimateError::InvalidJson)?;
    validate_estimate(value)
}

fn validate_estimate(mut value: Value) -> Result<EstimateResult> {
    let dish = match value.get_mut("dish").map(Value::take) {
        Some(Value::String(dish)) if !dish.is_empty() => dish,
        _ => return Err(EstimateError::IncompleteEstimate { field: "dish" }),
    };

    // A zero total counts as missing, same as an absent field.
    let estimated_carbon_kg = value
        .get("estimated_carbon_kg")
        .and_then(Value::as_f64)
        .filter(|kg| *kg > 0.0)
        .ok_or(EstimateError::IncompleteEstimate {
            field: "estimated_carbon_kg",
        })?;

    let ingredients = value
        .get_mut("ingredients")
        .map(Value::take)
        .and_then(|raw| serde_json::from_value::<Vec<Ingredient>>(raw).ok())
        .filter(|list| {
            !list.is_empty()
                && list
                    .iter()
                    .all(|i| !i.name.is_empty() && i.carbon_kg >= 0.0)
        })
        .ok_or(EstimateError::IncompleteEstimate {
            field: "ingredients",
        })?;

    Ok(EstimateResult {
        dish,
        estimated_carbon_kg,
        ingredients,
    })
}

/// Canned estimate used whenever the backend cannot produce a usable reply.
pub fn fallback_estimate(dish_name: &str) -> EstimateResult {
    let ingredients: Vec<Ingredient> = FALLBACK_INGREDIENTS
        .iter()
        .map(|(name, kg)| Ingredient::new(*name, *kg))
        .collect();
    let total: f64 = ingredients.iter().map(|i| i.carbon_kg).sum();

    EstimateResult {
        dish: dish_name.to_string(),
        estimated_carbon_kg: (total * 100.0).round() / 100.0,
        ingredients,
    }
}

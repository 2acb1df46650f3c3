use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub carbon_kg: f64,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, carbon_kg: f64) -> Self {
        Self {
            name: name.into(),
            carbon_kg,
        }
    }
}

/// Normalized estimate returned for every request, real or fallback.
///
/// `estimated_carbon_kg` is the model's holistic figure and is not required
/// to match the sum of `ingredients`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateResult {
    pub dish: String,
    pub estimated_carbon_kg: f64,
    pub ingredients: Vec<Ingredient>,
}

/// Body of `POST /api/estimate`
#[derive(Debug, Clone, Deserialize)]
pub struct EstimateRequest {
    #[serde(default)]
    pub dish: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
    pub api_configured: bool,
    pub message: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct PingResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadedFile {
    pub originalname: String,
    pub mimetype: String,
    pub size: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestUploadResponse {
    pub success: bool,
    pub file: UploadedFile,
    pub message: &'static str,
}

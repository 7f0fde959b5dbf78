//! Data transfer objects (DTOs) for API requests and responses.
//!
//! - `requests`: AnalyzeRequest, GenerateRequest, GithubAnalyzeRequest, ValidateShapesRequest
//! - `responses`: AnalysisResponse, GenerationResponse, ValidationResponse, HealthResponse

pub mod requests;
pub mod responses;

pub use requests::*;
pub use responses::*;

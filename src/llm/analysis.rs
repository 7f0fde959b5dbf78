use crate::error::Result;
use crate::llm::client::{GeminiClient, ThinkingBudget};
use crate::llm::image::ImagePayload;
use crate::prompts::{self, AnalysisMode};

impl GeminiClient {
    /// Runs one of the fixed image analyses (labels, Mermaid cleanup, ...).
    pub async fn analyze(&self, mode: AnalysisMode, image: &ImagePayload) -> Result<String> {
        let template = mode.template();
        let prompt = template.render(&[])?;
        tracing::info!("Analyzing image ({} bytes) with {} v{}", image.data.len(), template.name, template.version);
        self.generate_content(&prompt, Some(image), ThinkingBudget::Analysis)
            .await
    }

    /// Turns a sketch into a JSON shape array.
    pub async fn transform(&self, image: &ImagePayload) -> Result<String> {
        let prompt = prompts::TRANSFORM.render(&[])?;
        tracing::info!("Transforming sketch ({} bytes)", image.data.len());
        self.generate_content(&prompt, Some(image), ThinkingBudget::Off).await
    }
}

//! Extraction service: model call followed by normalization.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use gstx_core::models::config::{GstxConfig, ImageConfig};
use gstx_core::{
    validate_upload, GstxError, ImagePreparer, InvoiceNormalizer, InvoiceRecord, PipelineError,
    UploadError,
};

use crate::model::{generate_with_retry, prompt, InvoiceModel, ModelError, ModelRequest};

/// Errors raised by the extraction service.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// No model is configured.
    #[error("no model configured")]
    NoModel,

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Model(#[from] ModelError),

    /// Image could not be decoded or re-encoded.
    #[error("{0}")]
    Image(#[from] GstxError),
}

/// Runs invoices through the model and the normalization pipeline.
pub struct ExtractionService {
    model: Option<Arc<dyn InvoiceModel>>,
    normalizer: InvoiceNormalizer,
    preparer: ImagePreparer,
    image_config: ImageConfig,
    max_attempts: u32,
}

impl ExtractionService {
    /// Create a service from configuration and an optional model.
    pub fn new(config: &GstxConfig, model: Option<Arc<dyn InvoiceModel>>) -> Self {
        Self {
            model,
            normalizer: InvoiceNormalizer::from_config(&config.pipeline),
            preparer: ImagePreparer::from_config(&config.image),
            image_config: config.image.clone(),
            max_attempts: config.model.max_attempts,
        }
    }

    /// Whether a model is available.
    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Name of the configured model, if any.
    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref().map(|m| m.name())
    }

    /// Normalize a raw model response without calling the model.
    pub fn normalize(&self, raw: &str) -> Result<InvoiceRecord, PipelineError> {
        self.normalizer.normalize(raw)
    }

    /// Extract an invoice from plain text.
    pub async fn extract_text(&self, invoice_text: &str) -> Result<InvoiceRecord, ServiceError> {
        if invoice_text.trim().is_empty() {
            return Err(PipelineError::EmptyInput.into());
        }

        let model = self.model.as_deref().ok_or(ServiceError::NoModel)?;
        info!("Extracting invoice from {} characters of text", invoice_text.len());

        let request = ModelRequest::text(prompt::text_prompt(invoice_text));
        let raw = generate_with_retry(model, &request, self.max_attempts).await?;

        Ok(self.normalizer.normalize(&raw)?)
    }

    /// Extract an invoice from an uploaded image.
    pub async fn extract_image(
        &self,
        filename: Option<&str>,
        bytes: &[u8],
    ) -> Result<InvoiceRecord, ServiceError> {
        validate_upload(filename, bytes.len() as u64, &self.image_config)?;
        let model = self.model.as_deref().ok_or(ServiceError::NoModel)?;

        let image = self.preparer.prepare(bytes)?;
        debug!("Prepared image {}x{} ({} bytes)", image.width, image.height, image.bytes.len());

        let request = ModelRequest::with_image(prompt::image_prompt(), image);
        let raw = generate_with_retry(model, &request, self.max_attempts).await?;

        Ok(self.normalizer.normalize(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, RgbImage};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::testing::ScriptedModel;

    const RESPONSE: &str = r#"```json
{"supplier_details":{"name":"Acme","gstin":"27AAPFU0939F1ZV","address":"Pune"},
 "recipient_details":{},"invoice_details":{"invoice_number":"INV-7"},
 "items":[],"total_values":{"total_invoice_value_numbers":"1180"},"additional_notes":{}}
```"#;

    fn service(model: Arc<ScriptedModel>) -> ExtractionService {
        let model: Arc<dyn InvoiceModel> = model;
        ExtractionService::new(&GstxConfig::default(), Some(model))
    }

    fn png_bytes() -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(8, 8))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[tokio::test]
    async fn test_extract_text() {
        let model = Arc::new(ScriptedModel::replying(RESPONSE));
        let record = service(model.clone()).extract_text("Tax Invoice INV-7").await.unwrap();

        assert_eq!(record.supplier_details.name, "Acme");
        assert_eq!(record.total_values.total_invoice_value_numbers, 1180.0);
        assert_eq!(record.items.len(), 1);

        let calls = model.calls.lock().unwrap();
        assert!(calls[0].prompt.ends_with("Tax Invoice INV-7"));
        assert!(calls[0].image.is_none());
    }

    #[tokio::test]
    async fn test_blank_text_never_calls_model() {
        let model = Arc::new(ScriptedModel::replying(RESPONSE));
        let err = service(model.clone()).extract_text("  \n").await.unwrap_err();

        assert!(matches!(err, ServiceError::Pipeline(PipelineError::EmptyInput)));
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_no_model() {
        let service = ExtractionService::new(&GstxConfig::default(), None);
        let err = service.extract_text("invoice").await.unwrap_err();
        assert!(matches!(err, ServiceError::NoModel));
    }

    #[tokio::test]
    async fn test_extract_image_sends_png() {
        let model = Arc::new(ScriptedModel::replying(RESPONSE));
        let record = service(model.clone())
            .extract_image(Some("scan.png"), &png_bytes())
            .await
            .unwrap();

        assert_eq!(record.invoice_details.invoice_number, "INV-7");
        let calls = model.calls.lock().unwrap();
        assert_eq!(calls[0].image.as_ref().unwrap().mime_type, "image/png");
    }

    #[tokio::test]
    async fn test_extract_image_rejects_extension() {
        let model = Arc::new(ScriptedModel::replying(RESPONSE));
        let err = service(model)
            .extract_image(Some("invoice.pdf"), &png_bytes())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Upload(UploadError::UnsupportedFormat(_))));
    }

    #[tokio::test]
    async fn test_unstructured_reply_is_pipeline_error() {
        let model = Arc::new(ScriptedModel::replying("I could not read this invoice."));
        let err = service(model).extract_text("blurry").await.unwrap_err();
        assert!(matches!(err, ServiceError::Pipeline(PipelineError::NoJsonFound)));
    }
}

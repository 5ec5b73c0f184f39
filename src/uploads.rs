use crate::gateway::MutationPayload;
use crate::services::{ImageUpload, PortalService, ServiceResult, StoredImage};
use crate::validation::FormValidator;

/// Reusable image form field: holds the picked file, exposes a local preview
/// path before anything is uploaded, and knows how to fold itself into a
/// multipart payload.
#[derive(Clone, Debug, Default)]
pub struct AttachmentField {
    name: String,
    upload: Option<ImageUpload>,
}

impl AttachmentField {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            upload: None,
        }
    }

    pub fn pick(&mut self, upload: ImageUpload) {
        self.upload = Some(upload);
    }

    pub fn clear(&mut self) {
        self.upload = None;
    }

    pub fn has_file(&self) -> bool {
        self.upload.is_some()
    }

    /// Local preview location for the picked file, shown before the form is
    /// submitted. Mirrors the object-URL trick browsers use.
    pub fn preview_path(&self) -> Option<&str> {
        self.upload.as_ref().map(|upload| upload.tmp_path.as_str())
    }

    pub fn validate(&self, validator: &mut FormValidator) {
        if let Some(upload) = &self.upload {
            validator.image(&self.name, upload);
        }
    }

    /// Append the picked file to the payload, upgrading it to multipart.
    /// A field without a file leaves the payload untouched.
    pub fn append_to(&self, payload: MutationPayload) -> MutationPayload {
        match &self.upload {
            Some(upload) => payload.attach(upload.clone()),
            None => payload,
        }
    }

    /// Persist the picked file through the service, returning the stored
    /// image descriptor for the record being saved.
    pub fn store<S: PortalService>(&self, service: &S) -> ServiceResult<Option<StoredImage>> {
        match &self.upload {
            Some(upload) => service.store_image(upload.clone()).map(Some),
            None => Ok(None),
        }
    }
}

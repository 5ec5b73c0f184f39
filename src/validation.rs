use crate::services::{FieldErrors, ImageUpload, PortalError, RequestVars, ServiceResult};

pub const MAX_IMAGE_BYTES: i64 = 2 * 1024 * 1024;

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];
const IMAGE_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// Collects field-keyed errors before any service call is made. Rules run in
/// the order they are declared; the first failure per field wins.
#[derive(Debug, Default)]
pub struct FormValidator {
    errors: FieldErrors,
}

impl FormValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(&mut self, vars: &RequestVars, field: &str) -> String {
        let value = vars.string(field).unwrap_or_default();
        if value.trim().is_empty() {
            self.errors.push(field, "wajib diisi");
        }
        value.trim().to_string()
    }

    pub fn optional(&mut self, vars: &RequestVars, field: &str) -> String {
        vars.string(field).unwrap_or_default().trim().to_string()
    }

    pub fn max_len(&mut self, field: &str, value: &str, limit: usize) {
        if value.chars().count() > limit {
            self.errors
                .push(field, &format!("maksimal {limit} karakter"));
        }
    }

    pub fn required_int(&mut self, vars: &RequestVars, field: &str) -> i64 {
        match vars.int(field) {
            Some(value) => value,
            None => {
                self.errors.push(field, "wajib diisi");
                0
            }
        }
    }

    pub fn image(&mut self, field: &str, upload: &ImageUpload) {
        if let Err(message) = check_image(upload) {
            self.errors.push(field, message);
        }
    }

    pub fn push(&mut self, field: &str, message: &str) {
        self.errors.push(field, message);
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Ok when every rule passed, otherwise the accumulated field errors.
    pub fn finish(self) -> ServiceResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(PortalError::Validation(self.errors))
        }
    }
}

fn check_image(upload: &ImageUpload) -> Result<(), &'static str> {
    if upload.size <= 0 {
        return Err("berkas kosong");
    }
    if upload.size > MAX_IMAGE_BYTES {
        return Err("ukuran gambar maksimal 2 MB");
    }
    let extension = upload
        .name
        .rsplit('.')
        .next()
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();
    if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return Err("format gambar harus jpg, png, atau webp");
    }
    if !upload.mime_type.is_empty() && !IMAGE_MIME_TYPES.contains(&upload.mime_type.as_str()) {
        return Err("jenis berkas tidak dikenali sebagai gambar");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(size: i64) -> ImageUpload {
        ImageUpload {
            name: "logo.png".into(),
            tmp_path: "/tmp/logo.png".into(),
            size,
            mime_type: "image/png".into(),
        }
    }

    #[test]
    fn required_fields_collect_errors() {
        let mut vars = RequestVars::new();
        vars.set("title", "  ");
        let mut validator = FormValidator::new();
        validator.required(&vars, "title");
        validator.required(&vars, "student_name");
        let err = validator.finish().unwrap_err();
        match err {
            PortalError::Validation(errors) => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors.get("title"), Some("wajib diisi"));
                assert_eq!(errors.get("student_name"), Some("wajib diisi"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn valid_form_passes() {
        let mut vars = RequestVars::new();
        vars.set("title", "Juara 1");
        vars.set("type_id", 1);
        let mut validator = FormValidator::new();
        let title = validator.required(&vars, "title");
        validator.max_len("title", &title, 150);
        validator.required_int(&vars, "type_id");
        assert!(validator.finish().is_ok());
    }

    #[test]
    fn oversized_image_rejected() {
        let mut validator = FormValidator::new();
        validator.image("image", &png(MAX_IMAGE_BYTES + 1));
        let err = validator.finish().unwrap_err();
        assert!(matches!(err, PortalError::Validation(_)));
    }

    #[test]
    fn image_at_limit_accepted() {
        let mut validator = FormValidator::new();
        validator.image("image", &png(MAX_IMAGE_BYTES));
        assert!(validator.finish().is_ok());
    }

    #[test]
    fn unknown_extension_rejected() {
        let mut validator = FormValidator::new();
        validator.image(
            "image",
            &ImageUpload {
                name: "virus.exe".into(),
                tmp_path: "/tmp/virus.exe".into(),
                size: 100,
                mime_type: String::new(),
            },
        );
        assert!(validator.finish().is_err());
    }

    #[test]
    fn max_len_counts_characters() {
        let mut validator = FormValidator::new();
        validator.max_len("title", "prestasi", 5);
        assert!(!validator.is_ok());
    }
}

use crate::artifact::{CaptureArtifact, ImageBlob, MarketQuery};
use crate::error::ValidationError;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub fn validate_image(image: &ImageBlob) -> Result<(), ValidationError> {
    if image.size() > MAX_IMAGE_BYTES {
        return Err(ValidationError::FileTooLarge {
            size: image.size(),
            limit: MAX_IMAGE_BYTES,
        });
    }

    // Mirrors the `accept="image/*"` file picker filter.
    if !image.mime_type.trim().to_ascii_lowercase().starts_with("image/") {
        return Err(ValidationError::UnsupportedMediaType(image.mime_type.clone()));
    }

    Ok(())
}

pub fn validate_market_query(query: &MarketQuery) -> Result<(), ValidationError> {
    if query.crop.trim().is_empty() {
        return Err(ValidationError::EmptyField("crop"));
    }
    if query.location.trim().is_empty() {
        return Err(ValidationError::EmptyField("location"));
    }
    Ok(())
}

pub fn validate_artifact(artifact: &CaptureArtifact) -> Result<(), ValidationError> {
    match artifact {
        CaptureArtifact::Image(img) => validate_image(img),
        CaptureArtifact::Transcript(t) if t.trim().is_empty() => {
            Err(ValidationError::EmptyField("transcript"))
        }
        CaptureArtifact::Transcript(_) => Ok(()),
        CaptureArtifact::MarketQuery(q) => validate_market_query(q),
    }
}

/// Guess an image MIME type from a file extension.
pub fn mime_type_for_filename(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, e)| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(len: usize) -> ImageBlob {
        ImageBlob::new("leaf.jpg", "image/jpeg", vec![0; len])
    }

    #[test]
    fn accepts_exactly_five_megabytes() {
        assert!(validate_image(&image(MAX_IMAGE_BYTES)).is_ok());
    }

    #[test]
    fn rejects_one_byte_over_limit() {
        let err = validate_image(&image(MAX_IMAGE_BYTES + 1)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::FileTooLarge {
                size: MAX_IMAGE_BYTES + 1,
                limit: MAX_IMAGE_BYTES
            }
        );
    }

    #[test]
    fn rejects_non_image_mime() {
        let blob = ImageBlob::new("notes.pdf", "application/pdf", vec![1]);
        assert!(matches!(
            validate_image(&blob),
            Err(ValidationError::UnsupportedMediaType(_))
        ));
    }

    #[test]
    fn blank_crop_is_rejected() {
        let q = MarketQuery {
            crop: "  ".into(),
            location: "Bangalore".into(),
        };
        assert_eq!(
            validate_market_query(&q),
            Err(ValidationError::EmptyField("crop"))
        );
    }

    #[test]
    fn blank_transcript_is_rejected() {
        assert_eq!(
            validate_artifact(&CaptureArtifact::Transcript(" \n".into())),
            Err(ValidationError::EmptyField("transcript"))
        );
    }

    #[test]
    fn guesses_mime_from_extension() {
        assert_eq!(mime_type_for_filename("a.JPG"), "image/jpeg");
        assert_eq!(mime_type_for_filename("a.png"), "image/png");
        assert_eq!(mime_type_for_filename("noext"), "application/octet-stream");
    }
}

//! Upstream generative provider abstraction.
//!
//! The rest of the crate only sees [`GenerativeProvider`]: an opaque,
//! potentially slow, potentially failing capability that turns prompts into
//! text or PNG bytes. Route handlers and tests compose against mocks of this
//! trait; [`OpenAiProvider`] is the production implementation.

pub mod openai;

pub use openai::OpenAiProvider;

use async_trait::async_trait;

use crate::error::Result;

/// Image sizes the generate operation accepts. Anything outside the
/// allowlist falls back to portrait, a good default for print-ish designs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    Square1024,
    Portrait1024x1536,
    Landscape1536x1024,
}

impl ImageSize {
    pub fn normalize(size: Option<&str>) -> Self {
        match size {
            Some("1024x1024") => Self::Square1024,
            Some("1536x1024") => Self::Landscape1536x1024,
            _ => Self::Portrait1024x1536,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square1024 => "1024x1024",
            Self::Portrait1024x1536 => "1024x1536",
            Self::Landscape1536x1024 => "1536x1024",
        }
    }
}

/// An external text/image generation capability.
///
/// Both calls are seconds-scale suspension points and may fail with
/// [`crate::error::BriefsmithError::Upstream`] (transport/API failure),
/// [`crate::error::BriefsmithError::MalformedResponse`] (unusable payload),
/// or [`crate::error::BriefsmithError::Config`] (missing credentials).
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Run a chat completion and return the assistant's text.
    async fn generate_text(&self, system: &str, user: &str) -> Result<String>;

    /// Generate one image and return it as base64-encoded PNG data.
    async fn generate_image(&self, prompt: &str, size: ImageSize) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_accepts_allowlisted_sizes() {
        assert_eq!(ImageSize::normalize(Some("1024x1024")), ImageSize::Square1024);
        assert_eq!(
            ImageSize::normalize(Some("1024x1536")),
            ImageSize::Portrait1024x1536
        );
        assert_eq!(
            ImageSize::normalize(Some("1536x1024")),
            ImageSize::Landscape1536x1024
        );
    }

    #[test]
    fn test_normalize_falls_back_to_portrait() {
        assert_eq!(ImageSize::normalize(None), ImageSize::Portrait1024x1536);
        assert_eq!(
            ImageSize::normalize(Some("4096x4096")),
            ImageSize::Portrait1024x1536
        );
        assert_eq!(ImageSize::normalize(Some("")), ImageSize::Portrait1024x1536);
    }

    #[test]
    fn test_as_str_roundtrip() {
        for size in [
            ImageSize::Square1024,
            ImageSize::Portrait1024x1536,
            ImageSize::Landscape1536x1024,
        ] {
            assert_eq!(ImageSize::normalize(Some(size.as_str())), size);
        }
    }
}

//! Design-brief request model, normalization, and validation.
//!
//! Inbound payloads are loosely typed JSON from a browser form. Normalization
//! is forgiving by design: wrong-typed fields collapse to empty strings,
//! free-text fields are clamped to hard caps, and enumerated fields fall back
//! to sensible defaults. Only `designType`, `format`, and `renderSize` can
//! fail a request outright.

pub mod prompt;
pub mod season;

use serde::Serialize;
use serde_json::Value;

use crate::error::{BriefsmithError, Result};

/// What kind of collateral the brief targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DesignType {
    Flyer,
    Newsletter,
}

impl DesignType {
    /// Accepts `flyer`/`newsletter` in any case; anything else is invalid.
    pub fn parse(v: &Value) -> Option<Self> {
        match norm_str(v).to_lowercase().as_str() {
            "flyer" => Some(Self::Flyer),
            "newsletter" => Some(Self::Newsletter),
            _ => None,
        }
    }
}

/// Fold style, only meaningful for flyers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlyerFold {
    Single,
    Bifold,
    Trifold,
}

impl FlyerFold {
    /// Spaces and hyphens are stripped before matching, so `Tri-Fold` and
    /// `bi fold` both parse.
    pub fn parse(v: &Value) -> Option<Self> {
        let s = norm_str(v).to_lowercase();
        if s.is_empty() {
            return None;
        }
        let s: String = s.chars().filter(|c| !c.is_whitespace() && *c != '-').collect();
        match s.as_str() {
            "single" => Some(Self::Single),
            "bifold" => Some(Self::Bifold),
            "trifold" => Some(Self::Trifold),
            _ => None,
        }
    }
}

/// Who the piece is aimed at. Unrecognized values default to `Buyer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    #[default]
    Buyer,
    Seller,
    Realtor,
    All,
}

impl Audience {
    pub fn parse(v: &Value) -> Self {
        match norm_str(v).to_lowercase().as_str() {
            "seller" => Self::Seller,
            "realtor" => Self::Realtor,
            "all" => Self::All,
            _ => Self::Buyer,
        }
    }
}

/// Visual density preference. Unrecognized values default to `Balanced`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    Minimal,
    #[default]
    Balanced,
    Dense,
}

impl Density {
    pub fn parse(v: &Value) -> Self {
        match norm_str(v).to_lowercase().as_str() {
            "minimal" => Self::Minimal,
            "dense" => Self::Dense,
            _ => Self::Balanced,
        }
    }
}

/// Brief generation mode: a full brief, or a cheap copy-and-theme refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BriefMode {
    #[default]
    Brief,
    Copy,
}

impl BriefMode {
    pub fn parse(v: &Value) -> Self {
        if v.as_str() == Some("copy") {
            Self::Copy
        } else {
            Self::Brief
        }
    }
}

/// Target canvas, in pixels. Both dimensions must be in `256..=2048`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderSize {
    pub width: f64,
    pub height: f64,
}

/// A fully normalized, validated brief request.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedBrief {
    pub mode: BriefMode,
    pub design_type: DesignType,
    pub flyer_fold: Option<FlyerFold>,
    pub format: String,
    pub render_size: RenderSize,
    pub location: String,
    pub audience: Audience,
    pub surprise_copy: bool,
    pub surprise_design: bool,
    pub headline: String,
    pub subhead: String,
    pub cta: String,
    pub date_time: String,
    pub key_points: Vec<String>,
    pub tone: String,
    pub density: Density,
    pub brand_words: String,
    pub palette_hint: String,
    pub imagery_hint: String,
}

impl NormalizedBrief {
    /// Normalize and validate a raw JSON body.
    ///
    /// Two historical payload shapes are accepted: copy fields under `copy`
    /// or `content`, and direction fields under `designDirection` or
    /// `direction`, with the surprise flags at either level.
    pub fn from_value(body: &Value) -> Result<Self> {
        let mode = BriefMode::parse(&body["mode"]);

        let design_type = DesignType::parse(&body["designType"]).ok_or_else(|| {
            BriefsmithError::Validation(
                "Invalid designType. Use flyer/newsletter (or Flyer/Newsletter).".to_string(),
            )
        })?;

        let format = clamp_string(&body["format"], 40);
        if format.is_empty() {
            return Err(BriefsmithError::Validation("Missing format.".to_string()));
        }

        let width = body["renderSize"]["width"].as_f64().unwrap_or(f64::NAN);
        let height = body["renderSize"]["height"].as_f64().unwrap_or(f64::NAN);
        if !width.is_finite()
            || !height.is_finite()
            || width < 256.0
            || height < 256.0
            || width > 2048.0
            || height > 2048.0
        {
            return Err(BriefsmithError::Validation("Invalid renderSize.".to_string()));
        }

        let location = clamp_or(&body["location"], "Sacramento, CA", 80);
        let audience = Audience::parse(&body["audience"]);

        let flyer_fold = match design_type {
            DesignType::Flyer => FlyerFold::parse(&body["flyerFold"]),
            DesignType::Newsletter => None,
        };

        let copy_src = fallback(body, "copy", "content");
        let dir_src = fallback(body, "designDirection", "direction");

        let surprise_copy = flag(&body["surpriseCopy"], &copy_src["surpriseCopy"]);
        let surprise_design = flag(&body["surpriseDesign"], &dir_src["surpriseDesign"]);

        let key_points = copy_src["keyPoints"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .map(|x| clamp_string(x, 100))
                    .filter(|s| !s.is_empty())
                    .take(6)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            mode,
            design_type,
            flyer_fold,
            format,
            render_size: RenderSize { width, height },
            location,
            audience,
            surprise_copy,
            surprise_design,
            headline: clamp_string(&copy_src["headline"], 140),
            subhead: clamp_string(&copy_src["subhead"], 200),
            cta: clamp_string(&copy_src["cta"], 100),
            date_time: clamp_string(&copy_src["dateTime"], 80),
            key_points,
            tone: clamp_or(&dir_src["tone"], "Bold Modern", 50),
            density: Density::parse(&dir_src["density"]),
            brand_words: clamp_string(&dir_src["brandWords"], 140),
            palette_hint: clamp_string(&dir_src["paletteHint"], 160),
            imagery_hint: clamp_string(&dir_src["imageryHint"], 180),
        })
    }
}

/// Trimmed string value, or empty for non-strings.
fn norm_str(v: &Value) -> String {
    v.as_str().map(str::trim).unwrap_or("").to_string()
}

/// String value truncated to `max_chars`; empty for non-strings.
fn clamp_string(v: &Value, max_chars: usize) -> String {
    v.as_str()
        .map(|s| s.chars().take(max_chars).collect())
        .unwrap_or_default()
}

/// Like [`clamp_string`], but an absent or empty value yields `default`.
fn clamp_or(v: &Value, default: &str, max_chars: usize) -> String {
    let s = clamp_string(v, max_chars);
    if s.is_empty() {
        default.chars().take(max_chars).collect()
    } else {
        s
    }
}

/// Boolean flag read from the top level first, then the nested shape.
fn flag(primary: &Value, nested: &Value) -> bool {
    primary.as_bool().or_else(|| nested.as_bool()).unwrap_or(false)
}

/// `body[primary]` unless it is absent, in which case `body[secondary]`.
fn fallback<'a>(body: &'a Value, primary: &str, secondary: &str) -> &'a Value {
    if body[primary].is_null() {
        &body[secondary]
    } else {
        &body[primary]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal_body() -> Value {
        json!({
            "designType": "flyer",
            "format": "A4",
            "renderSize": { "width": 1024, "height": 1536 }
        })
    }

    #[test]
    fn test_minimal_body_gets_defaults() {
        let brief = NormalizedBrief::from_value(&minimal_body()).unwrap();
        assert_eq!(brief.mode, BriefMode::Brief);
        assert_eq!(brief.design_type, DesignType::Flyer);
        assert_eq!(brief.location, "Sacramento, CA");
        assert_eq!(brief.audience, Audience::Buyer);
        assert_eq!(brief.density, Density::Balanced);
        assert_eq!(brief.tone, "Bold Modern");
        assert!(!brief.surprise_copy);
        assert!(brief.key_points.is_empty());
    }

    #[test]
    fn test_invalid_design_type_rejected() {
        let mut body = minimal_body();
        body["designType"] = json!("poster");
        let err = NormalizedBrief::from_value(&body).unwrap_err();
        assert!(err.to_string().contains("Invalid designType"));
    }

    #[test]
    fn test_design_type_case_insensitive() {
        let mut body = minimal_body();
        body["designType"] = json!("Newsletter");
        let brief = NormalizedBrief::from_value(&body).unwrap();
        assert_eq!(brief.design_type, DesignType::Newsletter);
    }

    #[test]
    fn test_missing_format_rejected() {
        let mut body = minimal_body();
        body["format"] = json!("");
        let err = NormalizedBrief::from_value(&body).unwrap_err();
        assert_eq!(err.to_string(), "Missing format.");
    }

    #[test]
    fn test_non_string_format_rejected() {
        let mut body = minimal_body();
        body["format"] = json!(42);
        assert!(NormalizedBrief::from_value(&body).is_err());
    }

    #[test]
    fn test_render_size_bounds() {
        for (w, h) in [(255.0, 1024.0), (1024.0, 2049.0), (0.0, 0.0)] {
            let mut body = minimal_body();
            body["renderSize"] = json!({ "width": w, "height": h });
            let err = NormalizedBrief::from_value(&body).unwrap_err();
            assert_eq!(err.to_string(), "Invalid renderSize.", "size {w}x{h}");
        }
    }

    #[test]
    fn test_render_size_missing_rejected() {
        let mut body = minimal_body();
        body.as_object_mut().unwrap().remove("renderSize");
        assert!(NormalizedBrief::from_value(&body).is_err());
    }

    #[test]
    fn test_render_size_boundary_values_accepted() {
        let mut body = minimal_body();
        body["renderSize"] = json!({ "width": 256, "height": 2048 });
        let brief = NormalizedBrief::from_value(&body).unwrap();
        assert_eq!(brief.render_size.width, 256.0);
        assert_eq!(brief.render_size.height, 2048.0);
    }

    #[test]
    fn test_fold_normalization_strips_spaces_and_hyphens() {
        for raw in ["Tri-Fold", "tri fold", "TRIFOLD"] {
            let mut body = minimal_body();
            body["flyerFold"] = json!(raw);
            let brief = NormalizedBrief::from_value(&body).unwrap();
            assert_eq!(brief.flyer_fold, Some(FlyerFold::Trifold), "raw: {raw}");
        }
    }

    #[test]
    fn test_fold_ignored_for_newsletters() {
        let mut body = minimal_body();
        body["designType"] = json!("newsletter");
        body["flyerFold"] = json!("bifold");
        let brief = NormalizedBrief::from_value(&body).unwrap();
        assert_eq!(brief.flyer_fold, None);
    }

    #[test]
    fn test_unknown_fold_is_none() {
        let mut body = minimal_body();
        body["flyerFold"] = json!("z-fold");
        let brief = NormalizedBrief::from_value(&body).unwrap();
        assert_eq!(brief.flyer_fold, None);
    }

    #[test]
    fn test_copy_fields_from_either_shape() {
        let mut body = minimal_body();
        body["content"] = json!({ "headline": "Old shape" });
        let brief = NormalizedBrief::from_value(&body).unwrap();
        assert_eq!(brief.headline, "Old shape");

        // "copy" wins over "content" when both are present.
        body["copy"] = json!({ "headline": "New shape" });
        let brief = NormalizedBrief::from_value(&body).unwrap();
        assert_eq!(brief.headline, "New shape");
    }

    #[test]
    fn test_direction_fields_from_either_shape() {
        let mut body = minimal_body();
        body["direction"] = json!({ "tone": "Warm Classic", "density": "dense" });
        let brief = NormalizedBrief::from_value(&body).unwrap();
        assert_eq!(brief.tone, "Warm Classic");
        assert_eq!(brief.density, Density::Dense);
    }

    #[test]
    fn test_surprise_flags_from_either_level() {
        let mut body = minimal_body();
        body["content"] = json!({ "surpriseCopy": true });
        body["direction"] = json!({ "surpriseDesign": true });
        let brief = NormalizedBrief::from_value(&body).unwrap();
        assert!(brief.surprise_copy);
        assert!(brief.surprise_design);
    }

    #[test]
    fn test_headline_clamped_to_cap() {
        let mut body = minimal_body();
        body["copy"] = json!({ "headline": "x".repeat(500) });
        let brief = NormalizedBrief::from_value(&body).unwrap();
        assert_eq!(brief.headline.chars().count(), 140);
    }

    #[test]
    fn test_key_points_filtered_and_capped() {
        let mut body = minimal_body();
        body["copy"] = json!({
            "keyPoints": ["a", "", "b", 7, "c", "d", "e", "f", "g"]
        });
        let brief = NormalizedBrief::from_value(&body).unwrap();
        // Empties and non-strings dropped, then capped at six.
        assert_eq!(brief.key_points, vec!["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn test_mode_copy() {
        let mut body = minimal_body();
        body["mode"] = json!("copy");
        let brief = NormalizedBrief::from_value(&body).unwrap();
        assert_eq!(brief.mode, BriefMode::Copy);
    }

    #[test]
    fn test_unrecognized_mode_defaults_to_brief() {
        let mut body = minimal_body();
        body["mode"] = json!("deluxe");
        let brief = NormalizedBrief::from_value(&body).unwrap();
        assert_eq!(brief.mode, BriefMode::Brief);
    }

    #[test]
    fn test_audience_fallback() {
        let mut body = minimal_body();
        body["audience"] = json!("martian");
        let brief = NormalizedBrief::from_value(&body).unwrap();
        assert_eq!(brief.audience, Audience::Buyer);
    }

    #[test]
    fn test_enum_serialization_is_lowercase() {
        assert_eq!(serde_json::to_string(&DesignType::Flyer).unwrap(), "\"flyer\"");
        assert_eq!(serde_json::to_string(&Density::Dense).unwrap(), "\"dense\"");
        assert_eq!(serde_json::to_string(&BriefMode::Copy).unwrap(), "\"copy\"");
    }
}

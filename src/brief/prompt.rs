//! Prompt construction and model-output repair for the brief operation.

use serde_json::{json, Value};

use crate::error::{BriefsmithError, Result};

use super::season::SeasonalContext;
use super::NormalizedBrief;

/// System prompt for the brief chat-completion call. The required output
/// shape is spelled out inline because the provider is asked for a JSON
/// object, not a schema-validated response.
pub const BRIEF_SYSTEM_PROMPT: &str = r#"
You are the highest-paid senior graphic designer + creative director.
Your output must be extremely readable to a human editor who will actually build the design.
Return VALID JSON ONLY. No markdown. No code fences.

BIG GOAL:
- Give practical instructions that a designer/editor can execute immediately.
- Write like: "Do this", "Avoid this", "If X then Y".
- Assume time is limited. Make decisions confidently.

You must be context-aware:
- Consider today's date and proximity to holidays/season.
- Give theme suggestions as "Take it or leave it".

Never use em-dashes.

OUTPUT SHAPE (must include all keys):
{
  "mode": "brief" | "copy",

  "designType": "flyer"|"newsletter",
  "flyerFold": "single"|"bifold"|"trifold"|null,
  "format": string,
  "renderSize": { "width": number, "height": number },
  "location": string,
  "audience": "buyer"|"seller"|"realtor"|"all",

  "theme": {
    "seasonContext": string,
    "holidayReasoning": string[],
    "takeItOrLeaveItSuggestions": string[]
  },

  "copy": {
    "headline": string,
    "subhead": string,
    "cta": string,
    "dateTime": string,
    "keyPoints": string[]
  },

  "design": {
    "tone": string,
    "density": "minimal"|"balanced"|"dense",
    "palette": string,
    "imageryStyle": string,
    "layoutStyle": string
  },

  "prompt": string,

  "designerNotes": {
    "quickSummary": string,
    "doThis": string[],
    "avoidThis": string[],
    "hierarchy": string[],
    "spacingAndGrid": string[],
    "typography": string[],
    "colorLogic": string[],
    "imagery": string[],
    "foldAndPrintNotes": string[],
    "exportChecklist": string[]
  },

  "promptTransparency": {
    "whatTheModelOptimizedFor": string[],
    "whyThisWorks": string[],
    "risksAndTradeoffs": string[]
  }
}

RULES:
- If mode == "copy": focus on theme + copy + brief notes. Keep prompt + design fields present but simpler.
- If surpriseCopy is true, rewrite the copy strongly for the audience/location and season.
- If surpriseCopy is false, keep user's copy, only lightly clean it (grammar + clarity).
- If surpriseDesign is true, pick palette/imagery/layout like a pro.
- If surpriseDesign is false, honor paletteHint/imageryHint and keep notes shorter.
- Optimize for mobile scan and print clarity (no tiny text).
- Key points: 3-6 max, scannable.
- For folds: mention safe margins and fold lines.
- prompt must be directly usable for an image generator (describe layout, typography vibe, spacing, color, imagery, no faces unless necessary).
"#;

/// Assemble the user payload for the chat-completion call from the
/// normalized request and the seasonal context.
pub fn user_payload(brief: &NormalizedBrief, ctx: &SeasonalContext) -> Value {
    json!({
        "mode": brief.mode,
        "todayISO": ctx.iso,
        "seasonContext": ctx.season_label,
        "holidayHints": ctx.holiday_hints,

        "designType": brief.design_type,
        "flyerFold": brief.flyer_fold,
        "format": brief.format,
        "renderSize": brief.render_size,
        "location": brief.location,
        "audience": brief.audience,

        "content": {
            "surpriseCopy": brief.surprise_copy,
            "headline": brief.headline,
            "subhead": brief.subhead,
            "cta": brief.cta,
            "dateTime": brief.date_time,
            "keyPoints": brief.key_points,
        },
        "direction": {
            "surpriseDesign": brief.surprise_design,
            "tone": brief.tone,
            "density": brief.density,
            "brandWords": brief.brand_words,
            "paletteHint": brief.palette_hint,
            "imageryHint": brief.imagery_hint,
        },
    })
}

/// Parse the model's reply as JSON, retrying once with markdown code fences
/// stripped. Models asked for "JSON only" still wrap output in ```json
/// fences often enough that the retry pays for itself.
pub fn parse_model_json(text: &str) -> Result<Value> {
    if let Ok(value) = serde_json::from_str(text) {
        return Ok(value);
    }
    let cleaned = text.replace("```json", "").replace("```", "");
    serde_json::from_str(cleaned.trim()).map_err(|e| {
        BriefsmithError::MalformedResponse(format!("model returned invalid JSON: {e}"))
    })
}

/// Post-process a parsed brief before it goes back to the client.
///
/// Backfills `prompt` from `imagePrompt` when the model used the wrong key,
/// and appends the list of alternative image generators shown in the UI.
pub fn finalize_brief(brief: &mut Value) {
    if !brief.is_object() {
        return;
    }
    if brief["prompt"].is_null() && !brief["imagePrompt"].is_null() {
        brief["prompt"] = brief["imagePrompt"].clone();
    }

    brief["alternativeGenerators"] = json!([
        {
            "name": "Microsoft Designer (Image Creator)",
            "url": "https://designer.microsoft.com/",
            "note": "Often free with Microsoft account."
        },
        {
            "name": "Adobe Firefly",
            "url": "https://firefly.adobe.com/",
            "note": "Has free credits depending on plan/account."
        },
        {
            "name": "Canva AI Image Generator",
            "url": "https://www.canva.com/",
            "note": "Magic Media / AI tools available depending on plan."
        },
        {
            "name": "Leonardo AI",
            "url": "https://leonardo.ai/",
            "note": "Has free tier options depending on account."
        }
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brief::season::seasonal_context;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn sample_brief() -> NormalizedBrief {
        NormalizedBrief::from_value(&json!({
            "designType": "flyer",
            "flyerFold": "trifold",
            "format": "A4",
            "renderSize": { "width": 1024, "height": 1536 },
            "copy": { "headline": "Open House", "keyPoints": ["3 bed", "2 bath"] },
            "designDirection": { "tone": "Warm", "density": "minimal" },
            "surpriseCopy": true
        }))
        .unwrap()
    }

    #[test]
    fn test_system_prompt_demands_json_only() {
        assert!(BRIEF_SYSTEM_PROMPT.contains("Return VALID JSON ONLY"));
        assert!(BRIEF_SYSTEM_PROMPT.contains("OUTPUT SHAPE"));
    }

    #[test]
    fn test_user_payload_shape() {
        let ctx = seasonal_context(Utc.with_ymd_and_hms(2026, 7, 4, 12, 0, 0).unwrap());
        let payload = user_payload(&sample_brief(), &ctx);

        assert_eq!(payload["mode"], "brief");
        assert_eq!(payload["designType"], "flyer");
        assert_eq!(payload["flyerFold"], "trifold");
        assert_eq!(payload["seasonContext"], "Summer (June–August)");
        assert_eq!(payload["content"]["surpriseCopy"], true);
        assert_eq!(payload["content"]["headline"], "Open House");
        assert_eq!(payload["content"]["keyPoints"][1], "2 bath");
        assert_eq!(payload["direction"]["density"], "minimal");
        assert_eq!(payload["renderSize"]["width"], 1024.0);
    }

    #[test]
    fn test_user_payload_null_fold_for_newsletter() {
        let brief = NormalizedBrief::from_value(&json!({
            "designType": "newsletter",
            "format": "email",
            "renderSize": { "width": 600, "height": 1200 }
        }))
        .unwrap();
        let ctx = seasonal_context(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
        let payload = user_payload(&brief, &ctx);
        assert!(payload["flyerFold"].is_null());
    }

    #[test]
    fn test_parse_model_json_strict() {
        let value = parse_model_json(r#"{"prompt": "hi"}"#).unwrap();
        assert_eq!(value["prompt"], "hi");
    }

    #[test]
    fn test_parse_model_json_strips_fences() {
        let fenced = "```json\n{\"prompt\": \"hi\"}\n```";
        let value = parse_model_json(fenced).unwrap();
        assert_eq!(value["prompt"], "hi");
    }

    #[test]
    fn test_parse_model_json_garbage_errors() {
        let err = parse_model_json("I couldn't generate that.").unwrap_err();
        assert!(matches!(err, BriefsmithError::MalformedResponse(_)));
    }

    #[test]
    fn test_finalize_backfills_prompt_from_image_prompt() {
        let mut brief = json!({ "imagePrompt": "a bold flyer" });
        finalize_brief(&mut brief);
        assert_eq!(brief["prompt"], "a bold flyer");
    }

    #[test]
    fn test_finalize_keeps_existing_prompt() {
        let mut brief = json!({ "prompt": "keep me", "imagePrompt": "not me" });
        finalize_brief(&mut brief);
        assert_eq!(brief["prompt"], "keep me");
    }

    #[test]
    fn test_finalize_appends_alternative_generators() {
        let mut brief = json!({});
        finalize_brief(&mut brief);
        let generators = brief["alternativeGenerators"].as_array().unwrap();
        assert_eq!(generators.len(), 4);
        assert_eq!(generators[1]["name"], "Adobe Firefly");
    }
}

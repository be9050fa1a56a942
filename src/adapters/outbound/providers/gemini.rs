//! Google Gemini generateContent API.

use crate::domain::entities::{CallOptions, Payload};
use crate::domain::value_objects::ImageData;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'static str>,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// `{base}/v1beta/models/{model}:generateContent`
pub fn path(model: &str) -> String {
    let model = model.strip_prefix("models/").unwrap_or(model);
    format!("/v1beta/models/{}:generateContent", model)
}

pub fn build(payload: &Payload, options: &CallOptions) -> Option<GenerateContentRequest> {
    let (system_instruction, parts) = match payload {
        Payload::Text {
            system_prompt,
            user_prompt,
        } => {
            let system = (!system_prompt.is_empty()).then(|| Content {
                role: None,
                parts: vec![Part::Text {
                    text: system_prompt.clone(),
                }],
            });
            (
                system,
                vec![Part::Text {
                    text: user_prompt.clone(),
                }],
            )
        }
        Payload::Vision {
            prompt,
            image_data_url,
        } => {
            let image = ImageData::from_data_url(image_data_url)?;
            (
                None,
                vec![
                    Part::Text {
                        text: prompt.clone(),
                    },
                    Part::InlineData {
                        inline_data: Blob {
                            mime_type: image.mime_type,
                            data: image.base64,
                        },
                    },
                ],
            )
        }
    };

    let generation_config = GenerationConfig {
        temperature: options.temperature,
        max_output_tokens: options.max_tokens,
        response_mime_type: options.json_mode.then_some("application/json"),
    };
    let generation_config = (generation_config.temperature.is_some()
        || generation_config.max_output_tokens.is_some()
        || generation_config.response_mime_type.is_some())
    .then_some(generation_config);

    Some(GenerateContentRequest {
        contents: vec![Content {
            role: Some("user"),
            parts,
        }],
        system_instruction,
        generation_config,
    })
}

/// Text parts of `candidates[0].content`, concatenated.
pub fn parse(response: GenerateContentResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_strips_models_prefix() {
        assert_eq!(path("gemini-1.5-flash"), "/v1beta/models/gemini-1.5-flash:generateContent");
        assert_eq!(path("models/gemini-pro"), "/v1beta/models/gemini-pro:generateContent");
    }

    #[test]
    fn test_build_text_request_with_json_mode() {
        let options = CallOptions {
            temperature: Some(0.5),
            max_tokens: Some(512),
            json_mode: true,
        };
        let request = build(&Payload::text("sys", "hi"), &options).unwrap();
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(
            body,
            json!({
                "contents": [{"role": "user", "parts": [{"text": "hi"}]}],
                "systemInstruction": {"parts": [{"text": "sys"}]},
                "generationConfig": {
                    "temperature": 0.5,
                    "maxOutputTokens": 512,
                    "responseMimeType": "application/json"
                }
            })
        );
    }

    #[test]
    fn test_build_without_options_omits_generation_config() {
        let request = build(&Payload::text("", "hi"), &CallOptions::default()).unwrap();
        let body = serde_json::to_value(&request).unwrap();

        assert!(body.get("generationConfig").is_none());
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn test_build_vision_request() {
        let payload = Payload::vision("describe", "data:image/webp;base64,UklGRg==");
        let request = build(&payload, &CallOptions::default()).unwrap();
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(
            body["contents"][0]["parts"][1],
            json!({"inlineData": {"mimeType": "image/webp", "data": "UklGRg=="}})
        );
    }

    #[test]
    fn test_parse_concatenates_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hello, "}, {"text": "world"}]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(parse(response).as_deref(), Some("Hello, world"));
    }

    #[test]
    fn test_parse_blocked_response() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        assert!(parse(response).is_none());
    }
}

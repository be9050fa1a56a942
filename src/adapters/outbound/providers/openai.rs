//! OpenAI-compatible chat completions (OpenAI, Mistral).

use crate::domain::entities::{CallOptions, Payload};
use crate::domain::value_objects::{ImageData, ProviderKind};
use serde::{Deserialize, Serialize};

pub const PATH: &str = "/v1/chat/completions";

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub role: &'static str,
    pub content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Build a chat request, or None when the payload cannot be sent to `kind`.
pub fn build(
    kind: ProviderKind,
    model: &str,
    payload: &Payload,
    options: &CallOptions,
) -> Option<ChatRequest> {
    let messages = match payload {
        Payload::Text {
            system_prompt,
            user_prompt,
        } => {
            let mut messages = Vec::with_capacity(2);
            if !system_prompt.is_empty() {
                messages.push(Message {
                    role: "system",
                    content: MessageContent::Text(system_prompt.clone()),
                });
            }
            messages.push(Message {
                role: "user",
                content: MessageContent::Text(user_prompt.clone()),
            });
            messages
        }
        Payload::Vision {
            prompt,
            image_data_url,
        } => {
            if !kind.supports_vision() {
                return None;
            }
            let image = ImageData::from_data_url(image_data_url)?;
            vec![Message {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text {
                        text: prompt.clone(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image.to_data_url(),
                        },
                    },
                ]),
            }]
        }
    };

    let response_format = (options.json_mode && kind.supports_json_mode())
        .then_some(ResponseFormat {
            kind: "json_object",
        });

    Some(ChatRequest {
        model: model.to_string(),
        messages,
        temperature: options.temperature,
        max_tokens: options.max_tokens,
        response_format,
    })
}

/// `choices[0].message.content`
pub fn parse(response: ChatResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()?
        .message?
        .content
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_text_request() {
        let options = CallOptions {
            temperature: Some(0.3),
            max_tokens: Some(100),
            json_mode: true,
        };
        let payload = Payload::text("sys", "hi");
        let request = build(ProviderKind::OpenAi, "gpt-4o-mini", &payload, &options).unwrap();
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(
            body,
            json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "hi"}
                ],
                "temperature": 0.3,
                "max_tokens": 100,
                "response_format": {"type": "json_object"}
            })
        );
    }

    #[test]
    fn test_build_skips_empty_system_prompt_and_unset_options() {
        let payload = Payload::text("", "hi");
        let options = CallOptions::default();
        let request = build(ProviderKind::Mistral, "mistral-small", &payload, &options).unwrap();
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert!(body.get("temperature").is_none());
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_build_vision_request() {
        let payload = Payload::vision("what is this?", "data:image/jpeg;base64,/9j/4AAQ");
        let request =
            build(ProviderKind::OpenAi, "gpt-4o", &payload, &CallOptions::default()).unwrap();
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(
            body["messages"][0]["content"][0],
            json!({"type": "text", "text": "what is this?"})
        );
        assert_eq!(
            body["messages"][0]["content"][1],
            json!({"type": "image_url", "image_url": {"url": "data:image/jpeg;base64,/9j/4AAQ"}})
        );
    }

    #[test]
    fn test_build_vision_rejects_bad_data_url() {
        let payload = Payload::vision("what is this?", "https://example.com/cat.png");
        assert!(build(ProviderKind::OpenAi, "gpt-4o", &payload, &CallOptions::default()).is_none());
    }

    #[test]
    fn test_mistral_has_no_vision() {
        let payload = Payload::vision("what is this?", "data:image/png;base64,iVBORw0KGgo=");
        let options = CallOptions::default();
        assert!(build(ProviderKind::Mistral, "mistral-large", &payload, &options).is_none());
    }

    #[test]
    fn test_parse_response() {
        let response: ChatResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hello!"}}]
        }))
        .unwrap();
        assert_eq!(parse(response).as_deref(), Some("Hello!"));
    }

    #[test]
    fn test_parse_response_missing_content() {
        let response: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(parse(response).is_none());

        let response: ChatResponse =
            serde_json::from_value(json!({"choices": [{"message": {"content": null}}]})).unwrap();
        assert!(parse(response).is_none());
    }
}

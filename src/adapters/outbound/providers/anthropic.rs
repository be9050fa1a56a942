//! Anthropic Messages API.

use crate::domain::entities::{CallOptions, Payload};
use crate::domain::value_objects::ImageData;
use serde::{Deserialize, Serialize};

pub const PATH: &str = "/v1/messages";
pub const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    /// Required by the API
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub role: &'static str,
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    Image { source: ImageSource },
}

#[derive(Debug, Serialize)]
pub struct ImageSource {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub media_type: String,
    pub data: String,
}

#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Build a messages request. `json_mode` has no wire field here and is ignored.
pub fn build(
    model: &str,
    payload: &Payload,
    options: &CallOptions,
    default_max_tokens: u32,
) -> Option<MessagesRequest> {
    let (system, content) = match payload {
        Payload::Text {
            system_prompt,
            user_prompt,
        } => (
            Some(system_prompt.clone()).filter(|s| !s.is_empty()),
            vec![ContentBlock::Text {
                text: user_prompt.clone(),
            }],
        ),
        Payload::Vision {
            prompt,
            image_data_url,
        } => {
            let image = ImageData::from_data_url(image_data_url)?;
            (
                None,
                vec![
                    ContentBlock::Image {
                        source: ImageSource {
                            kind: "base64",
                            media_type: image.mime_type,
                            data: image.base64,
                        },
                    },
                    ContentBlock::Text {
                        text: prompt.clone(),
                    },
                ],
            )
        }
    };

    Some(MessagesRequest {
        model: model.to_string(),
        max_tokens: options.max_tokens.unwrap_or(default_max_tokens),
        system,
        messages: vec![Message {
            role: "user",
            content,
        }],
        temperature: options.temperature,
    })
}

/// First `content[]` block of type `text`.
pub fn parse(response: MessagesResponse) -> Option<String> {
    response
        .content
        .into_iter()
        .find(|block| block.kind == "text")?
        .text
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_text_request() {
        let options = CallOptions {
            temperature: Some(0.5),
            max_tokens: None,
            json_mode: true,
        };
        let payload = Payload::text("be brief", "hello");
        let request = build("claude-3-5-haiku", &payload, &options, 4096).unwrap();
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(
            body,
            json!({
                "model": "claude-3-5-haiku",
                "max_tokens": 4096,
                "system": "be brief",
                "messages": [{"role": "user", "content": [{"type": "text", "text": "hello"}]}],
                "temperature": 0.5
            })
        );
    }

    #[test]
    fn test_build_respects_max_tokens() {
        let options = CallOptions {
            max_tokens: Some(64),
            ..Default::default()
        };
        let request = build("claude", &Payload::text("", "hello"), &options, 4096).unwrap();
        assert_eq!(request.max_tokens, 64);
        assert!(request.system.is_none());
    }

    #[test]
    fn test_build_vision_request() {
        let payload = Payload::vision("read the total", "data:image/png;base64,iVBORw0KGgo=");
        let request = build("claude", &payload, &CallOptions::default(), 1024).unwrap();
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(
            body["messages"][0]["content"][0],
            json!({
                "type": "image",
                "source": {"type": "base64", "media_type": "image/png", "data": "iVBORw0KGgo="}
            })
        );
        assert_eq!(body["messages"][0]["content"][1]["text"], "read the total");
    }

    #[test]
    fn test_build_vision_rejects_bad_data_url() {
        let payload = Payload::vision("read", "data:image/png;base64");
        assert!(build("claude", &payload, &CallOptions::default(), 1024).is_none());
    }

    #[test]
    fn test_parse_first_text_block() {
        let response: MessagesResponse = serde_json::from_value(json!({
            "id": "msg_1",
            "content": [
                {"type": "tool_use", "id": "t1", "name": "x", "input": {}},
                {"type": "text", "text": "The answer"}
            ]
        }))
        .unwrap();
        assert_eq!(parse(response).as_deref(), Some("The answer"));
    }

    #[test]
    fn test_parse_no_text_block() {
        let response: MessagesResponse = serde_json::from_value(json!({"content": []})).unwrap();
        assert!(parse(response).is_none());
    }
}

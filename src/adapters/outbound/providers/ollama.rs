//! Ollama chat API.

use crate::domain::entities::{CallOptions, Payload};
use crate::domain::value_objects::ImageData;
use serde::{Deserialize, Serialize};

pub const PATH: &str = "/api/chat";

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ModelOptions>,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub role: &'static str,
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ModelOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

pub fn build(model: &str, payload: &Payload, options: &CallOptions) -> Option<ChatRequest> {
    let messages = match payload {
        Payload::Text {
            system_prompt,
            user_prompt,
        } => {
            let mut messages = Vec::with_capacity(2);
            if !system_prompt.is_empty() {
                messages.push(Message {
                    role: "system",
                    content: system_prompt.clone(),
                    images: Vec::new(),
                });
            }
            messages.push(Message {
                role: "user",
                content: user_prompt.clone(),
                images: Vec::new(),
            });
            messages
        }
        Payload::Vision {
            prompt,
            image_data_url,
        } => {
            let image = ImageData::from_data_url(image_data_url)?;
            vec![Message {
                role: "user",
                content: prompt.clone(),
                images: vec![image.base64],
            }]
        }
    };

    let model_options = (options.temperature.is_some() || options.max_tokens.is_some()).then(|| {
        ModelOptions {
            temperature: options.temperature,
            num_predict: options.max_tokens,
        }
    });

    Some(ChatRequest {
        model: model.to_string(),
        messages,
        stream: false,
        format: options.json_mode.then_some("json"),
        options: model_options,
    })
}

/// `message.content`
pub fn parse(response: ChatResponse) -> Option<String> {
    response.message.map(|m| m.content)
}

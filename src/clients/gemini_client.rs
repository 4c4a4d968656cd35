/// Gemini API 客户端
///
/// 封装 `generateContent` 接口的请求与响应解析
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::EditError;
use crate::utils::data_url::to_data_url;

const DEFAULT_RESULT_MIME: &str = "image/png";

// ========== 请求 / 响应结构 ==========

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataRef<'a>,
    },
    Text {
        text: &'a str,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataRef<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePart {
    #[serde(default)]
    pub inline_data: Option<InlineData>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: Option<String>,
    pub data: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Gemini 客户端
pub struct GeminiClient {
    http: Client,
    api_key: String,
    api_base_url: String,
    model_name: String,
}

impl GeminiClient {
    /// 创建新的 Gemini 客户端
    pub fn new(config: &Config) -> Result<Self, EditError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_key: config.gemini_api_key.clone(),
            api_base_url: config.gemini_api_base_url.trim_end_matches('/').to_string(),
            model_name: config.gemini_model_name.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base_url, self.model_name
        )
    }

    /// 发送一张图片和指令，返回结果图片的 data URL
    ///
    /// # 参数
    /// - `base64_data`: base64 编码的原图
    /// - `mime_type`: 原图 MIME 类型
    /// - `instruction`: 文本指令
    pub async fn edit_image(
        &self,
        base64_data: &str,
        mime_type: &str,
        instruction: &str,
    ) -> Result<String, EditError> {
        debug!(
            "调用 Gemini API，模型: {}，图片大小: {} 字符",
            self.model_name,
            base64_data.len()
        );

        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart::InlineData {
                        inline_data: InlineDataRef {
                            mime_type,
                            data: base64_data,
                        },
                    },
                    RequestPart::Text { text: instruction },
                ],
            }],
        };

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("Gemini API 请求失败: {}", e);
                EditError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            warn!("Gemini API 返回错误状态 {}: {}", status, message);
            return Err(EditError::BadStatus {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse = response.json().await?;
        debug!("Gemini API 调用成功，候选数量: {}", body.candidates.len());

        extract_image(body)
    }
}

/// 从响应中取出第一个候选结果里的第一张图片
pub fn extract_image(response: GenerateContentResponse) -> Result<String, EditError> {
    let first = response
        .candidates
        .into_iter()
        .next()
        .ok_or(EditError::NoCandidates)?;

    first
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .find_map(|part| part.inline_data)
        .map(|inline| {
            let mime = inline
                .mime_type
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_RESULT_MIME.to_string());
            to_data_url(&mime, &inline.data)
        })
        .ok_or(EditError::NoImageData)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_extract_first_inline_image() {
        let response = parse(
            r#"{"candidates":[{"content":{"parts":[
                {"text":"Here is the cleaned image"},
                {"inlineData":{"mimeType":"image/png","data":"QUJD"}},
                {"inlineData":{"mimeType":"image/png","data":"WFla"}}
            ]}}]}"#,
        );
        assert_eq!(
            extract_image(response).unwrap(),
            "data:image/png;base64,QUJD"
        );
    }

    #[test]
    fn test_extract_defaults_to_png() {
        let response =
            parse(r#"{"candidates":[{"content":{"parts":[{"inlineData":{"data":"QUJD"}}]}}]}"#);
        assert_eq!(
            extract_image(response).unwrap(),
            "data:image/png;base64,QUJD"
        );
    }

    #[test]
    fn test_extract_without_candidates() {
        let response = parse(r#"{"candidates":[]}"#);
        assert!(matches!(extract_image(response), Err(EditError::NoCandidates)));

        let response = parse(r#"{}"#);
        assert!(matches!(extract_image(response), Err(EditError::NoCandidates)));
    }

    #[test]
    fn test_extract_text_only_candidate() {
        let response =
            parse(r#"{"candidates":[{"content":{"parts":[{"text":"I can't do that"}]}}]}"#);
        let err = extract_image(response).unwrap_err();
        assert_eq!(err.to_string(), "No image data found in Gemini response");

        let response = parse(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#);
        assert!(matches!(extract_image(response), Err(EditError::NoImageData)));
    }

    #[test]
    fn test_request_body_shape() {
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart::InlineData {
                        inline_data: InlineDataRef {
                            mime_type: "image/jpeg",
                            data: "QUJD",
                        },
                    },
                    RequestPart::Text { text: "remove it" },
                ],
            }],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "contents": [{
                    "parts": [
                        {"inlineData": {"mimeType": "image/jpeg", "data": "QUJD"}},
                        {"text": "remove it"}
                    ]
                }]
            })
        );
    }
}

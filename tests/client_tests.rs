use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::json;
use slack_diffusion::{
    BotError, ChatCompletion, ChatMessage, ImageClient, ImageGenerator, ImageSize, OpenAiConfig,
    PostMessage, PromptSegment, SlackApi, SlackClient, SlackConfig, StabilityConfig, TextClient,
    TextToImageRequest, UploadRequest,
};
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn image_client(server: &MockServer) -> ImageClient {
    let config = StabilityConfig::new()
        .with_credentials("sk-stability")
        .with_api_host(server.uri());
    ImageClient::new(reqwest::Client::new(), &config).unwrap()
}

fn slack_client(server: &MockServer) -> SlackClient {
    let config = SlackConfig::new()
        .with_credentials("secret", "xoxb-test")
        .with_api_base(server.uri());
    SlackClient::new(reqwest::Client::new(), &config).unwrap()
}

#[tokio::test]
async fn text_to_image_posts_defaults_and_decodes_artifacts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(
            "/v1/generation/stable-diffusion-xl-beta-v2-2-2/text-to-image",
        ))
        .and(header("authorization", "Bearer sk-stability"))
        .and(header("accept", "application/json"))
        .and(body_json(json!({
            "text_prompts": [{ "text": "sky", "weight": 0.5 }, { "text": "sea" }],
            "cfg_scale": 7.0,
            "clip_guidance_preset": "FAST_BLUE",
            "height": 1024,
            "width": 1024,
            "samples": 1,
            "steps": 30
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "artifacts": [
                { "base64": STANDARD.encode(b"png-0"), "seed": 1, "finishReason": "SUCCESS" },
                { "base64": STANDARD.encode(b"png-1"), "seed": 2, "finishReason": "SUCCESS" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let images = image_client(&server)
        .text_to_image(TextToImageRequest::new(
            vec![PromptSegment::weighted("sky", 0.5), PromptSegment::new("sea")],
            ImageSize::LARGE,
        ))
        .await
        .unwrap();

    assert_eq!(images.len(), 2);
    assert_eq!(images[0].data, b"png-0".to_vec());
    assert_eq!(images[1].filename(), "image_1.png");
}

#[tokio::test]
async fn text_to_image_uses_requested_engine() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/generation/custom-engine/text-to-image"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "artifacts": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let images = image_client(&server)
        .text_to_image(
            TextToImageRequest::new(vec![PromptSegment::new("sky")], ImageSize::SMALL)
                .with_engine("custom-engine"),
        )
        .await
        .unwrap();
    assert!(images.is_empty());
}

#[tokio::test]
async fn text_to_image_error_carries_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let err = image_client(&server)
        .text_to_image(TextToImageRequest::new(
            vec![PromptSegment::new("sky")],
            ImageSize::SMALL,
        ))
        .await
        .unwrap_err();

    match err {
        BotError::UpstreamError { status, body, .. } => {
            assert_eq!(status, 401);
            assert!(body.contains("invalid api key"));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn chat_completion_returns_first_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_json(json!({
            "model": "gpt-3.5-turbo",
            "messages": [
                { "role": "system", "content": "sys" },
                { "role": "user", "content": "a cat" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [
                { "message": { "role": "assistant", "content": "Cat, Fluffy, Sunlight" } },
                { "message": { "role": "assistant", "content": "ignored" } }
            ]
        })))
        .mount(&server)
        .await;

    let config = OpenAiConfig::new()
        .with_credentials("sk-test")
        .with_api_base(server.uri());
    let client = TextClient::new(reqwest::Client::new(), &config).unwrap();

    let content = client
        .complete(
            "gpt-3.5-turbo",
            vec![ChatMessage::system("sys"), ChatMessage::user("a cat")],
        )
        .await
        .unwrap();
    assert_eq!(content.as_deref(), Some("Cat, Fluffy, Sunlight"));
}

#[tokio::test]
async fn chat_completion_without_choices_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let config = OpenAiConfig::new()
        .with_credentials("sk-test")
        .with_api_base(server.uri());
    let client = TextClient::new(reqwest::Client::new(), &config).unwrap();

    let content = client.complete("m", vec![ChatMessage::user("x")]).await.unwrap();
    assert!(content.is_none());
}

#[tokio::test]
async fn upload_sends_multipart_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/files.upload"))
        .and(header("authorization", "Bearer xoxb-test"))
        .and(body_string_contains("name=\"channels\""))
        .and(body_string_contains("name=\"thread_ts\""))
        .and(body_string_contains("filename=\"image_0.png\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let result = slack_client(&server)
        .upload_file(UploadRequest {
            data: b"png".to_vec(),
            filename: "image_0.png".into(),
            title: None,
            channel: Some("C1".into()),
            thread_ts: Some("1.0".into()),
        })
        .await;
    assert!(result.ok);
}

#[tokio::test]
async fn upload_rejection_is_reported_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/files.upload"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "ok": false, "error": "not_in_channel" })),
        )
        .mount(&server)
        .await;

    let result = slack_client(&server)
        .upload_file(UploadRequest {
            data: b"png".to_vec(),
            filename: "image_0.png".into(),
            ..Default::default()
        })
        .await;
    assert!(!result.ok);
    assert_eq!(result.error.as_deref(), Some("not_in_channel"));
}

#[tokio::test]
async fn history_queries_from_clicked_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/conversations.history"))
        .and(query_param("channel", "C1"))
        .and(query_param("latest", "3.0"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "messages": [{ "ts": "2.0", "thread_ts": "1.0" }]
        })))
        .mount(&server)
        .await;

    let messages = slack_client(&server)
        .conversations_history("C1", "3.0", 10)
        .await
        .unwrap();
    assert_eq!(messages[0].thread_ts.as_deref(), Some("1.0"));
}

#[tokio::test]
async fn post_message_surfaces_slack_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat.postMessage"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "ok": false, "error": "channel_not_found" })),
        )
        .mount(&server)
        .await;

    let err = slack_client(&server)
        .post_message(PostMessage::text("C1", "1.0", "hello"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("channel_not_found"));
}

//! Telegram messenger against a local stand-in for the Bot API.

use axum::{body::Bytes, extract::State, http::StatusCode, routing::post, Router};
use pushgate::delivery::{ImageFormat, Payload};
use pushgate::messengers::{Messenger, TelegramMessenger};
use tokio::sync::mpsc;

type Calls = mpsc::UnboundedSender<(&'static str, Bytes)>;

async fn fake_bot_api(status: StatusCode) -> (String, mpsc::UnboundedReceiver<(&'static str, Bytes)>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let send_message = move |State(tx): State<Calls>, body: Bytes| async move {
        let _ = tx.send(("sendMessage", body));
        status
    };
    let send_photo = move |State(tx): State<Calls>, body: Bytes| async move {
        let _ = tx.send(("sendPhoto", body));
        status
    };
    let app = Router::new()
        .route("/botTEST/sendMessage", post(send_message))
        .route("/botTEST/sendPhoto", post(send_photo))
        .with_state(tx);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{}/", addr), rx)
}

#[tokio::test]
async fn text_goes_to_send_message() {
    let (base, mut calls) = fake_bot_api(StatusCode::OK).await;
    let telegram = TelegramMessenger::with_api_base("TEST".to_string(), base);
    assert_eq!(telegram.id(), "telegram");

    telegram
        .send_message("12345", &Payload::Text("hello".to_string()))
        .await
        .unwrap();
    let (method, body) = calls.recv().await.unwrap();
    assert_eq!(method, "sendMessage");
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["chat_id"], "12345");
    assert_eq!(json["text"], "hello");
}

#[tokio::test]
async fn image_goes_to_send_photo() {
    let (base, mut calls) = fake_bot_api(StatusCode::OK).await;
    let telegram = TelegramMessenger::with_api_base("TEST".to_string(), base);

    let payload = Payload::Image {
        bytes: b"GIF89a-not-really".to_vec(),
        format: ImageFormat::Gif,
    };
    telegram.send_message("-100", &payload).await.unwrap();
    let (method, body) = calls.recv().await.unwrap();
    assert_eq!(method, "sendPhoto");
    let text = String::from_utf8_lossy(&body);
    assert!(text.contains("name=\"chat_id\""));
    assert!(text.contains("-100"));
    assert!(text.contains("filename=\"image.gif\""));
    assert!(text.contains("GIF89a-not-really"));
}

#[tokio::test]
async fn api_error_is_reported() {
    let (base, _calls) = fake_bot_api(StatusCode::BAD_REQUEST).await;
    let telegram = TelegramMessenger::with_api_base("TEST".to_string(), base);
    let err = telegram
        .send_message("1", &Payload::Text("x".to_string()))
        .await
        .unwrap_err();
    assert!(err.starts_with("sendMessage failed: 400"));
}

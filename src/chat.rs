use crate::constants::APOLOGY_TEXT;
use crate::core::chat::{encode_request, endpoint_for_host, parse_reply, ChatError};
use crate::core::voice::VoiceEvent;
use crate::dom;
use crate::http;
use crate::state::SharedStage;
use crate::voice::Voice;
use wasm_bindgen_futures::spawn_local;

async fn ask(endpoint: &str, text: &str) -> anyhow::Result<String> {
    let body = encode_request(text)?;
    let resp = http::post(endpoint, "application/json", &body).await?;
    if !resp.ok() {
        return Err(ChatError::Status(resp.status()).into());
    }
    let body = http::text(&resp).await?;
    Ok(parse_reply(&body)?)
}

/// Send the input field to the chat backend and speak the reply.
pub fn submit(stage: &SharedStage, voice: &Voice) {
    let Some(document) = dom::window_document() else {
        return;
    };
    let Some(input) = dom::text_input(&document) else {
        return;
    };
    let (text, endpoint) = {
        let mut s = stage.borrow_mut();
        let Some(text) = s.chat.begin(&input.value()) else {
            return;
        };
        let endpoint = endpoint_for_host(
            &dom::hostname(),
            &s.config.local_chat_url,
            &s.config.remote_chat_url,
        )
        .to_owned();
        (text, endpoint)
    };
    input.set_disabled(true);
    log::info!("[chat] asking {}", endpoint);

    let stage = stage.clone();
    let voice = voice.clone();
    spawn_local(async move {
        match ask(&endpoint, &text).await {
            Ok(reply) => voice.say(&reply),
            Err(e) => {
                log::error!("[chat] request failed: {:?}", e);
                voice.dispatch(VoiceEvent::Interrupted);
                voice.say(APOLOGY_TEXT);
            }
        }
        dom::release_input(&document);
        stage.borrow_mut().chat.finish();
    });
}

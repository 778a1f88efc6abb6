use super::{blocks, EventHandler};
use crate::{
    error::Result,
    models::{AppMentionEvent, PostMessage},
};

/// Removes the first `<@...>` mention token and trims what is left.
pub fn strip_mention(text: &str) -> String {
    if let Some(start) = text.find("<@") {
        if let Some(len) = text[start..].find('>') {
            let rest = format!("{}{}", &text[..start], &text[start + len + 1..]);
            return rest.trim().to_string();
        }
    }
    text.trim().to_string()
}

impl EventHandler {
    /// Answers a mention with a generated prompt and the confirmation form.
    pub async fn handle_mention(&self, event: AppMentionEvent) {
        let thread_ts = event.thread_anchor().to_string();

        if let Err(e) = self.run_mention(&event, &thread_ts).await {
            log::error!("Mention in {} failed: {}", event.channel, e);
            self.report_error(&event.channel, &thread_ts, &e).await;
        }
    }

    async fn run_mention(&self, event: &AppMentionEvent, thread_ts: &str) -> Result<()> {
        let message = strip_mention(&event.text);

        if message.is_empty() {
            log::info!("Empty mention in {}, sending usage hint", event.channel);
            return self
                .slack
                .post_message(PostMessage::blocks(
                    &event.channel,
                    thread_ts,
                    blocks::usage_hint_blocks(),
                ))
                .await;
        }

        let prompt = self.prompts.generate(&message, None).await?;

        self.slack
            .post_message(PostMessage::blocks(
                &event.channel,
                thread_ts,
                blocks::confirmation_blocks(&prompt),
            ))
            .await
    }
}

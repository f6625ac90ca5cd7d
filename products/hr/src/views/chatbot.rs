use std::fmt;

use platform_api::ApiError;

use crate::context::ViewContext;

pub const GREETING: &str = "Hello! How can I help you with your evaluation today?";
const AUTH_ERROR: &str = "Authentication error. Please log in again.";
const NO_ANSWER: &str = "Sorry, I couldn't understand that.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
}

/// Evaluation assistant on the employee dashboard. Every failure becomes a
/// bot message; the conversation never ends in an error.
#[derive(Clone, Debug)]
pub struct Chatbot {
    messages: Vec<ChatMessage>,
    typing: bool,
}

impl Default for Chatbot {
    fn default() -> Self {
        Self {
            messages: vec![ChatMessage {
                sender: Sender::Bot,
                text: GREETING.to_string(),
            }],
            typing: false,
        }
    }
}

impl Chatbot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Sends `input` and returns the bot's reply. Blank input is ignored.
    pub async fn send(&mut self, ctx: &ViewContext, input: &str) -> Option<&ChatMessage> {
        if input.trim().is_empty() || self.typing {
            return None;
        }
        self.messages.push(ChatMessage {
            sender: Sender::User,
            text: input.to_string(),
        });
        let reply = match ctx.token() {
            None => AUTH_ERROR.to_string(),
            Some(token) => {
                self.typing = true;
                let answer = ctx.api.chatbot_query(Some(&token), input).await;
                self.typing = false;
                match answer {
                    Ok(text) if text.trim().is_empty() => NO_ANSWER.to_string(),
                    Ok(text) => text,
                    Err(ApiError::Transport(_)) => {
                        "Something went wrong. Try again later.".to_string()
                    }
                    Err(err) => err.user_message("The server returned an error."),
                }
            }
        };
        self.messages.push(ChatMessage {
            sender: Sender::Bot,
            text: reply,
        });
        self.messages.last()
    }
}

impl fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let who = match self.sender {
            Sender::User => "you",
            Sender::Bot => "bot",
        };
        // Bold markers become plain text.
        write!(f, "{who}> {}", self.text.replace("**", ""))
    }
}

impl fmt::Display for Chatbot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for message in &self.messages {
            writeln!(f, "{message}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::offline as signed_out;

    #[tokio::test]
    async fn greets_and_ignores_blank_input() {
        let mut bot = Chatbot::new();
        assert_eq!(bot.messages()[0].text, GREETING);
        assert!(bot.send(&signed_out(), "   ").await.is_none());
        assert_eq!(bot.messages().len(), 1);
    }

    #[tokio::test]
    async fn missing_token_answers_with_auth_error() {
        let mut bot = Chatbot::new();
        let reply = bot.send(&signed_out(), "when is my review?").await.cloned();
        assert_eq!(reply.map(|m| m.text), Some(AUTH_ERROR.to_string()));
        assert_eq!(bot.messages().len(), 3);
    }

    #[test]
    fn bold_markers_are_stripped() {
        let message = ChatMessage {
            sender: Sender::Bot,
            text: "**Status**: on track".into(),
        };
        assert_eq!(message.to_string(), "bot> Status: on track");
    }
}

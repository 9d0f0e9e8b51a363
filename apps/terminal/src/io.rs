//! # Console I/O
//!
//! The shell and its confirmation prompts read from the same input, so a
//! prompt simply takes the next line.
//!
//! ```text
//!   cerrar
//!   ┌ Cerrar caja ───────────────────────────
//!   │ ¿Cerrar la caja? (19/10/2026 20:15)
//!   │ Ventas: 14 · Total: $ 48.300
//!   └ Cerrar (s/N): s          ◄── LinePrompter reads this line
//!   [ok] Caja cerrada.         ◄── ConsoleNotifier
//! ```

use async_trait::async_trait;
use huevo_client::{ConfirmRequest, Notice, Notifier, Prompter};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::Mutex;

use crate::render;

/// Line source shared by the read loop and the prompts.
pub struct LineInput<R> {
    lines: Mutex<Lines<R>>,
}

impl<R> LineInput<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        LineInput {
            lines: Mutex::new(reader.lines()),
        }
    }

    /// Next line, or `None` at end of input.
    pub async fn next_line(&self) -> std::io::Result<Option<String>> {
        self.lines.lock().await.next_line().await
    }
}

/// Confirms by reading one answer line. Anything but yes declines.
pub struct LinePrompter<R> {
    input: Arc<LineInput<R>>,
}

impl<R> LinePrompter<R> {
    pub fn new(input: Arc<LineInput<R>>) -> Self {
        LinePrompter { input }
    }
}

#[async_trait]
impl<R> Prompter for LinePrompter<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn confirm(&self, request: &ConfirmRequest) -> bool {
        println!("{}", render::confirm_request(request));
        match self.input.next_line().await {
            Ok(Some(answer)) => is_yes(&answer),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(error = %e, "Prompt input failed");
                false
            }
        }
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "s" | "si" | "sí" | "y" | "yes"
    )
}

/// Prints toasts as `[level] message`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        println!("{}", render::notice(&notice));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(text: &'static str) -> Arc<LineInput<&'static [u8]>> {
        Arc::new(LineInput::new(text.as_bytes()))
    }

    #[test]
    fn test_is_yes() {
        assert!(is_yes("s"));
        assert!(is_yes(" Sí "));
        assert!(!is_yes(""));
        assert!(!is_yes("no"));
    }

    #[tokio::test]
    async fn test_prompter_and_shell_share_lines() {
        let input = input("abrir\ns\nn\n");
        let prompter = LinePrompter::new(input.clone());
        let request = ConfirmRequest::new("Abrir caja", "¿Abrir la caja?");

        assert_eq!(input.next_line().await.unwrap().as_deref(), Some("abrir"));
        assert!(prompter.confirm(&request).await);
        assert!(!prompter.confirm(&request).await);
        assert!(!prompter.confirm(&request).await);
        assert_eq!(input.next_line().await.unwrap(), None);
    }
}

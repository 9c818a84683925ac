//! Session state shown in the prompt.

use console::style;

/// Prompt shown while the server cannot be reached.
pub const UNREACHABLE_PROMPT: &str = "Canvas Server not reachable";

/// Last-known view of the server's context.
///
/// Written only by [`PromptSync`](super::prompt::PromptSync); everything else
/// reads it through a watch receiver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Context path the server reported most recently.
    pub display_path: String,
    /// Whether the last refresh reached the server.
    pub reachable: bool,
}

impl SessionState {
    /// Plain prompt text: `[<path>] > ` or the unreachable placeholder.
    pub fn prompt_text(&self) -> String {
        if self.reachable {
            format!("[{}] > ", self.display_path)
        } else {
            format!("{} > ", UNREACHABLE_PROMPT)
        }
    }

    /// Prompt text with terminal styling.
    pub fn styled_prompt(&self) -> String {
        let text = self.prompt_text();
        let text = text.trim_end();
        if self.reachable {
            format!("{} ", style(text).cyan().bold())
        } else {
            format!("{} ", style(text).red())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reachable_prompt() {
        let state = SessionState {
            display_path: "/work/research".to_string(),
            reachable: true,
        };
        assert_eq!(state.prompt_text(), "[/work/research] > ");
    }

    #[test]
    fn test_unreachable_prompt_ignores_path() {
        let state = SessionState {
            display_path: "/work/research".to_string(),
            reachable: false,
        };
        assert_eq!(state.prompt_text(), "Canvas Server not reachable > ");
    }

    #[test]
    fn test_default_is_unreachable() {
        assert!(!SessionState::default().reachable);
    }
}

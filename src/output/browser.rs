//! Opening AI chat services in a browser tab.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiService {
    #[value(name = "chatgpt")]
    ChatGpt,
    Claude,
    Gemini,
}

impl AiService {
    pub const ALL: [AiService; 3] = [AiService::ChatGpt, AiService::Claude, AiService::Gemini];
}

impl fmt::Display for AiService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AiService::ChatGpt => "ChatGPT",
            AiService::Claude => "Claude",
            AiService::Gemini => "Gemini",
        };
        f.write_str(name)
    }
}

/// The page that starts a new conversation with `service`.
pub fn chat_url(service: AiService) -> &'static str {
    match service {
        AiService::ChatGpt => "https://chatgpt.com/",
        AiService::Claude => "https://claude.ai/new",
        AiService::Gemini => "https://gemini.google.com/app",
    }
}

/// The clipboard payload for chat mode: the prompt, if any, ahead of the
/// document.
pub fn chat_payload(prompt: Option<&str>, content: &str) -> String {
    match prompt.map(str::trim).filter(|p| !p.is_empty()) {
        Some(prompt) => format!("{prompt}\n\n{content}"),
        None => content.to_string(),
    }
}

/// The application name `open` should launch for a `--browser` value.
/// `None` means the system default.
pub fn browser_app(browser: &str) -> Option<String> {
    let browser = browser.trim().to_lowercase();
    let app = match browser.as_str() {
        "" | "default" => return None,
        "chrome" if cfg!(target_os = "macos") => "Google Chrome",
        "chrome" if cfg!(windows) => "chrome",
        "chrome" => "google-chrome",
        "safari" => "Safari",
        "edge" if cfg!(target_os = "macos") => "Microsoft Edge",
        "edge" if cfg!(windows) => "msedge",
        "edge" => "microsoft-edge",
        other => other,
    };
    Some(app.to_string())
}

/// Pasting instructions shown after a tab is opened.
pub fn instructions(service: AiService, prompt: Option<&str>) -> String {
    let mut text = format!(
        "\n{}\n1. Start a New chat if one is not already open\n2. Paste the copied repository (Ctrl+V / Cmd+V)\n",
        service.to_string().to_uppercase()
    );
    match prompt.filter(|p| !p.trim().is_empty()) {
        Some(prompt) => text.push_str(&format!("3. Your prompt is included at the top: \"{prompt}\"\n")),
        None => text.push_str("3. Add your question and send\n"),
    }
    text
}

/// Opens one tab per service. Returns `true` if at least one opened.
pub fn open_ai_chat(services: &[AiService], prompt: Option<&str>, browser: &str) -> bool {
    let app = browser_app(browser);
    open_ai_chat_with(services, prompt, |url| match &app {
        Some(app) => open::with(url, app),
        None => open::that(url),
    })
}

/// [`open_ai_chat`] with an explicit tab opener.
pub fn open_ai_chat_with<F>(services: &[AiService], prompt: Option<&str>, mut open_tab: F) -> bool
where
    F: FnMut(&str) -> io::Result<()>,
{
    let mut opened = 0;
    for &service in services {
        let url = chat_url(service);
        match open_tab(url) {
            Ok(()) => {
                tracing::info!("Opened {} at {}", service, url);
                eprint!("{}", instructions(service, prompt));
                opened += 1;
            }
            Err(e) => tracing::warn!("Failed to open {}: {}", service, e),
        }
    }
    opened > 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_urls_are_https() {
        for service in AiService::ALL {
            assert!(chat_url(service).starts_with("https://"));
        }
    }

    #[test]
    fn test_service_names_parse_from_cli() {
        assert_eq!(AiService::from_str("chatgpt", true).unwrap(), AiService::ChatGpt);
        assert_eq!(AiService::from_str("claude", true).unwrap(), AiService::Claude);
        assert!(AiService::from_str("invalid_service", true).is_err());
    }

    #[test]
    fn test_browser_app_mapping() {
        assert_eq!(browser_app("default"), None);
        assert_eq!(browser_app(""), None);
        assert_eq!(browser_app("firefox").as_deref(), Some("firefox"));
        assert_eq!(browser_app("Safari").as_deref(), Some("Safari"));
    }

    #[test]
    fn test_instructions_mention_service_and_prompt() {
        let text = instructions(AiService::ChatGpt, Some("test prompt"));
        assert!(text.contains("CHATGPT"));
        assert!(text.contains("New chat"));
        assert!(text.contains("test prompt"));
    }

    #[test]
    fn test_chat_payload_prepends_prompt() {
        assert_eq!(chat_payload(Some("Review this"), "# repo"), "Review this\n\n# repo");
        assert_eq!(chat_payload(Some("  "), "# repo"), "# repo");
        assert_eq!(chat_payload(None, "# repo"), "# repo");
    }

    #[test]
    fn test_open_ai_chat_opens_one_tab_per_service() {
        let mut urls = Vec::new();
        let ok = open_ai_chat_with(&[AiService::ChatGpt, AiService::Claude], None, |url| {
            urls.push(url.to_string());
            Ok(())
        });
        assert!(ok);
        assert_eq!(urls, vec![chat_url(AiService::ChatGpt), chat_url(AiService::Claude)]);
    }

    #[test]
    fn test_open_ai_chat_reports_total_failure() {
        let ok = open_ai_chat_with(&[AiService::Gemini], None, |_| {
            Err(io::Error::new(io::ErrorKind::NotFound, "no browser"))
        });
        assert!(!ok);
        assert!(!open_ai_chat_with(&[], None, |_| Ok(())));
    }
}

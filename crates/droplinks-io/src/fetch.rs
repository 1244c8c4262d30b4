//! Background page-title fetches.
//!
//! One worker thread per request, results collected by polling. Requests
//! can be cancelled by id, in which case the eventual result is dropped
//! unseen; the board uses this when a link disappears before its fetch
//! completes.

use std::{
    sync::mpsc::{self, Receiver, TryRecvError},
    thread::{self, JoinHandle},
    time::Duration,
};

/// Outcome of a title fetch. `title` is `None` when the page had no
/// usable `<title>` even if the request itself succeeded.
#[derive(Debug)]
pub struct MetadataResult {
    pub request_id: u64,
    pub title: Option<String>,
    pub error: Option<String>,
}

struct PendingFetch {
    request_id: u64,
    receiver: Receiver<MetadataResult>,
    join: Option<JoinHandle<()>>,
}

/// Manages non-blocking page-title lookups using a worker thread per
/// request.
pub struct MetadataFetchService {
    pending: Vec<PendingFetch>,
    default_timeout: Duration,
}

impl MetadataFetchService {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            default_timeout: Duration::from_secs(15),
        }
    }

    /// Set the timeout applied to every request.
    pub fn set_default_timeout(&mut self, timeout: Duration) {
        self.default_timeout = timeout;
    }

    /// Cancel a request by id: drop the pending entry so any eventual
    /// result is ignored.
    pub fn cancel(&mut self, request_id: u64) {
        self.pending.retain(|p| p.request_id != request_id);
    }

    pub fn request(&mut self, request_id: u64, url: &str) {
        let (tx, rx) = mpsc::channel();
        let url = url.to_string();
        let timeout = self.default_timeout;

        let join = thread::spawn(move || {
            let _ = tx.send(fetch_title(request_id, &url, timeout));
        });

        self.pending.push(PendingFetch {
            request_id,
            receiver: rx,
            join: Some(join),
        });
    }

    pub fn poll(&mut self) -> Vec<MetadataResult> {
        let mut ready = Vec::new();
        let mut still = Vec::new();
        for mut pending in self.pending.drain(..) {
            match pending.receiver.try_recv() {
                Ok(result) => {
                    if let Some(join) = pending.join.take() {
                        let _ = join.join();
                    }
                    ready.push(result);
                }
                Err(TryRecvError::Empty) => still.push(pending),
                Err(TryRecvError::Disconnected) => {
                    if let Some(join) = pending.join.take() {
                        let _ = join.join();
                    }
                    ready.push(MetadataResult {
                        request_id: pending.request_id,
                        title: None,
                        error: Some("disconnected".into()),
                    });
                }
            }
        }
        self.pending = still;
        ready
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

impl Default for MetadataFetchService {
    fn default() -> Self {
        Self::new()
    }
}

fn fetch_title(request_id: u64, url: &str, timeout: Duration) -> MetadataResult {
    let failure = |message: String| MetadataResult {
        request_id,
        title: None,
        error: Some(message),
    };

    let parsed = match reqwest::Url::parse(url) {
        Ok(parsed) => parsed,
        Err(err) => return failure(err.to_string()),
    };

    // Title lookups only make sense for web pages.
    let scheme = parsed.scheme().to_ascii_lowercase();
    if scheme != "http" && scheme != "https" {
        return failure("blocked: unsupported scheme".into());
    }

    let client = match reqwest::blocking::Client::builder()
        .user_agent("DropLinks/0.1")
        .timeout(timeout)
        .build()
    {
        Ok(client) => client,
        Err(err) => return failure(err.to_string()),
    };

    match client.get(parsed).send() {
        Ok(resp) => {
            if !resp.status().is_success() {
                return failure(format!("status {}", resp.status().as_u16()));
            }
            let title = resp.text().ok().as_deref().and_then(extract_html_title);
            MetadataResult {
                request_id,
                title,
                error: None,
            }
        }
        Err(err) => failure(err.to_string()),
    }
}

/// First non-empty `<title>` text in the document.
fn extract_html_title(body: &str) -> Option<String> {
    let document = scraper::Html::parse_document(body);
    let selector = scraper::Selector::parse("title").ok()?;
    let text: String = document.select(&selector).next()?.text().collect();
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_html_title() {
        let html = "<html><head><title>  My Page </title></head><body></body></html>";
        assert_eq!(extract_html_title(html).as_deref(), Some("My Page"));
    }

    #[test]
    fn test_extract_html_title_missing_or_empty() {
        assert_eq!(extract_html_title("<html><body>hi</body></html>"), None);
        assert_eq!(extract_html_title("<title>   </title>"), None);
        assert_eq!(extract_html_title("plain text"), None);
    }

    #[test]
    fn test_cancel_drops_pending_result() {
        let mut service = MetadataFetchService::new();
        service.request(7, "http://127.0.0.1:0/");
        assert!(service.has_pending());

        service.cancel(7);
        assert!(!service.has_pending());
        assert!(service.poll().is_empty());
    }

    #[test]
    fn test_unsupported_scheme_is_blocked() {
        let result = fetch_title(1, "ftp://files.example.com/a", Duration::from_secs(1));
        assert!(result.error.as_deref().unwrap().contains("unsupported scheme"));
        assert_eq!(result.title, None);
    }
}

// Transient UI state for one downloader view
//
// Single writer. Results come back tagged with the ticket of the request that
// produced them; only the newest ticket may change the visible state.

use crate::downloader::{BackendHealth, DownloadRequest, DownloadResult, Platform, TwoStepResult};

/// Identifies one submitted request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    generation: u64,
    request: DownloadRequest,
}

impl RequestTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn url(&self) -> &str {
        self.request.as_str()
    }
}

#[derive(Debug, Default)]
pub struct DownloadSession {
    url: String,
    selected_platform: Platform,
    is_downloading: bool,
    last_result: Option<DownloadResult>,
    pending: Option<TwoStepResult>,
    backend: BackendHealth,
    generation: u64,
}

impl DownloadSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    pub fn selected_platform(&self) -> Platform {
        self.selected_platform
    }

    /// Platform picker; only affects labels, dispatch always follows the URL
    pub fn select_platform(&mut self, platform: Platform) {
        self.selected_platform = platform;
    }

    /// Platform the current URL will be routed to
    pub fn detected_platform(&self) -> Platform {
        Platform::detect(&self.url)
    }

    pub fn backend_health(&self) -> BackendHealth {
        self.backend
    }

    pub fn set_backend_health(&mut self, health: BackendHealth) {
        self.backend = health;
    }

    pub fn is_downloading(&self) -> bool {
        self.is_downloading
    }

    pub fn last_result(&self) -> Option<&DownloadResult> {
        self.last_result.as_ref()
    }

    /// Two-step result still waiting for its download link
    pub fn pending(&self) -> Option<&TwoStepResult> {
        self.pending.as_ref()
    }

    pub fn take_pending(&mut self) -> Option<TwoStepResult> {
        self.pending.take()
    }

    /// Mirrors the download button: URL present, idle, backend online
    pub fn can_download(&self) -> bool {
        !self.url.trim().is_empty()
            && !self.is_downloading
            && self.backend == BackendHealth::Online
    }

    /// Start a request for the current URL.
    ///
    /// Returns `None` for an empty URL. A request already in flight is not
    /// cancelled, it is superseded: its result will be discarded.
    pub fn begin(&mut self) -> Option<RequestTicket> {
        let request = DownloadRequest::new(self.url.trim());
        if request.is_empty() {
            return None;
        }

        self.generation += 1;
        self.is_downloading = true;
        self.last_result = None;
        self.pending = None;

        Some(RequestTicket {
            generation: self.generation,
            request,
        })
    }

    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Apply a result; returns false when a newer request superseded it.
    pub fn complete(&mut self, ticket: &RequestTicket, result: DownloadResult) -> bool {
        if !self.is_current(ticket) {
            log::debug!(
                "[Session] Discarding stale result for request #{} (current #{})",
                ticket.generation,
                self.generation
            );
            return false;
        }

        self.is_downloading = false;
        self.last_result = Some(result);
        true
    }

    /// Apply a two-step result, keeping it pending if the link is unresolved.
    pub fn complete_two_step(&mut self, ticket: &RequestTicket, result: TwoStepResult) -> bool {
        let visible = match &result.download {
            Some(download) => download.as_ref().clone(),
            None => result.info.as_ref().clone(),
        };
        if !self.complete(ticket, visible) {
            return false;
        }

        // The slow link step is still running while the result is pending
        self.is_downloading = result.needs_resolution();
        self.pending = self.is_downloading.then_some(result);
        true
    }
}

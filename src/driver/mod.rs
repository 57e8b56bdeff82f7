//! Trait seam over the browser-automation stack.
//!
//! The scenario runner only ever talks to these traits, mirroring the
//! engine → browser → context → page ownership chain. The production
//! implementation lives in [`chromium`]; test doubles live in
//! [`crate::testing`].
//!
//! Trait methods carry no deadlines of their own: the runner bounds every
//! call with its per-step timeout, so a wedged backend surfaces as a
//! timeout error instead of a hang.

pub mod chromium;

use async_trait::async_trait;

use crate::error::Result;
use crate::locator::Locator;

/// Fixed launch configuration for the browser process.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    /// Extra process flags, e.g. container-friendly IPC settings.
    pub args: Vec<String>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1280,
            window_height: 720,
            args: vec![
                "--disable-dev-shm-usage".to_string(),
                "--ipc=host".to_string(),
                "--single-process".to_string(),
            ],
        }
    }
}

/// The automation engine: launches browsers and owns the machinery that
/// keeps them driveable (the CDP event loop in the real backend).
#[async_trait]
pub trait EngineLike: Send + Sync {
    async fn launch(&self, opts: &LaunchOptions) -> Result<Box<dyn BrowserLike>>;

    /// Stops the engine. Called exactly once per run, after the browser
    /// has been closed.
    async fn stop(&self) -> Result<()>;
}

/// A running browser process.
#[async_trait]
pub trait BrowserLike: Send + Sync {
    /// Opens an isolated browsing context (cookie/storage scoped).
    async fn new_context(&self) -> Result<Box<dyn ContextLike>>;

    async fn close(&self) -> Result<()>;
}

/// An isolated browsing context within a browser.
#[async_trait]
pub trait ContextLike: Send + Sync {
    async fn new_page(&self) -> Result<Box<dyn PageLike>>;

    async fn close(&self) -> Result<()>;
}

/// A single document view. All element interaction and the terminal
/// assertion go through this trait.
#[async_trait]
pub trait PageLike: Send + Sync {
    /// Navigates to `url`, returning as soon as the navigation is
    /// committed rather than fully loaded.
    async fn goto_commit(&self, url: &str) -> Result<()>;

    /// Resolves once the main document reaches DOM-ready.
    async fn dom_ready(&self) -> Result<()>;

    /// Identifiers of the page's child frames, for best-effort readiness
    /// probes.
    async fn child_frames(&self) -> Result<Vec<String>>;

    /// Resolves once the named child frame reaches DOM-ready.
    async fn frame_dom_ready(&self, frame: &str) -> Result<()>;

    /// Types `value` into the element addressed by `locator`.
    async fn fill(&self, locator: &Locator, value: &str) -> Result<()>;

    /// Clicks the element addressed by `locator`.
    async fn click(&self, locator: &Locator) -> Result<()>;

    /// Non-blocking probe: is `text` currently rendered and visible?
    async fn text_visible(&self, text: &str) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_launch_options_match_the_container_profile() {
        let opts = LaunchOptions::default();
        assert!(opts.headless);
        assert_eq!((opts.window_width, opts.window_height), (1280, 720));
        assert!(opts.args.iter().any(|a| a == "--disable-dev-shm-usage"));
        assert!(opts.args.iter().any(|a| a == "--single-process"));
    }
}

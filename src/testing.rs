//! Test doubles for the driver seam.
//!
//! [`MockEngine`] and the handles it produces record every action into a
//! shared [`MockState`] and can inject faults: a navigation or page action
//! that never resolves, a context that refuses to open, a frame that never
//! reaches DOM-ready. Release calls are counted so tests can assert each
//! handle is released exactly once.
//!
//! # Example
//!
//! ```
//! use agencyflow_e2e::testing::MockEngine;
//!
//! let engine = MockEngine::new();
//! let state = engine.state();
//! state.set_text_visible("Unique Invitation Token Generated");
//! // ... run the scenario against Box::new(engine), then inspect
//! // state.actions() and the release counters.
//! ```

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use anyhow::anyhow;

use crate::driver::{BrowserLike, ContextLike, EngineLike, LaunchOptions, PageLike};
use crate::error::Result;
use crate::locator::Locator;

/// Action recorded by the mock page for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockAction {
    Goto { url: String },
    DomReady,
    FrameReady { frame: String },
    Fill { locator: String, value: String },
    Click { locator: String },
    VisibilityProbe { text: String },
}

/// Shared state behind every handle a [`MockEngine`] produces.
///
/// Actions are recorded together with the (virtual) time they ran at, so
/// tests can assert on pacing as well as ordering.
#[derive(Default)]
pub struct MockState {
    actions: Mutex<Vec<(MockAction, tokio::time::Instant)>>,
    visible_texts: Mutex<HashSet<String>>,
    frames: Mutex<Vec<String>>,
    stuck_frames: Mutex<HashSet<String>>,
    hang_navigation: AtomicBool,
    hang_page_actions: AtomicBool,
    fail_context_open: AtomicBool,
    browser_closes: AtomicUsize,
    context_closes: AtomicUsize,
    engine_stops: AtomicUsize,
}

impl MockState {
    /// Marks `text` as visible on the page.
    pub fn set_text_visible(&self, text: &str) {
        self.visible_texts.lock().unwrap().insert(text.to_string());
    }

    /// Adds a child frame. A stuck frame never reaches DOM-ready.
    pub fn add_frame(&self, name: &str, stuck: bool) {
        self.frames.lock().unwrap().push(name.to_string());
        if stuck {
            self.stuck_frames.lock().unwrap().insert(name.to_string());
        }
    }

    /// Makes navigation suspend forever.
    pub fn set_hang_navigation(&self) {
        self.hang_navigation.store(true, Ordering::SeqCst);
    }

    /// Makes every fill/click suspend forever.
    pub fn set_hang_page_actions(&self) {
        self.hang_page_actions.store(true, Ordering::SeqCst);
    }

    /// Makes context acquisition fail.
    pub fn set_fail_context_open(&self) {
        self.fail_context_open.store(true, Ordering::SeqCst);
    }

    /// Returns all recorded actions.
    pub fn actions(&self) -> Vec<MockAction> {
        self.actions
            .lock()
            .unwrap()
            .iter()
            .map(|(action, _)| action.clone())
            .collect()
    }

    /// Returns all recorded actions with the instant each one ran at.
    pub fn timed_actions(&self) -> Vec<(MockAction, tokio::time::Instant)> {
        self.actions.lock().unwrap().clone()
    }

    pub fn browser_closes(&self) -> usize {
        self.browser_closes.load(Ordering::SeqCst)
    }

    pub fn context_closes(&self) -> usize {
        self.context_closes.load(Ordering::SeqCst)
    }

    pub fn engine_stops(&self) -> usize {
        self.engine_stops.load(Ordering::SeqCst)
    }

    fn record(&self, action: MockAction) {
        self.actions
            .lock()
            .unwrap()
            .push((action, tokio::time::Instant::now()));
    }
}

/// Mock automation engine for driving the scenario without a browser.
#[derive(Default)]
pub struct MockEngine {
    state: Arc<MockState>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the recorded state; clone it before boxing the
    /// engine for the runner.
    pub fn state(&self) -> Arc<MockState> {
        Arc::clone(&self.state)
    }
}

#[async_trait]
impl EngineLike for MockEngine {
    async fn launch(&self, _opts: &LaunchOptions) -> Result<Box<dyn BrowserLike>> {
        Ok(Box::new(MockBrowser {
            state: Arc::clone(&self.state),
        }))
    }

    async fn stop(&self) -> Result<()> {
        self.state.engine_stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct MockBrowser {
    state: Arc<MockState>,
}

#[async_trait]
impl BrowserLike for MockBrowser {
    async fn new_context(&self) -> Result<Box<dyn ContextLike>> {
        if self.state.fail_context_open.load(Ordering::SeqCst) {
            return Err(anyhow!("context open refused").into());
        }
        Ok(Box::new(MockContext {
            state: Arc::clone(&self.state),
        }))
    }

    async fn close(&self) -> Result<()> {
        self.state.browser_closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct MockContext {
    state: Arc<MockState>,
}

#[async_trait]
impl ContextLike for MockContext {
    async fn new_page(&self) -> Result<Box<dyn PageLike>> {
        Ok(Box::new(MockPage {
            state: Arc::clone(&self.state),
        }))
    }

    async fn close(&self) -> Result<()> {
        self.state.context_closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct MockPage {
    state: Arc<MockState>,
}

#[async_trait]
impl PageLike for MockPage {
    async fn goto_commit(&self, url: &str) -> Result<()> {
        if self.state.hang_navigation.load(Ordering::SeqCst) {
            return std::future::pending().await;
        }
        self.state.record(MockAction::Goto {
            url: url.to_string(),
        });
        Ok(())
    }

    async fn dom_ready(&self) -> Result<()> {
        self.state.record(MockAction::DomReady);
        Ok(())
    }

    async fn child_frames(&self) -> Result<Vec<String>> {
        Ok(self.state.frames.lock().unwrap().clone())
    }

    async fn frame_dom_ready(&self, frame: &str) -> Result<()> {
        if self.state.stuck_frames.lock().unwrap().contains(frame) {
            return std::future::pending().await;
        }
        self.state.record(MockAction::FrameReady {
            frame: frame.to_string(),
        });
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> Result<()> {
        if self.state.hang_page_actions.load(Ordering::SeqCst) {
            return std::future::pending().await;
        }
        self.state.record(MockAction::Fill {
            locator: locator.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        if self.state.hang_page_actions.load(Ordering::SeqCst) {
            return std::future::pending().await;
        }
        self.state.record(MockAction::Click {
            locator: locator.to_string(),
        });
        Ok(())
    }

    async fn text_visible(&self, text: &str) -> Result<bool> {
        self.state.record(MockAction::VisibilityProbe {
            text: text.to_string(),
        });
        Ok(self.state.visible_texts.lock().unwrap().contains(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_page_records_actions_in_order() {
        let engine = MockEngine::new();
        let state = engine.state();
        let browser = engine.launch(&LaunchOptions::default()).await.unwrap();
        let context = browser.new_context().await.unwrap();
        let page = context.new_page().await.unwrap();

        page.goto_commit("http://localhost:3000").await.unwrap();
        page.fill(&Locator::css("form input[type=email]"), "a@b.c")
            .await
            .unwrap();
        page.click(&Locator::css("form button[type=submit]"))
            .await
            .unwrap();

        assert_eq!(
            state.actions(),
            vec![
                MockAction::Goto {
                    url: "http://localhost:3000".to_string()
                },
                MockAction::Fill {
                    locator: "form input[type=email]".to_string(),
                    value: "a@b.c".to_string()
                },
                MockAction::Click {
                    locator: "form button[type=submit]".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn visibility_probe_reflects_configured_texts() {
        let engine = MockEngine::new();
        let state = engine.state();
        state.set_text_visible("Welcome");

        let browser = engine.launch(&LaunchOptions::default()).await.unwrap();
        let context = browser.new_context().await.unwrap();
        let page = context.new_page().await.unwrap();

        assert!(page.text_visible("Welcome").await.unwrap());
        assert!(!page.text_visible("Goodbye").await.unwrap());
    }

    #[tokio::test]
    async fn release_counters_track_each_handle() {
        let engine = MockEngine::new();
        let state = engine.state();
        let browser = engine.launch(&LaunchOptions::default()).await.unwrap();
        let context = browser.new_context().await.unwrap();

        context.close().await.unwrap();
        browser.close().await.unwrap();
        engine.stop().await.unwrap();

        assert_eq!(state.context_closes(), 1);
        assert_eq!(state.browser_closes(), 1);
        assert_eq!(state.engine_stops(), 1);
    }
}

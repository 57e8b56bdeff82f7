//! Chromium backend over the Chrome DevTools Protocol.
//!
//! [`ChromiumEngine`] spawns a Chromium process per run and drives it with
//! `chromiumoxide`. The CDP event handler runs on a dedicated task that is
//! owned by the engine and torn down when the engine stops.

use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::driver::{BrowserLike, ContextLike, EngineLike, LaunchOptions, PageLike};
use crate::error::{Result, ScenarioError};
use crate::locator::Locator;

const READY_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(100);

fn cdp_err(err: chromiumoxide::error::CdpError) -> ScenarioError {
    ScenarioError::Anyhow(anyhow::Error::new(err))
}

#[derive(Default)]
pub struct ChromiumEngine {
    events: StdMutex<Option<JoinHandle<()>>>,
}

impl ChromiumEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EngineLike for ChromiumEngine {
    async fn launch(&self, opts: &LaunchOptions) -> Result<Box<dyn BrowserLike>> {
        let mut builder = BrowserConfig::builder().arg(format!(
            "--window-size={},{}",
            opts.window_width, opts.window_height
        ));
        if !opts.headless {
            builder = builder.with_head();
        }
        for arg in &opts.args {
            builder = builder.arg(arg.as_str());
        }
        let config = builder.build().map_err(ScenarioError::BrowserLaunch)?;

        debug!(target = "driver", "launching Chromium...");
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScenarioError::BrowserLaunch(e.to_string()))?;

        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });
        if let Ok(mut slot) = self.events.lock() {
            *slot = Some(events);
        }

        Ok(Box::new(ChromiumBrowser {
            inner: Arc::new(Mutex::new(browser)),
        }))
    }

    async fn stop(&self) -> Result<()> {
        let handle = self.events.lock().ok().and_then(|mut slot| slot.take());
        if let Some(handle) = handle {
            handle.abort();
            debug!(target = "driver", "CDP event loop stopped");
        }
        Ok(())
    }
}

struct ChromiumBrowser {
    inner: Arc<Mutex<Browser>>,
}

#[async_trait]
impl BrowserLike for ChromiumBrowser {
    async fn new_context(&self) -> Result<Box<dyn ContextLike>> {
        // Each run launches its own Chromium with a fresh profile, so the
        // process's default context is already cookie/storage isolated.
        Ok(Box::new(ChromiumContext {
            browser: Arc::clone(&self.inner),
        }))
    }

    async fn close(&self) -> Result<()> {
        let mut browser = self.inner.lock().await;
        browser.close().await.map_err(cdp_err)?;
        // Reap the child process so no zombie outlives the run.
        let _ = browser.wait().await;
        debug!(target = "driver", "browser closed");
        Ok(())
    }
}

struct ChromiumContext {
    browser: Arc<Mutex<Browser>>,
}

#[async_trait]
impl ContextLike for ChromiumContext {
    async fn new_page(&self) -> Result<Box<dyn PageLike>> {
        let browser = self.browser.lock().await;
        let page = browser.new_page("about:blank").await.map_err(cdp_err)?;
        Ok(Box::new(ChromiumPage { page }))
    }

    async fn close(&self) -> Result<()> {
        // The context is the process's default one; releasing it amounts to
        // dropping the page handles. The process itself goes away with the
        // browser close that follows.
        debug!(target = "driver", "context released");
        Ok(())
    }
}

struct ChromiumPage {
    page: Page,
}

impl ChromiumPage {
    async fn resolve(&self, locator: &Locator) -> Result<Element> {
        if locator.nth == 0 {
            return self
                .page
                .find_element(locator.css)
                .await
                .map_err(|_| ScenarioError::ElementNotFound {
                    locator: locator.to_string(),
                });
        }
        let found = self
            .page
            .find_elements(locator.css)
            .await
            .map_err(|_| ScenarioError::ElementNotFound {
                locator: locator.to_string(),
            })?;
        found
            .into_iter()
            .nth(locator.nth)
            .ok_or_else(|| ScenarioError::ElementNotFound {
                locator: locator.to_string(),
            })
    }

    async fn ready_state(&self, expression: String) -> Result<String> {
        let state: String = self
            .page
            .evaluate(expression)
            .await
            .map_err(cdp_err)?
            .into_value()?;
        Ok(state)
    }
}

#[async_trait]
impl PageLike for ChromiumPage {
    async fn goto_commit(&self, url: &str) -> Result<()> {
        // Page.navigate resolves when the navigation is committed, before
        // the document finishes loading.
        self.page
            .goto(url)
            .await
            .map(|_| ())
            .map_err(|e| ScenarioError::Navigation {
                url: url.to_string(),
                source: anyhow::Error::new(e),
            })
    }

    async fn dom_ready(&self) -> Result<()> {
        loop {
            let state = self
                .ready_state("document.readyState".to_string())
                .await?;
            if state == "interactive" || state == "complete" {
                return Ok(());
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
    }

    async fn child_frames(&self) -> Result<Vec<String>> {
        let frames: Vec<String> = self
            .page
            .evaluate(
                "Array.from(document.querySelectorAll('iframe'))\
                 .map((f, i) => f.id || f.name || f.src || ('frame-' + i))",
            )
            .await
            .map_err(cdp_err)?
            .into_value()?;
        Ok(frames)
    }

    async fn frame_dom_ready(&self, frame: &str) -> Result<()> {
        let key = serde_json::to_string(frame)?;
        let expression = format!(
            "(() => {{\
               const frames = Array.from(document.querySelectorAll('iframe'));\
               const f = frames.find((f, i) => (f.id || f.name || f.src || ('frame-' + i)) === {key});\
               if (!f) return 'detached';\
               try {{ return f.contentDocument ? f.contentDocument.readyState : 'cross-origin'; }}\
               catch (_) {{ return 'cross-origin'; }}\
             }})()"
        );
        loop {
            let state = self.ready_state(expression.clone()).await?;
            // Cross-origin and detached frames cannot be observed; treat
            // them as settled rather than blocking the probe.
            match state.as_str() {
                "interactive" | "complete" | "cross-origin" | "detached" => return Ok(()),
                _ => tokio::time::sleep(READY_POLL_INTERVAL).await,
            }
        }
    }

    async fn fill(&self, locator: &Locator, value: &str) -> Result<()> {
        let element = self.resolve(locator).await?;
        element.click().await.map_err(cdp_err)?;
        element.type_str(value).await.map_err(cdp_err)?;
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        let element = self.resolve(locator).await?;
        element.click().await.map_err(cdp_err)?;
        Ok(())
    }

    async fn text_visible(&self, text: &str) -> Result<bool> {
        let needle = serde_json::to_string(text)?;
        let visible: bool = self
            .page
            .evaluate(format!(
                "document.body ? document.body.innerText.includes({needle}) : false"
            ))
            .await
            .map_err(cdp_err)?
            .into_value()?;
        Ok(visible)
    }
}

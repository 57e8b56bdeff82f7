//! Scoped ownership of the engine → browser → context → page chain.
//!
//! At most one of each handle exists per run. [`ScenarioSession::close`]
//! releases them in reverse acquisition order, each at most once, and runs
//! on every exit path including a failure partway through acquisition.

use tracing::{debug, warn};

use crate::driver::{BrowserLike, ContextLike, EngineLike, LaunchOptions, PageLike};
use crate::error::{Result, ScenarioError};

pub struct ScenarioSession {
    engine: Option<Box<dyn EngineLike>>,
    browser: Option<Box<dyn BrowserLike>>,
    context: Option<Box<dyn ContextLike>>,
    page: Option<Box<dyn PageLike>>,
}

impl ScenarioSession {
    /// Acquires the full resource chain. If any stage fails, everything
    /// acquired so far is released before the error is returned.
    pub async fn open(engine: Box<dyn EngineLike>, opts: &LaunchOptions) -> Result<Self> {
        let mut session = Self {
            engine: Some(engine),
            browser: None,
            context: None,
            page: None,
        };
        if let Err(err) = session.acquire(opts).await {
            session.close().await;
            return Err(err);
        }
        Ok(session)
    }

    async fn acquire(&mut self, opts: &LaunchOptions) -> Result<()> {
        let engine = self
            .engine
            .as_ref()
            .ok_or(ScenarioError::SessionClosed("engine"))?;
        self.browser = Some(engine.launch(opts).await?);

        let browser = self
            .browser
            .as_ref()
            .ok_or(ScenarioError::SessionClosed("browser"))?;
        self.context = Some(browser.new_context().await?);

        let context = self
            .context
            .as_ref()
            .ok_or(ScenarioError::SessionClosed("context"))?;
        self.page = Some(context.new_page().await?);

        debug!(target = "session", "session open");
        Ok(())
    }

    pub fn page(&self) -> Result<&dyn PageLike> {
        self.page
            .as_deref()
            .ok_or(ScenarioError::SessionClosed("page"))
    }

    /// Releases context, browser, and engine, in that order. Release
    /// failures are logged and do not stop the remaining handles from
    /// being released; the scenario verdict comes from the run body, not
    /// from teardown.
    pub async fn close(&mut self) {
        let _ = self.page.take();

        if let Some(context) = self.context.take() {
            if let Err(err) = context.close().await {
                warn!(target = "session", error = %err, "context close failed");
            }
        }
        if let Some(browser) = self.browser.take() {
            if let Err(err) = browser.close().await {
                warn!(target = "session", error = %err, "browser close failed");
            }
        }
        if let Some(engine) = self.engine.take() {
            if let Err(err) = engine.stop().await {
                warn!(target = "session", error = %err, "engine stop failed");
            }
        }
        debug!(target = "session", "session closed");
    }
}

//! Chromium page driver over the Chrome `DevTools` Protocol.
//!
//! Element lookups run as page-side JavaScript built from the selector's
//! query rendering, so text filters and `nth` behave exactly as in the
//! in-memory driver. Mutating actions go through real input events: the
//! addressed element is tagged with a one-off attribute, fetched as a CDP
//! element and clicked or typed into natively.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, CaptureScreenshotParams};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::driver::{PageDriver, SelectOption};
use crate::locator::{ElementState, Locator, DEFAULT_POLL_INTERVAL_MS};
use crate::result::{HallarError, HallarResult};

const TARGET_ATTR: &str = "data-hallar-target";

/// Browser launch options
#[derive(Debug, Clone)]
pub struct ChromiumConfig {
    /// Run without a window
    pub headless: bool,
    /// Chromium sandbox (disable in containers)
    pub sandbox: bool,
    /// Path to the chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Window width
    pub viewport_width: u32,
    /// Window height
    pub viewport_height: u32,
}

impl Default for ChromiumConfig {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: true,
            chromium_path: None,
            viewport_width: 1280,
            viewport_height: 900,
        }
    }
}

impl ChromiumConfig {
    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Disable the sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Set the chromium binary
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }
}

/// [`PageDriver`] backed by a real Chromium page
#[derive(Debug)]
pub struct ChromiumDriver {
    browser: Arc<Mutex<CdpBrowser>>,
    page: CdpPage,
    handle: tokio::task::JoinHandle<()>,
    tags: AtomicU64,
}

impl ChromiumDriver {
    /// Launch Chromium and open a blank page
    pub async fn launch(config: ChromiumConfig) -> HallarResult<Self> {
        let mut builder = CdpConfig::builder().window_size(config.viewport_width, config.viewport_height);
        if !config.headless {
            builder = builder.with_head();
        }
        if !config.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = config.chromium_path {
            builder = builder.chrome_executable(path);
        }
        let cdp_config = builder.build().map_err(HallarError::driver)?;

        let (browser, mut handler) = CdpBrowser::launch(cdp_config)
            .await
            .map_err(|e| HallarError::driver(format!("browser launch failed: {e}")))?;
        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| HallarError::driver(e.to_string()))?;
        debug!(headless = config.headless, "chromium launched");

        Ok(Self {
            browser: Arc::new(Mutex::new(browser)),
            page,
            handle,
            tags: AtomicU64::new(0),
        })
    }

    /// Navigate to `url`
    pub async fn goto(&self, url: &str) -> HallarResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| HallarError::driver(format!("navigation to {url} failed: {e}")))?;
        Ok(())
    }

    /// Close the browser
    pub async fn close(self) -> HallarResult<()> {
        let mut browser = self.browser.lock().await;
        browser
            .close()
            .await
            .map_err(|e| HallarError::driver(e.to_string()))?;
        self.handle.abort();
        Ok(())
    }

    /// Run `body` (a JS function body) and decode its JSON result
    async fn eval<T: DeserializeOwned>(&self, body: &str) -> HallarResult<T> {
        let script = format!("JSON.stringify((() => {{ {body} }})())");
        let raw: String = self
            .page
            .evaluate(script.as_str())
            .await
            .map_err(|e| HallarError::driver(e.to_string()))?
            .into_value()
            .map_err(|e| HallarError::driver(e.to_string()))?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Run `body` against the addressed element, failing when it is absent
    async fn with_element<T: DeserializeOwned>(&self, locator: &Locator, body: &str) -> HallarResult<T> {
        self.eval(&element_script(locator, body)).await
    }

    /// Fetch the addressed element as a CDP handle
    async fn element(&self, locator: &Locator) -> HallarResult<Element> {
        let tag = self.tags.fetch_add(1, Ordering::Relaxed);
        let _: bool = self
            .with_element(
                locator,
                &format!("el.setAttribute('{TARGET_ATTR}', '{tag}'); return true;"),
            )
            .await?;
        let found = self
            .page
            .find_element(tag_selector(tag))
            .await
            .map_err(|e| HallarError::driver(format!("{locator}: {e}")));
        if let Err(e) = self.eval::<bool>(&untag_script(tag)).await {
            debug!(%locator, error = %e, "target tag not removed");
        }
        found
    }
}

fn tag_selector(tag: u64) -> String {
    format!("[{TARGET_ATTR}=\"{tag}\"]")
}

fn untag_script(tag: u64) -> String {
    format!(
        "const el = document.querySelector('{}'); if (el) {{ el.removeAttribute('{TARGET_ATTR}'); }} return true;",
        tag_selector(tag)
    )
}

fn element_script(locator: &Locator, body: &str) -> String {
    format!(
        "const el = {}; if (!el) {{ throw new Error('no element matches the locator'); }} {body}",
        locator.to_query()
    )
}

fn state_script(locator: &Locator, state: ElementState) -> String {
    let check = match state {
        ElementState::Attached => "return true;",
        ElementState::Visible => {
            "const r = el.getBoundingClientRect(); const s = getComputedStyle(el); \
             return r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none';"
        }
    };
    format!("const el = {}; if (!el) {{ return false; }} {check}", locator.to_query())
}

/// Sets a form control's value through the prototype setter so framework
/// listeners observe the change
const SET_VALUE: &str = "const setter = Object.getOwnPropertyDescriptor(Object.getPrototypeOf(el), 'value').set; \
     setter.call(el, VALUE); \
     el.dispatchEvent(new Event('input', { bubbles: true })); \
     el.dispatchEvent(new Event('change', { bubbles: true }));";

#[async_trait]
impl PageDriver for ChromiumDriver {
    async fn wait_for(
        &self,
        locator: &Locator,
        state: ElementState,
        timeout: Duration,
    ) -> HallarResult<bool> {
        let script = state_script(locator, state);
        let deadline = Instant::now() + timeout;
        loop {
            if self.eval::<bool>(&script).await? {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(Duration::from_millis(DEFAULT_POLL_INTERVAL_MS)).await;
        }
    }

    async fn count(&self, locator: &Locator) -> HallarResult<usize> {
        self.eval(&format!("return {};", locator.selector().to_count_query()))
            .await
    }

    async fn click(&self, locator: &Locator) -> HallarResult<()> {
        let element = self.element(locator).await?;
        element
            .click()
            .await
            .map_err(|e| HallarError::driver(format!("click on {locator} failed: {e}")))?;
        Ok(())
    }

    async fn clear(&self, locator: &Locator) -> HallarResult<()> {
        let body = SET_VALUE.replace("VALUE", "''");
        let _: bool = self
            .with_element(locator, &format!("{body} return true;"))
            .await?;
        Ok(())
    }

    async fn fill(&self, locator: &Locator, text: &str) -> HallarResult<()> {
        let element = self.element(locator).await?;
        element
            .click()
            .await
            .map_err(|e| HallarError::driver(format!("focus on {locator} failed: {e}")))?;
        element
            .type_str(text)
            .await
            .map_err(|e| HallarError::driver(format!("typing into {locator} failed: {e}")))?;
        Ok(())
    }

    async fn select_option(&self, locator: &Locator, value: &str) -> HallarResult<()> {
        let wanted = serde_json::to_string(value)?;
        let body = format!(
            "const opt = Array.from(el.options).find(o => o.value === {wanted} || o.label === {wanted} || o.text === {wanted}); \
             if (!opt) {{ return false; }} \
             {} return true;",
            SET_VALUE.replace("VALUE", "opt.value")
        );
        if self.with_element(locator, &body).await? {
            Ok(())
        } else {
            Err(HallarError::driver(format!("no option '{value}' in {locator}")))
        }
    }

    async fn set_input_files(&self, locator: &Locator, files: &[PathBuf]) -> HallarResult<()> {
        let element = self.element(locator).await?;
        let mut paths = Vec::with_capacity(files.len());
        for file in files {
            let absolute = tokio::fs::canonicalize(file).await?;
            paths.push(absolute.display().to_string());
        }
        let params = SetFileInputFilesParams::builder()
            .files(paths)
            .backend_node_id(element.backend_node_id)
            .build()
            .map_err(HallarError::driver)?;
        self.page
            .execute(params)
            .await
            .map_err(|e| HallarError::driver(format!("attaching files to {locator} failed: {e}")))?;
        Ok(())
    }

    async fn get_attribute(&self, locator: &Locator, name: &str) -> HallarResult<Option<String>> {
        let name = serde_json::to_string(name)?;
        self.with_element(locator, &format!("return el.getAttribute({name});"))
            .await
    }

    async fn input_value(&self, locator: &Locator) -> HallarResult<String> {
        self.with_element(locator, "return el.value ?? '';").await
    }

    async fn text_content(&self, locator: &Locator) -> HallarResult<Option<String>> {
        self.with_element(locator, "return el.textContent;").await
    }

    async fn select_options(&self, locator: &Locator) -> HallarResult<Vec<SelectOption>> {
        self.with_element(
            locator,
            "return Array.from(el.options || []).map(o => ({ value: o.value, label: o.label || o.text }));",
        )
        .await
    }

    async fn wait_for_timeout(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    async fn screenshot(&self) -> HallarResult<Vec<u8>> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let shot = self
            .page
            .execute(params)
            .await
            .map_err(|e| HallarError::driver(format!("screenshot failed: {e}")))?;

        use base64::Engine;
        base64::engine::general_purpose::STANDARD
            .decode(&shot.data)
            .map_err(|e| HallarError::driver(format!("screenshot decode failed: {e}")))
    }
}

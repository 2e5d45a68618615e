//! The page the booking flow drives.
//!
//! Wraps a chromiumoxide page and exposes the handful of operations the flow
//! needs: navigation with the document status, locator-based clicks, fills and
//! reads, and polling waits on predicates over the live DOM.

use crate::locator::Locator;
use crate::{Error, Result};
use boarding_core::WaitConfig;
use boarding_core::wait::{wait_for_result, wait_for_some};
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventResponseReceived, ResourceType,
};
use chromiumoxide::page::Page as ChromePage;
use futures::StreamExt;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;

/// How long to look for the document response after a navigation completes.
const DOCUMENT_RESPONSE_GRACE: Duration = Duration::from_secs(5);

#[derive(Deserialize)]
struct Probe<T> {
    found: bool,
    value: Option<T>,
}

#[derive(Debug, Clone)]
pub struct Page {
    inner: ChromePage,
    wait: WaitConfig,
}

impl Page {
    pub(crate) fn new(inner: ChromePage, wait: WaitConfig) -> Self {
        Self { inner, wait }
    }

    /// Navigate to `url` and return the HTTP status of the main document.
    ///
    /// `None` means no document response was observed, e.g. when the page
    /// was served from cache.
    pub async fn goto(&self, url: &str) -> Result<Option<u16>> {
        self.inner.execute(EnableParams::default()).await?;
        let mut responses = self.inner.event_listener::<EventResponseReceived>().await?;

        tracing::debug!("Navigating to {}", url);
        self.inner.goto(url).await.map_err(|e| Error::Navigation {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let status = tokio::time::timeout(DOCUMENT_RESPONSE_GRACE, async {
            while let Some(event) = responses.next().await {
                if event.r#type == ResourceType::Document {
                    return Some(event.response.status as u16);
                }
            }
            None
        })
        .await
        .ok()
        .flatten();

        self.wait_for_load().await?;
        tracing::debug!("Loaded {} (status {:?})", url, status);
        Ok(status)
    }

    /// Evaluate a JS expression and deserialize its value
    pub async fn evaluate<T: DeserializeOwned>(&self, script: &str) -> Result<T> {
        let result = self
            .inner
            .evaluate(script)
            .await
            .map_err(|e| Error::Script(e.to_string()))?;

        result
            .into_value()
            .map_err(|e| Error::Script(e.to_string()))
    }

    pub async fn title(&self) -> Result<String> {
        self.evaluate("document.title").await
    }

    pub async fn url(&self) -> Result<String> {
        self.evaluate("window.location.href").await
    }

    /// Number of elements matching `locator` right now
    pub async fn count(&self, locator: &Locator) -> Result<usize> {
        self.evaluate(&locator.count_script()).await
    }

    /// Run `body` once against whatever `locator` resolves to right now.
    async fn probe_element<T: DeserializeOwned>(
        &self,
        locator: &Locator,
        body: &str,
    ) -> Result<Probe<T>> {
        self.evaluate(&locator.element_script(body)).await
    }

    /// Run `body` against the element `locator` resolves to, waiting for the
    /// element to be rendered first.
    async fn with_element<T: DeserializeOwned>(&self, locator: &Locator, body: &str) -> Result<T> {
        resolve_element(
            || async move { self.probe_element(locator, body).await },
            self.wait,
            locator,
        )
        .await
    }

    pub async fn click(&self, locator: &Locator) -> Result<()> {
        tracing::debug!("Click {}", locator);
        let _: bool = self
            .with_element(
                locator,
                "el.scrollIntoView({ block: 'center', inline: 'center' }); el.click(); return true;",
            )
            .await?;
        Ok(())
    }

    /// Replace the value of an input and notify the page's listeners
    pub async fn fill(&self, locator: &Locator, value: &str) -> Result<()> {
        tracing::debug!("Fill {}", locator);
        let value = serde_json::to_string(value).map_err(|e| Error::Script(e.to_string()))?;
        let body = format!(
            "el.focus(); \
             const proto = el instanceof HTMLTextAreaElement ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype; \
             Object.getOwnPropertyDescriptor(proto, 'value').set.call(el, {value}); \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
             el.blur(); \
             return true;"
        );
        let _: bool = self.with_element(locator, &body).await?;
        Ok(())
    }

    pub async fn input_value(&self, locator: &Locator) -> Result<String> {
        self.with_element(locator, "return el.value ?? '';").await
    }

    pub async fn inner_text(&self, locator: &Locator) -> Result<String> {
        self.with_element(locator, "return el.innerText ?? el.textContent ?? '';")
            .await
    }

    /// Whether `locator` resolves to a rendered, visible element
    pub async fn is_visible(&self, locator: &Locator) -> Result<bool> {
        let body = "const r = el.getBoundingClientRect(); \
                    const s = window.getComputedStyle(el); \
                    return r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none';";
        let probe: Probe<bool> = self.probe_element(locator, body).await?;
        Ok(probe.found && probe.value.unwrap_or(false))
    }

    /// Suspend until the JS `predicate` evaluates to true on the live page
    pub async fn wait_for_function(&self, predicate: &str, description: &str) -> Result<()> {
        self.wait_for_function_within(predicate, description, self.wait)
            .await
    }

    pub async fn wait_for_function_within(
        &self,
        predicate: &str,
        description: &str,
        wait: WaitConfig,
    ) -> Result<()> {
        let script = format!("Boolean({})", predicate);
        let script = script.as_str();
        wait_for_result(
            || async move { self.evaluate::<bool>(script).await },
            wait,
            description,
        )
        .await?;
        Ok(())
    }

    pub async fn wait_for_visible(&self, locator: &Locator) -> Result<()> {
        wait_for_result(
            || async move { self.is_visible(locator).await },
            self.wait,
            &format!("{} to be visible", locator),
        )
        .await?;
        Ok(())
    }

    pub async fn wait_for_load(&self) -> Result<()> {
        self.wait_for_function("document.readyState === 'complete'", "document ready")
            .await
    }

    /// Click `locator` and wait until the page has moved to a new URL and
    /// finished loading it
    pub async fn click_and_wait_for_navigation(&self, locator: &Locator) -> Result<()> {
        let before = self.url().await?;
        self.click(locator).await?;

        let before = before.as_str();
        wait_for_result(
            || async move { self.url().await.map(|now| now != before) },
            self.wait,
            &format!("navigation away from {}", before),
        )
        .await?;

        self.wait_for_load().await?;
        tracing::debug!("Navigated to {}", self.url().await?);
        Ok(())
    }
}

/// Poll `lookup` until the element is found and return what its body produced.
///
/// Running out of time is `Error::NotFound`; a failed evaluation is returned
/// as is, so a body with side effects never runs twice.
async fn resolve_element<T, F, Fut>(lookup: F, wait: WaitConfig, locator: &Locator) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Probe<T>>>,
{
    let lookup = &lookup;
    let outcome = wait_for_some(
        || async move {
            match lookup().await {
                Ok(Probe { found: false, .. }) => None,
                Ok(Probe { found: true, value }) => Some(value.ok_or_else(|| {
                    Error::Script(format!("No value returned for {}", locator))
                })),
                Err(e) => Some(Err(e)),
            }
        },
        wait,
        &format!("{} to be attached", locator),
    )
    .await;

    match outcome {
        Ok(result) => result,
        Err(boarding_core::Error::WaitTimeout { .. }) => Err(Error::NotFound {
            locator: locator.to_string(),
        }),
        Err(e) => Err(e.into()),
    }
}

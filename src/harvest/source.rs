//! Discovery channel seams between the renderer and the harvester.

use std::collections::VecDeque;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{Harvest, harvest};
use crate::renderer::RendererError;

/// Push-style stream of outbound request URLs observed while the page loads.
///
/// Implementations buffer what they observe; the harvester drains the buffer
/// once the page has been stabilized and inspected.
pub trait LiveUrlSource: Send {
    /// Returns every URL observed since the previous drain.
    fn drain_observed(&mut self) -> Vec<String>;
}

/// One-shot DOM inspection returning raw, possibly relative, media references.
#[async_trait]
pub trait OneShotDomQuery: Send {
    /// Inspects the loaded document.
    ///
    /// # Errors
    ///
    /// Returns [`RendererError::Evaluation`] when the inspection cannot run.
    async fn inspect_dom(&mut self, page_base_url: &str) -> Result<Vec<String>, RendererError>;
}

/// Runs the DOM query, drains the live source and harvests the union.
///
/// The DOM query runs first so requests it triggers are still drained.
///
/// # Errors
///
/// Propagates the DOM query failure.
#[instrument(skip(page))]
pub async fn harvest_page<P>(page: &mut P, page_base_url: &str) -> Result<Harvest, RendererError>
where
    P: LiveUrlSource + OneShotDomQuery + ?Sized,
{
    let dom_references = page.inspect_dom(page_base_url).await?;
    let network_events = page.drain_observed();
    debug!(
        network = network_events.len(),
        dom = dom_references.len(),
        "collected raw references"
    );
    Ok(harvest(&network_events, &dom_references, page_base_url))
}

/// Replays fixed URL lists through both seams.
///
/// Network events are handed out once; the DOM list is returned on every query.
#[derive(Debug, Clone, Default)]
pub struct ReplaySource {
    network: VecDeque<String>,
    dom: Vec<String>,
}

impl ReplaySource {
    /// Creates a replay source from fixed network and DOM lists.
    pub fn new<N, D>(network: N, dom: D) -> Self
    where
        N: IntoIterator,
        N::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        Self {
            network: network.into_iter().map(Into::into).collect(),
            dom: dom.into_iter().map(Into::into).collect(),
        }
    }

    /// Queues an additional network event.
    pub fn push_network(&mut self, url: impl Into<String>) {
        self.network.push_back(url.into());
    }
}

impl LiveUrlSource for ReplaySource {
    fn drain_observed(&mut self) -> Vec<String> {
        self.network.drain(..).collect()
    }
}

#[async_trait]
impl OneShotDomQuery for ReplaySource {
    async fn inspect_dom(&mut self, _page_base_url: &str) -> Result<Vec<String>, RendererError> {
        Ok(self.dom.clone())
    }
}

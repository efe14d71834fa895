use std::time::Duration;

use action_locator::PortableLocator;
use tokio::time::sleep;
use tracing::{debug, instrument};

use crate::actions::any_displayed;
use crate::bootstrap::AppiumHelper;
use crate::errors::{AppiumError, AppiumResult};
use crate::model::{
    swipe_actions, Point, SwipeDirection, DEFAULT_SWIPE_DURATION_MS, SWIPE_SETTLE_MS,
};
use crate::wait::{deadline_after, has_passed, seconds};

/// Offset used by directional swipes called without a speed
const DIRECTIONAL_OFFSET: f64 = 100.0;
/// Offset when a directional swipe is given a speed but no offset
const DIRECTIONAL_DEFAULT: f64 = 1000.0;

impl AppiumHelper {
    /// Swipe from an element's location by the given offsets
    #[instrument(name = "appium.action", skip(self), fields(action = "swipe"))]
    pub async fn swipe(
        &self,
        locator: &PortableLocator,
        x_offset: f64,
        y_offset: f64,
        speed: Option<u64>,
    ) -> AppiumResult<()> {
        self.require_platform("swipe", None)?;
        let element = self.find_one(locator, None).await?;
        let from = self.client()?.element_location(&element).await?;
        let to = from.offset(x_offset, y_offset);
        self.swipe_between(from, to, speed.unwrap_or(DEFAULT_SWIPE_DURATION_MS))
            .await
    }

    /// Swipe between two screen points
    #[instrument(name = "appium.action", skip(self), fields(action = "perform_swipe"))]
    pub async fn perform_swipe(&self, from: Point, to: Point) -> AppiumResult<()> {
        self.require_platform("perform_swipe", None)?;
        self.swipe_between(from, to, DEFAULT_SWIPE_DURATION_MS).await
    }

    pub async fn swipe_down(
        &self,
        locator: &PortableLocator,
        offset: Option<f64>,
        speed: Option<u64>,
    ) -> AppiumResult<()> {
        self.require_platform("swipe_down", None)?;
        let offset = directional_offset(offset, speed);
        self.swipe(locator, 0.0, offset, None).await
    }

    pub async fn swipe_up(
        &self,
        locator: &PortableLocator,
        offset: Option<f64>,
        speed: Option<u64>,
    ) -> AppiumResult<()> {
        self.require_platform("swipe_up", None)?;
        let offset = directional_offset(offset, speed);
        self.swipe(locator, 0.0, -offset, None).await
    }

    pub async fn swipe_left(
        &self,
        locator: &PortableLocator,
        offset: Option<f64>,
        speed: Option<u64>,
    ) -> AppiumResult<()> {
        self.require_platform("swipe_left", None)?;
        let offset = directional_offset(offset, speed);
        self.swipe(locator, -offset, 0.0, None).await
    }

    pub async fn swipe_right(
        &self,
        locator: &PortableLocator,
        offset: Option<f64>,
        speed: Option<u64>,
    ) -> AppiumResult<()> {
        self.require_platform("swipe_right", None)?;
        let offset = directional_offset(offset, speed);
        self.swipe(locator, offset, 0.0, None).await
    }

    /// Swipe `scroll` in `direction` until `target` is visible.
    ///
    /// Fails once the page source stops changing between swipes (the end
    /// of the list was reached) or the timeout passes.
    #[instrument(name = "appium.action", skip(self), fields(action = "swipe_to"))]
    pub async fn swipe_to(
        &self,
        target: &PortableLocator,
        scroll: &PortableLocator,
        direction: Option<SwipeDirection>,
        timeout: Option<f64>,
        offset: Option<f64>,
        speed: Option<u64>,
    ) -> AppiumResult<()> {
        self.require_platform("swipe_to", None)?;
        let client = self.client()?;
        let direction = direction.unwrap_or(SwipeDirection::Down);
        let selector = self.translate(target)?;
        let deadline = deadline_after(seconds(self.wait_seconds(timeout)));
        let not_found = || AppiumError::assertion(
            format!("element ({})", target),
            "to be found after scrolling to the end",
        );

        let mut last_source: Option<String> = None;
        loop {
            let elements = client.find_elements(&selector, None).await?;
            if let Some(first) = elements.first() {
                if any_displayed(client, std::slice::from_ref(first)).await? {
                    return Ok(());
                }
            }
            if has_passed(deadline) {
                return Err(not_found());
            }

            match direction {
                SwipeDirection::Down => self.swipe_down(scroll, offset, speed).await?,
                SwipeDirection::Up => self.swipe_up(scroll, offset, speed).await?,
                SwipeDirection::Left => self.swipe_left(scroll, offset, speed).await?,
                SwipeDirection::Right => self.swipe_right(scroll, offset, speed).await?,
            }
            let source = client.page_source().await?;
            if last_source.as_deref() == Some(source.as_str()) {
                debug!(%direction, "page source unchanged after swipe");
                return Err(not_found());
            }
            last_source = Some(source);
        }
    }

    async fn swipe_between(&self, from: Point, to: Point, duration_ms: u64) -> AppiumResult<()> {
        let client = self.client()?;
        debug!(?from, ?to, duration_ms, "swipe");
        client
            .perform_actions(swipe_actions(from, to, duration_ms))
            .await?;
        sleep(Duration::from_millis(SWIPE_SETTLE_MS)).await;
        Ok(())
    }
}

/// Directional swipes called without a speed take the offset argument as
/// the speed and swipe by a fixed offset instead. The move itself always
/// lasts `DEFAULT_SWIPE_DURATION_MS`.
fn directional_offset(offset: Option<f64>, speed: Option<u64>) -> f64 {
    match speed {
        Some(_) => offset.unwrap_or(DIRECTIONAL_DEFAULT),
        None => DIRECTIONAL_OFFSET,
    }
}

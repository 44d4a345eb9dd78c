use anyhow::{anyhow, Result};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::{num::NonZeroU32, time::Duration};

/// Direct (un-keyed) limiter shared by every AIS call in a run.
pub type LookupLimiter = DefaultDirectRateLimiter;

/// At most `max_calls` acquisitions in any rolling `window`.
///
/// Cells are spread evenly (one every `window / max_calls`) with no burst,
/// so no span of length `window` can hold more than `max_calls` of them.
/// `until_ready().await` sleeps instead of failing.
pub fn lookup_limiter(max_calls: usize, window: Duration) -> Result<LookupLimiter> {
    let max_calls = u32::try_from(max_calls.max(1))
        .map_err(|_| anyhow!("lookup_max_calls {} is too large", max_calls))?;
    let period = window / max_calls;
    let quota = Quota::with_period(period)
        .ok_or_else(|| anyhow!("lookup window {:?} is too short", window))?
        .allow_burst(NonZeroU32::MIN);
    Ok(RateLimiter::direct(quota))
}

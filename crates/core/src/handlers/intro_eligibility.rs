//! Introductory-offer eligibility responses
//!
//! Eligibility never fails once dispatched: anything the backend cannot
//! answer degrades to `Unknown` for the affected products.

use purchases_domain::constants::HTTP_REDIRECT;
use purchases_domain::{
    unknown_eligibilities, IntroEligibilityMap, IntroEligibilityStatus, Result,
};
use tracing::warn;

use crate::ports::TransportResult;

/// Map an eligibility response onto `product_ids`. Always returns `Ok`.
pub fn handle_intro_eligibility(
    outcome: TransportResult,
    product_ids: &[String],
) -> Result<IntroEligibilityMap> {
    let response = match outcome {
        Ok(response) if response.status_code < HTTP_REDIRECT => response,
        Ok(response) => {
            warn!(status = response.status_code, "Eligibility request failed; reporting unknown");
            return Ok(unknown_eligibilities(product_ids));
        }
        Err(error) => {
            warn!(error = %error, "Eligibility request failed; reporting unknown");
            return Ok(unknown_eligibilities(product_ids));
        }
    };

    let Some(body) = response.body else {
        return Ok(unknown_eligibilities(product_ids));
    };

    Ok(product_ids
        .iter()
        .map(|id| (id.clone(), IntroEligibilityStatus::from_backend_value(body.get(id))))
        .collect())
}

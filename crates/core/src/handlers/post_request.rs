//! Responses to posts that return no payload (attributes, alias, attribution)
//!
//! These endpoints treat a status of exactly 300 as success.

use purchases_domain::constants::HTTP_REDIRECT;
use purchases_domain::{PurchasesError, Result};

use super::{attribute_sync_context, backend_error};
use crate::ports::{HttpResponse, TransportResult};

/// Alias and attribution posts.
pub fn handle_post(outcome: TransportResult) -> Result<()> {
    let HttpResponse { status_code: status, body } = outcome.map_err(PurchasesError::network)?;
    if status > HTTP_REDIRECT {
        return Err(backend_error(body.as_ref()).into());
    }
    Ok(())
}

/// Subscriber attribute posts. Failures carry the attribute sync metadata.
pub fn handle_attributes_post(outcome: TransportResult) -> Result<()> {
    let HttpResponse { status_code: status, body } = outcome.map_err(PurchasesError::network)?;
    if status > HTTP_REDIRECT {
        let body = body.as_ref();
        let context = attribute_sync_context(status, body);
        return Err(backend_error(body).with_context(context).into());
    }
    Ok(())
}

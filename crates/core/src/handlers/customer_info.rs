//! Customer info responses (subscriber fetch and receipt post)

use purchases_domain::constants::{HTTP_INTERNAL_SERVER_ERROR, HTTP_REDIRECT};
use purchases_domain::{
    BackendErrorContext, CustomerInfo, JsonObject, PurchasesError, Result,
    UnexpectedResponseSubcode,
};

use super::{attribute_sync_context, backend_error, describe};
use crate::ports::{HttpResponse, TransportResult};

/// Classify a subscriber fetch or receipt post into [`CustomerInfo`].
///
/// Attribute errors reported alongside a success status still fail the
/// call; the decoded customer info travels in the error context.
pub fn handle_customer_info(outcome: TransportResult) -> Result<CustomerInfo> {
    let HttpResponse { status_code: status, body } = outcome.map_err(PurchasesError::network)?;
    let body = body.as_ref();

    if status >= HTTP_REDIRECT {
        let context = failure_context(status, body);
        return Err(backend_error(body).with_context(context).into());
    }

    let customer_info = parse_customer_info(status, body)?;

    // Attribute errors on a success status still fail the call, but the
    // decoded snapshot travels with the error.
    let mut context = failure_context(status, body);
    if context.attribute_errors.is_none() {
        return Ok(customer_info);
    }
    context.customer_info = Some(Box::new(customer_info));
    Err(backend_error(body).with_context(context).into())
}

fn failure_context(status: u16, body: Option<&JsonObject>) -> BackendErrorContext {
    BackendErrorContext {
        finishable: Some(status < HTTP_INTERNAL_SERVER_ERROR),
        ..attribute_sync_context(status, body)
    }
}

fn parse_customer_info(status: u16, body: Option<&JsonObject>) -> Result<CustomerInfo> {
    let Some(json) = body else {
        return Err(PurchasesError::unexpected_with_context(
            UnexpectedResponseSubcode::CustomerInfoResponseMalformed,
            describe(status, body),
        ));
    };

    CustomerInfo::from_json(json).map_err(|error| {
        PurchasesError::unexpected_with_context(
            UnexpectedResponseSubcode::CustomerInfoResponseParsing,
            describe(status, body),
        )
        .with_underlying(error)
    })
}

#[cfg(test)]
mod tests {
    use purchases_domain::{BackendError, TransportError};
    use serde_json::json;

    use super::*;
    use crate::handlers::test_support::{customer_info_json, respond, respond_empty};

    #[test]
    fn decodes_success_body() {
        let info = handle_customer_info(respond(200, customer_info_json("u1"))).unwrap();
        assert_eq!(info.original_app_user_id(), "u1");
    }

    #[test]
    fn transport_error_becomes_network() {
        let error = handle_customer_info(Err(TransportError::Connect("refused".into()))).unwrap_err();
        assert_eq!(error, PurchasesError::network(TransportError::Connect("refused".into())));
    }

    #[test]
    fn missing_body_on_success_is_malformed() {
        let error = handle_customer_info(respond_empty(200)).unwrap_err();
        assert_eq!(error.subcode(), Some(UnexpectedResponseSubcode::CustomerInfoResponseMalformed));
    }

    #[test]
    fn undecodable_body_is_parsing_error_with_underlying_cause() {
        let error = handle_customer_info(respond(200, json!({"subscriber": {}}))).unwrap_err();
        match error {
            PurchasesError::UnexpectedResponse { subcode, context, underlying } => {
                assert_eq!(subcode, UnexpectedResponseSubcode::CustomerInfoResponseParsing);
                assert!(context.unwrap().contains("status_code: 200"));
                assert!(underlying.unwrap().contains("original_app_user_id"));
            }
            other => panic!("expected unexpected response, got {other:?}"),
        }
    }

    #[test]
    fn error_status_becomes_backend_error_with_finishable_flag() {
        let error = handle_customer_info(respond(
            400,
            json!({"code": 7225, "message": "The receipt is not valid."}),
        ))
        .unwrap_err();

        let backend = error.backend_error().unwrap();
        assert_eq!(backend.code.code(), Some(7225));
        assert_eq!(backend.context.finishable, Some(true));
        assert_eq!(backend.context.successfully_synced, Some(true));
        assert!(backend.context.customer_info.is_none());
    }

    #[test]
    fn server_error_is_not_finishable_even_without_body() {
        let error = handle_customer_info(respond_empty(503)).unwrap_err();
        let backend = error.backend_error().unwrap();
        assert_eq!(backend.context.finishable, Some(false));
        assert_eq!(backend.context.successfully_synced, Some(false));
        assert!(backend.code.is_unknown());
    }

    #[test]
    fn redirect_status_is_treated_as_failure() {
        let error = handle_customer_info(respond(300, customer_info_json("u1"))).unwrap_err();
        assert!(matches!(error, PurchasesError::Backend(BackendError { .. })));
    }

    #[test]
    fn attribute_errors_on_success_carry_customer_info() {
        let mut body = customer_info_json("u1");
        body["attributes_error_response"] = json!({
            "attribute_errors": [{"key_name": "$email", "message": "invalid email"}]
        });

        let error = handle_customer_info(respond(200, body)).unwrap_err();
        let backend = error.backend_error().unwrap();
        assert_eq!(backend.context.finishable, Some(true));
        assert_eq!(
            backend.context.attribute_errors,
            Some(json!([{"key_name": "$email", "message": "invalid email"}]))
        );
        assert_eq!(backend.context.customer_info.as_ref().unwrap().original_app_user_id(), "u1");
    }
}

//! Service ticket validation tests.

use crate::common::{app_view, TestEnv};

use cas_client::{AuthOutcome, CasError, FailureKind};
use cas_protocol::SOAP_ACTION;

/// Tests the full happy path: ticket in, validated principal out.
#[tokio::test]
async fn test_valid_ticket_authenticates() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let outcome = env
        .session
        .authenticate(&app_view("/protected/page?ticket=ST-ok"))
        .await?;

    match outcome {
        AuthOutcome::Authenticated {
            principal,
            attributes,
            service_url,
        } => {
            assert_eq!(principal, "alice");
            assert!(attributes.is_empty(), "no attributes were released");
            assert_eq!(
                service_url, "https://app.example.edu/protected/page",
                "service URL must lose the ticket parameter"
            );
        }
        other => panic!("expected authentication, got {other:?}"),
    }

    let record = env.last_validation().expect("mock server was called");
    assert_eq!(record.service.as_deref(), Some("https://app.example.edu/protected/page"));
    assert_eq!(record.ticket.as_deref(), Some("ST-ok"));

    Ok(())
}

/// Tests that the validation POST is a SAML artifact lookup with the
/// expected SOAP trimmings.
#[tokio::test]
async fn test_validation_request_is_a_saml_envelope() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    env.session
        .authenticate(&app_view("/page?ticket=ST-ok"))
        .await?;

    let record = env.last_validation().expect("mock server was called");
    assert_eq!(record.soap_action.as_deref(), Some(SOAP_ACTION));
    assert!(
        record.body.starts_with("<SOAP-ENV:Envelope"),
        "body must be a SOAP envelope"
    );
    assert!(
        record
            .body
            .contains("<samlp:AssertionArtifact>ST-ok</samlp:AssertionArtifact>"),
        "ticket must travel as the assertion artifact"
    );

    Ok(())
}

/// Tests that other query parameters survive the round trip into the
/// service URL while the ticket is dropped.
#[tokio::test]
async fn test_service_url_keeps_other_query_parameters() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let outcome = env
        .session
        .authenticate(&app_view("/search?q=rust&ticket=ST-ok&page=2"))
        .await?;

    let record = env.last_validation().expect("mock server was called");
    assert_eq!(
        record.service.as_deref(),
        Some("https://app.example.edu/search?q=rust&page=2")
    );
    match outcome {
        AuthOutcome::Authenticated { service_url, .. } => {
            assert_eq!(service_url, "https://app.example.edu/search?q=rust&page=2");
        }
        other => panic!("expected authentication, got {other:?}"),
    }

    Ok(())
}

/// Tests attribute extraction from the nested container shape.
#[tokio::test]
async fn test_attributes_from_nested_container() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let outcome = env
        .session
        .authenticate(&app_view("/page?ticket=ST-attrs"))
        .await?;

    match outcome {
        AuthOutcome::Authenticated { attributes, .. } => {
            assert_eq!(
                attributes.get("mail").and_then(|v| v.as_single()),
                Some("alice@example.edu")
            );
            let groups: Vec<&str> = attributes
                .get("memberOf")
                .expect("memberOf released")
                .iter()
                .collect();
            assert_eq!(groups, vec!["staff", "admins"], "multi-values keep order");
        }
        other => panic!("expected authentication, got {other:?}"),
    }

    Ok(())
}

/// Tests attribute extraction from flat sibling elements.
#[tokio::test]
async fn test_attributes_from_flat_siblings() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let outcome = env
        .session
        .authenticate(&app_view("/page?ticket=ST-flat"))
        .await?;

    match outcome {
        AuthOutcome::Authenticated {
            principal,
            attributes,
            ..
        } => {
            assert_eq!(principal, "bob");
            assert_eq!(
                attributes.get("mail").and_then(|v| v.as_single()),
                Some("bob@example.edu")
            );
            assert!(attributes.get("user").is_none(), "user is not an attribute");
        }
        other => panic!("expected authentication, got {other:?}"),
    }

    Ok(())
}

/// Tests attribute extraction from name/value pair elements.
#[tokio::test]
async fn test_attributes_from_name_value_pairs() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let outcome = env
        .session
        .authenticate(&app_view("/page?ticket=ST-pairs"))
        .await?;

    match outcome {
        AuthOutcome::Authenticated { attributes, .. } => {
            assert_eq!(
                attributes.get("mail").and_then(|v| v.as_single()),
                Some("carol@example.edu")
            );
            assert_eq!(
                attributes.get("memberOf").and_then(|v| v.as_single()),
                Some("faculty")
            );
        }
        other => panic!("expected authentication, got {other:?}"),
    }

    Ok(())
}

/// Tests that a rejected ticket surfaces as a categorized validation
/// error, not a transport error.
#[tokio::test]
async fn test_rejected_ticket_is_a_validation_error() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let err = env
        .session
        .authenticate(&app_view("/page?ticket=ST-expired"))
        .await
        .expect_err("unknown ticket must be rejected");

    match &err {
        CasError::TicketValidation(failure) => {
            assert_eq!(failure.kind, FailureKind::AuthenticationFailure);
            assert!(
                failure.reason.contains("INVALID_TICKET"),
                "reason should carry the server code, got: {}",
                failure.reason
            );
        }
        other => panic!("expected a validation error, got {other:?}"),
    }
    assert!(!err.is_transport());

    Ok(())
}

/// Tests that a non-CAS response body counts as a malformed response.
#[tokio::test]
async fn test_garbage_response_is_malformed() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let err = env
        .session
        .authenticate(&app_view("/page?ticket=ST-garbage"))
        .await
        .expect_err("garbage body must not authenticate");

    let failure = err.validation_failure().expect("validation failure");
    assert_eq!(failure.kind, FailureKind::MalformedResponse);
    assert_eq!(failure.reason, "ticket not validated");

    Ok(())
}

/// Tests that a success element without a principal is rejected.
#[tokio::test]
async fn test_success_without_principal_is_rejected() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let err = env
        .session
        .authenticate(&app_view("/page?ticket=ST-nouser"))
        .await
        .expect_err("principal-less success must not authenticate");

    let failure = err.validation_failure().expect("validation failure");
    assert_eq!(failure.kind, FailureKind::MissingPrincipal);

    Ok(())
}

/// Tests that renew mode reaches the validation endpoint.
#[tokio::test]
async fn test_renew_forwarded_to_validation() -> anyhow::Result<()> {
    let env = TestEnv::with_config(|config| config.with_renew(true)).await?;

    env.session
        .authenticate(&app_view("/page?ticket=ST-ok"))
        .await?;

    let record = env.last_validation().expect("mock server was called");
    assert_eq!(record.renew.as_deref(), Some("true"));

    Ok(())
}

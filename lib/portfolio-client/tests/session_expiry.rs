use rstest::rstest;
use serde_json::json;

use portfolio_client::multipart::Form;
use portfolio_client::{ApiClientError, CredentialStore, Location, RequestOptions};

mod common;
use self::common::*;

#[rstest]
#[tokio::test]
async fn should_expire_session_on_unauthorized(#[future] session: Session) -> anyhow::Result<()> {
    let session = session.await;
    session.backend.reply(
        "/api/rulesets",
        Reply::json(401, &json!({"detail": "Token expired"})),
    );

    let result = session
        .client
        .api_request("/rulesets", RequestOptions::new())
        .await;

    assert!(matches!(result, Err(ApiClientError::SessionExpired)));
    assert!(session.storage.read().is_none());
    assert_eq!(session.location.navigations(), 1);
    assert_eq!(session.location.current_url(), EXPIRED_TARGET);
    assert_eq!(session.location.current_path(), "/login");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn should_replace_location_when_already_on_login(
    #[future] session: Session,
) -> anyhow::Result<()> {
    let session = session.await;
    session.location.assign("/login");
    session.backend.reply("/api/me", Reply::empty(401));

    let result = session
        .client
        .api_request("/me", RequestOptions::new())
        .await;

    assert!(matches!(result, Err(ApiClientError::SessionExpired)));
    assert!(session.storage.read().is_none());
    // only the manual assign above
    assert_eq!(session.location.navigations(), 1);
    assert_eq!(session.location.current_url(), EXPIRED_TARGET);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn should_navigate_once_for_concurrent_unauthorized(
    #[future] session: Session,
) -> anyhow::Result<()> {
    let session = session.await;
    session.backend.reply("/api/rulesets", Reply::empty(401));
    session.backend.reply("/api/portfolio", Reply::empty(401));
    session.backend.reply("/api/advisor/history", Reply::empty(401));

    let client = &session.client;
    let (rulesets, portfolio, history) = tokio::join!(
        client.api_request("/rulesets", RequestOptions::new()),
        client.api_request("/portfolio", RequestOptions::new()),
        client.api_request("/advisor/history", RequestOptions::new()),
    );

    for result in [rulesets, portfolio, history] {
        assert!(matches!(result, Err(ApiClientError::SessionExpired)));
    }
    assert_eq!(session.backend.requests().len(), 3);
    assert_eq!(session.location.navigations(), 1);
    assert_eq!(session.location.current_url(), EXPIRED_TARGET);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn should_expire_session_on_upload_and_download(
    #[future] session: Session,
) -> anyhow::Result<()> {
    let session = session.await;
    session.backend.reply("/api/imports", Reply::empty(401));
    session.backend.reply("/api/exports/latest", Reply::empty(401));

    let form = Form::new().text("kind", "transactions");
    let upload = session
        .client
        .api_upload("/imports", form, RequestOptions::new())
        .await;
    assert!(matches!(upload, Err(ApiClientError::SessionExpired)));
    assert!(session.storage.read().is_none());

    // back on the login page: the second expiry replaces in place
    let download = session.client.api_download("/exports/latest").await;
    assert!(matches!(download, Err(ApiClientError::SessionExpired)));
    assert_eq!(session.location.navigations(), 1);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn should_not_send_cleared_credential(#[future] session: Session) -> anyhow::Result<()> {
    let session = session.await;
    session.backend.reply("/api/rulesets", Reply::empty(401));

    let _ = session
        .client
        .api_request("/rulesets", RequestOptions::new())
        .await;
    let _ = session
        .client
        .api_request("/rulesets", RequestOptions::new())
        .await;

    let requests = session.backend.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[0].header("authorization").as_deref(),
        Some("Bearer jwt-token")
    );
    assert_eq!(requests[1].header("authorization"), None);
    Ok(())
}

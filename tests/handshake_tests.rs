/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
mod helpers;

#[cfg(test)]
mod test {
    use crate::helpers::{self, MockTransport, Reply};
    use flickr::rest::{
        ApiErrorCodes, AppCreds, CallOutcome, Client, ErrorKind, HandshakeState, PermissionLevel,
    };
    use serde_json::json;
    use std::collections::HashMap;

    fn client(mock: &MockTransport) -> Client {
        helpers::init_logging();
        Client::with_transport(helpers::app_creds(), mock.clone())
    }

    #[tokio::test]
    async fn grant_then_exchange_yields_requested_permission() {
        let mock = MockTransport::new();
        let client = client(&mock);
        let (auth, mut events) = client.handshake();

        let grant_id = auth.request_grant(PermissionLevel::Write).unwrap();
        let done = helpers::next(&mut events.grants).await;
        assert_eq!(done.id, grant_id);
        let grant = done.outcome.into_result().unwrap();
        assert_eq!(grant.grant(), "frob-1");

        let url = grant.approval_url();
        assert!(url.as_str().starts_with(helpers::AUTH_URL));
        let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(query["api_key"], helpers::API_KEY);
        assert_eq!(query["perms"], "write");
        assert_eq!(query["frob"], "frob-1");
        assert!(query.contains_key("api_sig"));

        let exchange_id = auth.exchange_grant_for_credential(grant.grant()).unwrap();
        assert_ne!(exchange_id, grant_id);
        let done = helpers::next(&mut events.credentials).await;
        assert_eq!(done.id, exchange_id);
        let credential = done.outcome.into_result().unwrap();
        assert_eq!(credential.permission(), PermissionLevel::Write);
        assert_eq!(credential.token(), "token-for-frob-1");
        assert_eq!(credential.user_id(), "35468159852@N01");
        assert_eq!(credential.user_name(), "testuser");
        assert_eq!(credential.full_name(), "Test User");

        assert_eq!(
            mock.sent_methods(),
            vec!["flickr.auth.getFrob", "flickr.auth.getToken"]
        );
        assert_eq!(mock.sent()[1].get("frob"), Some("frob-1"));
    }

    #[tokio::test]
    async fn empty_grant_is_rejected_without_a_call() {
        let mock = MockTransport::new();
        let (auth, _events) = client(&mock).handshake();

        for grant in ["", "   "] {
            let err = auth.exchange_grant_for_credential(grant).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
        assert_eq!(
            auth.check_credential("").unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
        assert!(mock.sent().is_empty());
    }

    #[tokio::test]
    async fn handshake_needs_a_shared_secret() {
        let mock = MockTransport::new();
        let client = Client::with_transport(AppCreds::from_tokens(helpers::API_KEY, None), mock.clone());
        let (auth, _events) = client.handshake();

        let err = auth.request_grant(PermissionLevel::Read).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = auth.exchange_grant_for_credential("frob-1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(mock.sent().is_empty());
    }

    #[tokio::test]
    async fn reply_missing_the_token_is_a_failure() {
        let mock = MockTransport::new();
        let mut reply = helpers::auth_doc("unused", "write");
        reply["auth"].as_object_mut().unwrap().remove("token");
        mock.on("flickr.auth.getToken", Reply::Doc(reply));
        let (auth, mut events) = client(&mock).handshake();

        let id = auth.exchange_grant_for_credential("frob-9").unwrap();
        let done = helpers::next(&mut events.credentials).await;
        assert_eq!(done.id, id);
        assert!(!done.is_success());
        match done.outcome {
            CallOutcome::Failure(e) => assert_eq!(e.kind(), ErrorKind::RemoteFailure),
            CallOutcome::Success(c) => panic!("got a credential from a broken reply: {c:?}"),
        }
    }

    #[tokio::test]
    async fn reply_with_unknown_permission_is_a_failure() {
        let mock = MockTransport::new();
        mock.on(
            "flickr.auth.getToken",
            Reply::Doc(helpers::auth_doc("tok", "Write")),
        );
        let (auth, mut events) = client(&mock).handshake();

        auth.exchange_grant_for_credential("frob-9").unwrap();
        let done = helpers::next(&mut events.credentials).await;
        assert!(!done.is_success());
    }

    #[tokio::test]
    async fn service_errors_arrive_as_failures() {
        let mock = MockTransport::new();
        let (auth, mut events) = client(&mock).handshake();

        // Never approved, so the mock does not know the frob
        let id = auth.exchange_grant_for_credential("frob-unknown").unwrap();
        let done = helpers::next(&mut events.credentials).await;
        assert_eq!(done.id, id);
        let err = done.outcome.into_result().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteFailure);
        assert_eq!(err.api_code(), Some(ApiErrorCodes::InvalidFrob));
    }

    #[tokio::test]
    async fn grant_request_failure_arrives_on_grant_channel() {
        let mock = MockTransport::new();
        mock.on("flickr.auth.getFrob", Reply::Doc(json!({"stat": "ok"})));
        let (auth, mut events) = client(&mock).handshake();

        let id = auth.request_grant(PermissionLevel::Delete).unwrap();
        let done = helpers::next(&mut events.grants).await;
        assert_eq!(done.id, id);
        assert!(!done.is_success());
    }

    #[tokio::test]
    async fn short_code_is_normalized() {
        let mock = MockTransport::new();
        mock.on(
            "flickr.auth.getFullToken",
            Reply::Doc(helpers::auth_doc("full-token", "read")),
        );
        let (auth, mut events) = client(&mock).handshake();

        let err = auth.upgrade_short_credential(" - - ").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let id = auth.upgrade_short_credential("123-456 789").unwrap();
        let done = helpers::next(&mut events.credentials).await;
        assert_eq!(done.id, id);
        let credential = done.outcome.into_result().unwrap();
        assert_eq!(credential.token(), "full-token");
        assert_eq!(credential.permission(), PermissionLevel::Read);
        assert_eq!(mock.sent()[0].get("mini_token"), Some("123456789"));
    }

    #[tokio::test]
    async fn check_credential_reports_current_permission() {
        let mock = MockTransport::new();
        mock.on(
            "flickr.auth.checkToken",
            Reply::Doc(helpers::auth_doc("stored-token", "delete")),
        );
        let (auth, mut events) = client(&mock).handshake();

        let id = auth.check_credential("stored-token").unwrap();
        let done = helpers::next(&mut events.credentials).await;
        assert_eq!(done.id, id);
        assert_eq!(
            done.outcome.into_result().unwrap().permission(),
            PermissionLevel::Delete
        );
        let sent = mock.sent();
        assert_eq!(sent[0].get("method"), Some("flickr.auth.checkToken"));
        assert_eq!(sent[0].get("auth_token"), Some("stored-token"));
    }

    #[tokio::test]
    async fn state_tracks_a_full_handshake() {
        let mock = MockTransport::new();
        let (auth, mut events) = client(&mock).handshake();
        let mut state = HandshakeState::default();

        auth.request_grant(PermissionLevel::Read).unwrap();
        state = state
            .on_grant_outcome(helpers::next(&mut events.grants).await.outcome)
            .unwrap();

        // Saved while the user is off approving, then picked up again
        let saved = serde_json::to_string(&state).unwrap();
        let state: HandshakeState = serde_json::from_str(&saved).unwrap();
        let state = state.approved().unwrap();

        let grant = state.grant().unwrap().grant().to_string();
        auth.exchange_grant_for_credential(&grant).unwrap();
        let state = state
            .on_credential_outcome(helpers::next(&mut events.credentials).await.outcome)
            .unwrap();
        assert!(state.is_finished());
        assert_eq!(
            state.credential().unwrap().permission(),
            PermissionLevel::Read
        );
    }
}

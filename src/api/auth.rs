//! Optional HTTP basic authentication for the API, checked against stored users.

use crate::AppState;
use crate::domain::user::driven_ports::PasswordVerifier;
use crate::domain::user::driving_ports::UserPort;
use crate::domain::user::{Credentials, UserService};
use crate::external_connections::ExternalConnectivity;
use crate::persistence::db_user_driven_ports::DbReadUsers;
use crate::routing_utils::{GenericErrorResponse, UnauthorizedErrorResponse};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use subtle::ConstantTimeEq;
use tracing::{debug, info};

/// Passwords are stored as they were provided, so verification is a direct comparison.
/// The comparison takes the same time wherever the first mismatching byte is.
pub struct PlainPasswordVerifier;

impl PasswordVerifier for PlainPasswordVerifier {
    fn verify(&self, presented: &str, stored: &str) -> bool {
        presented.as_bytes().ct_eq(stored.as_bytes()).into()
    }
}

/// Pulls the username and password out of an `Authorization: Basic ...` header.
/// Returns [None] if the header is missing or malformed.
pub fn basic_credentials(headers: &HeaderMap) -> Option<Credentials> {
    let header_value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some(Credentials {
        username: username.to_owned(),
        password: password.to_owned(),
    })
}

/// Middleware rejecting requests whose basic credentials don't match a stored user
pub async fn require_basic_auth(
    State(app_state): AppState,
    request: Request,
    next: Next,
) -> Response {
    let credentials = basic_credentials(request.headers());
    let mut ext_cxn = app_state.ext_cxn.clone();

    match authorize(credentials, &mut ext_cxn, &UserService).await {
        Ok(()) => next.run(request).await,
        Err(rejection) => rejection,
    }
}

async fn authorize(
    credentials: Option<Credentials>,
    ext_cxn: &mut impl ExternalConnectivity,
    user_service: &impl UserPort,
) -> Result<(), Response> {
    let Some(credentials) = credentials else {
        debug!("Request had no usable basic credentials");
        return Err(UnauthorizedErrorResponse.into_response());
    };

    let verified = user_service
        .verify_credentials(&credentials, ext_cxn, &DbReadUsers, &PlainPasswordVerifier)
        .await
        .map_err(|err| GenericErrorResponse(err).into_response())?;

    if verified {
        Ok(())
    } else {
        info!("Rejected credentials for user \"{}\"", credentials.username);
        Err(UnauthorizedErrorResponse.into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::test_util::MockUserService;
    use crate::external_connections;
    use anyhow::anyhow;
    use axum::http::{HeaderValue, StatusCode};
    use speculoos::prelude::*;
    use std::sync::Mutex;

    fn headers_with_authorization(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(value).expect("test header should be valid"),
        );
        headers
    }

    fn basic_header(username: &str, password: &str) -> HeaderMap {
        let encoded = STANDARD.encode(format!("{username}:{password}"));
        headers_with_authorization(&format!("Basic {encoded}"))
    }

    mod basic_credentials {
        use super::*;

        #[test]
        fn decodes_username_and_password() {
            let credentials = basic_credentials(&basic_header("evan", "hunter2"));
            assert_that!(credentials).is_some().is_equal_to(Credentials {
                username: "evan".to_owned(),
                password: "hunter2".to_owned(),
            });
        }

        #[test]
        fn keeps_colons_inside_the_password() {
            let credentials = basic_credentials(&basic_header("evan", "a:b:c"));
            assert_that!(credentials)
                .is_some()
                .matches(|creds| creds.username == "evan" && creds.password == "a:b:c");
        }

        #[test]
        fn scheme_is_case_insensitive() {
            let encoded = STANDARD.encode("evan:hunter2");
            let credentials =
                basic_credentials(&headers_with_authorization(&format!("basic {encoded}")));
            assert_that!(credentials).is_some();
        }

        #[test]
        fn missing_header_gives_nothing() {
            assert_that!(basic_credentials(&HeaderMap::new())).is_none();
        }

        #[test]
        fn other_schemes_give_nothing() {
            let credentials = basic_credentials(&headers_with_authorization("Bearer abc.def"));
            assert_that!(credentials).is_none();
        }

        #[test]
        fn undecodable_payload_gives_nothing() {
            let credentials = basic_credentials(&headers_with_authorization("Basic !!!notbase64"));
            assert_that!(credentials).is_none();
        }

        #[test]
        fn payload_without_separator_gives_nothing() {
            let encoded = STANDARD.encode("evanhunter2");
            let credentials =
                basic_credentials(&headers_with_authorization(&format!("Basic {encoded}")));
            assert_that!(credentials).is_none();
        }
    }

    mod authorize {
        use super::*;

        fn creds() -> Credentials {
            Credentials {
                username: "evan".to_owned(),
                password: "hunter2".to_owned(),
            }
        }

        #[tokio::test]
        async fn accepts_verified_credentials() {
            let mut user_service_raw = MockUserService::new();
            user_service_raw
                .verify_credentials_result
                .set_returned_anyhow(Ok(true));
            let user_service = Mutex::new(user_service_raw);
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();

            let auth_result = authorize(Some(creds()), &mut ext_cxn, &user_service).await;
            assert!(auth_result.is_ok());

            let locked_service = user_service.lock().expect("user service mutex poisoned");
            assert_eq!([creds()], locked_service.verify_credentials_result.calls());
        }

        #[tokio::test]
        async fn rejects_unverified_credentials() {
            let mut user_service_raw = MockUserService::new();
            user_service_raw
                .verify_credentials_result
                .set_returned_anyhow(Ok(false));
            let user_service = Mutex::new(user_service_raw);
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();

            let auth_result = authorize(Some(creds()), &mut ext_cxn, &user_service).await;
            let Err(response) = auth_result else {
                panic!("Unverified credentials were accepted");
            };
            assert_eq!(StatusCode::UNAUTHORIZED, response.status());
        }

        #[tokio::test]
        async fn rejects_missing_credentials_without_lookup() {
            let user_service = Mutex::new(MockUserService::new());
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();

            let auth_result = authorize(None, &mut ext_cxn, &user_service).await;
            let Err(response) = auth_result else {
                panic!("Missing credentials were accepted");
            };
            assert_eq!(StatusCode::UNAUTHORIZED, response.status());

            let locked_service = user_service.lock().expect("user service mutex poisoned");
            assert!(locked_service.verify_credentials_result.calls().is_empty());
        }

        #[tokio::test]
        async fn storage_failure_is_a_500() {
            let mut user_service_raw = MockUserService::new();
            user_service_raw
                .verify_credentials_result
                .set_returned_anyhow(Err(anyhow!("db went away")));
            let user_service = Mutex::new(user_service_raw);
            let mut ext_cxn = external_connections::test_util::FakeExternalConnectivity::new();

            let auth_result = authorize(Some(creds()), &mut ext_cxn, &user_service).await;
            let Err(response) = auth_result else {
                panic!("Credentials were accepted despite a storage failure");
            };
            assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
        }
    }

    mod plain_password_verifier {
        use super::*;

        #[test]
        fn accepts_identical_passwords() {
            assert!(PlainPasswordVerifier.verify("hunter2", "hunter2"));
            assert!(PlainPasswordVerifier.verify("", ""));
        }

        #[test]
        fn rejects_any_difference() {
            assert!(!PlainPasswordVerifier.verify("hunter2", "Hunter2"));
            assert!(!PlainPasswordVerifier.verify("hunter2", "hunter3"));
            assert!(!PlainPasswordVerifier.verify("", "hunter2"));
        }

        #[test]
        fn rejects_prefixes_and_extensions() {
            assert!(!PlainPasswordVerifier.verify("hunter", "hunter2"));
            assert!(!PlainPasswordVerifier.verify("hunter22", "hunter2"));
        }
    }
}

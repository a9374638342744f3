//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use reqwest::StatusCode;
use slotline_domain::SchedulingError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SchedulingError);

impl From<InfraError> for SchedulingError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SchedulingError> for InfraError {
    fn from(value: SchedulingError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoSchedulingError {
    fn into_scheduling(self) -> SchedulingError;
}

/// Map a non-success HTTP status (plus response body excerpt) to a domain error.
pub fn status_error(status: StatusCode, context: &str) -> SchedulingError {
    let code = status.as_u16();
    let message = format!(
        "HTTP {} {}: {}",
        code,
        status.canonical_reason().unwrap_or("unknown status"),
        context
    );

    match code {
        401 | 403 => SchedulingError::Auth(message),
        404 => SchedulingError::NotFound(message),
        429 => SchedulingError::Upstream(message),
        400..=499 => SchedulingError::InvalidInput(message),
        _ => SchedulingError::Upstream(message),
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → SchedulingError */
/* -------------------------------------------------------------------------- */

impl IntoSchedulingError for HttpError {
    fn into_scheduling(self) -> SchedulingError {
        if self.is_timeout() {
            return SchedulingError::Upstream("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return SchedulingError::Upstream("HTTP connection failure".into());
        }

        if self.is_decode() {
            return SchedulingError::Upstream(format!("undecodable response payload: {self}"));
        }

        if let Some(status) = self.status() {
            return status_error(status, "request failed");
        }

        SchedulingError::Upstream(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_scheduling())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use reqwest::Client;
    use tokio::runtime::Runtime;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn status_codes_map_to_domain_variants() {
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, "x"),
            SchedulingError::Auth(_)
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "event abc"),
            SchedulingError::NotFound(msg) if msg.contains("event abc")
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST, "x"),
            SchedulingError::InvalidInput(_)
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, "x"),
            SchedulingError::Upstream(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_GATEWAY, "x"),
            SchedulingError::Upstream(_)
        ));
    }

    #[test]
    fn http_status_401_maps_to_auth_error() {
        Runtime::new().unwrap().block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(StatusCode::UNAUTHORIZED))
                .mount(&server)
                .await;

            let client = Client::builder().no_proxy().build().unwrap();
            let error =
                client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

            let mapped: SchedulingError = InfraError::from(error).into();
            match mapped {
                SchedulingError::Auth(msg) => assert!(msg.contains("401")),
                other => panic!("expected auth error, got {:?}", other),
            }
        });
    }

    #[test]
    fn connection_refused_is_upstream() {
        Runtime::new().unwrap().block_on(async {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let addr = listener.local_addr().unwrap();
            drop(listener);

            let client = Client::builder().no_proxy().build().unwrap();
            let error = client.get(format!("http://{addr}")).send().await.unwrap_err();

            let mapped: SchedulingError = InfraError::from(error).into();
            assert!(mapped.is_upstream());
        });
    }
}

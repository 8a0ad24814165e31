//! Query parameter parsing helpers.

use jiff::civil::Date;
use salvo::{oapi::extract::QueryParam, prelude::StatusError};

use salon_app::domain::appointments::schedule::parse_date;

use crate::extensions::ResultExt;

pub(crate) trait QueryDateExt {
    /// Parse an optional `YYYY-MM-DD` query parameter.
    fn into_date(self, name: &str) -> Result<Option<Date>, StatusError>;
}

impl QueryDateExt for QueryParam<String, false> {
    fn into_date(self, name: &str) -> Result<Option<Date>, StatusError> {
        self.into_inner()
            .map(|value| parse_date(&value))
            .transpose()
            .or_400(&format!("could not parse \"{name}\" query parameter"))
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use salvo::{
        http::StatusCode,
        prelude::*,
        test::{ResponseExt, TestClient},
    };
    use testresult::TestResult;

    use super::*;

    #[handler]
    async fn echo(day: QueryParam<String, false>) -> Result<String, StatusError> {
        Ok(day
            .into_date("day")?
            .map(|day| day.to_string())
            .unwrap_or_default())
    }

    fn service() -> Service {
        Service::new(Router::new().get(echo))
    }

    #[tokio::test]
    async fn missing_parameter_is_none() -> TestResult {
        let mut res = TestClient::get("http://example.com/")
            .send(&service())
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(res.take_string().await?, "");

        Ok(())
    }

    #[tokio::test]
    async fn valid_date_is_parsed() -> TestResult {
        let mut res = TestClient::get("http://example.com/?day=2025-06-01")
            .send(&service())
            .await;

        assert_eq!(res.take_string().await?, date(2025, 6, 1).to_string());

        Ok(())
    }

    #[tokio::test]
    async fn invalid_date_is_bad_request() {
        let res = TestClient::get("http://example.com/?day=06/01/2025")
            .send(&service())
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
    }
}

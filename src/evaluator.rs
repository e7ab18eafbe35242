//! Sequences the liveness, duration and sample checks of a scrape target.

use color_eyre::eyre::Report;
use tracing::info;

use crate::probe::{ProbeError, ScrapeProbe};
use crate::{Outcome, ProbeRequest, QueryKind, Severity};

/// Checks how Prometheus sees one scrape target and turns that into a plugin
/// outcome.
pub struct ScrapeHealth {
    request: ProbeRequest,
    probe: ScrapeProbe,
}

impl TryFrom<ProbeRequest> for ScrapeHealth {
    type Error = Report;
    fn try_from(value: ProbeRequest) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl ScrapeHealth {
    pub fn new(request: ProbeRequest) -> Result<Self, Report> {
        Ok(Self {
            probe: ScrapeProbe::new(request.url.as_str(), request.request_timeout)?,
            request,
        })
    }

    /// Runs the three checks in order. The first failure ends the run as
    /// CRITICAL and no later query is issued.
    pub async fn check(&self) -> Outcome {
        let outcome = match self.evaluate().await {
            Ok(outcome) => outcome,
            Err(e) => Outcome::critical(e),
        };
        info!(instance = %self.request.instance, severity = %outcome.severity, "check finished");
        outcome
    }

    async fn evaluate(&self) -> Result<Outcome, ProbeError> {
        self.check_liveness().await?;
        let duration = self.scrape_duration().await?;
        let severity = self.request.thresholds.check(duration);
        let samples = self.run(QueryKind::SampleCount).await?;
        Ok(self.report(severity, duration, &samples))
    }

    async fn run(&self, kind: QueryKind) -> Result<String, ProbeError> {
        self.probe.query(&self.request.query(kind)).await
    }

    async fn check_liveness(&self) -> Result<(), ProbeError> {
        let raw = self.run(QueryKind::Liveness).await?;
        let up: i64 = raw
            .parse()
            .map_err(|e| ProbeError::Value(format!("invalid liveness value {raw:?}: {e}")))?;
        if up == 0 {
            return Err(ProbeError::NotScraped(self.request.instance.clone()));
        }
        Ok(())
    }

    async fn scrape_duration(&self) -> Result<f64, ProbeError> {
        let raw = self.run(QueryKind::ScrapeDuration).await?;
        raw.parse()
            .map_err(|e| ProbeError::Value(format!("invalid scrape duration {raw:?}: {e}")))
    }

    fn report(&self, severity: Severity, duration: f64, samples: &str) -> Outcome {
        Outcome::new(
            severity,
            format!(
                "{}scraping took {:.1}s|{} samples={}",
                severity.prefix(),
                duration,
                self.request.thresholds.perfdata(duration),
                samples
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Thresholds;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn vector(value: &str) -> String {
        format!(
            r#"{{"status":"success","data":{{"resultType":"vector","result":[{{"metric":{{"instance":"web1"}},"value":[1700000000.5,"{value}"]}}]}}}}"#
        )
    }

    fn request(server: &MockServer, instance: &str, tags: &str) -> ProbeRequest {
        ProbeRequest {
            url: format!("{}/api/v1/query", server.uri()),
            instance: instance.to_string(),
            tags: tags.to_string(),
            thresholds: Thresholds::new(5.0, 30.0),
            request_timeout: None,
        }
    }

    async fn answer(server: &MockServer, query: &str, response: ResponseTemplate, calls: u64) {
        Mock::given(method("GET"))
            .and(path("/api/v1/query"))
            .and(query_param("query", query))
            .respond_with(response)
            .expect(calls)
            .mount(server)
            .await;
    }

    async fn healthy_target(server: &MockServer, duration: &str, samples: &str) {
        let ok = |v: &str| ResponseTemplate::new(200).set_body_string(vector(v));
        answer(server, r#"up{instance="web1"}"#, ok("1"), 1).await;
        answer(server, r#"scrape_duration_seconds{instance="web1"}"#, ok(duration), 1).await;
        answer(server, r#"scrape_samples_scraped{instance="web1"}"#, ok(samples), 1).await;
    }

    async fn check(req: ProbeRequest) -> Outcome {
        ScrapeHealth::new(req).unwrap().check().await
    }

    #[tokio::test]
    async fn slow_scrape_is_warning() {
        let server = MockServer::start().await;
        healthy_target(&server, "12.3", "150").await;

        let outcome = check(request(&server, "web1", "")).await;
        assert_eq!(outcome.severity, Severity::Warning);
        assert_eq!(outcome.severity.exit_code(), 1);
        assert_eq!(
            outcome.message,
            "WARNING  - scraping took 12.3s|duration=12.300000s;5;30;0; samples=150"
        );
    }

    #[tokio::test]
    async fn fast_scrape_is_ok_without_prefix() {
        let server = MockServer::start().await;
        healthy_target(&server, "4.9", "42").await;

        let outcome = check(request(&server, "web1", "")).await;
        assert_eq!(outcome.severity, Severity::Ok);
        assert_eq!(
            outcome.message,
            "scraping took 4.9s|duration=4.900000s;5;30;0; samples=42"
        );
    }

    #[tokio::test]
    async fn very_slow_scrape_is_critical() {
        let server = MockServer::start().await;
        healthy_target(&server, "31.0", "7").await;

        let outcome = check(request(&server, "web1", "")).await;
        assert_eq!(outcome.severity, Severity::Critical);
        assert_eq!(
            outcome.message,
            "CRITICAL - scraping took 31.0s|duration=31.000000s;5;30;0; samples=7"
        );
    }

    #[tokio::test]
    async fn samples_value_is_displayed_verbatim() {
        let server = MockServer::start().await;
        healthy_target(&server, "0.0123", "1.5e3").await;

        let outcome = check(request(&server, "web1", "")).await;
        assert_eq!(outcome.severity, Severity::Ok);
        assert!(outcome.message.ends_with(" samples=1.5e3"));
    }

    #[tokio::test]
    async fn tags_are_part_of_every_query() {
        let server = MockServer::start().await;
        let ok = |v: &str| ResponseTemplate::new(200).set_body_string(vector(v));
        answer(&server, r#"up{instance="web1","job"}"#, ok("1"), 1).await;
        answer(&server, r#"scrape_duration_seconds{instance="web1","job"}"#, ok("1"), 1).await;
        answer(&server, r#"scrape_samples_scraped{instance="web1","job"}"#, ok("3"), 1).await;

        let outcome = check(request(&server, "web1", "job")).await;
        assert_eq!(outcome.severity, Severity::Ok);
    }

    #[tokio::test]
    async fn target_down_aborts_before_duration() {
        let server = MockServer::start().await;
        let ok = |v: &str| ResponseTemplate::new(200).set_body_string(vector(v));
        answer(&server, r#"up{instance="web1"}"#, ok("0"), 1).await;
        answer(&server, r#"scrape_duration_seconds{instance="web1"}"#, ok("1"), 0).await;
        answer(&server, r#"scrape_samples_scraped{instance="web1"}"#, ok("1"), 0).await;

        let outcome = check(request(&server, "web1", "")).await;
        assert_eq!(outcome.severity, Severity::Critical);
        assert_eq!(outcome.message, "CRITICAL - unable to scrape instance web1");
    }

    #[tokio::test]
    async fn non_numeric_liveness_is_critical() {
        let server = MockServer::start().await;
        let ok = |v: &str| ResponseTemplate::new(200).set_body_string(vector(v));
        answer(&server, r#"up{instance="web1"}"#, ok("yes"), 1).await;
        answer(&server, r#"scrape_duration_seconds{instance="web1"}"#, ok("1"), 0).await;

        let outcome = check(request(&server, "web1", "")).await;
        assert_eq!(outcome.severity, Severity::Critical);
        assert!(outcome.message.starts_with("CRITICAL - invalid liveness value"));
    }

    #[tokio::test]
    async fn non_numeric_duration_is_critical() {
        let server = MockServer::start().await;
        let ok = |v: &str| ResponseTemplate::new(200).set_body_string(vector(v));
        answer(&server, r#"up{instance="web1"}"#, ok("1"), 1).await;
        answer(&server, r#"scrape_duration_seconds{instance="web1"}"#, ok("slow"), 1).await;
        answer(&server, r#"scrape_samples_scraped{instance="web1"}"#, ok("1"), 0).await;

        let outcome = check(request(&server, "web1", "")).await;
        assert_eq!(outcome.severity, Severity::Critical);
        assert!(outcome.message.starts_with("CRITICAL - invalid scrape duration"));
    }

    #[tokio::test]
    async fn server_error_on_liveness_stops_the_run() {
        let server = MockServer::start().await;
        let ok = |v: &str| ResponseTemplate::new(200).set_body_string(vector(v));
        answer(&server, r#"up{instance="web1"}"#, ResponseTemplate::new(500), 1).await;
        answer(&server, r#"scrape_duration_seconds{instance="web1"}"#, ok("1"), 0).await;
        answer(&server, r#"scrape_samples_scraped{instance="web1"}"#, ok("1"), 0).await;

        let outcome = check(request(&server, "web1", "")).await;
        assert_eq!(outcome.severity, Severity::Critical);
        assert_eq!(
            outcome.message,
            "CRITICAL - API request error: 500 Internal Server Error"
        );
    }

    #[tokio::test]
    async fn server_error_on_duration_stops_the_run() {
        let server = MockServer::start().await;
        let ok = |v: &str| ResponseTemplate::new(200).set_body_string(vector(v));
        answer(&server, r#"up{instance="web1"}"#, ok("1"), 1).await;
        let down = ResponseTemplate::new(500);
        answer(&server, r#"scrape_duration_seconds{instance="web1"}"#, down, 1).await;
        answer(&server, r#"scrape_samples_scraped{instance="web1"}"#, ok("1"), 0).await;

        let outcome = check(request(&server, "web1", "")).await;
        assert_eq!(outcome.severity, Severity::Critical);
        assert!(outcome.message.contains("500 Internal Server Error"));
    }

    #[tokio::test]
    async fn server_error_on_samples_overrides_duration_severity() {
        let server = MockServer::start().await;
        let ok = |v: &str| ResponseTemplate::new(200).set_body_string(vector(v));
        answer(&server, r#"up{instance="web1"}"#, ok("1"), 1).await;
        answer(&server, r#"scrape_duration_seconds{instance="web1"}"#, ok("12.3"), 1).await;
        let down = ResponseTemplate::new(503);
        answer(&server, r#"scrape_samples_scraped{instance="web1"}"#, down, 1).await;

        let outcome = check(request(&server, "web1", "")).await;
        assert_eq!(outcome.severity, Severity::Critical);
        assert_eq!(
            outcome.message,
            "CRITICAL - API request error: 503 Service Unavailable"
        );
    }

    #[tokio::test]
    async fn no_data_is_critical() {
        let server = MockServer::start().await;
        answer(
            &server,
            r#"up{instance="web1"}"#,
            ResponseTemplate::new(200).set_body_string(
                r#"{"status":"success","data":{"resultType":"vector","result":[]}}"#,
            ),
            1,
        )
        .await;

        let outcome = check(request(&server, "web1", "")).await;
        assert_eq!(outcome.severity, Severity::Critical);
        assert_eq!(outcome.message, "CRITICAL - API response error - no data");
    }
}

mod common;

use common::{mock_client, read_fixture};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zenkit::{JobOperations, JobPollOptions, JobState, NewTicket, ZendeskError};

const JOB_ID: &str = "8b726e606741012ffc2d782bcb7848fe";

fn working_body() -> serde_json::Value {
    json!({
        "job_status": {
            "id": JOB_ID,
            "status": "working",
            "progress": 1,
            "total": 2
        }
    })
}

#[tokio::test]
async fn polls_until_job_completes() {
    let server = MockServer::start().await;
    let job_path = format!("/job_statuses/{}.json", JOB_ID);

    Mock::given(method("GET"))
        .and(path(job_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(working_body()))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(job_path.as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(read_fixture("jobs/job-completed.json"), "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server.uri());
    let response = client
        .wait_for_job(
            JOB_ID,
            JobPollOptions::new(Duration::from_millis(50), Duration::from_secs(5)),
        )
        .await
        .unwrap();

    assert_eq!(response.job_status.status, JobState::Completed);
    assert_eq!(response.job_status.successful_ids(), vec![995, 994]);
}

#[tokio::test]
async fn failed_job_is_returned_not_raised() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/job_statuses/job-f.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "job_status": {
                "id": "job-f",
                "status": "failed",
                "message": "Aborted"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server.uri());
    let response = client
        .wait_for_job("job-f", JobPollOptions::default())
        .await
        .unwrap();

    assert_eq!(response.job_status.status, JobState::Failed);
    assert_eq!(response.job_status.message.as_deref(), Some("Aborted"));
}

#[tokio::test]
async fn times_out_when_job_never_terminates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/job_statuses/job-9.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "job_status": { "id": "job-9", "status": "working" }
        })))
        .mount(&server)
        .await;

    let client = mock_client(&server.uri());
    let error = client
        .wait_for_job(
            "job-9",
            JobPollOptions::new(Duration::from_millis(100), Duration::from_millis(300)),
        )
        .await
        .unwrap_err();

    match error {
        ZendeskError::JobTimeout { job_id, timeout_ms } => {
            assert_eq!(job_id, "job-9");
            assert_eq!(timeout_ms, 300);
        }
        other => panic!("expected timeout error, got {:?}", other),
    }
}

#[tokio::test]
async fn poll_errors_propagate_immediately() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/job_statuses/job-e.json"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "title": "ServerError", "message": "boom" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server.uri());
    let error = client
        .wait_for_job("job-e", JobPollOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(error, ZendeskError::Api { status: 500, .. }));
}

#[tokio::test]
async fn bulk_create_composes_with_job_polling() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tickets/create_many.json"))
        .and(body_partial_json(json!({
            "tickets": [{ "subject": "Printer is on fire" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "job_status": { "id": JOB_ID, "status": "queued" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/job_statuses/{}.json", JOB_ID).as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(read_fixture("jobs/job-completed.json"), "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server.uri());
    let response = client
        .create_many_tickets_and_wait(
            vec![NewTicket::new("Printer is on fire")],
            JobPollOptions::new(Duration::from_millis(10), Duration::from_secs(1)),
        )
        .await
        .unwrap();

    assert_eq!(response.job_status.status, JobState::Completed);
}

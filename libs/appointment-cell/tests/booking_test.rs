// libs/appointment-cell/tests/booking_test.rs
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Local};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::router::appointment_routes;
use appointment_cell::speech::{long_date_with_year, numeric_date, short_date};
use appointment_cell::TIME_SLOTS;
use shared_config::AppConfig;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

const CLERK_ID: &str = "clerk-123";

fn create_test_app(config: AppConfig) -> Router {
    appointment_routes(Arc::new(config))
}

fn tomorrow_string() -> String {
    (Local::now().date_naive() + Duration::days(1))
        .format("%Y-%m-%d")
        .to_string()
}

fn book_payload(args: Value) -> Value {
    json!({
        "message": {
            "type": "tool-calls",
            "toolCallList": [
                {"id": "call-1", "name": "book_appointment", "arguments": args}
            ]
        }
    })
}

async fn post_book(app: Router, payload: &Value) -> axum::response::Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri("/book")
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn first_result(body: &Value) -> String {
    body["results"][0]["result"].as_str().unwrap().to_string()
}

async fn mount_user(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("clerk_id", format!("eq.{}", CLERK_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::user_response(CLERK_ID, "patient@example.com")
        ])))
        .mount(mock_server)
        .await;
}

async fn mount_directory(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_response("doc-1", "Dr. Sarah Smith", "Orthodontics"),
            MockSupabaseResponses::doctor_response("doc-2", "Dr. James Lee", "General Dentistry"),
        ])))
        .mount(mock_server)
        .await;
}

async fn mount_booked_times(mock_server: &MockServer, doctor_id: &str, times: &[&str]) {
    let rows: Vec<Value> = times
        .iter()
        .map(|time| MockSupabaseResponses::booked_time_response(time))
        .collect();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("doctor_id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(mock_server)
        .await;
}

/// Guard mock asserting the write stage is never reached.
async fn mount_no_write_guard(mock_server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_missing_date_and_time_prompts_for_both() {
    let mock_server = MockServer::start().await;
    mount_no_write_guard(&mock_server).await;

    let config = TestConfig::default().with_store(&mock_server.uri()).to_app_config();
    let payload = book_payload(json!({"clerkId": CLERK_ID, "doctorId": "doc-1"}));

    let response = post_book(create_test_app(config), &payload).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(
        first_result(&body),
        "I need both a date and time to book your appointment. Could you please provide both?"
    );
}

#[tokio::test]
async fn test_missing_identity_is_rejected_without_write() {
    let mock_server = MockServer::start().await;
    mount_no_write_guard(&mock_server).await;

    let config = TestConfig::default().with_store(&mock_server.uri()).to_app_config();
    let payload = book_payload(json!({
        "doctorId": "doc-1",
        "date": tomorrow_string(),
        "time": "09:00"
    }));

    let response = post_book(create_test_app(config), &payload).await;
    let body = response_json(response).await;

    assert_eq!(
        first_result(&body),
        "I need to verify your account to book an appointment. Please make sure you're logged in."
    );
}

#[tokio::test]
async fn test_unknown_account_is_rejected() {
    let mock_server = MockServer::start().await;
    mount_no_write_guard(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::default().with_store(&mock_server.uri()).to_app_config();
    let payload = book_payload(json!({
        "clerkId": "clerk-unknown",
        "doctorId": "doc-1",
        "date": tomorrow_string(),
        "time": "09:00"
    }));

    let response = post_book(create_test_app(config), &payload).await;
    let body = response_json(response).await;

    assert_eq!(
        first_result(&body),
        "I couldn't find your account. Please make sure you're logged in to book an appointment."
    );
}

#[tokio::test]
async fn test_unknown_doctor_name_enumerates_directory() {
    let mock_server = MockServer::start().await;
    mount_user(&mock_server).await;
    mount_directory(&mock_server).await;
    mount_no_write_guard(&mock_server).await;

    let config = TestConfig::default().with_store(&mock_server.uri()).to_app_config();
    let payload = book_payload(json!({
        "clerkId": CLERK_ID,
        "doctorName": "Dr. Smith",
        "date": tomorrow_string(),
        "time": "09:00"
    }));

    let response = post_book(create_test_app(config), &payload).await;
    let body = response_json(response).await;

    assert_eq!(
        first_result(&body),
        "I couldn't find a doctor named \"Dr. Smith\". Available doctors are: \
         Dr. Sarah Smith (Orthodontics), Dr. James Lee (General Dentistry). \
         Which doctor would you like to book with?"
    );
}

#[tokio::test]
async fn test_doctor_name_match_is_case_insensitive() {
    let mock_server = MockServer::start().await;
    mount_user(&mock_server).await;
    mount_directory(&mock_server).await;
    mount_booked_times(&mock_server, "doc-1", &[]).await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .and(body_partial_json(json!({"doctor_id": "doc-1"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::created_appointment_response(
                "Dr. Sarah Smith",
                "patient@example.com",
                &tomorrow_string(),
                "09:00",
                "General consultation",
            )
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TestConfig::default().with_store(&mock_server.uri()).to_app_config();
    let payload = book_payload(json!({
        "clerkId": CLERK_ID,
        "doctorName": "dr. sarah smith",
        "date": tomorrow_string(),
        "time": "09:00"
    }));

    let response = post_book(create_test_app(config), &payload).await;
    let body = response_json(response).await;

    assert!(first_result(&body).starts_with("Great! I've successfully booked your appointment"));
}

#[tokio::test]
async fn test_no_doctor_given_prompts_with_directory() {
    let mock_server = MockServer::start().await;
    mount_user(&mock_server).await;
    mount_directory(&mock_server).await;
    mount_no_write_guard(&mock_server).await;

    let config = TestConfig::default().with_store(&mock_server.uri()).to_app_config();
    let payload = book_payload(json!({
        "clerkId": CLERK_ID,
        "date": tomorrow_string(),
        "time": "09:00"
    }));

    let response = post_book(create_test_app(config), &payload).await;
    let body = response_json(response).await;

    assert_eq!(
        first_result(&body),
        "Which doctor would you like to book with? Available doctors are: \
         Dr. Sarah Smith (Orthodontics), Dr. James Lee (General Dentistry)"
    );
}

#[tokio::test]
async fn test_unparsable_date_asks_for_format() {
    let mock_server = MockServer::start().await;
    mount_user(&mock_server).await;
    mount_no_write_guard(&mock_server).await;

    let config = TestConfig::default().with_store(&mock_server.uri()).to_app_config();
    let payload = book_payload(json!({
        "clerkId": CLERK_ID,
        "doctorId": "doc-1",
        "date": "next Tuesday",
        "time": "09:00"
    }));

    let response = post_book(create_test_app(config), &payload).await;
    let body = response_json(response).await;

    assert_eq!(
        first_result(&body),
        "Invalid date format. Please provide the date in YYYY-MM-DD format, for example 2025-01-15."
    );
}

#[tokio::test]
async fn test_today_is_rejected_with_next_five_dates() {
    let mock_server = MockServer::start().await;
    mount_user(&mock_server).await;
    mount_no_write_guard(&mock_server).await;

    let config = TestConfig::default().with_store(&mock_server.uri()).to_app_config();
    let today = Local::now().date_naive();
    let payload = book_payload(json!({
        "clerkId": CLERK_ID,
        "doctorId": "doc-1",
        "date": today.format("%Y-%m-%d").to_string(),
        "time": "09:00"
    }));

    let response = post_book(create_test_app(config), &payload).await;
    let body = response_json(response).await;

    let expected_dates = (1..=5)
        .map(|offset| short_date(today + Duration::days(offset)))
        .collect::<Vec<_>>()
        .join(", ");
    assert_eq!(
        first_result(&body),
        format!(
            "Appointments must be booked at least one day in advance. Available dates are: {}. \
             Which date would you prefer?",
            expected_dates
        )
    );
}

#[tokio::test]
async fn test_invalid_time_lists_full_catalog_without_write() {
    let mock_server = MockServer::start().await;
    mount_user(&mock_server).await;
    mount_no_write_guard(&mock_server).await;

    let config = TestConfig::default().with_store(&mock_server.uri()).to_app_config();
    let payload = book_payload(json!({
        "clerkId": CLERK_ID,
        "doctorId": "doc-1",
        "date": tomorrow_string(),
        "time": "12:00"
    }));

    let response = post_book(create_test_app(config), &payload).await;
    let body = response_json(response).await;

    assert_eq!(
        first_result(&body),
        format!(
            "Invalid time slot. Available times are: {}. Which time would you prefer?",
            TIME_SLOTS.join(", ")
        )
    );
}

#[tokio::test]
async fn test_conflicting_slot_lists_remaining_times() {
    let mock_server = MockServer::start().await;
    mount_user(&mock_server).await;
    mount_booked_times(&mock_server, "doc-1", &["09:00", "14:00"]).await;
    mount_no_write_guard(&mock_server).await;

    let config = TestConfig::default().with_store(&mock_server.uri()).to_app_config();
    let date = tomorrow_string();
    let payload = book_payload(json!({
        "clerkId": CLERK_ID,
        "doctorId": "doc-1",
        "date": date,
        "time": "09:00"
    }));

    let response = post_book(create_test_app(config), &payload).await;
    let body = response_json(response).await;

    let parsed = chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d").unwrap();
    let remaining = TIME_SLOTS
        .iter()
        .filter(|slot| **slot != "09:00" && **slot != "14:00")
        .copied()
        .collect::<Vec<_>>()
        .join(", ");
    assert_eq!(
        first_result(&body),
        format!(
            "I'm sorry, but the time slot 09:00 is already booked for this doctor on {}. \
             Available times on that date are: {}. Would you like to choose a different time?",
            numeric_date(parsed),
            remaining
        )
    );
}

#[tokio::test]
async fn test_successful_booking_commits_and_notifies() {
    let mock_server = MockServer::start().await;
    let email_server = MockServer::start().await;

    mount_user(&mock_server).await;
    mount_booked_times(&mock_server, "doc-1", &[]).await;

    let date = tomorrow_string();
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .and(body_partial_json(json!({
            "doctor_id": "doc-1",
            "date": date,
            "time": "09:00",
            "reason": "Regular Checkup",
            "status": "confirmed"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::created_appointment_response(
                "Dr. Sarah Smith",
                "patient@example.com",
                &date,
                "09:00",
                "Regular Checkup",
            )
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/send-appointment-email"))
        .and(body_partial_json(json!({
            "userEmail": "patient@example.com",
            "doctorName": "Dr. Sarah Smith",
            "appointmentTime": "09:00",
            "appointmentType": "Regular Checkup",
            "duration": "60 min",
            "price": "$120"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&email_server)
        .await;

    let config = TestConfig::default()
        .with_store(&mock_server.uri())
        .with_email_service(&format!("{}/send-appointment-email", email_server.uri()))
        .to_app_config();
    let payload = book_payload(json!({
        "clerkId": CLERK_ID,
        "doctorId": "doc-1",
        "date": date,
        "time": "09:00",
        "appointmentType": "checkup"
    }));

    let response = post_book(create_test_app(config), &payload).await;
    let body = response_json(response).await;

    let parsed = chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d").unwrap();
    assert_eq!(
        first_result(&body),
        format!(
            "Great! I've successfully booked your appointment with Dr. Sarah Smith on {} at 9:00 AM \
             for Regular Checkup. You'll receive a confirmation email shortly with all the details. \
             Is there anything else I can help you with?",
            long_date_with_year(parsed)
        )
    );
}

#[tokio::test]
async fn test_notification_failure_never_fails_the_booking() {
    let mock_server = MockServer::start().await;
    let email_server = MockServer::start().await;

    mount_user(&mock_server).await;
    mount_booked_times(&mock_server, "doc-1", &[]).await;

    let date = tomorrow_string();
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::created_appointment_response(
                "Dr. Sarah Smith",
                "patient@example.com",
                &date,
                "09:00",
                "General consultation",
            )
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/send-appointment-email"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&email_server)
        .await;

    let config = TestConfig::default()
        .with_store(&mock_server.uri())
        .with_email_service(&format!("{}/send-appointment-email", email_server.uri()))
        .to_app_config();
    let payload = book_payload(json!({
        "clerkId": CLERK_ID,
        "doctorId": "doc-1",
        "date": date,
        "time": "09:00"
    }));

    let response = post_book(create_test_app(config), &payload).await;
    let body = response_json(response).await;

    assert!(first_result(&body).starts_with("Great! I've successfully booked your appointment"));
}

#[tokio::test]
async fn test_lost_commit_race_is_spoken_as_conflict() {
    let mock_server = MockServer::start().await;

    mount_user(&mock_server).await;

    // First read sees a free slot; the re-read after the rejected insert
    // reflects the competing commit.
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("doctor_id", "eq.doc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("doctor_id", "eq.doc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::booked_time_response("09:00")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(409).set_body_string(
            "duplicate key value violates unique constraint \"appointments_doctor_id_date_time_key\"",
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TestConfig::default().with_store(&mock_server.uri()).to_app_config();
    let date = tomorrow_string();
    let payload = book_payload(json!({
        "clerkId": CLERK_ID,
        "doctorId": "doc-1",
        "date": date,
        "time": "09:00"
    }));

    let response = post_book(create_test_app(config), &payload).await;
    let body = response_json(response).await;

    let result = first_result(&body);
    assert!(result.starts_with("I'm sorry, but the time slot 09:00 is already booked"));
    assert!(result.contains("09:30"));
}

#[tokio::test]
async fn test_clerk_id_falls_back_to_call_variables() {
    let mock_server = MockServer::start().await;
    mount_no_write_guard(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("clerk_id", "eq.from-call"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TestConfig::default().with_store(&mock_server.uri()).to_app_config();
    let payload = json!({
        "message": {
            "type": "tool-calls",
            "toolCallList": [
                {"id": "call-1", "name": "book_appointment", "arguments": {
                    "doctorId": "doc-1",
                    "date": tomorrow_string(),
                    "time": "09:00"
                }}
            ]
        },
        "call": {"variables": {"clerkId": "from-call"}}
    });

    let response = post_book(create_test_app(config), &payload).await;
    let body = response_json(response).await;

    // The lookup above proves the call-variable token was used.
    assert_eq!(
        first_result(&body),
        "I couldn't find your account. Please make sure you're logged in to book an appointment."
    );
}

#[tokio::test]
async fn test_clerk_id_falls_back_to_request_headers() {
    let mock_server = MockServer::start().await;
    mount_no_write_guard(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("clerk_id", "eq.from-header"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TestConfig::default().with_store(&mock_server.uri()).to_app_config();
    let payload = book_payload(json!({
        "doctorId": "doc-1",
        "date": tomorrow_string(),
        "time": "09:00"
    }));

    let app = create_test_app(config);
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/book")
                .header("content-type", "application/json")
                .header("x-clerk-id", "from-header")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let body = response_json(response).await;

    assert_eq!(
        first_result(&body),
        "I couldn't find your account. Please make sure you're logged in to book an appointment."
    );
}

#[tokio::test]
async fn test_direct_call_returns_message_object() {
    let mock_server = MockServer::start().await;
    mount_no_write_guard(&mock_server).await;

    let config = TestConfig::default().with_store(&mock_server.uri()).to_app_config();
    let payload = json!({"doctorId": "doc-1"});

    let response = post_book(create_test_app(config), &payload).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(
        body["message"],
        "I need both a date and time to book your appointment. Could you please provide both?"
    );
}

#[tokio::test]
async fn test_batch_skips_unrecognized_names() {
    let mock_server = MockServer::start().await;
    mount_no_write_guard(&mock_server).await;

    let config = TestConfig::default().with_store(&mock_server.uri()).to_app_config();
    let payload = json!({
        "message": {
            "type": "tool-calls",
            "toolCallList": [
                {"id": "call-1", "name": "book_appointment", "arguments": {}},
                {"id": "call-2", "name": "summon_ufo", "arguments": {}}
            ]
        }
    });

    let response = post_book(create_test_app(config), &payload).await;
    let body = response_json(response).await;

    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["toolCallId"], "call-1");
}

#[tokio::test]
async fn test_batched_doctor_listing_rides_along() {
    let mock_server = MockServer::start().await;
    mount_directory(&mock_server).await;
    mount_no_write_guard(&mock_server).await;

    let config = TestConfig::default().with_store(&mock_server.uri()).to_app_config();
    let payload = json!({
        "message": {
            "type": "tool-calls",
            "toolCallList": [
                {"id": "call-1", "name": "get_available_doctors", "arguments": {}}
            ]
        }
    });

    let response = post_book(create_test_app(config), &payload).await;
    let body = response_json(response).await;

    assert_eq!(
        first_result(&body),
        "Available doctors: Dr. Sarah Smith (Orthodontics), Dr. James Lee (General Dentistry). \
         Which doctor would you like to book with?"
    );
}

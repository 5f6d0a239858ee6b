use dropout_risk_client::chat::{self, ChatHistoryStore, UNAVAILABLE_TEXT};
use dropout_risk_client::db::LocalStore;
use dropout_risk_client::demo;
use dropout_risk_client::gateway::{RemoteGateway, SignUpRequest};
use dropout_risk_client::models::{Role, UserProfile};
use dropout_risk_client::resilience::ResilienceShim;
use dropout_risk_client::session::SessionStore;
use dropout_risk_client::{ClientConfig, ClientError, RiskClient};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(uri: &str) -> RiskClient {
    let config = ClientConfig::single_host(uri);
    let store = LocalStore::in_memory().await.unwrap();
    RiskClient::new(
        RemoteGateway::new(&config).unwrap(),
        SessionStore::new(store),
    )
}

fn student_profile() -> UserProfile {
    UserProfile {
        user_id: "STU2024001".to_string(),
        name: "Sarah Johnson".to_string(),
        role: Role::Student,
        email: None,
    }
}

async fn mount_sign_in(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/signin"))
        .and(body_json(json!({ "userId": "STU2024001", "password": "Demo123!" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Login successful",
            "user": { "userId": "STU2024001", "name": "Sarah Johnson", "role": "student" },
            "token": "tok-1"
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn sign_in_stores_session() {
    let server = MockServer::start().await;
    mount_sign_in(&server).await;
    let client = client_for(&server.uri()).await;

    let response = client.sign_in("STU2024001", "Demo123!").await.unwrap();

    assert_eq!(response.user.role, Role::Student);
    assert_eq!(
        client.session().load_token().await.unwrap().as_deref(),
        Some("tok-1")
    );
    assert_eq!(client.stored_profile().await.unwrap(), Some(student_profile()));
}

#[tokio::test]
async fn rejected_sign_in_surfaces_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/signin"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .mount(&server)
        .await;
    let client = client_for(&server.uri()).await;

    let err = client.sign_in("demo@student.com", "wrong").await.unwrap_err();

    assert!(err.is_user_facing());
    assert_eq!(err.to_string(), "Invalid credentials");
    assert!(!client.session().is_authenticated().await);
}

#[tokio::test]
async fn student_dashboard_loads_live_analytics() {
    let server = MockServer::start().await;
    mount_sign_in(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard/student/STU2024001"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "student": { "studentId": "STU2024001", "name": "Sarah Johnson" },
                "dashboard": [
                    {
                        "semester": 1,
                        "gpa": 3.2,
                        "cgpa": 3.2,
                        "attendancePercentage": 85,
                        "backlogs": 0,
                        "riskStatus": "Safe"
                    },
                    {
                        "semester": 2,
                        "gpa": 2.8,
                        "cgpa": 3.0,
                        "attendancePercentage": 70,
                        "backlogs": 1,
                        "riskStatus": "Warning"
                    }
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server.uri()).await;
    client.sign_in("STU2024001", "Demo123!").await.unwrap();

    let shim = ResilienceShim::new(demo::student_dashboard());
    let loaded = client.load_student_dashboard(&shim).await;

    assert!(!loaded.is_demo);
    assert!(loaded.notice.is_none());
    assert_eq!(loaded.analytics.avg_gpa, 3.0);
    assert_eq!(loaded.analytics.avg_attendance, 78.0);
    assert_eq!(loaded.analytics.gpa_change, -12.5);
    assert_eq!(loaded.analytics.attendance_change, -17.6);
    assert_eq!(loaded.analytics.raw_dashboard.len(), 2);
}

#[tokio::test]
async fn missing_session_falls_back_without_calling_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let client = client_for(&server.uri()).await;

    let shim = ResilienceShim::new(demo::student_dashboard());
    let loaded = client.load_student_dashboard(&shim).await;

    assert!(loaded.is_demo);
    assert_eq!(loaded.analytics, demo::student_dashboard());
    let notice = loaded.notice.unwrap();
    assert_eq!(notice.cause, ClientError::Unauthenticated.to_string());
}

#[tokio::test]
async fn empty_semester_list_falls_back_to_demo() {
    let server = MockServer::start().await;
    mount_sign_in(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard/student/STU2024001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "student": { "name": "Sarah Johnson" },
            "dashboard": []
        })))
        .mount(&server)
        .await;
    let client = client_for(&server.uri()).await;
    client.sign_in("STU2024001", "Demo123!").await.unwrap();

    let shim = ResilienceShim::new(demo::student_dashboard());
    let loaded = client.load_student_dashboard(&shim).await;

    assert!(loaded.is_demo);
    assert_eq!(
        loaded.notice.map(|notice| notice.cause),
        Some(ClientError::EmptyInput.to_string())
    );
}

#[tokio::test]
async fn counselor_dashboard_aggregates_raw_roster() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/counselor/dashboard"))
        .and(header("authorization", "Bearer tok-c"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "studentId": "S1",
                "name": "Emma",
                "currentGpa": 3.6,
                "currentAttendance": 94,
                "currentRiskStatus": "Safe"
            },
            {
                "studentId": "S2",
                "name": "David",
                "currentGpa": 1.8,
                "currentAttendance": 47,
                "currentRiskStatus": "At Risk"
            }
        ])))
        .mount(&server)
        .await;
    let client = client_for(&server.uri()).await;
    let counselor = UserProfile {
        user_id: "CNS001".to_string(),
        name: "Dr. Sarah Wilson".to_string(),
        role: Role::Counselor,
        email: None,
    };
    client.session().save("tok-c", &counselor).await.unwrap();

    let shim = ResilienceShim::new(demo::counselor_dashboard());
    let loaded = client.load_counselor_dashboard(&shim).await;

    assert!(!loaded.is_demo);
    let summary = &loaded.analytics.summary;
    assert_eq!(summary.total_students, 2);
    assert_eq!(summary.avg_gpa, 2.7);
    assert_eq!(summary.avg_attendance, 71.0);
    assert_eq!(summary.risk_counts.safe, 1);
    assert_eq!(summary.risk_counts.at_risk, 1);
}

#[tokio::test]
async fn server_error_on_counselor_load_shows_demo() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/counselor/dashboard"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({ "message": "Counselor access only" })),
        )
        .mount(&server)
        .await;
    let client = client_for(&server.uri()).await;
    client.session().save("tok-1", &student_profile()).await.unwrap();

    let shim = ResilienceShim::new(demo::counselor_dashboard());
    let loaded = client.load_counselor_dashboard(&shim).await;

    assert!(loaded.is_demo);
    assert_eq!(loaded.analytics.summary.total_students, 5);
    assert_eq!(
        loaded.notice.map(|notice| notice.cause).as_deref(),
        Some("Counselor access only")
    );
}

#[tokio::test]
async fn logout_clears_session_even_when_backend_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server.uri()).await;
    client.session().save("tok-1", &student_profile()).await.unwrap();

    client.logout().await;

    assert!(client.session().load_token().await.unwrap().is_none());
    assert!(client.stored_profile().await.unwrap().is_none());
}

#[tokio::test]
async fn unreachable_backend_is_a_network_failure() {
    let uri = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };
    let client = client_for(&uri).await;

    let err = client.forgot_password("demo@student.com").await.unwrap_err();

    assert!(matches!(err, ClientError::NetworkFailure(_)));
}

#[tokio::test]
async fn forgot_password_returns_reset_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/forgot-password"))
        .and(body_json(json!({ "email": "demo@student.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Reset link sent",
            "resetToken": "reset-42"
        })))
        .mount(&server)
        .await;
    let client = client_for(&server.uri()).await;

    let response = client.forgot_password("demo@student.com").await.unwrap();

    assert_eq!(response.reset_token.as_deref(), Some("reset-42"));
}

#[tokio::test]
async fn chat_exchange_is_recorded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({ "message": "I feel stressed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reply": "I'm sorry to hear that. What is on your mind?"
        })))
        .mount(&server)
        .await;
    let gateway = RemoteGateway::new(&ClientConfig::single_host(&server.uri())).unwrap();
    let history = ChatHistoryStore::new(LocalStore::in_memory().await.unwrap());

    let reply = chat::converse(&gateway, &history, "  I feel stressed  ")
        .await
        .unwrap()
        .unwrap();

    assert!(!reply.is_user);
    let transcript = history.load().await.unwrap();
    assert_eq!(transcript.len(), 2);
    assert!(transcript[0].is_user);
    assert_eq!(transcript[0].message, "I feel stressed");
    assert_eq!(transcript[1], reply);
}

#[tokio::test]
async fn chat_failure_records_apology() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "error": "model offline" })),
        )
        .mount(&server)
        .await;
    let gateway = RemoteGateway::new(&ClientConfig::single_host(&server.uri())).unwrap();
    let history = ChatHistoryStore::new(LocalStore::in_memory().await.unwrap());

    let reply = chat::converse(&gateway, &history, "hello").await.unwrap().unwrap();

    assert_eq!(reply.message, UNAVAILABLE_TEXT);
    assert_eq!(history.load().await.unwrap().len(), 2);
    assert!(chat::converse(&gateway, &history, "   ").await.unwrap().is_none());
    assert_eq!(history.load().await.unwrap().len(), 2);
}

#[tokio::test]
async fn sign_up_sends_role_in_lowercase() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/signup"))
        .and(body_json(json!({
            "name": "Dr. Sarah Wilson",
            "email": "wilson@college.edu",
            "password": "Counsel123!",
            "role": "counselor"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "userId": "CNS002" })))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server.uri()).await;

    let response = client
        .sign_up(&SignUpRequest {
            name: "Dr. Sarah Wilson".to_string(),
            email: Some("wilson@college.edu".to_string()),
            password: "Counsel123!".to_string(),
            role: Some(Role::Counselor),
        })
        .await
        .unwrap();

    assert_eq!(response["userId"], "CNS002");
    assert!(!client.session().is_authenticated().await);
}

#[tokio::test]
async fn reset_password_sends_camel_case_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/reset-password"))
        .and(body_json(json!({ "token": "reset-42", "newPassword": "Fresh456!" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "Password updated" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server.uri()).await;

    client.reset_password("reset-42", "Fresh456!").await.unwrap();
}

#[tokio::test]
async fn remote_profile_unwraps_data_and_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/profile"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "user": {
                    "userId": "ADM001",
                    "name": "Registrar",
                    "role": "admin",
                    "email": "registrar@college.edu"
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    let client = client_for(&server.uri()).await;
    client.session().save("tok-1", &student_profile()).await.unwrap();

    let profile = client.remote_profile().await.unwrap();

    assert_eq!(profile.user_id, "ADM001");
    assert_eq!(profile.role, Role::Other("admin".to_string()));
    assert_eq!(profile.email.as_deref(), Some("registrar@college.edu"));
}

#[tokio::test]
async fn remote_profile_without_token_skips_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/profile"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let client = client_for(&server.uri()).await;

    let err = client.remote_profile().await.unwrap_err();

    assert!(matches!(err, ClientError::Unauthenticated));
}

//! tests/gateway_tests.rs
//! Pruebas del cliente Africa's Talking contra un servidor simulado (wiremock).

use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::dispatch_config::SimulationConfig;
use crate::config::gateway_config::GatewayConfig;
use crate::models::sms_model::GatewayResult;
use crate::services::gateway_service::{AfricasTalkingGateway, SmsGateway};
use crate::services::simulation_service::{SimulationService, PLACEHOLDER_COST};

const PHONE: &str = "+254700000001";

fn live_gateway(base_url: &str, timeout: Duration) -> AfricasTalkingGateway {
    let config = GatewayConfig::new("acme", Some("test-key".to_string()))
        .with_base_url(base_url)
        .with_timeout(timeout);
    AfricasTalkingGateway::new(config, SimulationService::new(SimulationConfig::instant()))
        .expect("No se pudo crear el gateway")
}

fn success_body(status: &str, message_id: &str, cost: &str) -> serde_json::Value {
    serde_json::json!({
        "SMSMessageData": {
            "Message": "Sent to 1/1 Total Cost: KES 0.8000",
            "Recipients": [{
                "statusCode": 101,
                "number": PHONE,
                "status": status,
                "cost": cost,
                "messageId": message_id
            }]
        }
    })
}

#[actix_rt::test]
async fn test_live_send_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/version1/messaging"))
        .and(header("ApiKey", "test-key"))
        .and(header("Accept", "application/json"))
        .and(body_string_contains("username=acme"))
        .and(body_string_contains("to=%2B254700000001"))
        .and(body_string_contains("message=Hola"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(success_body(
                "Success",
                "ATXid_abc123",
                "KES 0.8000",
            )),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let gateway = live_gateway(&mock_server.uri(), Duration::from_secs(5));
    let outcome = gateway.send("Hola", PHONE).await.expect("send no debe fallar");

    assert!(outcome.success);
    assert!(!outcome.simulated);
    assert_eq!(outcome.provider_message_id.as_deref(), Some("ATXid_abc123"));
    assert_eq!(outcome.cost.as_deref(), Some("KES 0.8000"));
    assert!(outcome.error.is_none());
}

#[actix_rt::test]
async fn test_provider_rejection_is_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/version1/messaging"))
        .respond_with(ResponseTemplate::new(201).set_body_json(success_body(
            "InvalidPhoneNumber",
            "None",
            "0",
        )))
        .mount(&mock_server)
        .await;

    let gateway = live_gateway(&mock_server.uri(), Duration::from_secs(5));
    let outcome = gateway.send("Hola", PHONE).await.unwrap();

    assert!(!outcome.success);
    assert!(!outcome.simulated);
    assert_eq!(outcome.error.as_deref(), Some("InvalidPhoneNumber"));
    assert!(outcome.provider_message_id.is_none());
}

#[actix_rt::test]
async fn test_empty_recipients_with_reason_is_provider_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "SMSMessageData": { "Message": "InvalidSenderId", "Recipients": [] }
        })))
        .mount(&mock_server)
        .await;

    let gateway = live_gateway(&mock_server.uri(), Duration::from_secs(5));
    let result = gateway.submit("test-key", "Hola", PHONE).await;

    assert_eq!(
        result,
        GatewayResult::ProviderFailure {
            reason: "InvalidSenderId".to_string()
        }
    );
}

#[actix_rt::test]
async fn test_server_error_degrades_to_simulated_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let gateway = live_gateway(&mock_server.uri(), Duration::from_secs(5));

    let raw = gateway.submit("test-key", "Hola", PHONE).await;
    assert!(matches!(raw, GatewayResult::TransportFailure { ref reason } if reason.contains("500")));

    let outcome = gateway.send("Hola", PHONE).await.unwrap();
    assert!(outcome.success);
    assert!(outcome.simulated);
    assert_eq!(outcome.cost.as_deref(), Some(PLACEHOLDER_COST));
}

#[actix_rt::test]
async fn test_malformed_body_degrades_to_simulated_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let gateway = live_gateway(&mock_server.uri(), Duration::from_secs(5));
    let outcome = gateway.send("Hola", PHONE).await.unwrap();

    assert!(outcome.success);
    assert!(outcome.simulated);
}

#[actix_rt::test]
async fn test_timeout_degrades_to_simulated_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(success_body("Success", "ATXid_late", "KES 0.8000"))
                .set_delay(Duration::from_millis(800)),
        )
        .mount(&mock_server)
        .await;

    let gateway = live_gateway(&mock_server.uri(), Duration::from_millis(100));

    let raw = gateway.submit("test-key", "Hola", PHONE).await;
    assert!(matches!(raw, GatewayResult::TransportFailure { .. }));

    let outcome = gateway.send("Hola", PHONE).await.unwrap();
    assert!(outcome.success);
    assert!(outcome.simulated);
    assert_ne!(outcome.provider_message_id.as_deref(), Some("ATXid_late"));
}

#[actix_rt::test]
async fn test_unreachable_provider_degrades() {
    // Puerto 9 (discard): nadie escucha
    let gateway = live_gateway("http://127.0.0.1:9", Duration::from_secs(2));
    let outcome = gateway.send("Hola", PHONE).await.unwrap();

    assert!(outcome.success);
    assert!(outcome.simulated);
}

#[actix_rt::test]
async fn test_placeholder_key_never_calls_provider() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = GatewayConfig::new("sandbox", Some("your-api-key-here".to_string()))
        .with_base_url(mock_server.uri());
    let gateway =
        AfricasTalkingGateway::new(config, SimulationService::new(SimulationConfig::instant()))
            .unwrap();

    assert!(!gateway.is_configured());
    let outcome = gateway.send("Hola", PHONE).await.unwrap();
    assert!(outcome.simulated);

    let status = gateway.status();
    assert!(!status.api_key_configured);
    assert!(status.sandbox);
    assert_eq!(status.username, "sandbox");
}

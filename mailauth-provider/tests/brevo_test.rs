//! Brevo provider against a wiremock server

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

mod common;

use common::{fast_retry, hits, json};
use mailauth_provider::{
    BrevoProvider, DnsRecordType, ProviderError, RecordPurpose, SendingProvider,
};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer};

fn provider(server: &MockServer) -> BrevoProvider {
    BrevoProvider::builder("xkeysib-test".into())
        .api_base(server.uri())
        .retry_policy(fast_retry())
        .build()
        .unwrap()
}

#[tokio::test]
async fn register_domain_normalizes_records() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/senders/domains"))
        .and(header("api-key", "xkeysib-test"))
        .respond_with(json(
            201,
            r#"{
                "id": 77,
                "domain_name": "example.com",
                "message": "Domain added successfully",
                "dns_records": {
                    "dkim1Record": {"type":"CNAME","value":"b1.example-com.dkim.brevo.com","host_name":"brevo1._domainkey","status":false},
                    "dkim2Record": {"type":"CNAME","value":"b2.example-com.dkim.brevo.com","host_name":"brevo2._domainkey","status":false},
                    "brevo_code": {"type":"TXT","value":"brevo-code:3f1c","host_name":"@","status":false},
                    "dmarc_record": {"type":"TXT","value":"v=DMARC1; p=none; rua=mailto:rua@dmarc.brevo.com","host_name":"_dmarc","status":false}
                }
            }"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let identity = provider(&server)
        .register_domain("example.com")
        .await
        .unwrap();

    assert_eq!(identity.reference, "77");
    assert_eq!(identity.dkim_selectors(), vec!["brevo1", "brevo2"]);
    let code = identity
        .dns_records
        .iter()
        .find(|r| r.purpose == RecordPurpose::Verification)
        .unwrap();
    assert_eq!(code.record_type, DnsRecordType::Txt);
    assert_eq!(code.host, "@");
}

#[tokio::test]
async fn duplicate_domain_maps_to_domain_exists() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/senders/domains"))
        .respond_with(json(
            400,
            r#"{"code":"duplicate_parameter","message":"Domain already exists"}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let err = provider(&server)
        .register_domain("example.com")
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::DomainExists { .. }));
}

#[tokio::test]
async fn domain_status_reads_legacy_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/senders/domains/example.com"))
        .respond_with(json(
            200,
            r#"{
                "domain": "example.com",
                "verified": true,
                "authenticated": true,
                "dns_records": {
                    "dkim_record": {"type":"TXT","value":"k=rsa;p=MIGfMA0","host_name":"mail._domainkey","status":true},
                    "brevo_code": {"type":"TXT","value":"brevo-code:3f1c","host_name":"","status":true}
                }
            }"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let status = provider(&server)
        .get_domain_status("example.com")
        .await
        .unwrap();

    assert!(status.authenticated);
    assert!(status.verified);
    assert!(status.mechanisms.dkim);
    assert!(status.mechanisms.ownership);
    assert!(!status.mechanisms.dmarc);
}

#[tokio::test]
async fn recheck_retries_transient_failures() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/senders/domains/example.com/authenticate"))
        .respond_with(json(503, ""))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/senders/domains/example.com/authenticate"))
        .respond_with(json(
            200,
            r#"{"domain_name":"example.com","message":"Domain has been authenticated"}"#,
        ))
        .mount(&server)
        .await;

    provider(&server)
        .trigger_recheck("example.com")
        .await
        .unwrap();

    assert_eq!(
        hits(&server).await,
        vec![
            "PUT /senders/domains/example.com/authenticate",
            "PUT /senders/domains/example.com/authenticate",
        ]
    );
}

#[tokio::test]
async fn unauthorized_is_permanent() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/senders/domains/example.com/authenticate"))
        .respond_with(json(
            401,
            r#"{"code":"unauthorized","message":"Key not found"}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let err = provider(&server)
        .trigger_recheck("example.com")
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::InvalidCredentials { .. }));
}

#[tokio::test]
async fn register_sender_flags_authentication_problems() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/senders"))
        .respond_with(json(201, r#"{"id": 12, "spfError": true, "dkimError": false}"#))
        .mount(&server)
        .await;

    let sender = provider(&server)
        .register_sender("news@example.com", "Example News")
        .await
        .unwrap();

    assert_eq!(sender.reference, "12");
    assert!(!sender.authenticated);
}

#[tokio::test]
async fn duplicate_sender_maps_to_sender_exists() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/senders"))
        .respond_with(json(
            400,
            r#"{"code":"duplicate_parameter","message":"Sender already exists"}"#,
        ))
        .mount(&server)
        .await;

    let err = provider(&server)
        .register_sender("news@example.com", "Example News")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ProviderError::SenderExists { ref email, .. } if email == "news@example.com"
    ));
}

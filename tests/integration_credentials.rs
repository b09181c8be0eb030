//! Integration tests for the Basic, Bearer, NTLM and Digest forms
//!
//! These tests drive the editor through its public surface: control events,
//! serialize/restore, validation, clearing and rendering.

use authorization_method::{
    AuthorizationMethod, ChangeEvent, ControlEvent, FormRenderer, MethodType, UiFlags,
};
use serde_json::json;
use tokio::sync::broadcast::error::TryRecvError;

#[test]
fn test_bearer_token_makes_form_valid() {
    let mut method = AuthorizationMethod::new(MethodType::Bearer);
    assert!(!method.validate());

    method
        .handle_input("token", "test-token", ControlEvent::Input)
        .unwrap();

    assert!(method.validate());
    assert_eq!(
        method.serialize().to_value().unwrap(),
        json!({ "token": "test-token" })
    );
}

#[test]
fn test_basic_round_trip() {
    let settings = json!({ "username": "uname", "password": "passwd" });
    let method = AuthorizationMethod::with_settings(MethodType::Basic, &settings);
    assert_eq!(method.serialize().to_value().unwrap(), settings);
    assert!(method.validate());
}

/// Restores `settings`, serializes, restores that output into a fresh editor
/// and checks both serializations match `settings`.
fn assert_round_trip(method: MethodType, settings: serde_json::Value) {
    let first = AuthorizationMethod::with_settings(method, &settings);
    let serialized = first.serialize().to_value().unwrap();
    assert_eq!(serialized, settings);

    let second = AuthorizationMethod::with_settings(method, &serialized);
    assert_eq!(second.serialize().to_value().unwrap(), serialized);
}

#[test]
fn test_bearer_round_trip() {
    assert_round_trip(MethodType::Bearer, json!({ "token": "secret-token" }));
}

#[test]
fn test_ntlm_round_trip() {
    assert_round_trip(
        MethodType::Ntlm,
        json!({ "username": "uname", "password": "passwd", "domain": "CORP" }),
    );
}

#[test]
fn test_digest_round_trip_with_custom_counters() {
    assert_round_trip(
        MethodType::Digest,
        json!({
            "username": "Mufasa",
            "password": "Circle Of Life",
            "realm": "testrealm@host.com",
            "nonce": "dcd98b7102dd2f0e8b11d0f600bfb0c093",
            "opaque": "5ccc069c403ebaf9f0171e9517f40e41",
            "algorithm": "MD5-sess",
            "requestUrl": "/dir/index.html",
            "qop": "auth-int",
            "nc": "0000000a",
            "cnonce": "0a4f113b",
        }),
    );
}

#[test]
fn test_ntlm_restore_keeps_fields_without_keys() {
    let mut method = AuthorizationMethod::with_settings(
        MethodType::Ntlm,
        &json!({ "username": "u", "password": "p", "domain": "d" }),
    );
    method.restore(&json!({ "domain": "other", "unknown": true, "password": 5 }));
    assert_eq!(
        method.serialize().to_value().unwrap(),
        json!({ "username": "u", "password": "p", "domain": "other" })
    );
}

#[test]
fn test_clear_keeps_method_type() {
    let mut method =
        AuthorizationMethod::with_settings(MethodType::Basic, &json!({ "username": "u" }));
    method.clear();
    assert_eq!(method.method_type(), MethodType::Basic);
    assert!(!method.validate());
    assert_eq!(
        method.serialize().to_value().unwrap(),
        json!({ "username": "", "password": "" })
    );
}

#[test]
fn test_digest_validation_and_serialization() {
    let mut method = AuthorizationMethod::new(MethodType::Digest);
    for (field, value) in [
        ("username", "Mufasa"),
        ("realm", "testrealm@host.com"),
        ("nonce", "dcd98b7102dd2f0e8b11d0f600bfb0c093"),
    ] {
        method.handle_input(field, value, ControlEvent::Input).unwrap();
    }
    assert!(method.validate());

    let value = method.serialize().to_value().unwrap();
    assert_eq!(value["algorithm"], "MD5");
    assert_eq!(value["qop"], "auth");
    assert_eq!(value["nc"], "00000001");

    method.handle_input("nc", "", ControlEvent::Input).unwrap();
    assert!(!method.validate());
    method.handle_input("qop", "", ControlEvent::Change).unwrap();
    assert!(method.validate());
}

#[test]
fn test_each_committed_edit_notifies_once() {
    let mut method = AuthorizationMethod::new(MethodType::Basic);
    let mut rx = method.subscribe();

    method.handle_input("username", "u", ControlEvent::Input).unwrap();
    method.handle_input("password", "p", ControlEvent::Input).unwrap();
    method.handle_input("password", "p", ControlEvent::Change).unwrap();

    assert_eq!(rx.try_recv().unwrap(), ChangeEvent);
    assert_eq!(rx.try_recv().unwrap(), ChangeEvent);
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[test]
fn test_render_basic_form_binds_fields() {
    let renderer = FormRenderer::new().unwrap();
    let method = AuthorizationMethod::with_settings(
        MethodType::Basic,
        &json!({ "username": "<admin>", "password": "secret" }),
    );
    let markup = method.render(&renderer).unwrap();
    assert!(markup.contains("basic-auth"));
    assert!(markup.contains(r#"name="username""#));
    assert!(markup.contains(r#"name="password""#));
    assert!(markup.contains("&lt;admin&gt;"));
    assert!(!markup.contains("<admin>"));
}

#[test]
fn test_render_applies_ui_flags() {
    let renderer = FormRenderer::new().unwrap();
    let mut method = AuthorizationMethod::new(MethodType::Ntlm);
    method.set_ui_flags(UiFlags {
        compatibility: true,
        outlined: false,
    });
    let markup = method.render(&renderer).unwrap();
    assert!(markup.contains("compatibility"));
    assert!(markup.contains(r#"name="domain""#));
}

#[test]
fn test_render_digest_hides_counters_without_qop() {
    let renderer = FormRenderer::new().unwrap();
    let mut method = AuthorizationMethod::new(MethodType::Digest);
    assert!(method.render(&renderer).unwrap().contains(r#"name="cnonce""#));

    method.handle_input("qop", "", ControlEvent::Change).unwrap();
    let markup = method.render(&renderer).unwrap();
    assert!(!markup.contains(r#"name="cnonce""#));
    assert!(!markup.contains(r#"name="nc""#));
}

#[test]
fn test_switching_type_starts_from_defaults() {
    let mut method =
        AuthorizationMethod::with_settings(MethodType::Bearer, &json!({ "token": "t" }));
    method.set_method_type(MethodType::Digest);
    assert_eq!(method.method_type(), MethodType::Digest);
    assert_eq!(method.as_digest().unwrap().algorithm, "MD5");
    assert!(method.as_bearer().is_none());
}

use time::Duration;

use crate::auth_api::AuthApiError;
use crate::auth_api::internal::data::{parse_identity, parse_token_grant};
use crate::data::Role;

#[test]
fn token_grant_parses_the_enveloped_fields() {
    let grant = parse_token_grant(
        r#"{
            "data": {
                "access_token": "header.payload.signature",
                "refresh_token": "opaque-refresh",
                "expires": 900000
            }
        }"#,
    )
    .unwrap();
    assert_eq!(grant.access_token, "header.payload.signature");
    assert_eq!(grant.refresh_token, "opaque-refresh");
    assert_eq!(grant.ttl, Duration::minutes(15));
}

#[test]
fn token_grant_without_envelope_is_malformed() {
    let result = parse_token_grant(
        r#"{ "access_token": "a", "refresh_token": "r", "expires": 1 }"#,
    );
    assert!(matches!(result, Err(AuthApiError::Malformed(_))));
}

#[test]
fn identity_parses_role_name_through_the_nested_relation() {
    let identity = parse_identity(
        r#"{
            "data": {
                "id": "f3b5570b-2b1e-4f5e-9f18-9a4de2f1c9d0",
                "email": "driver@example.org",
                "first_name": "Kim",
                "last_name": null,
                "status": "active",
                "role": {"name": "Driver"}
            }
        }"#,
    )
    .unwrap();
    assert_eq!(identity.role(), Some(Role::Driver));
    assert_eq!(identity.display_name(), "Kim");
}

#[test]
fn identity_with_no_role_relation_has_no_role() {
    let identity = parse_identity(
        r#"{
            "data": {
                "id": "f3b5570b-2b1e-4f5e-9f18-9a4de2f1c9d0"
            }
        }"#,
    )
    .unwrap();
    assert_eq!(identity.role_name, None);
    assert_eq!(identity.role(), None);
}

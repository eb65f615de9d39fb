//! Cipher and bearer-token services used the way a provider deployment does

use proptest::prelude::*;
use signet_services::{
    AesGcmCipher, AuthorizationGrant, BearerTokenService, CipherService, GrantStore,
};
use std::collections::HashMap;

/// Grant store that only knows tokens it was built with
struct Fixed(HashMap<String, AuthorizationGrant>);

impl GrantStore for Fixed {
    fn grant_by_access_token(&self, token: &str) -> Option<AuthorizationGrant> {
        self.0.get(token).cloned()
    }
}

#[test]
fn encrypted_connection_properties_decrypt_in_place() {
    let cipher: Box<dyn CipherService> = Box::new(AesGcmCipher::new([0x42; 32]));
    let stored = HashMap::from([
        (
            "bindPassword".to_string(),
            cipher.encrypt("s3cret").unwrap().unwrap(),
        ),
        ("bindDN".to_string(), "cn=directory manager".to_string()),
    ]);

    let plain = cipher.decrypt_properties(stored);
    assert_eq!(plain.len(), 2);
    assert_eq!(plain["bindPassword"], "s3cret");
    assert_eq!(plain["bindDN"], "cn=directory manager");
}

#[test]
fn grant_lookup_through_custom_store() {
    let grant = AuthorizationGrant {
        client_id: "rp".into(),
        client_dn: "inum=rp,ou=clients".into(),
        scopes: vec!["openid".into(), "profile".into()],
        expires_at: chrono::Utc::now() + chrono::Duration::minutes(10),
    };
    let service = BearerTokenService::new(Fixed(HashMap::from([(
        "token-123".to_string(),
        grant.clone(),
    )])));

    assert_eq!(service.authorization_grant(Some("Bearer token-123")), Some(grant));
    assert_eq!(service.client_dn(Some("Bearer token-124")), "");
}

proptest! {
    #[test]
    fn any_non_empty_text_survives_encryption(text in "\\PC{1,64}") {
        let cipher = AesGcmCipher::new([9; 32]);
        let sealed = cipher.encrypt(&text).unwrap().unwrap();
        prop_assert_eq!(cipher.decrypt(&sealed).unwrap(), Some(text));
    }

    #[test]
    fn only_bearer_prefix_yields_token(scheme in "[A-Za-z]{1,8}", token in "[A-Za-z0-9._-]{1,32}") {
        let service = BearerTokenService::new(Fixed(HashMap::new()));
        let header = format!("{scheme} {token}");
        let extracted = service.token_from_authorization(Some(&header));
        if scheme == "Bearer" {
            prop_assert_eq!(extracted, Some(token.as_str()));
        } else {
            prop_assert_eq!(extracted, None);
        }
    }
}

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use super::claims::{Claims, Principal};
use crate::config::JwtConfig;

/// Signing and verification keys for session tokens.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl TokenKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::days(cfg.ttl_days),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, principal: &Principal) -> anyhow::Result<String> {
        self.issue_at(principal, OffsetDateTime::now_utc())
    }

    pub fn issue_at(&self, principal: &Principal, now: OffsetDateTime) -> anyhow::Result<String> {
        let claims = Claims {
            user_id: principal.user_id,
            email: principal.email.clone(),
            iat: now.unix_timestamp(),
            exp: (now + self.ttl).unix_timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %principal.user_id, "session token issued");
        Ok(token)
    }

    /// `None` means unauthenticated: malformed, forged, foreign or expired.
    pub fn verify(&self, token: &str) -> Option<Principal> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => Some(data.claims.into()),
            Err(e) => {
                debug!(error = %e, "session token rejected");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn make_keys(secret: &str, issuer: &str, audience: &str) -> TokenKeys {
        TokenKeys::from_config(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_days: 7,
        })
    }

    fn principal() -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            email: "dev@email.com".into(),
        }
    }

    #[test]
    fn issue_and_verify_roundtrip() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let p = principal();
        let token = keys.issue(&p).expect("issue");
        assert_eq!(keys.verify(&token), Some(p));
    }

    #[test]
    fn token_expires_after_seven_days() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let p = principal();

        let almost = OffsetDateTime::now_utc() - Duration::days(7) + Duration::minutes(5);
        let token = keys.issue_at(&p, almost).expect("issue");
        assert_eq!(keys.verify(&token), Some(p.clone()));

        let stale = OffsetDateTime::now_utc() - Duration::days(7) - Duration::seconds(5);
        let token = keys.issue_at(&p, stale).expect("issue");
        assert_eq!(keys.verify(&token), None);
    }

    #[test]
    fn verify_rejects_foreign_secret() {
        let ours = make_keys("our-secret", "iss", "aud");
        let theirs = make_keys("their-secret", "iss", "aud");
        let token = theirs.issue(&principal()).expect("issue");
        assert!(ours.verify(&token).is_none());
    }

    #[test]
    fn verify_rejects_wrong_issuer_or_audience() {
        let good = make_keys("same-secret", "good-iss", "good-aud");
        let bad = make_keys("same-secret", "bad-iss", "bad-aud");
        let token = good.issue(&principal()).expect("issue");
        assert!(bad.verify(&token).is_none());
    }

    #[test]
    fn verify_rejects_tampered_and_malformed() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let token = keys.issue(&principal()).expect("issue");
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged_payload = {
            let other = keys
                .issue(&Principal {
                    user_id: Uuid::new_v4(),
                    email: "mallory@email.com".into(),
                })
                .expect("issue");
            other.split('.').nth(1).unwrap().to_string()
        };
        parts[1] = &forged_payload;
        assert!(keys.verify(&parts.join(".")).is_none());

        assert!(keys.verify("").is_none());
        assert!(keys.verify("not-a-token").is_none());
    }
}

//! Signed, expiring tokens for e-mailed accept/decline links
//!
//! Token layout: `hex(payload) "." hex(HMAC-SHA256(secret, payload))`
//! where payload is `userId:pitchId:action:issuedAtUnix`.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use std::str::FromStr;

type HmacSha256 = Hmac<Sha256>;

/// Tolerated clock skew for tokens issued "in the future"
const MAX_CLOCK_SKEW_SECS: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteAction {
    Accept,
    Decline,
}

impl InviteAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            InviteAction::Accept => "accept",
            InviteAction::Decline => "decline",
        }
    }
}

impl fmt::Display for InviteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InviteAction {
    type Err = ActionTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accept" => Ok(InviteAction::Accept),
            "decline" => Ok(InviteAction::Decline),
            _ => Err(ActionTokenError::Malformed),
        }
    }
}

/// Verified token contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionClaims {
    pub user_id: i64,
    pub pitch_id: i64,
    pub action: InviteAction,
    pub issued_at: i64,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ActionTokenError {
    #[error("malformed action token")]
    Malformed,
    #[error("action token signature mismatch")]
    BadSignature,
    #[error("action token expired")]
    Expired,
    #[error("action token issued in the future")]
    NotYetValid,
    #[error("invalid action token secret")]
    InvalidKey,
}

/// Issues and verifies invite tokens with a shared secret
#[derive(Clone)]
pub struct ActionTokenSigner {
    secret: Vec<u8>,
    ttl_secs: i64,
}

impl ActionTokenSigner {
    pub fn new(secret: impl AsRef<[u8]>, ttl_secs: i64) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            ttl_secs,
        }
    }

    fn mac(&self) -> Result<HmacSha256, ActionTokenError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|_| ActionTokenError::InvalidKey)
    }

    pub fn sign(
        &self,
        user_id: i64,
        pitch_id: i64,
        action: InviteAction,
        issued_at: i64,
    ) -> Result<String, ActionTokenError> {
        let payload = format!("{}:{}:{}:{}", user_id, pitch_id, action, issued_at);
        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let signature = mac.finalize().into_bytes();

        Ok(format!("{}.{}", hex::encode(payload), hex::encode(signature)))
    }

    /// Verify signature first, then contents, then age relative to `now`.
    pub fn verify(&self, token: &str, now: i64) -> Result<ActionClaims, ActionTokenError> {
        let (payload_hex, signature_hex) = token
            .trim()
            .split_once('.')
            .ok_or(ActionTokenError::Malformed)?;

        let payload = hex::decode(payload_hex).map_err(|_| ActionTokenError::Malformed)?;
        let signature = hex::decode(signature_hex).map_err(|_| ActionTokenError::Malformed)?;

        let mut mac = self.mac()?;
        mac.update(&payload);
        mac.verify_slice(&signature)
            .map_err(|_| ActionTokenError::BadSignature)?;

        let payload = String::from_utf8(payload).map_err(|_| ActionTokenError::Malformed)?;
        let claims = parse_payload(&payload)?;

        if claims.issued_at > now + MAX_CLOCK_SKEW_SECS {
            return Err(ActionTokenError::NotYetValid);
        }
        if now - claims.issued_at > self.ttl_secs {
            return Err(ActionTokenError::Expired);
        }

        Ok(claims)
    }
}

fn parse_payload(payload: &str) -> Result<ActionClaims, ActionTokenError> {
    let parts: Vec<&str> = payload.split(':').collect();
    let [user_id, pitch_id, action, issued_at] = parts.as_slice() else {
        return Err(ActionTokenError::Malformed);
    };

    Ok(ActionClaims {
        user_id: user_id.parse().map_err(|_| ActionTokenError::Malformed)?,
        pitch_id: pitch_id.parse().map_err(|_| ActionTokenError::Malformed)?,
        action: action.parse()?,
        issued_at: issued_at.parse().map_err(|_| ActionTokenError::Malformed)?,
    })
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Magic-link issue/verify (§4.4): a signed token carrying an email claim
//! and a 15-minute expiry, HMAC-pinned so a caller cannot request an
//! alternate algorithm at verify time.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use hatch_core::session_token::lifetimes::MAGIC_LINK_TOKEN_MS;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    email: String,
    exp: u64,
}

pub struct MagicLinkIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl MagicLinkIssuer {
    pub fn new(signing_secret: &[u8]) -> Self {
        Self { encoding_key: EncodingKey::from_secret(signing_secret), decoding_key: DecodingKey::from_secret(signing_secret) }
    }

    pub fn issue(&self, email: &str, now_epoch_ms: u64) -> Result<String, AuthError> {
        let claims = Claims { email: email.to_string(), exp: (now_epoch_ms + MAGIC_LINK_TOKEN_MS) / 1000 };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|_| AuthError::InvalidToken)
    }

    /// Verifies the token's signature and expiry, returning the claimed
    /// email. The algorithm is pinned to HS256 regardless of the token's own
    /// header, closing the classic "alg: none" downgrade.
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|_| AuthError::InvalidToken)?;
        Ok(data.claims.email)
    }
}

#[cfg(test)]
#[path = "magic_link_tests.rs"]
mod tests;

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Token lifetime. There is no revocation list; a token stays valid until it
/// expires, and logout only records a timestamp.
pub const TOKEN_TTL_DAYS: i64 = 7;

/// The claims carried by an issued token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
	/// The id of the user the token is bound to.
	pub sub: Uuid,
	pub iat: i64,
	pub exp: i64,
}

/// HS256 signing and verification keys, derived from `JWT_SECRET`.
#[derive(Clone)]
pub struct Keys {
	encoding: EncodingKey,
	decoding: DecodingKey,
}

impl Keys {
	pub fn from_secret(secret: &[u8]) -> Self {
		Self {
			encoding: EncodingKey::from_secret(secret),
			decoding: DecodingKey::from_secret(secret),
		}
	}

	/// Issues a bearer token bound to `user_id`.
	pub fn issue(&self, user_id: Uuid) -> Result<String, jsonwebtoken::errors::Error> {
		let now = Utc::now();
		let claims = Claims {
			sub: user_id,
			iat: now.timestamp(),
			exp: (now + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
		};

		jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
	}

	/// Verifies a bearer token, returning its claims.
	pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
		jsonwebtoken::decode(token, &self.decoding, &Validation::default()).map(|data| data.claims)
	}
}

#[cfg(test)]
mod test {
	use uuid::Uuid;

	use super::Keys;

	#[test]
	fn test_issue_verify_round_trip() {
		let keys = Keys::from_secret(b"test-secret");
		let user_id = Uuid::new_v4();

		let token = keys.issue(user_id).unwrap();
		let claims = keys.verify(&token).unwrap();

		assert_eq!(claims.sub, user_id);
		assert!(claims.exp > claims.iat);
	}

	#[test]
	fn test_verify_rejects_foreign_signature() {
		let token = Keys::from_secret(b"one").issue(Uuid::new_v4()).unwrap();

		assert!(Keys::from_secret(b"two").verify(&token).is_err());
	}

	#[test]
	fn test_verify_rejects_garbage() {
		assert!(Keys::from_secret(b"one").verify("not.a.token").is_err());
	}
}

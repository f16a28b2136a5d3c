use tubely_api::auth::JwtKeys;
use uuid::Uuid;

use super::TEST_JWT_SECRET;

/// Test user: a fresh owner id and a bearer token for it.
pub struct TestUser {
    pub user_id: Uuid,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

pub fn create_test_user() -> TestUser {
    let user_id = Uuid::new_v4();
    TestUser {
        user_id,
        token: token_for(user_id, chrono::Duration::hours(1)),
    }
}

pub fn token_for(user_id: Uuid, expires_in: chrono::Duration) -> String {
    JwtKeys::new(TEST_JWT_SECRET)
        .issue(user_id, expires_in)
        .expect("Failed to issue test token")
}

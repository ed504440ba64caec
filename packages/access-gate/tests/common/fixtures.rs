//! Fixtures for access gate tests

use access_gate::{AccessGate, AuthResponse, MemoryStorage, Role, UserIdentity};

/// Session payload as the auth API would issue it
pub fn teacher_login() -> AuthResponse {
    AuthResponse {
        token: "session-token-1".to_string(),
        identity: UserIdentity {
            id: "teacher-17".to_string(),
            name: "Mariam Haddad".to_string(),
            role: Some(Role::Teacher),
            institution_code: Some("NORTHSIDE".to_string()),
        },
        role: Role::Teacher,
    }
}

pub fn sign_in_teacher(gate: &AccessGate<MemoryStorage>) {
    gate.sign_in(&teacher_login())
        .expect("Failed to save session");
}

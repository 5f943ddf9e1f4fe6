pub mod auth;

pub use auth::{
    AuthResponse, ChangePasswordRequest, LoginRequest, LogoutRequest, PasswordResetConfirm,
    PasswordResetRequest, RefreshRequest, RegisterRequest,
};

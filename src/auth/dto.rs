use serde::{Deserialize, Serialize};

/// Login form fields.
#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Registration form fields.
#[derive(Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
}

/// Context for `login.html`.
#[derive(Debug, Serialize, Default)]
pub struct LoginView<'a> {
    pub error: Option<&'a str>,
    pub notice: Option<&'a str>,
}

/// Context for `register.html`.
#[derive(Debug, Serialize, Default)]
pub struct RegisterView<'a> {
    pub error: Option<&'a str>,
    pub username: &'a str,
}

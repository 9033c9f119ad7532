use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// OCPI 2.2 起 token 需 base64 編碼；較早版本送原文
pub fn prefers_encoded(version: &str) -> bool {
    matches!(version, "2.2" | "2.2.1")
}

/// Literal `Authorization` header value for the token in the requested encoding.
pub fn authorization_header(token: &str, encode: bool) -> String {
    if encode {
        format!("Token {}", STANDARD.encode(token))
    } else {
        format!("Token {}", token)
    }
}

pub mod id_validator;
pub mod ip;
pub mod url_validator;

pub use id_validator::{IdPolicy, IdValidationError, is_valid_short_code};
pub use ip::extract_client_ip;
pub use url_validator::{UrlValidationError, is_redirectable, validate_url};

/// 生成随机短码（供客户端或测试使用）
pub fn generate_random_code(length: usize) -> String {
    use std::iter;

    let chars = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    iter::repeat_with(|| chars[rand::random_range(0..chars.len())] as char)
        .take(length)
        .collect()
}

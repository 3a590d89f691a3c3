//! 客户端 IP 提取
//!
//! 创建短链时记录的 creator_origin 来自这里。

use actix_web::HttpRequest;
use actix_web::http::header::HeaderMap;

/// creator_origin 列宽
const MAX_ORIGIN_LENGTH: usize = 64;

/// 从 HttpRequest 提取客户端 IP
///
/// 只有在 `trust_forwarded_for` 打开时才读取 X-Forwarded-For / X-Real-IP，
/// 否则使用连接的对端地址，避免被伪造。
pub fn extract_client_ip(req: &HttpRequest, trust_forwarded_for: bool) -> Option<String> {
    let ip = if trust_forwarded_for {
        extract_forwarded_ip_from_headers(req.headers())
            .or_else(|| req.peer_addr().map(|addr| addr.ip().to_string()))
    } else {
        req.peer_addr().map(|addr| addr.ip().to_string())
    };

    ip.filter(|s| !s.is_empty()).map(|mut s| {
        if s.len() > MAX_ORIGIN_LENGTH {
            let mut end = MAX_ORIGIN_LENGTH;
            while !s.is_char_boundary(end) {
                end -= 1;
            }
            s.truncate(end);
        }
        s
    })
}

/// 从 HeaderMap 提取转发的 IP
pub fn extract_forwarded_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    // 优先 X-Forwarded-For（取第一个，即原始客户端 IP）
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(|s| s.trim().to_string())
        })
}

use axum::body::Body;
use axum::http::{header, Request};
use axum::middleware::Next;
use axum::response::Response;

/// Middleware для логирования HTTP запросов: метод, путь, статус,
/// длительность и размер ответа (по Content-Length, если известен)
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    let size = response
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    let status = response.status();
    let elapsed_ms = start.elapsed().as_millis();

    if status.is_server_error() {
        tracing::error!("{} {} -> {} in {}ms", method, path, status.as_u16(), elapsed_ms);
    } else {
        tracing::info!(
            "{} {} -> {} in {}ms, {}",
            method,
            path,
            status.as_u16(),
            elapsed_ms,
            format_size(size)
        );
    }

    response
}

fn format_size(size: Option<usize>) -> String {
    match size {
        None => "streamed".to_string(),
        Some(bytes) if bytes < 1024 => format!("{} B", bytes),
        Some(bytes) => format!("{:.1} KB", bytes as f64 / 1024.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(None), "streamed");
        assert_eq!(format_size(Some(512)), "512 B");
        assert_eq!(format_size(Some(2048)), "2.0 KB");
    }
}

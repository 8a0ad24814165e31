//! HTTP span helpers.

use uuid::Uuid;

#[derive(Debug, Clone)]
pub(super) struct RequestSpanName {
    pub(super) otel_path: String,
    pub(super) otel_span_name: String,
}

pub(super) fn request_span_name(method: &str, path: &str) -> RequestSpanName {
    let otel_path = normalise_path_for_span_name(path);
    let otel_span_name = format!("{method} {otel_path}");

    RequestSpanName {
        otel_path,
        otel_span_name,
    }
}

/// Replace identifiers and calendar months so routes stay low-cardinality.
fn normalise_path_for_span_name(path: &str) -> String {
    if path == "/" {
        return "/".to_owned();
    }

    let mut normalised = String::from("/");

    for (index, segment) in path.trim_start_matches('/').split('/').enumerate() {
        if index > 0 {
            normalised.push('/');
        }

        if Uuid::parse_str(segment).is_ok() {
            normalised.push_str("{id}");
        } else if is_month(segment) {
            normalised.push_str("{month}");
        } else {
            normalised.push_str(segment);
        }
    }

    normalised
}

fn is_month(segment: &str) -> bool {
    let bytes = segment.as_bytes();

    bytes.len() == 7
        && bytes.get(4) == Some(&b'-')
        && bytes
            .iter()
            .enumerate()
            .all(|(index, byte)| index == 4 || byte.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_and_months_are_templated() {
        let id = Uuid::now_v7();

        assert_eq!(
            request_span_name("PUT", &format!("/appointments/{id}/cancel")).otel_span_name,
            "PUT /appointments/{id}/cancel"
        );
        assert_eq!(
            request_span_name("GET", "/appointments/calendar/2025-06").otel_path,
            "/appointments/calendar/{month}"
        );
    }

    #[test]
    fn static_paths_are_kept() {
        assert_eq!(request_span_name("GET", "/").otel_path, "/");
        assert_eq!(
            request_span_name("GET", "/appointments/my").otel_path,
            "/appointments/my"
        );
        assert_eq!(
            request_span_name("GET", "/appointments/2025-6").otel_path,
            "/appointments/2025-6"
        );
    }
}

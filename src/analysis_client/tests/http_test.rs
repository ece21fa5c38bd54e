#[cfg(test)]
mod http_test {
    use crate::analysis_client::impl_http::{AnalysisClientHttp, HttpAnalysisConfig};
    use crate::analysis_client::interface::{AnalysisClient, AnalysisError, AnalysisSource};
    use crate::library::logger::impl_console::LoggerConsole;
    use crate::streaming_channel::message::EncodedImage;
    use chrono::{Offset, Utc};
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::Arc;
    use std::thread::{self, JoinHandle};
    use std::time::Duration;

    /// Answers a single request with `status_line` and `body`, returning the
    /// raw request it received.
    fn serve_once(status_line: &'static str, body: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            request
        });

        (base, handle)
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut data = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            data.extend_from_slice(&buf[..n]);

            let Some(end) = data.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let headers = String::from_utf8_lossy(&data[..end]).to_ascii_lowercase();
            let length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .map(|value| value.trim().parse::<usize>().unwrap())
                .unwrap_or(0);
            if data.len() >= end + 4 + length {
                break;
            }
        }
        String::from_utf8_lossy(&data).into_owned()
    }

    fn client(base: &str) -> AnalysisClientHttp {
        AnalysisClientHttp::new(
            HttpAnalysisConfig {
                analyze_url: format!("{}/analyze", base),
                predict_url: format!("{}/predict", base),
                timeout: Duration::from_secs(5),
            },
            Arc::new(LoggerConsole::new(Utc.fix())),
        )
    }

    #[test]
    fn uploads_a_file_as_multipart_and_parses_the_result() {
        let body = serde_json::json!({
            "image": "data:image/jpeg;base64,AA==",
            "message": "Detected happy",
            "chart_data": { "happy": 4, "sad": 1 }
        })
        .to_string();
        let (base, server) = serve_once("200 OK", body);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face.jpg");
        std::fs::write(&path, b"jpegbytes").unwrap();

        let result = client(&base)
            .analyze(&AnalysisSource::File(path))
            .unwrap();

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /analyze"));
        assert!(request.contains("multipart/form-data; boundary="));
        assert!(request.contains("name=\"file\"; filename=\"face.jpg\""));
        assert!(request.contains("Content-Type: image/jpeg"));
        assert!(request.contains("jpegbytes"));
        assert_eq!(result.message, "Detected happy");
        assert_eq!(result.category_values.get("happy"), Some(&4.0));
    }

    #[test]
    fn sends_remote_images_as_a_url_field() {
        let body = serde_json::json!({ "image": "data:,", "message": "ok", "chart_data": {} })
            .to_string();
        let (base, server) = serve_once("200 OK", body);

        client(&base)
            .analyze(&AnalysisSource::Url("https://example.com/a.jpg".to_string()))
            .unwrap();

        let request = server.join().unwrap();
        assert!(request.contains("application/x-www-form-urlencoded"));
        assert!(request.contains("url=https%3A%2F%2Fexample.com%2Fa.jpg"));
    }

    #[test]
    fn service_errors_carry_the_server_message() {
        let body = serde_json::json!({ "error": "No face found" }).to_string();
        let (base, server) = serve_once("400 Bad Request", body);

        let result = client(&base).analyze(&AnalysisSource::Url("https://x/y.png".to_string()));

        server.join().unwrap();
        assert_eq!(
            result,
            Err(AnalysisError::Service {
                status: 400,
                message: "No face found".to_string()
            })
        );
    }

    #[test]
    fn missing_files_are_rejected_before_any_request() {
        let result = client("http://127.0.0.1:9")
            .analyze(&AnalysisSource::File("/definitely/not/here.jpg".into()));

        assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));
    }

    #[test]
    fn legacy_annotate_posts_the_data_uri_and_returns_the_image() {
        let body = serde_json::json!({ "image": "data:image/jpeg;base64,AQI=" }).to_string();
        let (base, server) = serve_once("200 OK", body);

        let annotated = client(&base)
            .annotate(&EncodedImage::jpeg(&[0xff, 0xd8]))
            .unwrap();

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /predict"));
        assert!(request.contains("\"image\":\"data:image/jpeg;base64,/9g=\""));
        assert_eq!(annotated.decode().unwrap(), vec![1, 2]);
    }

    #[test]
    fn parse_treats_http_prefixes_as_urls() {
        assert_eq!(
            AnalysisSource::parse("HTTPS://host/img.png"),
            AnalysisSource::Url("HTTPS://host/img.png".to_string())
        );
        assert_eq!(
            AnalysisSource::parse("./face.jpg"),
            AnalysisSource::File("./face.jpg".into())
        );
    }
}

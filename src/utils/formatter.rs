use crate::http::{Response, Status};
use colored::*;

pub enum ResponseFormat {
    /// 状态行 + body
    Compact,
    /// 状态行 + 耗时 + headers + body
    Verbose,
}

pub struct ResponseFormatter {
    format: ResponseFormat,
}

impl ResponseFormatter {
    pub fn new(format: ResponseFormat) -> Self {
        Self { format }
    }

    pub fn format(&self, response: &Response) -> String {
        let mut output = vec![self.status_line(response)];

        if let ResponseFormat::Verbose = self.format {
            output.push(format!("Time: {}ms", response.duration.as_millis()).cyan().to_string());
            if !response.headers.is_empty() {
                output.push(String::new());
                for (key, value) in response.headers.iter() {
                    let value = value.to_str().unwrap_or("<invalid utf-8>");
                    output.push(format!("{}: {}", key, value).blue().to_string());
                }
            }
        }

        if !response.body.is_empty() {
            output.push(String::new());
            output.push(pretty_body(&response.body));
        }

        output.join("\n")
    }

    fn status_line(&self, response: &Response) -> String {
        format!("HTTP {}", response.status)
            .color(status_color(&response.status))
            .bold()
            .to_string()
    }
}

/// 状态码按类别着色：2xx 绿色，3xx 青色，4xx 黄色，5xx 红色
pub fn status_color(status: &Status) -> Color {
    if status.is_success() {
        Color::Green
    } else if status.is_redirect() {
        Color::Cyan
    } else if status.is_client_error() {
        Color::Yellow
    } else if status.is_server_error() {
        Color::Red
    } else {
        Color::White
    }
}

/// JSON body 美化输出，不是 JSON 时原样返回
pub fn pretty_body(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| body.to_string())
}

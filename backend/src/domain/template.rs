//! Placeholder substitution for notification emails.
//!
//! Rendering walks the template once. Each `{TOKEN}` that names a known
//! placeholder is replaced by its value, anything else is copied as is, and
//! inserted values are never scanned again.

use crate::domain::models::session::{format_time, ScheduledSession};

pub const NOT_INFORMED: &str = "Não informado";
pub const TEACHER_TO_BE_DEFINED: &str = "A definir";

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateValues {
    pub title: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub subject: String,
    pub teacher: String,
    pub topics: String,
    pub materials: String,
}

impl TemplateValues {
    pub fn for_session(
        session: &ScheduledSession,
        subject_name: Option<&str>,
        teacher_name: Option<&str>,
    ) -> Self {
        let non_blank = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Self {
            title: session.title.clone(),
            date: session.date.format("%d/%m/%Y").to_string(),
            start_time: format_time(session.start_time),
            end_time: format_time(session.end_time),
            location: session.location.clone(),
            subject: non_blank(subject_name).unwrap_or_else(|| NOT_INFORMED.to_string()),
            teacher: non_blank(teacher_name).unwrap_or_else(|| TEACHER_TO_BE_DEFINED.to_string()),
            topics: if session.topics.is_empty() {
                NOT_INFORMED.to_string()
            } else {
                session.topics.join(", ")
            },
            materials: non_blank(session.materials_needed.as_deref())
                .unwrap_or_else(|| NOT_INFORMED.to_string()),
        }
    }

    fn lookup(&self, token: &str) -> Option<&str> {
        let value = match token {
            "TITULO_AULAO" => &self.title,
            "DATA" => &self.date,
            "HORARIO_INICIO" => &self.start_time,
            "HORARIO_FIM" => &self.end_time,
            "LOCAL" => &self.location,
            "MATERIA" => &self.subject,
            "MINISTRANTE" => &self.teacher,
            "TOPICOS" => &self.topics,
            "MATERIAIS" => &self.materials,
            _ => return None,
        };
        Some(value.as_str())
    }
}

pub fn render(template: &str, values: &TemplateValues) -> String {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let candidate = &rest[open + 1..];

        match candidate.find(|c: char| c == '}' || c == '{') {
            Some(close) if candidate.as_bytes()[close] == b'}' => {
                let token = &candidate[..close];
                match values.lookup(token) {
                    Some(value) => output.push_str(value),
                    None => {
                        output.push('{');
                        output.push_str(token);
                        output.push('}');
                    }
                }
                rest = &candidate[close + 1..];
            }
            // Lone or nested brace: keep it and continue after it
            _ => {
                output.push('{');
                rest = candidate;
            }
        }
    }

    output.push_str(rest);
    output
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn to_html_lines(text: &str) -> String {
    escape_html(text).replace("\r\n", "\n").replace('\n', "<br>")
}

/// Wraps a rendered plain-text body and signature in the mail layout
pub fn html_document(body: &str, signature: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <div style="text-align: center; margin-bottom: 30px;">
    <h1 style="color: #2563eb; margin-bottom: 10px;">Aulão Solidário</h1>
  </div>
  <div style="background-color: #f8fafc; padding: 20px; border-radius: 8px; margin-bottom: 20px;">
    {}
  </div>
  <div style="border-top: 1px solid #e2e8f0; padding-top: 20px; margin-top: 30px; font-size: 14px; color: #64748b;">
    {}
  </div>
</div>"#,
        to_html_lines(body),
        to_html_lines(signature)
    )
}

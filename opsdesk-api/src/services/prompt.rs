use serde::Deserialize;

use opsdesk_shared::clients::gemini::Content;

use crate::models::{Process, ProcessStep, SubStepForm};

/// Only this many of the most recent prior turns are re-submitted.
const HISTORY_WINDOW: usize = 20;

/// One prior turn as re-submitted by the client each call.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatTurn {
    pub text: String,
    pub sender: String,
}

/// Reference data read from the database and folded into the prompt.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    pub processes: Vec<Process>,
    pub steps: Vec<ProcessStep>,
    pub forms: Vec<SubStepForm>,
}

/// Render the catalog the way the prompt expects: one line per process
/// with its ordered step names, then one line per known form.
pub fn format_catalog(catalog: &Catalog) -> String {
    let mut out = String::from("Danh sách quy trình trong hệ thống:\n");
    if catalog.processes.is_empty() {
        out.push_str("(chưa có quy trình nào)\n");
    }
    for p in &catalog.processes {
        let steps = catalog
            .steps
            .iter()
            .filter(|s| s.process_id == p.id)
            .map(|s| s.step_name.as_str())
            .collect::<Vec<_>>()
            .join(" → ");
        let description = p.description.as_deref().unwrap_or("-");
        out.push_str(&format!(
            "- {} | {} (v{}) | {}\n  Các bước: {}\n",
            p.code, p.name, p.version, description, steps
        ));
    }

    out.push_str("\nBiểu mẫu:\n");
    if catalog.forms.is_empty() {
        out.push_str("(chưa có biểu mẫu nào)\n");
    }
    for f in &catalog.forms {
        let link = f.url_file.as_deref().unwrap_or("Chưa có file");
        out.push_str(&format!("- {}: {}\n", f.form_name, link));
    }
    out
}

/// Assemble the full request contents: document block first, then the
/// bounded history window (role-tagged), then the latest user message.
pub fn build_contents(
    docs: &str,
    catalog_text: &str,
    history: &[ChatTurn],
    message: &str,
) -> Vec<Content> {
    let mut contents = Vec::with_capacity(history.len().min(HISTORY_WINDOW) + 2);

    contents.push(Content::user(format!(
        "TÀI LIỆU NỘI BỘ (dùng làm nguồn duy nhất):\n{docs}\n\n{catalog_text}"
    )));

    let start = history.len().saturating_sub(HISTORY_WINDOW);
    for turn in &history[start..] {
        if turn.sender == "user" {
            contents.push(Content::user(turn.text.clone()));
        } else {
            contents.push(Content::model(turn.text.clone()));
        }
    }

    contents.push(Content::user(message.to_string()));
    contents
}

/// Rewrite informal `(Link:URL )` markers from the internal documents
/// into markdown links so the client renders them as hyperlinks.
pub fn rewrite_links(text: &str) -> String {
    const MARKER: &str = "Link:";

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find(MARKER) {
        let url_start = pos + MARKER.len();
        let tail = &rest[url_start..];
        let url_len = tail
            .find(|c: char| c.is_whitespace() || c == ')')
            .unwrap_or(tail.len());
        let url = &tail[..url_len];

        if url.is_empty() {
            out.push_str(&rest[..url_start]);
            rest = tail;
            continue;
        }

        // `(Link:URL )` collapses to a bare markdown link; a marker
        // outside parentheses is rewritten in place.
        let after_url = &tail[url_len..];
        let ws_len = after_url.len() - after_url.trim_start().len();
        let wrapped = rest[..pos].ends_with('(') && after_url.trim_start().starts_with(')');

        if wrapped {
            out.push_str(&rest[..pos - 1]);
            out.push_str(&format!("[Tải về]({url})"));
            rest = &after_url[ws_len + 1..];
        } else {
            out.push_str(&rest[..pos]);
            out.push_str(&format!("[Tải về]({url})"));
            rest = after_url;
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn turn(sender: &str, text: &str) -> ChatTurn {
        ChatTurn {
            text: text.to_string(),
            sender: sender.to_string(),
        }
    }

    #[test]
    fn document_block_comes_first_and_message_last() {
        let contents = build_contents("TLTS docs", "catalog", &[], "Bước 1 là gì?");
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0].role, "user");
        assert!(contents[0].parts[0].text.contains("TÀI LIỆU NỘI BỘ"));
        assert!(contents[0].parts[0].text.contains("TLTS docs"));
        assert!(contents[0].parts[0].text.contains("catalog"));
        assert_eq!(contents.last().unwrap().parts[0].text, "Bước 1 là gì?");
    }

    #[test]
    fn history_is_role_tagged_and_bounded() {
        let mut history = Vec::new();
        for i in 0..30 {
            history.push(turn("user", &format!("q{i}")));
            history.push(turn("ai", &format!("a{i}")));
        }

        let contents = build_contents("docs", "catalog", &history, "latest");
        // docs + 20 most recent turns + latest message
        assert_eq!(contents.len(), 22);
        assert_eq!(contents[1].parts[0].text, "q20");
        assert_eq!(contents[1].role, "user");
        assert_eq!(contents[2].parts[0].text, "a20");
        assert_eq!(contents[2].role, "model");
    }

    #[test]
    fn parenthesized_link_marker_becomes_markdown() {
        let reply = "Biểu mẫu: Giấy đề nghị (Link:https://files.example.edu.vn/form.docx )";
        assert_eq!(
            rewrite_links(reply),
            "Biểu mẫu: Giấy đề nghị [Tải về](https://files.example.edu.vn/form.docx)"
        );
    }

    #[test]
    fn bare_link_marker_is_rewritten_in_place() {
        let reply = "Tải tại Link:https://files.example.edu.vn/form.docx nhé";
        assert_eq!(
            rewrite_links(reply),
            "Tải tại [Tải về](https://files.example.edu.vn/form.docx) nhé"
        );
    }

    #[test]
    fn text_without_markers_is_unchanged() {
        let reply = "Chưa có thông tin trong tài liệu nội bộ đã cung cấp.";
        assert_eq!(rewrite_links(reply), reply);
    }

    #[test]
    fn catalog_lists_processes_with_steps_and_forms() {
        let pid = Uuid::new_v4();
        let catalog = Catalog {
            processes: vec![Process {
                id: pid,
                code: "QT_TLTS".into(),
                name: "Thanh lý tài sản".into(),
                description: None,
                version: "1.0".into(),
                is_active: true,
                created_at: Utc::now(),
            }],
            steps: vec![
                ProcessStep {
                    id: Uuid::new_v4(),
                    process_id: pid,
                    step_no: 1,
                    step_name: "Lập giấy đề nghị".into(),
                    note: None,
                    created_at: Utc::now(),
                },
                ProcessStep {
                    id: Uuid::new_v4(),
                    process_id: pid,
                    step_no: 2,
                    step_name: "Tổng hợp danh sách".into(),
                    note: None,
                    created_at: Utc::now(),
                },
            ],
            forms: vec![SubStepForm {
                id: Uuid::new_v4(),
                sub_step_id: Uuid::new_v4(),
                form_code: None,
                form_name: "Giấy đề nghị".into(),
                url_file: Some("https://files.example.edu.vn/form.docx".into()),
                note: None,
                created_at: Utc::now(),
            }],
        };

        let text = format_catalog(&catalog);
        assert!(text.contains("QT_TLTS"));
        assert!(text.contains("Lập giấy đề nghị → Tổng hợp danh sách"));
        assert!(text.contains("Giấy đề nghị: https://files.example.edu.vn/form.docx"));
    }
}

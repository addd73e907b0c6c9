use uuid::Uuid;

/// Logical attachment kind derived from the MIME prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Image,
    Video,
    File,
}

impl AttachmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttachmentKind::Image => "image",
            AttachmentKind::Video => "video",
            AttachmentKind::File => "file",
        }
    }
}

/// Unknown or empty MIME types fall back to the generic `file` kind.
pub fn classify(mime: &str) -> AttachmentKind {
    if mime.starts_with("image/") {
        AttachmentKind::Image
    } else if mime.starts_with("video/") {
        AttachmentKind::Video
    } else {
        AttachmentKind::File
    }
}

/// Reduce an original filename to a URL/filesystem-safe string.
pub fn sanitize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_escape = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
            out.push(c);
            last_was_escape = false;
        } else if !last_was_escape {
            out.push('_');
            last_was_escape = true;
        }
    }
    if out.is_empty() {
        "file".to_string()
    } else {
        out
    }
}

/// Collision-resistant object key: `incidents/{id}/{millis}_{sanitized}`.
pub fn storage_key(incident_id: Uuid, millis: i64, original_name: &str) -> String {
    format!("incidents/{incident_id}/{millis}_{}", sanitize_name(original_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_mime_prefix() {
        assert_eq!(classify("image/png"), AttachmentKind::Image);
        assert_eq!(classify("image/jpeg"), AttachmentKind::Image);
        assert_eq!(classify("video/mp4"), AttachmentKind::Video);
        assert_eq!(classify("application/pdf"), AttachmentKind::File);
    }

    #[test]
    fn unknown_and_empty_mime_default_to_file() {
        assert_eq!(classify(""), AttachmentKind::File);
        assert_eq!(classify("imagepng"), AttachmentKind::File);
    }

    #[test]
    fn sanitize_collapses_unsafe_runs() {
        assert_eq!(sanitize_name("bien ban  kiem ke.docx"), "bien_ban_kiem_ke.docx");
        assert_eq!(sanitize_name("báo cáo.pdf"), "b_o_c_o.pdf");
        assert_eq!(sanitize_name("ok-file_1.png"), "ok-file_1.png");
    }

    #[test]
    fn sanitize_never_returns_empty() {
        assert_eq!(sanitize_name(""), "file");
        assert_eq!(sanitize_name("???"), "_");
    }

    #[test]
    fn storage_key_scopes_by_incident() {
        let id = Uuid::nil();
        let key = storage_key(id, 1700000000000, "leaking pipe.jpg");
        assert_eq!(
            key,
            "incidents/00000000-0000-0000-0000-000000000000/1700000000000_leaking_pipe.jpg"
        );
    }
}

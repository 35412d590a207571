use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

/// One toast for the UI shell.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub id: Uuid,
    pub kind: NoticeKind,
    pub title: &'static str,
    pub message: String,
}

/// Pending notices; drained into the IPC response that produced them.
#[derive(Debug, Default)]
pub struct Notices {
    queue: Vec<Notice>,
}

impl Notices {
    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(event = "notice_error", message = %message);
        self.queue.push(Notice {
            id: Uuid::new_v4(),
            kind: NoticeKind::Error,
            title: "Error",
            message,
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.queue.push(Notice {
            id: Uuid::new_v4(),
            kind: NoticeKind::Success,
            title: "Success",
            message: message.into(),
        });
    }

    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.queue)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.queue.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Notice> {
        self.queue.iter().filter(|n| n.kind == NoticeKind::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

use teloxide::types::Message;

pub trait MessageExt {
    /// Text or caption, trimmed. `None` for stickers, photos without a
    /// caption and whitespace-only messages.
    fn plain_text(&self) -> Option<&str>;
}

impl MessageExt for Message {
    fn plain_text(&self) -> Option<&str> {
        non_blank(self.text().or(self.caption()))
    }
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

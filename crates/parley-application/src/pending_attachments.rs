//! Staging list of attachments waiting for the next send.

use parley_core::attachment::Attachment;

#[derive(Debug, Clone, Default)]
pub struct PendingAttachments {
    items: Vec<Attachment>,
}

impl PendingAttachments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends accepted attachments after the ones already staged.
    pub fn stage(&mut self, attachments: impl IntoIterator<Item = Attachment>) {
        self.items.extend(attachments);
    }

    /// Removes the attachment at `index`, if any.
    pub fn remove(&mut self, index: usize) -> Option<Attachment> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Empties the list and returns what was staged.
    pub fn take(&mut self) -> Vec<Attachment> {
        std::mem::take(&mut self.items)
    }

    pub fn list(&self) -> &[Attachment] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment(name: &str) -> Attachment {
        Attachment::new("data:text/plain;base64,aGk=", "text/plain", name)
    }

    #[test]
    fn test_stage_keeps_order() {
        let mut pending = PendingAttachments::new();
        pending.stage(vec![attachment("a.txt")]);
        pending.stage(vec![attachment("b.txt"), attachment("c.txt")]);

        let names: Vec<&str> = pending.list().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
    }

    #[test]
    fn test_remove_by_index() {
        let mut pending = PendingAttachments::new();
        pending.stage(vec![attachment("a.txt"), attachment("b.txt")]);

        assert_eq!(pending.remove(0).map(|a| a.name), Some("a.txt".to_string()));
        assert!(pending.remove(5).is_none());
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn test_take_clears() {
        let mut pending = PendingAttachments::new();
        pending.stage(vec![attachment("a.txt")]);

        assert_eq!(pending.take().len(), 1);
        assert!(pending.is_empty());
    }
}

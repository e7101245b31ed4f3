/// Visual category of a dialog or notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    Info,
    Success,
    Warning,
    Error,
    Question,
}

/// Operator answer to a confirmation prompt. `Cancelled` is the explicit
/// secondary button — the three-way deactivate-or-delete prompt routes it
/// to the alternate action — while `Dismissed` is any other way out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Confirmed,
    Cancelled,
    Dismissed,
}

/// Seam between the orchestrator and whatever surface renders dialogs. The
/// terminal shell prompts over stdin; tests script the answers.
pub trait DialogService {
    fn confirm(&self, title: &str, message: &str, kind: DialogKind) -> Decision;
    fn notify(&self, title: &str, message: &str, kind: DialogKind);
}

impl<D: DialogService> DialogService for std::rc::Rc<D> {
    fn confirm(&self, title: &str, message: &str, kind: DialogKind) -> Decision {
        (**self).confirm(title, message, kind)
    }

    fn notify(&self, title: &str, message: &str, kind: DialogKind) {
        (**self).notify(title, message, kind)
    }
}

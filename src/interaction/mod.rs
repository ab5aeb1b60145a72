// Page-level interaction state: busy flag, notices, confirmation gate

pub mod busy;
pub mod confirmation;
pub mod notices;

pub use busy::{BusyFlag, BusyGuard};
pub use confirmation::{AutoApprove, Confirmation, ConfirmationPrompt, TerminalConfirmation};
pub use notices::{ConsoleNotifier, Notice, NoticeBoard, Notifier, Severity};

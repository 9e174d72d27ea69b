use std::io::{self, Write};

use crate::model::config::NotificationPermission;

/// Best-effort desktop notification sink. Never fails.
pub trait Notifier {
    fn notify(&mut self, title: &str, body: &str);
}

/// Emits OSC 9 desktop notifications (supported by iTerm2, kitty, WezTerm,
/// foot and others) when permission is granted.
pub struct TerminalNotifier<W: Write = io::Stdout> {
    permission: NotificationPermission,
    out: W,
}

impl TerminalNotifier<io::Stdout> {
    pub fn stdout(permission: NotificationPermission) -> Self {
        TerminalNotifier {
            permission,
            out: io::stdout(),
        }
    }
}

impl<W: Write> TerminalNotifier<W> {
    pub fn new(permission: NotificationPermission, out: W) -> Self {
        TerminalNotifier { permission, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Notifier for TerminalNotifier<W> {
    fn notify(&mut self, title: &str, body: &str) {
        if self.permission != NotificationPermission::Granted {
            return;
        }
        let payload = format!("{}: {}", strip_controls(title), strip_controls(body));
        let _ = write!(self.out, "\x1b]9;{}\x07", payload);
        let _ = self.out.flush();
    }
}

// BEL or ESC inside the payload would terminate the sequence early
fn strip_controls(s: &str) -> String {
    s.chars().filter(|c| !c.is_control()).collect()
}

/// Collects notifications in memory
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    pub sent: std::rc::Rc<std::cell::RefCell<Vec<(String, String)>>>,
}

#[cfg(test)]
impl Notifier for Recorder {
    fn notify(&mut self, title: &str, body: &str) {
        self.sent
            .borrow_mut()
            .push((title.to_string(), body.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn granted_writes_osc9() {
        let mut n = TerminalNotifier::new(NotificationPermission::Granted, Vec::new());
        n.notify("Task overdue", "\"Pay rent\" was due");
        let out = String::from_utf8(n.into_inner()).unwrap();
        assert_eq!(out, "\x1b]9;Task overdue: \"Pay rent\" was due\x07");
    }

    #[test]
    fn default_and_denied_are_silent() {
        for perm in [NotificationPermission::Default, NotificationPermission::Denied] {
            let mut n = TerminalNotifier::new(perm, Vec::new());
            n.notify("Task due soon", "x");
            assert!(n.into_inner().is_empty());
        }
    }

    #[test]
    fn control_chars_are_stripped() {
        let mut n = TerminalNotifier::new(NotificationPermission::Granted, Vec::new());
        n.notify("a\x07b", "c\x1bd");
        let out = String::from_utf8(n.into_inner()).unwrap();
        assert_eq!(out, "\x1b]9;ab: cd\x07");
    }

    struct Broken;
    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::other("closed"))
        }
    }

    #[test]
    fn write_errors_are_swallowed() {
        let mut n = TerminalNotifier::new(NotificationPermission::Granted, Broken);
        n.notify("t", "b");
    }

    #[test]
    fn recorder_collects() {
        let rec = Recorder::default();
        let mut n = rec.clone();
        n.notify("t", "b");
        assert_eq!(rec.sent.borrow().as_slice(), &[("t".to_string(), "b".to_string())]);
    }
}

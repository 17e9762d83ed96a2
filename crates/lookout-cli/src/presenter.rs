//! Presentation of status and result text.

/// Presentation surface for status and result text.
///
/// `show` replaces the displayed text unconditionally — no append, no
/// history.
pub trait Presenter: Send + Sync {
    fn show(&self, text: &str);
}

/// Prints status/result text to stdout.
pub struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn show(&self, text: &str) {
        println!("{text}");
    }
}

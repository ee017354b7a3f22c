/// Signal to an external display surface (home-screen widget, tray, ...) that
/// the pinned set or its readings changed.
///
/// Fire-and-forget: implementations must return promptly and swallow their
/// own failures.
pub trait WidgetNotifier: Send + Sync {
    fn notify_pinned_changed(&self);
}

impl<F> WidgetNotifier for F
where
    F: Fn() + Send + Sync,
{
    fn notify_pinned_changed(&self) {
        self()
    }
}

/// For sessions with no widget attached.
pub struct NoopWidgetNotifier;

impl WidgetNotifier for NoopWidgetNotifier {
    fn notify_pinned_changed(&self) {}
}

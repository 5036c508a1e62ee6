//! Hook event classification

/// What a hook invocation asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookEvent {
    Start,
    Shutdown,
    Other,
}

impl HookEvent {
    /// Classify libvirt hook arguments.
    ///
    /// Arguments are joined with spaces and searched for `start`, then
    /// `shutdown`. Matching is by substring and case-sensitive, so `restart`
    /// counts as a start and a start anywhere wins over a shutdown.
    pub fn classify(args: &[String]) -> Self {
        let joined = join_args(args);
        if joined.contains("start") {
            HookEvent::Start
        } else if joined.contains("shutdown") {
            HookEvent::Shutdown
        } else {
            HookEvent::Other
        }
    }
}

/// Join arguments the way `$*` does
pub fn join_args(args: &[String]) -> String {
    args.join(" ")
}

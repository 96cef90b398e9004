//! Key hints per screen, shown in the footer.

/// The screen or mode that decides which hints apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyContext {
    SignIn,
    Dashboard,
    Search,
    Form,
    Content,
    Help,
}

/// One-line hint text for a context. Keys are in brackets.
pub fn get_context_hints(context: KeyContext) -> &'static str {
    match context {
        KeyContext::SignIn => "[Tab] next field  [Enter] sign in  [Ctrl+C] quit",
        KeyContext::Dashboard => {
            "[Tab] table  [/] search  [1-9] sort  [n/p] page  [r] refresh  [a] add  [e] profile  [c] content  [S] sign out  [?] help"
        }
        KeyContext::Search => "[Enter] apply  [Esc] clear  type to filter",
        KeyContext::Form => "[Tab] next  [Shift+Tab] prev  [Ctrl+S] submit  [Esc] cancel",
        KeyContext::Content => "[Tab] category  [/] search  [1-9] sort  [o] open  [Esc] back",
        KeyContext::Help => "[Esc] close",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_context_has_bracketed_keys() {
        for context in [
            KeyContext::SignIn,
            KeyContext::Dashboard,
            KeyContext::Search,
            KeyContext::Form,
            KeyContext::Content,
            KeyContext::Help,
        ] {
            let hints = get_context_hints(context);
            assert!(hints.contains('[') && hints.contains(']'), "{:?}", context);
        }
    }
}

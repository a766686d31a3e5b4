//! Browser side of the reload channel.

/// Reserved path of the event-stream endpoint.
pub const RELOAD_PATH: &str = "/servbot-listener";

/// Script appended to every HTML response while reload is enabled.
///
/// Reloads on any message. After a connection error the next successful open
/// also reloads, so a restarted server refreshes the page.
pub const RELOAD_SCRIPT: &str = r#"
<script>
    (() => {
        const source = new EventSource('/servbot-listener');
        const reload = () => location.reload(true);
        source.onmessage = reload;
        source.onerror = () => source.onopen = reload;
        console.log('servbot is listening for changes...');
    })();
</script>
"#;

/// Snippet to inject, empty when reload is disabled.
pub fn injection(reload: bool) -> &'static str {
    if reload {
        RELOAD_SCRIPT
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_targets_reload_path() {
        assert!(RELOAD_SCRIPT.contains(&format!("new EventSource('{}')", RELOAD_PATH)));
    }

    #[test]
    fn disabled_injection_is_empty() {
        assert!(injection(false).is_empty());
        assert_eq!(injection(true), RELOAD_SCRIPT);
    }
}

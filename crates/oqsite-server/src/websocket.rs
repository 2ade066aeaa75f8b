//! WebSocket live reload.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Path of the live reload WebSocket endpoint.
pub const LIVE_RELOAD_PATH: &str = "/__livereload";

/// Path the client script is served from.
pub const LIVE_RELOAD_SCRIPT_PATH: &str = "/__livereload.js";

/// Messages sent to connected browsers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReloadMessage {
    /// Connection established
    Connected,

    /// Full page reload
    Reload,

    /// Only stylesheets changed; refresh them in place
    CssUpdate {
        /// Changed file, relative to the project root
        path: String,
    },

    /// The last rebuild failed; the previous output is still being served
    BuildFailed {
        message: String,
    },
}

/// Hub for broadcasting reload messages to all connected clients.
#[derive(Debug, Clone)]
pub struct ReloadHub {
    sender: broadcast::Sender<ReloadMessage>,
}

impl ReloadHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Send a message to all connected clients.
    pub fn send(&self, msg: ReloadMessage) {
        // No receivers is fine
        let _ = self.sender.send(msg);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadMessage> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Insert the live reload script tag before `</body>`, or append it.
pub fn inject_client_script(html: &str) -> String {
    let tag = format!(r#"<script src="{}"></script>"#, LIVE_RELOAD_SCRIPT_PATH);

    match html.rfind("</body>") {
        Some(pos) => {
            let mut out = String::with_capacity(html.len() + tag.len() + 1);
            out.push_str(&html[..pos]);
            out.push_str(&tag);
            out.push('\n');
            out.push_str(&html[pos..]);
            out
        }
        None => format!("{}\n{}", html, tag),
    }
}

/// Generate the client-side live reload script.
pub fn live_reload_client_script() -> String {
    format!(
        r#"
(function() {{
  'use strict';

  const protocol = location.protocol === 'https:' ? 'wss:' : 'ws:';
  const url = protocol + '//' + location.host + '{}';
  let reconnectAttempts = 0;
  const maxReconnectAttempts = 10;

  function showError(message) {{
    let overlay = document.getElementById('__oqsite_error');
    if (!overlay) {{
      overlay = document.createElement('pre');
      overlay.id = '__oqsite_error';
      overlay.style.cssText = 'position:fixed;inset:auto 1rem 1rem 1rem;z-index:99999;' +
        'padding:1rem;background:#2b0b0b;color:#ffb4b4;border-radius:8px;white-space:pre-wrap;';
      document.body.appendChild(overlay);
    }}
    overlay.textContent = message;
  }}

  function refreshStyles() {{
    document.querySelectorAll('link[rel="stylesheet"]').forEach(function(link) {{
      const href = link.getAttribute('href').split('?')[0];
      link.setAttribute('href', href + '?t=' + Date.now());
    }});
  }}

  function connect() {{
    const ws = new WebSocket(url);

    ws.onopen = function() {{
      reconnectAttempts = 0;
    }};

    ws.onmessage = function(event) {{
      const msg = JSON.parse(event.data);

      switch (msg.type) {{
        case 'reload':
          location.reload();
          break;

        case 'css_update':
          refreshStyles();
          break;

        case 'build_failed':
          showError(msg.message);
          break;

        case 'connected':
          console.log('[oqsite] Live reload connected');
          break;
      }}
    }};

    ws.onclose = function() {{
      if (reconnectAttempts < maxReconnectAttempts) {{
        reconnectAttempts++;
        setTimeout(connect, 1000 * reconnectAttempts);
      }}
    }};
  }}

  connect();
}})();
"#,
        LIVE_RELOAD_PATH
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn hub_broadcasts_messages() {
        let hub = ReloadHub::new();
        let mut rx = hub.subscribe();

        hub.send(ReloadMessage::Reload);

        assert_eq!(rx.try_recv().unwrap(), ReloadMessage::Reload);
        assert_eq!(hub.subscriber_count(), 1);
    }

    #[test]
    fn send_without_subscribers_is_ignored() {
        let hub = ReloadHub::new();
        hub.send(ReloadMessage::Connected);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn serializes_messages() {
        let msg = ReloadMessage::BuildFailed {
            message: "Failed to render index.html".to_string(),
        };

        let json = serde_json::to_string(&msg).unwrap();

        assert_eq!(
            json,
            r#"{"type":"build_failed","message":"Failed to render index.html"}"#
        );
        assert_eq!(
            serde_json::to_string(&ReloadMessage::CssUpdate { path: "a.css".into() }).unwrap(),
            r#"{"type":"css_update","path":"a.css"}"#
        );
    }

    #[test]
    fn injects_before_closing_body() {
        let html = inject_client_script("<html><body><p>Hi</p></body></html>");

        assert_eq!(
            html,
            "<html><body><p>Hi</p><script src=\"/__livereload.js\"></script>\n</body></html>"
        );
    }

    #[test]
    fn appends_to_fragments() {
        let html = inject_client_script("<p>fragment</p>");

        assert!(html.starts_with("<p>fragment</p>\n"));
        assert!(html.ends_with("</script>"));
    }

    #[test]
    fn client_script_targets_endpoint() {
        let js = live_reload_client_script();

        assert!(js.contains("location.host + '/__livereload'"));
        assert!(js.contains("case 'css_update'"));
    }
}

//! Public landing page.

use axum::response::Html;

/// GET /
pub async fn landing() -> Html<String> {
    Html(build_landing_html("wabridge"))
}

/// Build the self-contained landing page.
fn build_landing_html(title: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width,initial-scale=1">
<title>{title}</title>
<style>
*{{margin:0;padding:0;box-sizing:border-box}}
body{{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',sans-serif;background:#1e1e1e;color:#cccccc;min-height:100vh;display:flex;align-items:center;justify-content:center}}
.card{{background:#252526;border:1px solid #3c3c3c;border-radius:12px;padding:32px 40px;max-width:420px}}
.card h1{{font-size:18px;font-weight:600;color:#25d366;margin-bottom:8px}}
.card p{{font-size:14px;line-height:1.6;margin-bottom:16px}}
.card a{{color:#25d366;text-decoration:none}}
.card a:hover{{text-decoration:underline}}
.card ul{{list-style:none}}
.card li{{padding:6px 0;font-size:14px}}
.card code{{background:#313131;border-radius:4px;padding:2px 6px;font-size:13px}}
</style>
</head>
<body>
<div class="card">
  <h1>{title}</h1>
  <p>HTTP bridge for a browser-driven WhatsApp web session.</p>
  <ul>
    <li><a href="/qr">GET /qr</a> &mdash; pending pairing code</li>
    <li><a href="/status">GET /status</a> &mdash; connection status</li>
    <li><code>POST /send-message</code> &mdash; send a text message</li>
  </ul>
</div>
</body>
</html>"##
    )
}

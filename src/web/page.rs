//! Listing page markup.

use crate::db::QrCode;

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>QR Codes</title>
    <style>
        body { font-family: system-ui, sans-serif; max-width: 960px; margin: 0 auto; padding: 24px; }
        form.generate { display: flex; gap: 8px; margin-bottom: 24px; }
        form.generate input { flex: 1; padding: 8px; }
        .grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(200px, 1fr)); gap: 16px; }
        .card { border: 1px solid #ddd; border-radius: 8px; padding: 12px; }
        .card img { width: 100%; image-rendering: pixelated; }
        .content { word-break: break-all; font-size: 0.9em; }
        .label { font-weight: 600; }
        .meta { color: #777; font-size: 0.8em; }
        .empty { color: #777; }
    </style>
</head>
<body>
    <h1>QR Codes</h1>
    <form class="generate" method="post" action="/generate">
        <input type="text" name="content" placeholder="Text or URL to encode" required>
        <button type="submit">Generate</button>
    </form>
"#;

const SCRIPT: &str = r#"    <script>
        async function relabel(id, current) {
            const label = prompt("Label", current);
            if (label === null) return;
            const res = await fetch(`/qr/${id}`, {
                method: "PUT",
                headers: { "Content-Type": "application/json" },
                body: JSON.stringify({ label }),
            });
            if (res.ok) location.reload(); else alert(await res.text());
        }
        async function removeCode(id) {
            if (!confirm("Delete this QR code?")) return;
            const res = await fetch(`/qr/${id}`, { method: "DELETE" });
            if (res.ok) location.reload(); else alert(await res.text());
        }
    </script>
</body>
</html>
"#;

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn render_card(qr_code: &QrCode) -> String {
    let id = qr_code.id;
    let content = escape_html(&qr_code.content);
    let label = escape_html(&qr_code.label);
    // Label goes into a JS string inside an attribute: JSON-quote, then escape.
    let label_js = escape_html(
        &serde_json::to_string(&qr_code.label).unwrap_or_else(|_| "\"\"".to_string()),
    );

    format!(
        r#"        <div class="card" id="qr-{id}">
            <a href="/qr/{id}" target="_blank"><img src="/qr/{id}" alt="QR code {id}" loading="lazy"></a>
            <div class="label">{label}</div>
            <div class="content">{content}</div>
            <div class="meta">Created {created}</div>
            <button type="button" onclick="relabel({id}, {label_js})">Label</button>
            <button type="button" onclick="removeCode({id})">Delete</button>
        </div>
"#,
        created = qr_code.created_at.format("%Y-%m-%d %H:%M UTC"),
    )
}

/// Render the listing page. `total` is the number of stored codes, which may
/// exceed `qr_codes.len()`.
pub fn render_index(qr_codes: &[QrCode], total: i64) -> String {
    let mut html = String::from(HEAD);

    if qr_codes.is_empty() {
        html.push_str("    <p class=\"empty\">No QR codes yet.</p>\n");
    } else {
        html.push_str(&format!(
            "    <p class=\"meta\">Showing {} of {} codes</p>\n",
            qr_codes.len(),
            total
        ));
        html.push_str("    <div class=\"grid\">\n");
        for qr_code in qr_codes {
            html.push_str(&render_card(qr_code));
        }
        html.push_str("    </div>\n");
    }

    html.push_str(SCRIPT);
    html
}

//! HTML rendering for the login form and error pages.

use axum::http::StatusCode;
use shared_types::SiteConfig;

/// Everything the login form needs to render.
#[derive(Debug, Default)]
pub struct LoginView<'a> {
    pub prefill_email: &'a str,
    pub error: Option<&'a str>,
    pub site: SiteConfig,
}

pub fn login_page(view: &LoginView<'_>) -> String {
    let error = view
        .error
        .map(|msg| format!(r#"<p class="flash error" role="alert">{}</p>"#, escape(msg)))
        .unwrap_or_default();

    let body = format!(
        r#"<main>
  <h1>Sign in</h1>
  {error}
  <form method="post" action="/login">
    <label for="email">Email</label>
    <input id="email" name="email" type="email" autocomplete="username" required value="{email}">
    <label for="password">Password</label>
    <input id="password" name="password" type="password" autocomplete="current-password" required>
    <button type="submit">Sign in</button>
  </form>
</main>"#,
        error = error,
        email = escape(view.prefill_email),
    );

    layout("Sign in", &view.site, &body)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        r#"<main>
  <h1>{code}</h1>
  <p>{message}</p>
  <p><a href="/login">Back to sign in</a></p>
</main>"#,
        code = status.as_u16(),
        message = escape(message),
    );

    layout(
        status.canonical_reason().unwrap_or("Error"),
        &SiteConfig::default(),
        &body,
    )
}

fn layout(title: &str, site: &SiteConfig, body: &str) -> String {
    let dir = if site.rtl { "rtl" } else { "ltr" };
    format!(
        r#"<!doctype html>
<html lang="en" dir="{dir}">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
  :root {{ --accent: {accent}; }}
  body {{ font-family: system-ui, sans-serif; display: flex; justify-content: center; padding-top: 10vh; }}
  main {{ width: min(22rem, 90vw); }}
  label, input, button {{ display: block; width: 100%; box-sizing: border-box; margin-top: .5rem; }}
  input {{ padding: .5rem; }}
  input:focus {{ outline: 2px solid var(--accent); }}
  button {{ margin-top: 1rem; padding: .6rem; background: var(--accent); border: 0; font-weight: 600; }}
  .error {{ color: #b91c1c; }}
</style>
</head>
<body>
{body}
</body>
</html>
"#,
        dir = dir,
        title = escape(title),
        accent = escape(&site.theme.accent),
        body = body,
    )
}

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

//! HTML bodies for outgoing mail.
//!
//! All user-provided text is escaped before interpolation.

/// Escape text for use in HTML element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap a plain message in a paragraph.
pub fn paragraph(message: &str) -> String {
    format!("<p>{}</p>", escape(message))
}

/// Greeting line of the confirmation email.
pub fn greeting(name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => format!("Welcome, {name}!"),
        _ => "Welcome!".to_string(),
    }
}

/// Body of the double opt-in confirmation email.
pub fn confirmation_email(name: Option<&str>, confirm_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; margin: 0; padding: 0; background-color: #f4f4f5;">
  <div style="text-align: center; padding: 40px 20px;">
    <h1 style="color: #18181b; margin-bottom: 16px;">{greeting}</h1>
    <p style="color: #52525b; font-size: 16px; margin-bottom: 32px;">Please confirm your subscription to our newsletter.</p>
    <a href="{url}" style="background-color: #18181b; color: #ffffff; padding: 12px 32px; border-radius: 6px; text-decoration: none; font-weight: bold; display: inline-block;">Confirm Subscription</a>
    <p style="color: #a1a1aa; font-size: 12px; margin-top: 32px;">If you didn't request this, you can safely ignore this email.</p>
  </div>
</body>
</html>"#,
        greeting = escape(&greeting(name)),
        url = escape(confirm_url),
    )
}

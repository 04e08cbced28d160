use super::constant::VERIFICATION_TOKEN_TTL;

/// Generates the HTML body of the verification email.
///
/// # Arguments
///
/// * `link` - Full verification URL, including the raw token
pub fn verification_email_html(link: &str) -> String {
    let hours = VERIFICATION_TOKEN_TTL.as_secs() / 3600;

    format!(
        r#"<p>Verify your email address to complete the signup and login into your account.</p><p>This link <b>expires in {hours} hours</b>.</p><p>Press <a href="{link}">here</a> to proceed.</p>"#
    )
}

/// Landing page shown after following a verification link.
///
/// `error` carries the failure message from the redirect; `None` renders the
/// success page.
pub fn verified_page_html(error: Option<&str>) -> String {
    let current_year = time::OffsetDateTime::now_utc().year();
    let (title, colour, text) = match error {
        None => (
            "Email Verified",
            "#1877f2",
            "Your email has been verified. You can now sign in to your account.".to_string(),
        ),
        Some(message) => ("Verification Failed", "#d93025", escape(message)),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
  body {{ margin: 0; background: #f4f5f7; font-family: system-ui, sans-serif; }}
  main {{ max-width: 520px; margin: 64px auto; padding: 32px; background: #fff; border-radius: 10px; text-align: center; }}
  h1 {{ margin-top: 0; color: {colour}; }}
  p {{ color: #555; line-height: 1.5; }}
  footer {{ margin-top: 32px; font-size: 12px; color: #999; }}
</style>
</head>
<body>
<main>
  <h1>{title}</h1>
  <p>{text}</p>
  <footer>&copy; {current_year} Handyhub</footer>
</main>
</body>
</html>"#
    )
}

/// Escapes text for HTML element content.
fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

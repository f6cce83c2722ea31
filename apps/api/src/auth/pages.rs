//! Bare HTML for the session pages. Forms post back to the same path.

use crate::auth::session::Flash;
use crate::models::user::UserAccount;

/// Escapes text for HTML element and attribute content.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}

fn layout(title: &str, flashes: &[Flash], body: &str) -> String {
    let flash_html: String = flashes
        .iter()
        .map(|f| {
            format!(
                "<p class=\"flash flash-{}\">{}</p>\n",
                f.level.as_str(),
                escape_html(&f.message)
            )
        })
        .collect();

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} - Resume Builder</title>\n</head>\n<body>\n\
         <h1>{title}</h1>\n{flash_html}{body}\n</body>\n</html>\n",
        title = escape_html(title),
    )
}

pub fn login_page(flashes: &[Flash], next: Option<&str>) -> String {
    let next_field = next
        .map(|n| format!("<input type=\"hidden\" name=\"next\" value=\"{}\">\n", escape_html(n)))
        .unwrap_or_default();
    let body = format!(
        "<form method=\"post\" action=\"/login\">\n{next_field}\
         <label>Username <input name=\"username\" required></label>\n\
         <label>Password <input name=\"password\" type=\"password\" required></label>\n\
         <button type=\"submit\">Log in</button>\n</form>\n\
         <p>No account? <a href=\"/register\">Register</a></p>"
    );
    layout("Login", flashes, &body)
}

pub fn register_page(flashes: &[Flash]) -> String {
    let body = "<form method=\"post\" action=\"/register\">\n\
         <label>Full name <input name=\"full_name\" required></label>\n\
         <label>Username <input name=\"username\" required></label>\n\
         <label>Email <input name=\"email\" type=\"email\" required></label>\n\
         <label>Password <input name=\"password\" type=\"password\" required></label>\n\
         <label>Confirm password <input name=\"confirm_password\" type=\"password\" required></label>\n\
         <button type=\"submit\">Register</button>\n</form>\n\
         <p>Already registered? <a href=\"/login\">Log in</a></p>";
    layout("Register", flashes, body)
}

pub fn index_page(user: &UserAccount, flashes: &[Flash]) -> String {
    let body = format!(
        "<p>Signed in as <strong>{}</strong> ({})</p>\n\
         <ul>\n\
         <li><code>POST /api/generate-resume</code></li>\n\
         <li><code>POST /api/generate-cover-letter</code></li>\n\
         <li><code>POST /api/download-pdf</code></li>\n\
         <li><code>POST /api/download-cover-letter</code></li>\n\
         </ul>\n<p><a href=\"/logout\">Log out</a></p>",
        escape_html(&user.full_name),
        escape_html(&user.username),
    );
    layout("Resume Builder", flashes, &body)
}

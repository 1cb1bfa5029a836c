//! HTML rendering
//!
//! Pages are plain strings assembled with `format!`; every value that came
//! from the database or the request goes through [`escape`].

use axum::response::Html;
use quotebox_common::ranking::RankedQuote;
use quotebox_common::selection::ServedQuote;
use quotebox_common::{Field, Source, SourceKind, ValidationErrors};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; color: #222; }
nav a { margin-right: 1rem; }
blockquote { font-size: 1.4rem; margin: 1.5rem 0; }
.meta { color: #666; }
.error { color: #b00020; }
.votes form { display: inline; }
table { border-collapse: collapse; width: 100%; margin-bottom: 2rem; }
td, th { text-align: left; padding: .3rem .5rem; border-bottom: 1px solid #ddd; }
"#;

/// Escape text for HTML element and attribute content
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

/// What the navigation bar needs to know about the visitor
#[derive(Debug, Clone, Copy, Default)]
pub struct Chrome {
    pub can_add: bool,
    pub is_staff: bool,
}

/// Full page with navigation
pub fn page(title: &str, chrome: Chrome, body: &str) -> Html<String> {
    let add_link = if chrome.can_add {
        r#"<a href="/add/">Add a quote</a>"#
    } else {
        ""
    };
    let staff_link = if chrome.is_staff {
        r#"<form method="post" action="/admin/logout/" style="display:inline"><button type="submit">Log out</button></form>"#
    } else {
        ""
    };

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} · Quotebox</title>
<style>{STYLE}</style>
</head>
<body>
<nav>
<a href="/">Random</a>
<a href="/top/">Top 10</a>
<a href="/dashboard/">Dashboard</a>
{add_link}
{staff_link}
</nav>
<main>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
    ))
}

/// Placeholder shown when there is nothing to draw from
pub fn empty_catalog(can_add: bool) -> String {
    if can_add {
        r#"<div class="empty">No quotes yet. <a href="/add/">Add the first one!</a></div>"#.to_string()
    } else {
        r#"<div class="empty">No quotes yet.</div>"#.to_string()
    }
}

/// A served quote with its vote buttons and share link
pub fn quote_card(served: &ServedQuote, share_url: &str) -> String {
    let quote = &served.quote.quote;
    let source = &served.quote.source;
    format!(
        r#"<article class="quote" data-id="{id}">
<blockquote>{text}</blockquote>
<p class="meta">{title} ({kind}) · weight {weight} · {views} views</p>
<div class="votes">
<form method="post" action="/vote/"><input type="hidden" name="quote_id" value="{id}"><input type="hidden" name="action" value="like"><button type="submit">👍 {likes}</button></form>
<form method="post" action="/vote/"><input type="hidden" name="quote_id" value="{id}"><input type="hidden" name="action" value="dislike"><button type="submit">👎 {dislikes}</button></form>
</div>
<p><a href="/?exclude={id}">Another quote</a> · <a href="{share}">Permalink</a></p>
</article>"#,
        id = quote.id,
        text = escape(&quote.text),
        title = escape(&source.title),
        kind = source.kind.label(),
        weight = quote.weight,
        views = quote.views,
        likes = served.likes,
        dislikes = served.dislikes,
        share = escape(share_url),
    )
}

/// One leaderboard as a table
pub fn ranked_table(heading: &str, rows: &[RankedQuote]) -> String {
    if rows.is_empty() {
        return format!("<h2>{}</h2>\n<p>Nothing here yet.</p>", escape(heading));
    }

    let body: String = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let quote = &row.quote.quote;
            format!(
                r#"<tr><td>{rank}</td><td><a href="/q/{id}/">{text}</a></td><td>{title}</td><td>{views}</td><td>{likes}</td><td>{dislikes}</td></tr>"#,
                rank = i + 1,
                id = quote.id,
                text = escape(&quote.text),
                title = escape(&row.quote.source.title),
                views = quote.views,
                likes = row.likes,
                dislikes = row.dislikes,
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "<h2>{}</h2>\n<table>\n<tr><th>#</th><th>Quote</th><th>Source</th><th>Views</th><th>Likes</th><th>Dislikes</th></tr>\n{}\n</table>",
        escape(heading),
        body
    )
}

/// Kind filter links for the dashboard
pub fn kind_filter(selected: Option<SourceKind>) -> String {
    let mut links = vec![if selected.is_none() {
        "<strong>All</strong>".to_string()
    } else {
        r#"<a href="/dashboard/">All</a>"#.to_string()
    }];
    for kind in SourceKind::ALL {
        if selected == Some(kind) {
            links.push(format!("<strong>{}</strong>", kind.label()));
        } else {
            links.push(format!(
                r#"<a href="/dashboard/?kind={}">{}</a>"#,
                kind.as_str(),
                kind.label()
            ));
        }
    }
    format!("<p class=\"filter\">{}</p>", links.join(" · "))
}

/// Values echoed back into the add form
#[derive(Debug, Clone, Default)]
pub struct AddFormValues {
    pub text: String,
    pub source_id: String,
    pub new_source_title: String,
    pub new_source_kind: String,
    pub weight: String,
}

fn field_errors(errors: Option<&ValidationErrors>, field: Field) -> String {
    errors
        .map(|errors| {
            errors
                .for_field(field)
                .into_iter()
                .map(|e| format!(r#"<p class="error">{}</p>"#, escape(&e.to_string())))
                .collect::<String>()
        })
        .unwrap_or_default()
}

/// Submission form
pub fn add_form(
    sources: &[Source],
    values: &AddFormValues,
    errors: Option<&ValidationErrors>,
) -> String {
    let source_options: String = sources
        .iter()
        .map(|s| {
            let selected = if values.source_id == s.id.to_string() {
                " selected"
            } else {
                ""
            };
            format!(
                r#"<option value="{id}"{selected}>{title} ({kind})</option>"#,
                id = s.id,
                title = escape(&s.title),
                kind = s.kind.label(),
            )
        })
        .collect();

    let kind_options: String = SourceKind::ALL
        .iter()
        .map(|k| {
            let selected = if values.new_source_kind == k.as_str() {
                " selected"
            } else {
                ""
            };
            format!(r#"<option value="{}"{}>{}</option>"#, k.as_str(), selected, k.label())
        })
        .collect();

    format!(
        r#"<h1>Add a quote</h1>
<form method="post" action="/add/">
<p><label>Quote<br><textarea name="text" rows="4" cols="60">{text}</textarea></label></p>
{text_errors}
<p><label>Existing source<br><select name="source_id"><option value="">-- choose --</option>{source_options}</select></label></p>
<p><label>or new source title <input name="new_source_title" value="{new_title}"></label>
<label>kind <select name="new_source_kind"><option value="">--</option>{kind_options}</select></label></p>
{source_errors}
<p><label>Weight <input name="weight" value="{weight}" size="4"></label></p>
{weight_errors}
<p><button type="submit">Save</button></p>
</form>"#,
        text = escape(&values.text),
        text_errors = field_errors(errors, Field::Text),
        new_title = escape(&values.new_source_title),
        source_errors = field_errors(errors, Field::Source),
        weight = escape(&values.weight),
        weight_errors = field_errors(errors, Field::Weight),
    )
}

/// Staff login form
pub fn login_form(next: &str, error: Option<&str>) -> String {
    let error = error
        .map(|msg| format!(r#"<p class="error">{}</p>"#, escape(msg)))
        .unwrap_or_default();
    format!(
        r#"<h1>Staff login</h1>
{error}
<form method="post" action="/admin/login/">
<input type="hidden" name="next" value="{next}">
<p><label>Password <input type="password" name="password"></label></p>
<p><button type="submit">Log in</button></p>
</form>"#,
        next = escape(next),
    )
}

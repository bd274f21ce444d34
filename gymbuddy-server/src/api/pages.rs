//! Server-rendered page shells. Each page is a static template that loads
//! its data from the JSON API in the browser.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use super::ApiResult;
use crate::db::repositories::{ExerciseRepository, ThreadRepository};
use crate::state::AppState;

const BASE_HTML: &str = include_str!("../../web/base.html");
const INDEX_HTML: &str = include_str!("../../web/index.html");
const LOGIN_HTML: &str = include_str!("../../web/login.html");
const REGISTER_HTML: &str = include_str!("../../web/register.html");
const HOWTO_HTML: &str = include_str!("../../web/howto.html");
const HOWTO_DETAIL_HTML: &str = include_str!("../../web/howto_detail.html");
const PLANNER_HTML: &str = include_str!("../../web/planner.html");
const LOG_HTML: &str = include_str!("../../web/log.html");
const COMMUNITY_HTML: &str = include_str!("../../web/community.html");
const THREAD_HTML: &str = include_str!("../../web/thread.html");

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
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

/// Replace `{{name}}` placeholders in a single pass. Substituted text is
/// never scanned again; unknown placeholders are left as they are.
fn substitute<V: AsRef<str>>(template: &str, vars: &[(&str, V)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            rest = &rest[start..];
            break;
        };

        let name = &after[..end];
        match vars.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value.as_ref()),
            None => out.push_str(&rest[start..start + end + 4]),
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

/// Fill `{{name}}` placeholders with escaped values
fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let escaped: Vec<(&str, String)> = vars
        .iter()
        .map(|(name, value)| (*name, escape_html(value)))
        .collect();
    substitute(template, &escaped)
}

fn layout(title: &str, content: String) -> Html<String> {
    let title = escape_html(title);
    Html(substitute(
        BASE_HTML,
        &[("title", title.as_str()), ("content", content.as_str())],
    ))
}

fn not_found(what: &str) -> Response {
    let content = format!("<section class=\"card\"><h1>{} not found</h1></section>", escape_html(what));
    (StatusCode::NOT_FOUND, layout("Not found", content)).into_response()
}

pub fn login_page(error: Option<&str>, next: &str) -> Html<String> {
    layout(
        "Log in",
        render(LOGIN_HTML, &[("error", error.unwrap_or_default()), ("next", next)]),
    )
}

pub fn register_page(error: Option<&str>, username: &str) -> Html<String> {
    layout(
        "Register",
        render(REGISTER_HTML, &[("error", error.unwrap_or_default()), ("username", username)]),
    )
}

/// GET /
pub async fn index() -> Html<String> {
    layout("Home", INDEX_HTML.to_string())
}

/// GET /howto/
pub async fn howto() -> Html<String> {
    layout("Exercises", HOWTO_HTML.to_string())
}

/// GET /howto/detail/:id/
pub async fn howto_detail(
    State(state): State<AppState>,
    Path(exercise_id): Path<String>,
) -> ApiResult<Response> {
    let Ok(exercise_id) = exercise_id.parse::<i64>() else {
        return Ok(not_found("Exercise"));
    };

    let repo = ExerciseRepository::new(state.db.pool.clone());
    let Some(exercise) = repo.get_by_id(exercise_id)? else {
        return Ok(not_found("Exercise"));
    };

    let id = exercise.id.to_string();
    let content = render(
        HOWTO_DETAIL_HTML,
        &[
            ("exercise_id", &id),
            ("exercise_name", &exercise.exercise_name),
            ("main_muscle", &exercise.main_muscle),
            ("target_muscle", exercise.target_muscle.as_deref().unwrap_or("-")),
            ("synergist_muscle", exercise.synergist_muscle.as_deref().unwrap_or("-")),
            ("equipment", exercise.equipment.as_deref().unwrap_or("-")),
            ("instructions", exercise.instructions.as_deref().unwrap_or_default()),
        ],
    );
    Ok(layout(&exercise.exercise_name, content).into_response())
}

/// GET /planner/ (login required)
pub async fn planner() -> Html<String> {
    layout("Planner", PLANNER_HTML.to_string())
}

/// GET /log/ (login required)
pub async fn workout_log() -> Html<String> {
    layout("Workout log", LOG_HTML.to_string())
}

/// GET /community/
pub async fn community() -> Html<String> {
    layout("Community", COMMUNITY_HTML.to_string())
}

/// GET /community/thread/:id/
pub async fn thread(
    State(state): State<AppState>,
    Path(thread_id): Path<String>,
) -> ApiResult<Response> {
    let Ok(thread_id) = thread_id.parse::<i64>() else {
        return Ok(not_found("Thread"));
    };

    let repo = ThreadRepository::new(state.db.pool.clone());
    let Some(thread) = repo.get(thread_id)? else {
        return Ok(not_found("Thread"));
    };

    let id = thread.id.to_string();
    let created_at = thread.created_at.format("%Y-%m-%d %H:%M").to_string();
    let content = render(
        THREAD_HTML,
        &[
            ("thread_id", &id),
            ("title", &thread.title),
            ("author", &thread.author_username),
            ("created_at", &created_at),
            ("content", &thread.content),
        ],
    );
    Ok(layout(&thread.title, content).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#x27;y&#x27;&lt;/script&gt;"
        );
    }

    #[test]
    fn test_render_escapes_values() {
        let html = render("<p>{{name}}</p><p>{{name}}</p>", &[("name", "<b>")]);
        assert_eq!(html, "<p>&lt;b&gt;</p><p>&lt;b&gt;</p>");
    }

    #[test]
    fn test_substituted_values_are_not_expanded_again() {
        let html = render(
            "<p>{{error}}</p><input value=\"{{next}}\">",
            &[("error", "{{next}}"), ("next", "/planner/")],
        );
        assert_eq!(html, "<p>{{next}}</p><input value=\"/planner/\">");

        let page = layout("{{content}}", "<main>body</main>".to_string()).0;
        assert_eq!(page.matches("<main>body</main>").count(), 1);
        assert!(page.contains("{{content}}"));
    }

    #[test]
    fn test_unknown_and_unclosed_placeholders_kept() {
        assert_eq!(substitute("a {{missing}} b", &[("x", "y")]), "a {{missing}} b");
        assert_eq!(substitute("tail {{open", &[("open", "no")]), "tail {{open");
    }

    #[test]
    fn test_login_page_keeps_next() {
        let Html(page) = login_page(Some("Invalid username or password."), "/planner/");
        assert!(page.contains(r#"name="next" value="/planner/""#));
        assert!(page.contains("Invalid username or password."));
        assert!(!page.contains("{{"));
    }
}

use crate::days::REACTION_PALETTE;
use crate::models::{DayCardResponse, OverviewResponse};

pub struct Page<'a> {
    pub overview: &'a OverviewResponse,
    pub card: Option<&'a DayCardResponse>,
    pub show_history: bool,
    pub notice: Option<&'a str>,
}

pub fn render_index(page: &Page<'_>) -> String {
    let overview = page.overview;
    let uid = escape_html(&overview.uid);
    let body = if page.show_history {
        render_history(overview)
    } else {
        page.card
            .map(|card| render_card(&uid, card))
            .unwrap_or_default()
    };
    let notice = page
        .notice
        .map(|text| format!(r#"<p class="notice">{}</p>"#, escape_html(text)))
        .unwrap_or_default();

    INDEX_HTML
        .replace("{{UID}}", &uid)
        .replace("{{PROGRESS}}", &render_progress(overview))
        .replace("{{COMPLETED}}", &overview.completed_count.to_string())
        .replace("{{TOTAL}}", &overview.total_days.to_string())
        .replace("{{NOTICE}}", &notice)
        .replace("{{BODY}}", &body)
}

fn render_progress(overview: &OverviewResponse) -> String {
    let label = if overview.active_day == 0 {
        format!("Starting soon: {}", overview.start_date)
    } else {
        format!(
            "Unlocked: day {}/{} · {}%",
            overview.active_day, overview.total_days, overview.progress_percent
        )
    };
    format!(
        r#"<div class="progress"><span>{label}</span><div class="bar"><div style="width:{}%"></div></div></div>"#,
        overview.progress_percent
    )
}

fn render_card(uid: &str, card: &DayCardResponse) -> String {
    let heading = format!("Day {}: {}", card.day, escape_html(&card.title));
    let Some(task) = card.task.as_deref() else {
        return format!(
            r#"<section class="card locked"><h2>{heading}</h2><p>This card is still locked. One card unlocks per day.</p><span class="pill">🔒 Locked</span></section>"#
        );
    };

    let options: String = REACTION_PALETTE
        .iter()
        .map(|tag| {
            let selected = if *tag == card.reaction { " selected" } else { "" };
            format!(r#"<option value="{tag}"{selected}>{tag}</option>"#)
        })
        .collect();
    let done = if card.completed { "✅ Completed" } else { "⬜ To do" };
    let fav = if card.favorite { "❤️ Favorite" } else { "🤍 Favorite" };
    let day = card.day;

    format!(
        r#"<section class="card">
  <h2>{heading}</h2>
  <p>{task}</p>
  <div class="meta">
    <span class="pill">⏱️ {duration}</span>
    <span class="pill">Reaction: <b>{reaction}</b></span>
    <span class="pill">{done}</span>
    <span class="pill">{fav}</span>
  </div>
  <div class="actions">
    <form method="post" action="/days/{day}/complete"><input type="hidden" name="uid" value="{uid}"><button>Mark as done</button></form>
    <form method="post" action="/days/{day}/favorite"><input type="hidden" name="uid" value="{uid}"><button>❤️ / 🤍 Favorite</button></form>
    <form method="post" action="/days/{day}/reaction"><input type="hidden" name="uid" value="{uid}"><select name="tag">{options}</select><button>Save reaction</button></form>
    <a class="button" href="/?uid={uid}&amp;day={next}">Next day</a>
  </div>
</section>"#,
        task = escape_html(task),
        duration = escape_html(&card.duration),
        reaction = escape_html(&card.reaction),
        next = card.next_day,
    )
}

fn render_history(overview: &OverviewResponse) -> String {
    let uid = escape_html(&overview.uid);
    let cells: String = overview
        .days
        .iter()
        .map(|day| {
            let label = format!("{} Day {}", escape_html(&day.emoji), day.day);
            if day.unlocked {
                format!(r#"<a class="cell" href="/?uid={uid}&amp;day={}">{label}</a>"#, day.day)
            } else {
                format!(r#"<span class="cell disabled">{label}</span>"#)
            }
        })
        .collect();
    format!(r#"<section class="history"><h2>History</h2><div class="grid">{cells}</div></section>"#)
}

fn escape_html(text: &str) -> String {
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

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Daily Cards</title>
  <style>
    :root {
      --bg: #1b1016;
      --ink: #f6eef2;
      --muted: rgba(246, 238, 242, 0.6);
      --accent: #ff4d6d;
      --card: rgba(255, 255, 255, 0.06);
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, #3a1526, var(--bg) 70%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: start center;
      padding: 32px 18px;
    }

    .app { width: min(860px, 100%); display: grid; gap: 20px; }
    header { display: flex; justify-content: space-between; align-items: center; gap: 12px; }
    nav a, .button { color: var(--ink); margin-right: 12px; }
    .progress span { color: var(--muted); font-size: 14px; }
    .bar { height: 8px; border-radius: 8px; background: var(--card); margin-top: 8px; overflow: hidden; }
    .bar div { height: 100%; background: var(--accent); }
    .card, .history { background: var(--card); border-radius: 20px; padding: 24px; }
    .locked { opacity: 0.7; }
    .meta, .actions { display: flex; flex-wrap: wrap; gap: 10px; margin-top: 14px; }
    .pill { border: 1px solid var(--muted); border-radius: 999px; padding: 4px 10px; font-size: 13px; }
    .grid { display: grid; grid-template-columns: repeat(7, 1fr); gap: 8px; }
    .cell { padding: 10px; border-radius: 12px; background: var(--card); color: var(--ink); text-align: center; }
    .disabled { opacity: 0.4; }
    .notice { background: #5c1d2b; border-radius: 12px; padding: 12px; }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Daily Cards</h1>
      <span>Completed: <b>{{COMPLETED}}</b> / {{TOTAL}}</span>
    </header>
    {{PROGRESS}}
    <nav>
      <a href="/?uid={{UID}}">Today</a>
      <a href="/?uid={{UID}}&amp;view=history">History</a>
    </nav>
    {{NOTICE}}
    {{BODY}}
    <footer>
      <form method="post" action="/reset">
        <input type="hidden" name="uid" value="{{UID}}" />
        <button>Reset my progress</button>
      </form>
    </footer>
  </main>
</body>
</html>
"#;

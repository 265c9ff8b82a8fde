//! Server-side HTML for the page routes.
//!
//! Pages are plain HTML with a small inline script for live search; styling
//! is left to the stylesheet served alongside.

use std::fmt::Write;

use axum::http::StatusCode;
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

use crate::data::{Artist, ArtistCard, MAX_MEMBER_BUCKET, SearchResult};
use crate::web::filter_form::{FilterForm, YearBounds};

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title} | Groupie Tracker</title>\n</head>\n<body>\n\
         <header><a href=\"/\">Groupie Tracker</a>\n\
         <form action=\"/search\" method=\"get\"><input type=\"search\" name=\"q\" \
         placeholder=\"Search artists, members, locations\" list=\"suggestions\" \
         autocomplete=\"off\"><datalist id=\"suggestions\"></datalist></form></header>\n\
         <main>\n{body}\n</main>\n{SUGGEST_SCRIPT}\n</body>\n</html>\n",
        title = text(title),
    )
}

/// Populates the search datalist from the JSON variant of `/search`.
const SUGGEST_SCRIPT: &str = r#"<script>
const input = document.querySelector('input[name="q"]');
const list = document.getElementById('suggestions');
input.addEventListener('input', async () => {
  const response = await fetch('/search?q=' + encodeURIComponent(input.value), {
    headers: { 'X-Requested-With': 'XMLHttpRequest' },
  });
  if (!response.ok) return;
  list.replaceChildren(...(await response.json()).map((r) => {
    const option = document.createElement('option');
    option.value = r.text;
    option.label = r.type;
    return option;
  }));
});
</script>"#;

fn artist_grid(out: &mut String, cards: &[ArtistCard]) {
    if cards.is_empty() {
        out.push_str("<p class=\"empty\">No artists match.</p>\n");
        return;
    }
    out.push_str("<ul class=\"artists\">\n");
    for card in cards {
        let _ = writeln!(
            out,
            "<li><a href=\"/artist?id={id}\"><img src=\"{image}\" alt=\"{name}\" loading=\"lazy\">\
             <span>{name_text}</span></a></li>",
            id = card.id,
            image = attr(&card.image),
            name = attr(&card.name),
            name_text = text(&card.name),
        );
    }
    out.push_str("</ul>\n");
}

fn year_input(out: &mut String, name: &str, value: Option<i32>, min: i32, max: i32) {
    let value = value.map(|v| v.to_string()).unwrap_or_default();
    let _ = write!(
        out,
        "<input type=\"number\" name=\"{name}\" min=\"{min}\" max=\"{max}\" value=\"{value}\">"
    );
}

fn filter_controls(out: &mut String, form: &FilterForm, bounds: YearBounds, locations: &[String]) {
    out.push_str("<form class=\"filters\" action=\"/filter\" method=\"post\">\n");

    out.push_str("<fieldset><legend>Formed</legend>");
    year_input(out, "creation_start", form.creation_start, bounds.min_creation, bounds.max_year);
    year_input(out, "creation_end", form.creation_end, bounds.min_creation, bounds.max_year);
    out.push_str("</fieldset>\n");

    out.push_str("<fieldset><legend>First album</legend>");
    year_input(out, "album_start", form.album_start, bounds.min_album, bounds.max_year);
    year_input(out, "album_end", form.album_end, bounds.min_album, bounds.max_year);
    out.push_str("</fieldset>\n");

    out.push_str("<fieldset><legend>Members</legend>");
    for count in 1..=MAX_MEMBER_BUCKET {
        let checked = if form.members.contains(&count) { " checked" } else { "" };
        let label = if count == MAX_MEMBER_BUCKET {
            format!("{count}+")
        } else {
            count.to_string()
        };
        let _ = write!(
            out,
            "<label><input type=\"checkbox\" name=\"members_{count}\"{checked}>{label}</label>"
        );
    }
    out.push_str("</fieldset>\n");

    out.push_str("<fieldset><legend>Locations</legend><select name=\"location[]\" multiple>");
    for location in locations {
        let selected = if form.locations.iter().any(|l| l.eq_ignore_ascii_case(location)) {
            " selected"
        } else {
            ""
        };
        let _ = write!(
            out,
            "<option value=\"{value}\"{selected}>{label}</option>",
            value = attr(location),
            label = text(location),
        );
    }
    out.push_str("</select></fieldset>\n");

    out.push_str("<button type=\"submit\">Filter</button> <a href=\"/\">Reset</a>\n</form>\n");
}

/// Artist listing with filter controls, used by `/` and `/filter`.
pub fn listing_page(
    cards: &[ArtistCard],
    form: &FilterForm,
    bounds: YearBounds,
    locations: &[String],
) -> String {
    let mut body = String::new();
    filter_controls(&mut body, form, bounds, locations);
    let _ = writeln!(body, "<p class=\"count\">{} artists</p>", cards.len());
    artist_grid(&mut body, cards);
    layout("Artists", &body)
}

pub fn artist_page(artist: &Artist) -> String {
    let mut body = String::new();
    let _ = writeln!(
        body,
        "<article class=\"artist\" data-id=\"{id}\">\n<h1>{name}</h1>\n\
         <img src=\"{image}\" alt=\"{name_attr}\">\n\
         <dl><dt>Formed</dt><dd>{created}</dd><dt>First album</dt><dd>{album}</dd></dl>",
        id = artist.id,
        name = text(&artist.name),
        name_attr = attr(&artist.name),
        image = attr(&artist.image),
        created = artist.creation_date,
        album = text(&artist.first_album),
    );

    body.push_str("<h2>Members</h2>\n<ul class=\"members\">");
    for member in &artist.members {
        let _ = write!(body, "<li>{}</li>", text(member));
    }
    body.push_str("</ul>\n");

    body.push_str("<h2>Concerts</h2>\n<table class=\"concerts\">\n");
    for (location, dates) in &artist.relations {
        let _ = writeln!(
            body,
            "<tr><th>{}</th><td>{}</td></tr>",
            text(location),
            text(&dates.join(", "))
        );
    }
    body.push_str("</table>\n");

    if !artist.location_states.is_empty() {
        body.push_str("<h2>By state</h2>\n<ul class=\"states\">");
        for (state, cities) in &artist.location_states {
            let _ = write!(
                body,
                "<li><strong>{}</strong>: {}</li>",
                text(state),
                text(&cities.join("; "))
            );
        }
        body.push_str("</ul>\n");
    }

    // Markers are loaded client-side from /api/coordinates
    let _ = writeln!(
        body,
        "<div id=\"map\" data-coordinates=\"/api/coordinates?id={}\"></div>\n</article>",
        artist.id
    );
    layout(&artist.name, &body)
}

pub fn search_page(query: &str, results: &[SearchResult]) -> String {
    let mut body = String::new();
    let _ = writeln!(
        body,
        "<h1>Results for \u{201c}{}\u{201d}</h1>\n<p class=\"count\">{} matches</p>",
        text(query),
        results.len()
    );
    if !results.is_empty() {
        body.push_str("<ul class=\"results\">\n");
        for result in results {
            let _ = writeln!(
                body,
                "<li class=\"result\"><a href=\"/artist?id={id}\">{text}</a> \
                 <span class=\"type\">{kind}</span> <small>{description}</small></li>",
                id = result.artist_id,
                text = text(&result.text),
                kind = result.kind.label(),
                description = text(&result.description),
            );
        }
        body.push_str("</ul>\n");
    }
    layout("Search", &body)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let title = status.canonical_reason().unwrap_or("Error");
    let body = format!(
        "<h1>{code} {title}</h1>\n<p>{message}</p>\n<a href=\"/\">Back to all artists</a>",
        code = status.as_u16(),
        title = text(title),
        message = text(message),
    );
    layout(title, &body)
}

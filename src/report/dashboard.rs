//! HTML dashboard rendering.
//!
//! Charts are Plotly figure specs built as JSON and drawn client-side by
//! plotly.js. The page has five tabs: one bar chart per view plus a treemap.

use crate::models::{Category, CoverageRow, CoverageViews};
use serde_json::{json, Value};

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Qualitative palette for treemap tiles (Plotly default colourway).
const TILE_COLORS: [&str; 10] = [
    "#636efa", "#EF553B", "#00cc96", "#ab63fa", "#FFA15A", "#19d3f3", "#FF6692", "#B6E880",
    "#FF97FF", "#FECB52",
];

const TREEMAP_HOVER: &str = "Coverage: %{value}<br>Concept: %{customdata[0]}<br>Type: %{customdata[1]}<br>";

/// Options controlling page chrome.
#[derive(Debug, Clone, Copy, Default)]
pub struct DashboardOptions {
    /// Show a logout button (gated dashboards only).
    pub show_logout: bool,
}

/// Bar chart over a set of rows: one trace per category present, in order of first appearance.
pub fn bar_chart(rows: &[CoverageRow]) -> Value {
    let mut categories: Vec<Category> = Vec::new();
    for row in rows {
        if !categories.contains(&row.category) {
            categories.push(row.category);
        }
    }

    let traces: Vec<Value> = categories
        .iter()
        .map(|category| {
            let (x, y): (Vec<&str>, Vec<u64>) = rows
                .iter()
                .filter(|r| r.category == *category)
                .map(|r| (r.concept.as_str(), r.coverage))
                .unzip();

            json!({
                "type": "bar",
                "name": category.to_string(),
                "legendgroup": category.to_string(),
                "x": x,
                "y": y,
                "marker": { "color": category.color() },
                "hovertemplate": format!(
                    "Type={}<br>Concept=%{{x}}<br>Coverage=%{{y}}<extra></extra>",
                    category
                ),
            })
        })
        .collect();

    json!({
        "data": traces,
        "layout": {
            "barmode": "relative",
            "xaxis": { "title": { "text": "Concept" } },
            "yaxis": { "title": { "text": "Coverage" } },
            "legend": { "title": { "text": "Type" } },
            "margin": { "t": 30 },
        }
    })
}

/// Treemap over all rows, sized by coverage and coloured by concept.
pub fn treemap(rows: &[CoverageRow]) -> Value {
    let labels: Vec<&str> = rows.iter().map(|r| r.concept.as_str()).collect();
    let parents: Vec<&str> = rows.iter().map(|_| "").collect();
    let values: Vec<u64> = rows.iter().map(|r| r.coverage).collect();
    let customdata: Vec<[String; 2]> = rows
        .iter()
        .map(|r| [r.concept.clone(), r.category.to_string()])
        .collect();
    let colors: Vec<&str> = (0..rows.len())
        .map(|i| TILE_COLORS[i % TILE_COLORS.len()])
        .collect();

    json!({
        "data": [{
            "type": "treemap",
            "labels": labels,
            "parents": parents,
            "values": values,
            "customdata": customdata,
            "marker": { "colors": colors },
            "hovertemplate": TREEMAP_HOVER,
        }],
        "layout": { "margin": { "t": 30, "l": 10, "r": 10, "b": 10 } }
    })
}

/// Figures for the five tabs, in tab order.
pub fn figures(views: &CoverageViews) -> Vec<(&'static str, Value)> {
    vec![
        ("Overall", bar_chart(&views.all)),
        ("Population", bar_chart(&views.population)),
        ("Intervention", bar_chart(&views.intervention)),
        ("Outcome", bar_chart(&views.outcome)),
        ("Treemap", treemap(&views.all)),
    ]
}

/// Render the full dashboard page.
pub fn render_dashboard(views: &CoverageViews, options: DashboardOptions) -> String {
    let figures = figures(views);

    let mut tabs = String::new();
    let mut panels = String::new();
    for (i, (name, _)) in figures.iter().enumerate() {
        let active = if i == 0 { " active" } else { "" };
        tabs.push_str(&format!(
            "<button class=\"tab{}\" data-tab=\"{}\">{}</button>\n",
            active, i, name
        ));
        panels.push_str(&format!(
            "<div class=\"panel{}\" id=\"panel-{}\"><div class=\"chart\" id=\"chart-{}\"></div></div>\n",
            active, i, i
        ));
    }

    let specs: Vec<&Value> = figures.iter().map(|(_, figure)| figure).collect();
    let specs_json = script_safe_json(&json!(specs));

    let logout = if options.show_logout {
        "<form method=\"post\" action=\"/logout\"><button class=\"logout\" type=\"submit\">Log out</button></form>"
    } else {
        ""
    };

    let mut page = String::new();
    page.push_str(PAGE_HEAD);
    page.push_str(&format!("<script src=\"{}\"></script>\n</head>\n<body>\n", PLOTLY_CDN));
    page.push_str(&format!(
        "<header><h1>PICO Coverage</h1>{}</header>\n",
        logout
    ));
    page.push_str(&format!("<nav>\n{}</nav>\n", tabs));
    page.push_str(&panels);
    page.push_str(&format!(
        "<script>\nconst FIGURES = {};\n{}</script>\n</body>\n</html>\n",
        specs_json, PAGE_SCRIPT
    ));

    page
}

/// Serialize JSON for inline embedding in a `<script>` block.
fn script_safe_json(value: &Value) -> String {
    value.to_string().replace("</", "<\\/")
}

/// Escape text for HTML element content.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>PICO Coverage</title>
<style>
body { font-family: "Source Sans Pro", sans-serif; margin: 0 auto; max-width: 1200px; padding: 1rem 2rem; color: #31333f; }
header { display: flex; justify-content: space-between; align-items: center; }
nav { display: flex; gap: 0.5rem; border-bottom: 1px solid #e6e9ef; }
.tab { background: none; border: none; padding: 0.6rem 1rem; cursor: pointer; font-size: 1rem; color: #31333f; }
.tab.active { border-bottom: 3px solid #ff4b4b; color: #ff4b4b; }
.panel { display: none; padding-top: 1rem; }
.panel.active { display: block; }
.chart { width: 100%; height: 560px; }
.logout { background: #f0f2f6; border: 1px solid #d6d9e0; border-radius: 4px; padding: 0.4rem 0.8rem; cursor: pointer; }
</style>
"#;

const PAGE_SCRIPT: &str = r#"FIGURES.forEach(function (fig, i) {
  Plotly.newPlot("chart-" + i, fig.data, fig.layout, { responsive: true });
});
document.querySelectorAll(".tab").forEach(function (tab) {
  tab.addEventListener("click", function () {
    var i = tab.dataset.tab;
    document.querySelectorAll(".tab, .panel").forEach(function (el) { el.classList.remove("active"); });
    tab.classList.add("active");
    document.getElementById("panel-" + i).classList.add("active");
    Plotly.Plots.resize("chart-" + i);
  });
});
"#;

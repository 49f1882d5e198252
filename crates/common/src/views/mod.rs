//! HTML views
//!
//! maud templates for dashboard blocks and chart fragments. Fragments coming
//! from chart controllers are already HTML and are inserted unescaped.

use crate::blocks::ChartPerson;
use maud::{html, Markup, PreEscaped};
use regex_lite::Regex;
use std::sync::OnceLock;

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"))
}

/// Remove HTML tags, keeping their text.
pub fn strip_tags(text: &str) -> String {
    tag_regex().replace_all(text, "").into_owned()
}

/// Values for the generic block wrapper.
#[derive(Debug)]
pub struct BlockView<'a> {
    /// CSS-friendly module name, e.g. `charts`
    pub block: &'a str,
    pub id: i32,
    /// Link to the configuration form, when the viewer may use it
    pub config_url: Option<&'a str>,
    /// Plain-text title
    pub title: &'a str,
    /// Block body, already HTML
    pub content: &'a str,
}

/// Wraps block content in a card with a title and, optionally, a
/// configuration link.
pub fn block_template(view: &BlockView<'_>) -> Markup {
    html! {
        div id={ "block-" (view.id) } class={ "card wt-block wt-block-" (view.block) } {
            div.card-header.wt-block-header {
                @if let Some(url) = view.config_url {
                    a.wt-block-config href=(url) title="Preferences" { "Preferences" }
                }
                h2.wt-block-title { (view.title) }
            }
            div.card-body.wt-block-content {
                (PreEscaped(view.content))
            }
        }
    }
}

/// Configuration form of the Charts block.
///
/// `charts` are `(value, label)` pairs in display order.
pub fn charts_config_form(
    action: &str,
    charts: &[(&str, &str)],
    selected: &str,
    pid: &str,
    pid_name: Option<&str>,
    csrf_token: &str,
) -> Markup {
    html! {
        form.wt-block-config-form method="post" action=(action) {
            input type="hidden" name="save" value="1";
            input type="hidden" name="csrf" value=(csrf_token);
            div.form-group.row {
                label.col-sm-3.col-form-label for="type" { "Chart type" }
                div.col-sm-9 {
                    select.form-control id="type" name="type" {
                        @for (value, label) in charts {
                            option value=(value) selected[*value == selected] { (label) }
                        }
                    }
                }
            }
            div.form-group.row {
                label.col-sm-3.col-form-label for="pid" { "Individual" }
                div.col-sm-9 {
                    input.form-control type="text" id="pid" name="pid" value=(pid);
                    @if let Some(name) = pid_name {
                        small.form-text.text-muted { (name) }
                    }
                }
            }
            button.btn.btn-primary type="submit" { "save" }
        }
    }
}

/// Box with a person's name, as used in every chart.
pub fn person_box(person: &ChartPerson) -> Markup {
    html! {
        div class={ "wt-chart-box wt-sex-" (person.sex.to_ascii_lowercase()) } data-xref=(person.xref) {
            span.wt-chart-box-name { (person.name) }
        }
    }
}

/// A single-subject chart of a given kind and depth.
pub fn chart_frame(kind: &str, person: &ChartPerson, generations: u32) -> Markup {
    html! {
        div class={ "wt-chart " (kind) } data-generations=(generations) {
            (person_box(person))
        }
    }
}

/// Interactive tree container.
pub fn tree_viewport(person: &ChartPerson, generations: u32) -> Markup {
    html! {
        div id="tvTreeBorder" class="tv_tree" data-generations=(generations) {
            div id="tv_tree" {
                (person_box(person))
            }
        }
    }
}

/// Two chart fragments side by side, followed by their script.
pub fn chart_pair(left_class: Option<&str>, left: &str, right: &str, script: &str) -> Markup {
    html! {
        table cellspacing="0" cellpadding="0" border="0" {
            tr {
                td class=[left_class] { (PreEscaped(left)) }
                td { (PreEscaped(right)) }
            }
        }
        script { (PreEscaped(script)) }
    }
}

/// One chart fragment followed by its script.
pub fn chart_single(chart: &str, script: &str) -> Markup {
    html! {
        (PreEscaped(chart))
        script { (PreEscaped(script)) }
    }
}

/// Interactive tree: stylesheet injection, viewer script, viewport and its
/// start-up script.
pub fn tree_view(css_url: &str, js_url: &str, viewport: &str, script: &str) -> Markup {
    let css_link = format!(
        "$(\"head\").append('<link rel=\"stylesheet\" href=\"{}\" type=\"text/css\" />');",
        css_url
    );

    html! {
        script { (PreEscaped(css_link)) }
        script src=(js_url) {}
        (PreEscaped(viewport))
        script { (PreEscaped(script)) }
    }
}
